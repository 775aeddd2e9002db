//! Config object instances: controlled mutation, dict-like access,
//! equality, and serialization.

use core::fmt;
use core::ops::Index;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;

use crate::class::ConfigClass;
use crate::error::ConfigError;
use crate::field::FieldValue;

/// An instance of a reified class.
///
/// Its live state is exactly one slot per field in the class's field table,
/// in declaration order. Every mutation path (`set`, `set_item`, `update`)
/// funnels through one controlled setter, so coercion and the unset-guard
/// cannot be bypassed.
pub struct ConfigObject {
    class: ConfigClass,
    slots: IndexMap<String, FieldValue>,
    in_default_phase: bool,
}

impl ConfigObject {
    /// Produces a raw instance with no slots assigned yet. Only the
    /// construction protocol calls this.
    pub(crate) fn allocate(class: ConfigClass) -> Self {
        let capacity = class.fields().len();
        Self {
            class,
            slots: IndexMap::with_capacity(capacity),
            in_default_phase: true,
        }
    }

    pub(crate) fn end_default_phase(&mut self) {
        self.in_default_phase = false;
    }

    /// Names of fields whose slots are still unset, in declaration order.
    pub(crate) fn unset_fields(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_unset())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The instance's class descriptor.
    pub fn class(&self) -> &ConfigClass {
        &self.class
    }

    /// The controlled setter every mutation path funnels through.
    ///
    /// Steps, in order: reject `Unset` outside the default-assignment
    /// phase; run the field's coercer unless the value is `null` and the
    /// field allows it; store. A failed step leaves the prior value
    /// untouched.
    pub(crate) fn assign(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigError> {
        let Some(spec) = self.class.fields().get(name) else {
            return Err(ConfigError::NoSuchField {
                class: self.class.name().to_string(),
                field: name.to_string(),
            });
        };

        let stored = match value {
            FieldValue::Unset => {
                if !self.in_default_phase {
                    return Err(ConfigError::UnsetAfterInit {
                        class: self.class.name().to_string(),
                        field: name.to_string(),
                    });
                }
                FieldValue::Unset
            }
            FieldValue::Set(raw) => {
                let coerced = match spec.coercer() {
                    Some(coercer) if !(raw.is_null() && spec.is_none_allowed()) => {
                        coercer.apply(raw)?
                    }
                    _ => raw,
                };
                FieldValue::Set(coerced)
            }
        };

        trace!(class = self.class.name(), field = name, "assign");
        self.slots.insert(name.to_string(), stored);
        Ok(())
    }

    /// Assigns fields from keyword arguments.
    ///
    /// Pairs apply in order; the first unknown name aborts the call with
    /// [`ConfigError::NoSuchField`], leaving earlier pairs applied.
    pub fn update(
        &mut self,
        kwargs: impl IntoIterator<Item = (String, FieldValue)>,
    ) -> Result<(), ConfigError> {
        for (name, value) in kwargs {
            self.assign(&name, value)?;
        }
        Ok(())
    }

    /// Attribute-style read. Unknown names fail with
    /// [`ConfigError::NoSuchField`]; a slot that is still unset (possible
    /// only inside a custom initializer) fails with
    /// [`ConfigError::ReadUnset`].
    pub fn get(&self, name: &str) -> Result<&Value, ConfigError> {
        match self.slots.get(name) {
            None => Err(ConfigError::NoSuchField {
                class: self.class.name().to_string(),
                field: name.to_string(),
            }),
            Some(FieldValue::Unset) => Err(ConfigError::ReadUnset {
                class: self.class.name().to_string(),
                field: name.to_string(),
            }),
            Some(FieldValue::Set(value)) => Ok(value),
        }
    }

    /// Attribute-style write through the controlled setter.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), ConfigError> {
        self.assign(name, value.into())
    }

    /// Indexed read: like [`get`](Self::get) but unknown keys fail with the
    /// lookup-error kind, [`ConfigError::NoSuchKey`].
    pub fn get_item(&self, key: &str) -> Result<&Value, ConfigError> {
        match self.slots.get(key) {
            None => Err(ConfigError::NoSuchKey {
                key: key.to_string(),
            }),
            Some(FieldValue::Unset) => Err(ConfigError::ReadUnset {
                class: self.class.name().to_string(),
                field: key.to_string(),
            }),
            Some(FieldValue::Set(value)) => Ok(value),
        }
    }

    /// Indexed write: like [`set`](Self::set) but unknown keys fail with
    /// [`ConfigError::NoSuchKey`].
    pub fn set_item(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<(), ConfigError> {
        if !self.class.fields().contains(key) {
            return Err(ConfigError::NoSuchKey {
                key: key.to_string(),
            });
        }
        self.assign(key, value.into())
    }

    /// A field's current slot, unset or not.
    pub fn field_value(&self, name: &str) -> Result<&FieldValue, ConfigError> {
        self.slots.get(name).ok_or_else(|| ConfigError::NoSuchField {
            class: self.class.name().to_string(),
            field: name.to_string(),
        })
    }

    /// Current field values as an ordered map, in declaration order.
    ///
    /// Slots that are still unset are skipped; after construction every
    /// slot is set, so the map then covers the whole field table.
    pub fn to_dict(&self) -> Map<String, Value> {
        self.slots
            .iter()
            .filter_map(|(name, slot)| {
                slot.as_value().map(|value| (name.clone(), value.clone()))
            })
            .collect()
    }

    /// Field names, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Current field values, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.slots.values()
    }

    /// `(name, current value)` pairs, in declaration order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    /// `(name, declared default)` pairs, independent of current state.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.class
            .fields()
            .iter()
            .map(|(name, spec)| (name, spec.default()))
    }

    /// The declared default for one field.
    pub fn default(&self, name: &str) -> Result<&FieldValue, ConfigError> {
        match self.class.fields().get(name) {
            Some(spec) => Ok(spec.default()),
            None => Err(ConfigError::NoSuchField {
                class: self.class.name().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Invokes a class method, resolving through the base chain.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ConfigError> {
        match self.class.method(name) {
            Some(method) => Ok(method(self, args)),
            None => Err(ConfigError::NoSuchAttr {
                class: self.class.name().to_string(),
                name: name.to_string(),
            }),
        }
    }
}

impl Index<&str> for ConfigObject {
    type Output = Value;

    /// Panics on unknown keys (and on slots still unset), with the same
    /// message the fallible [`get_item`](ConfigObject::get_item) reports.
    fn index(&self, key: &str) -> &Value {
        match self.get_item(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<'a> IntoIterator for &'a ConfigObject {
    type Item = (&'a str, &'a FieldValue);
    type IntoIter = ObjectIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        ObjectIter {
            inner: self.slots.iter(),
        }
    }
}

/// Iterator over `(name, current value)` pairs of a config object.
pub struct ObjectIter<'a> {
    inner: indexmap::map::Iter<'a, String, FieldValue>,
}

impl<'a> Iterator for ObjectIter<'a> {
    type Item = (&'a str, &'a FieldValue);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(name, slot)| (name.as_str(), slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl PartialEq for ConfigObject {
    /// Instances compare equal iff one class is (or extends) the other and
    /// every field of the ancestor class compares equal in both.
    fn eq(&self, other: &Self) -> bool {
        let ancestor = if self.class.is_subclass_of(&other.class) {
            &other.class
        } else if other.class.is_subclass_of(&self.class) {
            &self.class
        } else {
            return false;
        };

        ancestor.fields().names().all(|name| {
            match (self.slots.get(name), other.slots.get(name)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        })
    }
}

impl fmt::Display for ConfigObject {
    /// `<ClassName: {name: value, ...}>`, fields in declaration order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {{", self.class.name())?;
        for (i, (name, slot)) in self.items().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {slot}")?;
        }
        write!(f, "}}>")
    }
}

impl fmt::Debug for ConfigObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for ConfigObject {
    /// Serializes as a map of field name to current value, in declaration
    /// order. Unset slots serialize as `null`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (name, slot) in self.items() {
            match slot.as_value() {
                Some(value) => map.serialize_entry(name, value)?,
                None => map.serialize_entry(name, &Value::Null)?,
            }
        }
        map.end()
    }
}
