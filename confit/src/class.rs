//! Class reification: turning an ordered class body into a class descriptor
//! with an immutable field table.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use crate::error::ConfigError;
use crate::field::{FieldSpec, FieldValue};
use crate::object::ConfigObject;
use crate::table::FieldTable;

/// Keyword arguments for construction and [`ConfigObject::update`].
///
/// Pairs are processed in order; the [`kwargs!`](crate::kwargs) macro builds
/// one from `name: value` literals.
pub type Kwargs = Vec<(String, FieldValue)>;

/// A method attached to a class, invocable through
/// [`ConfigObject::call`].
pub type Method = Arc<dyn Fn(&ConfigObject, &[Value]) -> Value + Send + Sync>;

/// A custom user-initialization hook, replacing the default
/// template-then-kwargs application.
///
/// Runs after defaults have been assigned and before required fields are
/// validated, so it can leave no required field unset without the
/// construction call failing.
pub type Initializer =
    Arc<dyn Fn(&mut ConfigObject, Option<&ConfigObject>, Kwargs) -> Result<(), ConfigError> + Send + Sync>;

/// One entry of a class body, in the order it was declared.
///
/// Field status is syntactically explicit: there is no way to nest wrappers
/// or to smuggle a callable in as a plain value.
pub enum Entry {
    /// A plain body entry. Becomes a field (with the value as its default)
    /// unless the name is underscore-prefixed.
    Value(Value),
    /// A forced field, regardless of the underlying default.
    Field(FieldSpec),
    /// Explicitly opted out: restored as an ordinary class attribute.
    Nonfield(Value),
    /// A plain function. Never a field; becomes a method.
    Method(Method),
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Entry::Field(spec) => f.debug_tuple("Field").field(spec).finish(),
            Entry::Nonfield(value) => f.debug_tuple("Nonfield").field(value).finish(),
            Entry::Method(_) => f.write_str("Method(..)"),
        }
    }
}

/// A non-field class attribute left behind by reification.
pub enum ClassAttr {
    /// An ordinary value attribute.
    Value(Value),
    /// A method, invocable through [`ConfigObject::call`].
    Method(Method),
    /// A field spec shadowed by the underscore rule: kept as-is, un-reified.
    Spec(FieldSpec),
}

impl ClassAttr {
    /// Returns the attribute's value, if it is a plain value attribute.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ClassAttr::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for ClassAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassAttr::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ClassAttr::Method(_) => f.write_str("Method(..)"),
            ClassAttr::Spec(spec) => f.debug_tuple("Spec").field(spec).finish(),
        }
    }
}

struct ClassInner {
    name: String,
    base: Option<ConfigClass>,
    fields: FieldTable,
    attrs: IndexMap<String, ClassAttr>,
    initializer: Option<Initializer>,
}

/// A reified class: name, ordered field table, ordinary attributes, and an
/// optional base class.
///
/// `ConfigClass` is a cheap handle (`Arc` internally); clones share the same
/// class identity. Two separately built classes are distinct even if their
/// bodies match.
#[derive(Clone)]
pub struct ConfigClass {
    inner: Arc<ClassInner>,
}

impl ConfigClass {
    /// Starts a class body for `name`.
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            entries: IndexMap::new(),
            base: None,
            initializer: None,
        }
    }

    /// The class name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The class's own field table.
    ///
    /// Computed from this class's declared body only; base-class fields are
    /// not merged in.
    pub fn fields(&self) -> &FieldTable {
        &self.inner.fields
    }

    /// The base class, if one was declared with [`ClassBuilder::extends`].
    pub fn base(&self) -> Option<&ConfigClass> {
        self.inner.base.as_ref()
    }

    /// Returns `true` if `self` is `other` or transitively extends it.
    pub fn is_subclass_of(&self, other: &ConfigClass) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if Arc::ptr_eq(&class.inner, &other.inner) {
                return true;
            }
            current = class.base();
        }
        false
    }

    /// Looks up a non-field attribute, walking the base chain.
    pub fn attr(&self, name: &str) -> Option<&ClassAttr> {
        let mut current = Some(self);
        while let Some(class) = current {
            if let Some(attr) = class.inner.attrs.get(name) {
                return Some(attr);
            }
            current = class.base();
        }
        None
    }

    /// Looks up a method, walking the base chain.
    pub fn method(&self, name: &str) -> Option<&Method> {
        match self.attr(name) {
            Some(ClassAttr::Method(method)) => Some(method),
            _ => None,
        }
    }

    /// Constructs an instance from keyword arguments alone.
    pub fn instantiate(
        &self,
        kwargs: impl IntoIterator<Item = (String, FieldValue)>,
    ) -> Result<ConfigObject, ConfigError> {
        self.construct(None, kwargs.into_iter().collect())
    }

    /// Constructs an instance seeded from a template instance's current
    /// field values, then overridden by keyword arguments.
    pub fn instantiate_from(
        &self,
        template: &ConfigObject,
        kwargs: impl IntoIterator<Item = (String, FieldValue)>,
    ) -> Result<ConfigObject, ConfigError> {
        self.construct(Some(template), kwargs.into_iter().collect())
    }

    /// The construction protocol: allocate, assign defaults in declaration
    /// order, run the initializer, then enforce that no field is left unset.
    fn construct(
        &self,
        template: Option<&ConfigObject>,
        kwargs: Kwargs,
    ) -> Result<ConfigObject, ConfigError> {
        trace!(class = self.name(), "allocating instance");
        let mut obj = ConfigObject::allocate(self.clone());

        // Defaults phase: the only window where Unset may be assigned.
        // Typed defaults go through the controlled setter and get coerced.
        for (name, spec) in self.fields().iter() {
            obj.assign(name, spec.default().clone())?;
        }
        obj.end_default_phase();

        match &self.inner.initializer {
            Some(init) => init(&mut obj, template, kwargs)?,
            None => {
                if let Some(template) = template {
                    let seed: Kwargs = template
                        .items()
                        .map(|(name, value)| (name.to_string(), value.clone()))
                        .collect();
                    obj.update(seed)?;
                }
                obj.update(kwargs)?;
            }
        }

        let missing = obj.unset_fields();
        if missing.is_empty() {
            trace!(class = self.name(), "instance validated");
            Ok(obj)
        } else {
            Err(ConfigError::RequiredUnset {
                class: self.name().to_string(),
                fields: missing,
            })
        }
    }
}

impl fmt::Debug for ConfigClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigClass")
            .field("name", &self.inner.name)
            .field("fields", &self.inner.fields)
            .finish_non_exhaustive()
    }
}

/// Accumulates a class body and reifies it with [`ClassBuilder::build`].
///
/// Entries keep declaration order; redeclaring a name replaces the entry in
/// place without moving it.
pub struct ClassBuilder {
    name: String,
    entries: IndexMap<String, Entry>,
    base: Option<ConfigClass>,
    initializer: Option<Initializer>,
}

impl ClassBuilder {
    /// Adds a raw entry.
    pub fn entry(mut self, name: impl Into<String>, entry: Entry) -> Self {
        self.entries.insert(name.into(), entry);
        self
    }

    /// Adds a plain body entry: `name = value`.
    pub fn set(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entry(name, Entry::Value(value.into()))
    }

    /// Adds a forced field.
    pub fn field(self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.entry(name, Entry::Field(spec))
    }

    /// Adds a required field: no default, a value must be supplied at
    /// construction time.
    pub fn required(self, name: impl Into<String>) -> Self {
        self.field(name, FieldSpec::required())
    }

    /// Adds a typed field.
    pub fn typed(
        self,
        name: impl Into<String>,
        default: impl Into<FieldValue>,
        coercer: crate::coerce::Coercer,
    ) -> Self {
        self.field(name, FieldSpec::typed(default, coercer))
    }

    /// Adds an entry explicitly opted out of field reification.
    pub fn nonfield(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entry(name, Entry::Nonfield(value.into()))
    }

    /// Adds a method.
    pub fn method(
        self,
        name: impl Into<String>,
        method: impl Fn(&ConfigObject, &[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.entry(name, Entry::Method(Arc::new(method)))
    }

    /// Declares a base class.
    ///
    /// Attribute and method lookup walk the base chain, and instances
    /// compare equal across the subclass relation. The field table does
    /// *not* merge: it is computed from this class's own body.
    pub fn extends(mut self, base: ConfigClass) -> Self {
        self.base = Some(base);
        self
    }

    /// Replaces the default user-initialization phase.
    ///
    /// The hook receives the freshly defaulted instance, the optional
    /// template, and the constructor's keyword arguments. Required-field
    /// validation still runs after it returns and cannot be bypassed.
    pub fn initializer(
        mut self,
        init: impl Fn(&mut ConfigObject, Option<&ConfigObject>, Kwargs) -> Result<(), ConfigError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.initializer = Some(Arc::new(init));
        self
    }

    /// Reifies the class body.
    ///
    /// Every entry is classified by the first matching rule:
    ///
    /// 1. underscore-prefixed names are never fields;
    /// 2. [`Entry::Nonfield`] entries are never fields;
    /// 3. [`Entry::Field`] entries are always fields;
    /// 4. otherwise the entry is a field unless it is a plain function
    ///    ([`Entry::Method`]).
    ///
    /// Selected fields are stripped from the class namespace and inserted
    /// into the field table in declaration order.
    pub fn build(self) -> ConfigClass {
        let mut fields = IndexMap::new();
        let mut attrs = IndexMap::new();

        for (name, entry) in self.entries {
            if name.starts_with('_') {
                let attr = match entry {
                    Entry::Value(value) | Entry::Nonfield(value) => ClassAttr::Value(value),
                    Entry::Method(method) => ClassAttr::Method(method),
                    // Shadowed by the underscore rule: the wrapper survives
                    // as a plain attribute, un-reified.
                    Entry::Field(spec) => ClassAttr::Spec(spec),
                };
                attrs.insert(name, attr);
                continue;
            }
            match entry {
                Entry::Nonfield(value) => {
                    attrs.insert(name, ClassAttr::Value(value));
                }
                Entry::Field(spec) => {
                    fields.insert(name, spec);
                }
                Entry::Method(method) => {
                    attrs.insert(name, ClassAttr::Method(method));
                }
                Entry::Value(value) => {
                    fields.insert(name, FieldSpec::new(value));
                }
            }
        }

        trace!(
            class = self.name.as_str(),
            fields = fields.len(),
            attrs = attrs.len(),
            "reified class"
        );

        ConfigClass {
            inner: Arc::new(ClassInner {
                name: self.name,
                base: self.base,
                fields: FieldTable::from_entries(fields),
                attrs,
                initializer: self.initializer,
            }),
        }
    }
}
