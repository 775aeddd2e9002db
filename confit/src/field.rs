//! Field values and field specs.
//!
//! [`FieldValue`] is the tagged replacement for an identity-compared
//! "no default" sentinel: `Unset` marks a required field (and, during the
//! construction window, a field that has not been supplied yet), while
//! `Set` wraps a live value. [`FieldSpec`] is the per-field descriptor held
//! by the field table.

use core::fmt;

use serde_json::Value;

use crate::coerce::Coercer;

/// A field's default or current value.
///
/// Compared structurally: two `Unset`s are equal, and `Set` values compare
/// by their contents. `Unset` is only a legal *current* value between
/// allocation and the end of the construction protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No value. As a default this means "required, must be supplied".
    Unset,
    /// A live value.
    Set(Value),
}

/// Marker for "required, no default" field declarations.
pub const NO_DEFAULT: FieldValue = FieldValue::Unset;

impl FieldValue {
    /// Returns `true` if this is `Unset`.
    pub fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Unset)
    }

    /// Returns the inner value, or `None` for `Unset`.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Unset => None,
            FieldValue::Set(value) => Some(value),
        }
    }

    /// Wraps anything convertible to a [`Value`].
    pub fn of(value: impl Into<Value>) -> Self {
        FieldValue::Set(value.into())
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Set(value)
    }
}

macro_rules! field_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Set(Value::from(value))
                }
            }
        )*
    };
}

field_value_from!(&str, String, bool, i32, i64, u32, u64, f64);

impl PartialEq<Value> for FieldValue {
    fn eq(&self, other: &Value) -> bool {
        self.as_value() == Some(other)
    }
}

impl PartialEq<FieldValue> for Value {
    fn eq(&self, other: &FieldValue) -> bool {
        other == self
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unset => f.write_str("NO_DEFAULT"),
            FieldValue::Set(value) => fmt::Display::fmt(value, f),
        }
    }
}

/// Per-field descriptor: declared default, optional coercion, and whether
/// `null` bypasses coercion.
///
/// Owned exclusively by the field table and immutable once the table is
/// built.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    default: FieldValue,
    coercer: Option<Coercer>,
    allow_none: bool,
}

impl FieldSpec {
    /// A plain field with the given default and no coercion.
    pub fn new(default: impl Into<Value>) -> Self {
        Self {
            default: FieldValue::Set(default.into()),
            coercer: None,
            allow_none: true,
        }
    }

    /// A plain field with no default: a value must be supplied at
    /// construction time.
    pub fn required() -> Self {
        Self {
            default: FieldValue::Unset,
            coercer: None,
            allow_none: true,
        }
    }

    /// A typed field: every assigned value (including the default) goes
    /// through `coercer`. Pass [`NO_DEFAULT`] to make it required.
    pub fn typed(default: impl Into<FieldValue>, coercer: Coercer) -> Self {
        Self {
            default: default.into(),
            coercer: Some(coercer),
            allow_none: true,
        }
    }

    /// Controls whether `null` assignments bypass the coercer.
    ///
    /// Defaults to `true`. With `false`, assigning `null` to a typed field
    /// invokes the coercer, which will typically reject it.
    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }

    /// The declared default.
    pub fn default(&self) -> &FieldValue {
        &self.default
    }

    /// The coercer, if this is a typed field.
    pub fn coercer(&self) -> Option<&Coercer> {
        self.coercer.as_ref()
    }

    /// Whether `null` assignments bypass the coercer.
    pub fn is_none_allowed(&self) -> bool {
        self.allow_none
    }
}
