use crate::coerce::CoerceError;

/// Errors that can occur when constructing or manipulating config objects.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `update`, `set`, or constructor keyword handling was given a name
    /// that is not in the class's field table.
    NoSuchField {
        /// Name of the class whose field table was consulted.
        class: String,
        /// The offending field name.
        field: String,
    },

    /// Indexed access (`get_item` / `set_item`) was given an unknown key.
    ///
    /// This is deliberately distinct from [`ConfigError::NoSuchField`]: it is
    /// the lookup-error kind, mirroring `obj[key]` rather than `obj.field`.
    NoSuchKey {
        /// The offending key.
        key: String,
    },

    /// One or more required fields were still unset when the construction
    /// protocol finished. All offending names are reported together.
    RequiredUnset {
        /// Name of the class being constructed.
        class: String,
        /// Every field that was still unset, in declaration order.
        fields: Vec<String>,
    },

    /// Tried to assign [`Unset`](crate::FieldValue::Unset) to a field after
    /// the default-assignment phase ended.
    UnsetAfterInit {
        /// Name of the class.
        class: String,
        /// The field that was targeted.
        field: String,
    },

    /// Read a field whose slot is still unset. Only reachable from inside a
    /// custom initializer, before required fields have been supplied.
    ReadUnset {
        /// Name of the class.
        class: String,
        /// The field that was read.
        field: String,
    },

    /// Method or attribute lookup failed on the class (and its base chain).
    NoSuchAttr {
        /// Name of the class where lookup started.
        class: String,
        /// The attribute or method name.
        name: String,
    },

    /// A coercer rejected an assigned value. The underlying error is carried
    /// unchanged.
    Coerce(CoerceError),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoSuchField { class, field } => {
                write!(f, "{class} has no config field {field:?}")
            }
            ConfigError::NoSuchKey { key } => {
                write!(f, "no such key: {key:?}")
            }
            ConfigError::RequiredUnset { class, fields } => {
                write!(f, "{class}: unset required fields: ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                Ok(())
            }
            ConfigError::UnsetAfterInit { class, field } => {
                write!(
                    f,
                    "attempt to assign NO_DEFAULT to field {field:?} after end of {class} initialization"
                )
            }
            ConfigError::ReadUnset { class, field } => {
                write!(f, "{class} field {field:?} is still unset")
            }
            ConfigError::NoSuchAttr { class, name } => {
                write!(f, "{class} has no attribute {name:?}")
            }
            ConfigError::Coerce(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ConfigError::Coerce(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoerceError> for ConfigError {
    fn from(err: CoerceError) -> Self {
        ConfigError::Coerce(err)
    }
}
