//! Coercion callables for typed fields.
//!
//! A [`Coercer`] is a named conversion function applied to every value
//! assigned to a typed field. The built-ins cover the usual scalar
//! conversions; anything else can be supplied with [`Coercer::new`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Conversion function applied to values assigned to a typed field.
type CoerceFn = dyn Fn(Value) -> Result<Value, CoerceError> + Send + Sync;

/// A named conversion applied to every value assigned to a typed field.
///
/// The name only serves diagnostics: it shows up in [`CoerceError`] messages
/// and in `Debug` output for field specs.
#[derive(Clone)]
pub struct Coercer {
    name: &'static str,
    apply: Arc<CoerceFn>,
}

impl Coercer {
    /// Creates a coercer from a name and a conversion function.
    pub fn new(
        name: &'static str,
        apply: impl Fn(Value) -> Result<Value, CoerceError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            apply: Arc::new(apply),
        }
    }

    /// The coercer's diagnostic name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Applies the conversion to `value`.
    pub fn apply(&self, value: Value) -> Result<Value, CoerceError> {
        (self.apply)(value)
    }
}

impl fmt::Debug for Coercer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Coercer").field(&self.name).finish()
    }
}

/// A coercer rejected a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    /// Name of the coercer that rejected the value.
    pub coercer: &'static str,
    /// Rendering of the rejected value.
    pub value: String,
}

impl CoerceError {
    /// Builds the standard rejection error for a value a coercer cannot
    /// convert.
    pub fn rejected(coercer: &'static str, value: &Value) -> Self {
        Self {
            coercer,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coercer {:?} cannot convert {}", self.coercer, self.value)
    }
}

impl core::error::Error for CoerceError {}

/// Coerces to an integer. Accepts integers, integral floats, booleans, and
/// strings that parse as an integer.
pub fn integer() -> Coercer {
    Coercer::new("integer", |value| {
        let out = match &value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(i)
                } else {
                    // Integral floats truncate toward zero, like int(7.9) -> 7.
                    n.as_f64().map(|f| f.trunc() as i64)
                }
            }
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match out {
            Some(i) => Ok(Value::from(i)),
            None => Err(CoerceError::rejected("integer", &value)),
        }
    })
}

/// Coerces to a float. Accepts numbers, booleans, and parseable strings.
pub fn float() -> Coercer {
    Coercer::new("float", |value| {
        let out = match &value {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match out.and_then(serde_json::Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => Err(CoerceError::rejected("float", &value)),
        }
    })
}

/// Coerces to a boolean. Accepts booleans, numbers (zero is false), and the
/// strings `"true"` / `"false"`.
pub fn boolean() -> Coercer {
    Coercer::new("boolean", |value| {
        let out = match &value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            Value::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        };
        match out {
            Some(b) => Ok(Value::Bool(b)),
            None => Err(CoerceError::rejected("boolean", &value)),
        }
    })
}

/// Coerces to a string. Strings pass through; other scalars are rendered in
/// their JSON form. Arrays and objects are rejected.
pub fn string() -> Coercer {
    Coercer::new("string", |value| match value {
        Value::String(s) => Ok(Value::String(s)),
        Value::Number(_) | Value::Bool(_) => Ok(Value::String(value.to_string())),
        other => Err(CoerceError::rejected("string", &other)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_accepts_numeric_strings() {
        assert_eq!(integer().apply(json!("5")).unwrap(), json!(5));
        assert_eq!(integer().apply(json!(" -12 ")).unwrap(), json!(-12));
    }

    #[test]
    fn integer_truncates_floats() {
        assert_eq!(integer().apply(json!(7.9)).unwrap(), json!(7));
    }

    #[test]
    fn integer_rejects_null() {
        let err = integer().apply(Value::Null).unwrap_err();
        assert_eq!(err.coercer, "integer");
    }

    #[test]
    fn string_renders_scalars() {
        assert_eq!(string().apply(json!(8080)).unwrap(), json!("8080"));
        assert_eq!(string().apply(json!("x")).unwrap(), json!("x"));
        assert!(string().apply(json!([1, 2])).is_err());
    }

    #[test]
    fn boolean_parses_literals() {
        assert_eq!(boolean().apply(json!("true")).unwrap(), json!(true));
        assert_eq!(boolean().apply(json!(0)).unwrap(), json!(false));
        assert!(boolean().apply(json!("yes")).is_err());
    }
}
