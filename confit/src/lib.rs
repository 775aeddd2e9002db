#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod class;
pub use class::{ClassAttr, ClassBuilder, ConfigClass, Entry, Initializer, Kwargs, Method};

pub mod coerce;
pub use coerce::{CoerceError, Coercer};

mod error;
pub use error::ConfigError;

mod field;
pub use field::{FieldSpec, FieldValue, NO_DEFAULT};

mod object;
pub use object::{ConfigObject, ObjectIter};

mod table;
pub use table::FieldTable;

pub use serde_json::{Map, Value, json};

/// Builds [`Kwargs`] from `name: value` literals.
///
/// Values go through [`json!`], so anything that macro accepts works here:
///
/// ```
/// use confit::kwargs;
///
/// let args = kwargs! { port: "9090", token: "abc", retries: 3 };
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! kwargs {
    () => { $crate::Kwargs::new() };
    ($($name:ident : $value:expr),+ $(,)?) => {
        <$crate::Kwargs>::from([
            $( (::std::string::String::from(stringify!($name)), $crate::FieldValue::from($crate::json!($value))) ),+
        ])
    };
}
