//! The tagged value container produced by argument parsing.
//!
//! Every declared option, command, and positional argument maps to exactly
//! one [`Value`]. The kind of a value is fixed by the usage text (a counted
//! flag is always [`Value::Int`], a repeating positional is always
//! [`Value::List`]) while its content reflects what the user supplied, the
//! declared default, or a falsy placeholder.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminant of a [`Value`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Empty,
    Bool,
    Int,
    Str,
    List,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Kind::Empty => "empty",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Str => "string",
            Kind::List => "string list",
        };
        f.write_str(label)
    }
}

/// Error produced by a kind-checked extraction from a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value holds a different kind than the one requested.
    #[error("cannot read {actual} value as {requested}")]
    KindMismatch { requested: Kind, actual: Kind },
    /// Integer extraction from a string that is not entirely numeric.
    #[error("'{0}' contains non-numeric characters")]
    NonNumeric(String),
}

/// A parsed argument value.
///
/// Serializes untagged, so the JSON form is the natural one: `null`, a
/// boolean, an integer, a string, or an array of strings.
///
/// # Examples
///
/// ```
/// use usagedoc_core::Value;
///
/// let v = Value::Str("15".into());
/// assert_eq!(v.as_str(), Some("15"));
/// assert_eq!(v.to_int().unwrap(), 15);
/// assert_eq!(v.to_string(), "\"15\"");
///
/// assert!(!Value::Empty.is_present());
/// assert!(Value::Bool(false).is_present());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value at all; an option that takes an argument but was neither
    /// given nor defaulted.
    #[default]
    Empty,
    /// A flag or command that was present or absent.
    Bool(bool),
    /// An occurrence counter for a repeatable flag or command.
    Int(i64),
    /// A single supplied or defaulted argument.
    Str(String),
    /// Accumulated values of a repeatable argument, in argv order.
    List(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Empty => Kind::Empty,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Str(_) => Kind::Str,
            Value::List(_) => Kind::List,
        }
    }

    /// Whether the value holds any contents at all. Note that `Bool(false)`
    /// is present; only [`Value::Empty`] is not.
    pub fn is_present(&self) -> bool {
        !matches!(self, Value::Empty)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Extracts an integer, converting from a string only when the entire
    /// string parses as a signed decimal.
    ///
    /// # Examples
    ///
    /// ```
    /// use usagedoc_core::Value;
    ///
    /// assert_eq!(Value::Str("-42".into()).to_int().unwrap(), -42);
    /// assert!(Value::Str("12px".into()).to_int().is_err());
    /// assert!(Value::Bool(true).to_int().is_err());
    /// ```
    pub fn to_int(&self) -> Result<i64, ValueError> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Str(s) => s
                .parse::<i64>()
                .map_err(|_| ValueError::NonNumeric(s.clone())),
            other => Err(ValueError::KindMismatch {
                requested: Kind::Int,
                actual: other.kind(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{item}\"")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rendering() {
        assert_eq!(Value::Empty.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Int(10).to_string(), "10");
        assert_eq!(Value::Str("x y".into()).to_string(), "\"x y\"");
        assert_eq!(
            Value::List(vec!["a".into(), "b".into()]).to_string(),
            "[\"a\", \"b\"]"
        );
        assert_eq!(Value::List(Vec::new()).to_string(), "[]");
    }

    #[test]
    fn test_to_int_requires_full_parse() {
        assert_eq!(Value::Str("123".into()).to_int().unwrap(), 123);
        assert_eq!(Value::Str("-7".into()).to_int().unwrap(), -7);
        assert_eq!(
            Value::Str("12x".into()).to_int(),
            Err(ValueError::NonNumeric("12x".into()))
        );
        assert_eq!(
            Value::Str("1 2".into()).to_int(),
            Err(ValueError::NonNumeric("1 2".into()))
        );
    }

    #[test]
    fn test_to_int_kind_mismatch() {
        let err = Value::List(Vec::new()).to_int().unwrap_err();
        assert_eq!(
            err,
            ValueError::KindMismatch {
                requested: Kind::Int,
                actual: Kind::List,
            }
        );
    }

    #[test]
    fn test_presence() {
        assert!(!Value::Empty.is_present());
        assert!(Value::Bool(false).is_present());
        assert!(Value::Int(0).is_present());
        assert!(Value::Str(String::new()).is_present());
    }

    #[test]
    fn test_serde_untagged_json() {
        let json = serde_json::to_string(&Value::Empty).unwrap();
        assert_eq!(json, "null");
        assert_eq!(serde_json::to_string(&Value::Int(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&Value::List(vec!["a".into()])).unwrap(),
            "[\"a\"]"
        );

        let back: Value = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(back, Value::Str("hello".into()));
        let back: Value = serde_json::from_str("null").unwrap();
        assert_eq!(back, Value::Empty);
    }
}
