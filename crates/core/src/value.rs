//! Typed argument values produced by parsers.

use std::fmt;

use serde::Serialize;

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// An optional argument that was omitted and has no default.
    Null,
    /// Boolean (from `@bool` or a `@flag` switch).
    Bool(bool),
    /// Integer (from `@int`).
    Int(i64),
    /// Floating-point number (from `@double`).
    Double(f64),
    /// Text (literals, `@string`, `@text`).
    Str(String),
}

impl Value {
    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The text of a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer of a [`Value::Int`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The number of a [`Value::Double`] or [`Value::Int`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// The boolean of a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Double(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
        }
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

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Where a [`ParsedArg`]'s value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgOrigin {
    /// Consumed from a positional word.
    Input,
    /// Supplied as `-name value`.
    Switch,
    /// Filled from the argument's default (or null) because it was omitted.
    Default,
}

/// One argument on the matched command path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedArg {
    /// Argument name (`name` parameter, else the parser or literal name).
    pub name: String,
    /// Parsed value.
    pub value: Value,
    /// Consumed for matching but hidden from [`crate::Invocation::args`].
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub suppressed: bool,
    /// Where the value came from.
    pub origin: ArgOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accessors() {
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert_eq!(Value::Double(1.5).as_i64(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert!(Value::Null.is_null());
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(3),
            Value::from("hi"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,true,3,"hi"]"#);
    }

    #[test]
    fn suppressed_flag_only_serialized_when_set() {
        let arg = ParsedArg {
            name: "amount".into(),
            value: Value::Int(2),
            suppressed: false,
            origin: ArgOrigin::Input,
        };
        let json = serde_json::to_string(&arg).unwrap();
        assert_eq!(json, r#"{"name":"amount","value":2,"origin":"input"}"#);
    }
}
