//! Typed-value kinds for configuration variables

use crate::{Error, Result};
use serde_json::Value;

/// The primitive kinds a configuration variable can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Integer,
    Float,
    String,
    Boolean,
    List,
    Dict,
}

impl Default for VarKind {
    fn default() -> Self {
        Self::String
    }
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::List => "List",
            Self::Dict => "Dict",
        }
    }

    /// Parse a kind name, case-insensitively. Unrecognised names are an
    /// error rather than falling back to `String`, so a typo in a
    /// declaration surfaces instead of silently changing parse behavior.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            "list" => Ok(Self::List),
            "dict" => Ok(Self::Dict),
            other => Err(Error::InvalidArgument(format!(
                "Unknown variable kind: {other}"
            ))),
        }
    }

    /// Coerce a raw string into a typed value of this kind.
    pub fn parse_value(&self, raw: &str) -> Result<VarValue> {
        match self {
            Self::String => Ok(VarValue::String(raw.trim().to_string())),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(VarValue::Integer)
                .map_err(|_| Error::InvalidArgument(format!("Invalid integer value: {raw:?}"))),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .map(VarValue::Float)
                .map_err(|_| Error::InvalidArgument(format!("Invalid float value: {raw:?}"))),
            Self::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "y" | "on" => Ok(VarValue::Boolean(true)),
                "0" | "false" | "no" | "n" | "off" => Ok(VarValue::Boolean(false)),
                _ => Err(Error::InvalidArgument(format!(
                    "Invalid boolean value: {raw:?}"
                ))),
            },
            Self::List => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(VarValue::List(Vec::new()));
                }
                Ok(VarValue::List(
                    trimmed
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect(),
                ))
            }
            Self::Dict => match serde_json::from_str::<Value>(raw.trim()) {
                Ok(Value::Object(map)) => Ok(VarValue::Dict(map)),
                _ => Err(Error::InvalidArgument(format!(
                    "Invalid dict value: {raw:?}"
                ))),
            },
        }
    }
}

impl std::fmt::Display for VarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed configuration value produced by [`VarKind::parse_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<String>),
    Dict(serde_json::Map<String, Value>),
}

impl VarValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(n) => Value::from(*n),
            Self::Float(f) => Value::from(*f),
            Self::String(s) => Value::from(s.clone()),
            Self::Boolean(b) => Value::from(*b),
            Self::List(items) => Value::from(items.clone()),
            Self::Dict(map) => Value::Object(map.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_case_insensitive() {
        assert_eq!(VarKind::parse("boolean").unwrap(), VarKind::Boolean);
        assert_eq!(VarKind::parse("List").unwrap(), VarKind::List);
        assert_eq!(VarKind::parse("INTEGER").unwrap(), VarKind::Integer);
    }

    #[test]
    fn test_parse_kind_unknown_is_error() {
        assert!(VarKind::parse("decimal").is_err());
        assert!(VarKind::parse("").is_err());
    }

    #[test]
    fn test_parse_boolean_values() {
        for raw in ["1", "true", "YES", "on", "y"] {
            assert_eq!(
                VarKind::Boolean.parse_value(raw).unwrap(),
                VarValue::Boolean(true)
            );
        }
        for raw in ["0", "false", "No", "off", "n"] {
            assert_eq!(
                VarKind::Boolean.parse_value(raw).unwrap(),
                VarValue::Boolean(false)
            );
        }
        assert!(VarKind::Boolean.parse_value("maybe").is_err());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(
            VarKind::Integer.parse_value("42").unwrap(),
            VarValue::Integer(42)
        );
        assert!(VarKind::Integer.parse_value("forty-two").is_err());
    }

    #[test]
    fn test_parse_list_splits_and_trims() {
        assert_eq!(
            VarKind::List.parse_value("a, b ,c,,").unwrap(),
            VarValue::List(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(VarKind::List.parse_value("").unwrap(), VarValue::List(vec![]));
    }

    #[test]
    fn test_parse_dict() {
        let value = VarKind::Dict.parse_value(r#"{"force": true}"#).unwrap();
        match value {
            VarValue::Dict(map) => assert_eq!(map.get("force"), Some(&Value::Bool(true))),
            other => panic!("expected dict, got {other:?}"),
        }
        assert!(VarKind::Dict.parse_value("[1,2]").is_err());
    }
}
