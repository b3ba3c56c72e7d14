//! Lifecycle rule filters

use crate::lifecycle::value::{field, opt_string, opt_u64};
use crate::Result;
use serde_json::{json, Map, Value};

/// Criteria restricting which objects a rule applies to.
///
/// All fields are independently optional; a tag is only meaningful when
/// both its key and value are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub prefix: Option<String>,
    pub tag_key: Option<String>,
    pub tag_value: Option<String>,
    pub object_size_greater_than: Option<u64>,
    pub object_size_less_than: Option<u64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tag_key = Some(key.into());
        self.tag_value = Some(value.into());
        self
    }

    pub fn with_object_size_greater_than(mut self, size: u64) -> Self {
        self.object_size_greater_than = Some(size);
        self
    }

    pub fn with_object_size_less_than(mut self, size: u64) -> Self {
        self.object_size_less_than = Some(size);
        self
    }

    pub fn from_value(data: &Value) -> Result<Self> {
        let tag = field(data, "Tag", "tag");
        let (tag_key, tag_value) = match tag {
            Some(tag) => (
                opt_string(tag, "Key", "key"),
                opt_string(tag, "Value", "value"),
            ),
            None => (None, None),
        };
        Ok(Self {
            prefix: opt_string(data, "Prefix", "prefix"),
            tag_key,
            tag_value,
            object_size_greater_than: opt_u64(
                data,
                "ObjectSizeGreaterThan",
                "object_size_greater_than",
            )?,
            object_size_less_than: opt_u64(data, "ObjectSizeLessThan", "object_size_less_than")?,
        })
    }

    fn tag(&self) -> Option<(&str, &str)> {
        match (&self.tag_key, &self.tag_value) {
            (Some(key), Some(value)) => Some((key, value)),
            _ => None,
        }
    }

    pub fn describe(&self) -> Value {
        let mut result = Map::new();
        if let Some(prefix) = &self.prefix {
            result.insert("prefix".into(), json!(prefix));
        }
        if let Some((key, value)) = self.tag() {
            result.insert("tag".into(), json!({"key": key, "value": value}));
        }
        if let Some(size) = self.object_size_greater_than {
            result.insert("object_size_greater_than".into(), json!(size));
        }
        if let Some(size) = self.object_size_less_than {
            result.insert("object_size_less_than".into(), json!(size));
        }
        Value::Object(result)
    }

    pub fn to_payload(&self) -> Value {
        let mut result = Map::new();
        if let Some(prefix) = &self.prefix {
            result.insert("Prefix".into(), json!(prefix));
        }
        if let Some((key, value)) = self.tag() {
            result.insert("Tag".into(), json!({"Key": key, "Value": value}));
        }
        if let Some(size) = self.object_size_greater_than {
            result.insert("ObjectSizeGreaterThan".into(), json!(size));
        }
        if let Some(size) = self.object_size_less_than {
            result.insert("ObjectSizeLessThan".into(), json!(size));
        }
        Value::Object(result)
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "prefix": self.prefix,
            "tag": {"key": self.tag_key, "value": self.tag_value},
            "object_size_greater_than": self.object_size_greater_than,
            "object_size_less_than": self.object_size_less_than,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_none()
            && self.tag().is_none()
            && self.object_size_greater_than.is_none()
            && self.object_size_less_than.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_is_sparse() {
        let filter = Filter::new().with_prefix("logs/");
        assert_eq!(filter.describe(), json!({"prefix": "logs/"}));
        assert_eq!(Filter::new().describe(), json!({}));
    }

    #[test]
    fn test_tag_requires_both_parts() {
        let mut filter = Filter::new();
        filter.tag_key = Some("env".into());
        assert_eq!(filter.describe(), json!({}));
        assert_eq!(filter.to_payload(), json!({}));

        let complete = Filter::new().with_tag("env", "dev");
        assert_eq!(
            complete.to_payload(),
            json!({"Tag": {"Key": "env", "Value": "dev"}})
        );
    }

    #[test]
    fn test_from_value_wire_and_internal() {
        let wire = json!({
            "Prefix": "archive/",
            "Tag": {"Key": "tier", "Value": "cold"},
            "ObjectSizeGreaterThan": 1024,
        });
        let parsed = Filter::from_value(&wire).unwrap();
        assert_eq!(parsed.prefix.as_deref(), Some("archive/"));
        assert_eq!(parsed.tag_key.as_deref(), Some("tier"));
        assert_eq!(parsed.object_size_greater_than, Some(1024));

        let internal = json!({
            "prefix": "archive/",
            "tag": {"key": "tier", "value": "cold"},
            "object_size_greater_than": 1024,
        });
        assert_eq!(Filter::from_value(&internal).unwrap(), parsed);
    }

    #[test]
    fn test_round_trip_to_dict() {
        let filter = Filter::new()
            .with_prefix("data/")
            .with_tag("env", "prod")
            .with_object_size_less_than(1_048_576);
        assert_eq!(Filter::from_value(&filter.to_dict()).unwrap(), filter);

        let empty = Filter::new();
        assert_eq!(Filter::from_value(&empty.to_dict()).unwrap(), empty);
    }
}
