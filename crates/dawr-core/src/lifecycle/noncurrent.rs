//! Actions on noncurrent object versions

use crate::lifecycle::value::{opt_string, opt_u32};
use crate::lifecycle::StorageClass;
use crate::Result;
use serde_json::{json, Map, Value};

/// Moves noncurrent versions to another storage class after a number of
/// days of noncurrency, optionally retaining the N newest noncurrent
/// versions where they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoncurrentVersionTransition {
    pub noncurrent_days: Option<u32>,
    pub newer_noncurrent_versions: Option<u32>,
    pub storage_class: Option<StorageClass>,
}

impl NoncurrentVersionTransition {
    pub fn after_days(noncurrent_days: u32, storage_class: StorageClass) -> Self {
        Self {
            noncurrent_days: Some(noncurrent_days),
            newer_noncurrent_versions: None,
            storage_class: Some(storage_class),
        }
    }

    pub fn retaining(mut self, newer_noncurrent_versions: u32) -> Self {
        self.newer_noncurrent_versions = Some(newer_noncurrent_versions);
        self
    }

    pub fn from_value(data: &Value) -> Result<Self> {
        let storage_class = opt_string(data, "StorageClass", "storage_class")
            .map(|s| StorageClass::parse(&s))
            .transpose()?;
        Ok(Self {
            noncurrent_days: opt_u32(data, "NoncurrentDays", "noncurrent_days")?,
            newer_noncurrent_versions: opt_u32(
                data,
                "NewerNoncurrentVersions",
                "newer_noncurrent_versions",
            )?,
            storage_class,
        })
    }

    pub fn describe(&self) -> Value {
        let mut result = Map::new();
        if let Some(days) = self.noncurrent_days {
            result.insert("noncurrent_days".into(), json!(days));
        }
        if let Some(keep) = self.newer_noncurrent_versions {
            result.insert("newer_noncurrent_versions".into(), json!(keep));
        }
        if let Some(class) = &self.storage_class {
            result.insert("storage_class".into(), json!(class.as_str()));
        }
        Value::Object(result)
    }

    pub fn to_payload(&self) -> Value {
        let mut result = Map::new();
        if let Some(days) = self.noncurrent_days {
            result.insert("NoncurrentDays".into(), json!(days));
        }
        if let Some(keep) = self.newer_noncurrent_versions {
            result.insert("NewerNoncurrentVersions".into(), json!(keep));
        }
        if let Some(class) = &self.storage_class {
            result.insert("StorageClass".into(), json!(class.as_str()));
        }
        Value::Object(result)
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "noncurrent_days": self.noncurrent_days,
            "newer_noncurrent_versions": self.newer_noncurrent_versions,
            "storage_class": self.storage_class.as_ref().map(StorageClass::as_str),
        })
    }
}

/// Permanently deletes noncurrent versions after a number of days of
/// noncurrency, optionally retaining the N newest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoncurrentVersionExpiration {
    pub noncurrent_days: Option<u32>,
    pub newer_noncurrent_versions: Option<u32>,
}

impl NoncurrentVersionExpiration {
    pub fn after_days(noncurrent_days: u32) -> Self {
        Self {
            noncurrent_days: Some(noncurrent_days),
            newer_noncurrent_versions: None,
        }
    }

    pub fn retaining(mut self, newer_noncurrent_versions: u32) -> Self {
        self.newer_noncurrent_versions = Some(newer_noncurrent_versions);
        self
    }

    pub fn from_value(data: &Value) -> Result<Self> {
        Ok(Self {
            noncurrent_days: opt_u32(data, "NoncurrentDays", "noncurrent_days")?,
            newer_noncurrent_versions: opt_u32(
                data,
                "NewerNoncurrentVersions",
                "newer_noncurrent_versions",
            )?,
        })
    }

    pub fn describe(&self) -> Value {
        let mut result = Map::new();
        if let Some(days) = self.noncurrent_days {
            result.insert("noncurrent_days".into(), json!(days));
        }
        if let Some(keep) = self.newer_noncurrent_versions {
            result.insert("newer_noncurrent_versions".into(), json!(keep));
        }
        Value::Object(result)
    }

    pub fn to_payload(&self) -> Value {
        let mut result = Map::new();
        if let Some(days) = self.noncurrent_days {
            result.insert("NoncurrentDays".into(), json!(days));
        }
        if let Some(keep) = self.newer_noncurrent_versions {
            result.insert("NewerNoncurrentVersions".into(), json!(keep));
        }
        Value::Object(result)
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "noncurrent_days": self.noncurrent_days,
            "newer_noncurrent_versions": self.newer_noncurrent_versions,
        })
    }
}
