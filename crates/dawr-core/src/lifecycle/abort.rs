//! Incomplete multipart upload cleanup

use crate::lifecycle::value::opt_u32;
use crate::Result;
use serde_json::{json, Map, Value};

/// Aborts multipart uploads still incomplete a number of days after
/// initiation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbortIncompleteMultipartUpload {
    pub days_after_initiation: Option<u32>,
}

impl AbortIncompleteMultipartUpload {
    pub fn after_days(days_after_initiation: u32) -> Self {
        Self {
            days_after_initiation: Some(days_after_initiation),
        }
    }

    pub fn from_value(data: &Value) -> Result<Self> {
        Ok(Self {
            days_after_initiation: opt_u32(data, "DaysAfterInitiation", "days_after_initiation")?,
        })
    }

    pub fn describe(&self) -> Value {
        let mut result = Map::new();
        if let Some(days) = self.days_after_initiation {
            result.insert("days_after_initiation".into(), json!(days));
        }
        Value::Object(result)
    }

    pub fn to_payload(&self) -> Value {
        let mut result = Map::new();
        if let Some(days) = self.days_after_initiation {
            result.insert("DaysAfterInitiation".into(), json!(days));
        }
        Value::Object(result)
    }

    pub fn to_dict(&self) -> Value {
        json!({"days_after_initiation": self.days_after_initiation})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let abort = AbortIncompleteMultipartUpload::after_days(7);
        assert_eq!(
            AbortIncompleteMultipartUpload::from_value(&abort.to_dict()).unwrap(),
            abort
        );
        assert_eq!(abort.to_payload(), json!({"DaysAfterInitiation": 7}));

        let empty = AbortIncompleteMultipartUpload::default();
        assert_eq!(
            AbortIncompleteMultipartUpload::from_value(&empty.to_dict()).unwrap(),
            empty
        );
        assert_eq!(empty.describe(), json!({}));
    }
}
