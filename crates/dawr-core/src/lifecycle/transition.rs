//! Transition action for current object versions

use crate::lifecycle::value::{format_date, opt_date, opt_string, opt_u32};
use crate::lifecycle::StorageClass;
use crate::Result;
use chrono::NaiveDate;
use serde_json::{json, Map, Value};

/// Moves current object versions to another storage class, either on a
/// date or a number of days after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub date: Option<NaiveDate>,
    pub days: Option<u32>,
    pub storage_class: Option<StorageClass>,
}

impl Transition {
    pub fn after_days(days: u32, storage_class: StorageClass) -> Self {
        Self {
            date: None,
            days: Some(days),
            storage_class: Some(storage_class),
        }
    }

    pub fn on_date(date: NaiveDate, storage_class: StorageClass) -> Self {
        Self {
            date: Some(date),
            days: None,
            storage_class: Some(storage_class),
        }
    }

    pub fn from_value(data: &Value) -> Result<Self> {
        let storage_class = opt_string(data, "StorageClass", "storage_class")
            .map(|s| StorageClass::parse(&s))
            .transpose()?;
        Ok(Self {
            date: opt_date(data, "Date", "date")?,
            days: opt_u32(data, "Days", "days")?,
            storage_class,
        })
    }

    pub fn describe(&self) -> Value {
        let mut result = Map::new();
        if let Some(date) = &self.date {
            result.insert("date".into(), json!(format_date(date)));
        }
        if let Some(days) = self.days {
            result.insert("days".into(), json!(days));
        }
        if let Some(class) = &self.storage_class {
            result.insert("storage_class".into(), json!(class.as_str()));
        }
        Value::Object(result)
    }

    pub fn to_payload(&self) -> Value {
        let mut result = Map::new();
        if let Some(date) = &self.date {
            result.insert("Date".into(), json!(format_date(date)));
        }
        if let Some(days) = self.days {
            result.insert("Days".into(), json!(days));
        }
        if let Some(class) = &self.storage_class {
            result.insert("StorageClass".into(), json!(class.as_str()));
        }
        Value::Object(result)
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "date": self.date.as_ref().map(format_date),
            "days": self.days,
            "storage_class": self.storage_class.as_ref().map(StorageClass::as_str),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_parses_storage_class() {
        let t = Transition::from_value(&json!({"days": 90, "storage_class": "glacier"})).unwrap();
        assert_eq!(t.storage_class, Some(StorageClass::Glacier));
        assert_eq!(t.days, Some(90));
    }

    #[test]
    fn test_unknown_storage_class_is_error() {
        assert!(Transition::from_value(&json!({"days": 90, "storage_class": "FROZEN"})).is_err());
    }

    #[test]
    fn test_payload_uses_wire_names() {
        let t = Transition::after_days(90, StorageClass::DeepArchive);
        assert_eq!(
            t.to_payload(),
            json!({"Days": 90, "StorageClass": "DEEP_ARCHIVE"})
        );
    }

    #[test]
    fn test_round_trip_to_dict() {
        let t = Transition::on_date(
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            StorageClass::StandardIa,
        );
        assert_eq!(Transition::from_value(&t.to_dict()).unwrap(), t);

        let empty = Transition::default();
        assert_eq!(Transition::from_value(&empty.to_dict()).unwrap(), empty);
    }
}
