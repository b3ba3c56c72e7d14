//! Expiration action for current object versions

use crate::lifecycle::value::{format_date, opt_bool, opt_date, opt_u32};
use crate::Result;
use chrono::NaiveDate;
use serde_json::{json, Map, Value};

/// When current object versions are permanently deleted.
///
/// Several fields may be set at once; whether the combination is legal is
/// left to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expiration {
    pub date: Option<NaiveDate>,
    pub days: Option<u32>,
    pub expired_object_delete_marker: Option<bool>,
}

impl Expiration {
    pub fn days(days: u32) -> Self {
        Self {
            days: Some(days),
            ..Self::default()
        }
    }

    pub fn date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn delete_marker() -> Self {
        Self {
            expired_object_delete_marker: Some(true),
            ..Self::default()
        }
    }

    pub fn from_value(data: &Value) -> Result<Self> {
        Ok(Self {
            date: opt_date(data, "Date", "date")?,
            days: opt_u32(data, "Days", "days")?,
            expired_object_delete_marker: opt_bool(
                data,
                "ExpiredObjectDeleteMarker",
                "expired_object_delete_marker",
            )?,
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
        if let Some(marker) = self.expired_object_delete_marker {
            result.insert("expired_object_delete_marker".into(), json!(marker));
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
        if let Some(marker) = self.expired_object_delete_marker {
            result.insert("ExpiredObjectDeleteMarker".into(), json!(marker));
        }
        Value::Object(result)
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "date": self.date.as_ref().map(format_date),
            "days": self.days,
            "expired_object_delete_marker": self.expired_object_delete_marker,
        })
    }
}
