//! Shared field-extraction helpers for lifecycle value objects
//!
//! Every lifecycle type deserialises from a generic JSON mapping that may
//! use either the backend's wire naming (`Days`, `StorageClass`) or the
//! internal snake_case naming (`days`, `storage_class`). Day counts and
//! sizes additionally accept numeric strings, which is how they arrive
//! from loosely typed declaration documents.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde_json::Value;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Look a field up under its wire name first, then its internal name.
/// Explicit nulls count as absent.
pub(crate) fn field<'a>(data: &'a Value, wire: &str, internal: &str) -> Option<&'a Value> {
    data.get(wire)
        .filter(|v| !v.is_null())
        .or_else(|| data.get(internal).filter(|v| !v.is_null()))
}

pub(crate) fn opt_string(data: &Value, wire: &str, internal: &str) -> Option<String> {
    field(data, wire, internal)
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub(crate) fn opt_bool(data: &Value, wire: &str, internal: &str) -> Result<Option<bool>> {
    match field(data, wire, internal) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(Error::invalid_value(
            internal,
            format!("expected a boolean, got {other}"),
        )),
    }
}

/// Non-negative integer, accepted as a JSON number or a numeric string.
pub(crate) fn opt_u32(data: &Value, wire: &str, internal: &str) -> Result<Option<u32>> {
    match field(data, wire, internal) {
        None => Ok(None),
        Some(value) => coerce_u64(value, internal)?
            .try_into()
            .map(Some)
            .map_err(|_| Error::invalid_value(internal, "value out of range")),
    }
}

pub(crate) fn opt_u64(data: &Value, wire: &str, internal: &str) -> Result<Option<u64>> {
    match field(data, wire, internal) {
        None => Ok(None),
        Some(value) => coerce_u64(value, internal).map(Some),
    }
}

fn coerce_u64(value: &Value, name: &str) -> Result<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| Error::invalid_value(name, format!("expected a non-negative integer, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::invalid_value(name, format!("invalid integer value: {s:?}"))),
        other => Err(Error::invalid_value(
            name,
            format!("expected an integer, got {other}"),
        )),
    }
}

/// Calendar date in `YYYY-MM-DD` form.
pub(crate) fn opt_date(data: &Value, wire: &str, internal: &str) -> Result<Option<NaiveDate>> {
    match field(data, wire, internal) {
        None => Ok(None),
        Some(Value::String(s)) => parse_date(s, internal).map(Some),
        Some(other) => Err(Error::invalid_value(
            internal,
            format!("expected a date string, got {other}"),
        )),
    }
}

pub(crate) fn parse_date(s: &str, name: &str) -> Result<NaiveDate> {
    // Declaration documents sometimes carry a full timestamp; the date
    // part is all a lifecycle action uses.
    let date_part = s.split('T').next().unwrap_or(s).trim();
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|_| Error::invalid_value(name, format!("invalid date value: {s:?}")))
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_prefers_wire_name() {
        let data = json!({"Days": 30, "days": 7});
        assert_eq!(opt_u32(&data, "Days", "days").unwrap(), Some(30));
    }

    #[test]
    fn test_field_falls_back_to_internal_name() {
        let data = json!({"days": 7});
        assert_eq!(opt_u32(&data, "Days", "days").unwrap(), Some(7));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let data = json!({"Days": null, "days": null});
        assert_eq!(opt_u32(&data, "Days", "days").unwrap(), None);
    }

    #[test]
    fn test_numeric_string_coercion() {
        let data = json!({"days": "30"});
        assert_eq!(opt_u32(&data, "Days", "days").unwrap(), Some(30));
        let bad = json!({"days": "soon"});
        assert!(opt_u32(&bad, "Days", "days").is_err());
    }

    #[test]
    fn test_negative_rejected() {
        let data = json!({"days": -1});
        assert!(opt_u32(&data, "Days", "days").is_err());
    }

    #[test]
    fn test_date_parsing() {
        let data = json!({"Date": "2026-12-31"});
        let parsed = opt_date(&data, "Date", "date").unwrap().unwrap();
        assert_eq!(format_date(&parsed), "2026-12-31");

        let stamped = json!({"date": "2026-12-31T00:00:00Z"});
        assert!(opt_date(&stamped, "Date", "date").unwrap().is_some());

        let bad = json!({"date": "31/12/2026"});
        assert!(opt_date(&bad, "Date", "date").is_err());
    }
}
