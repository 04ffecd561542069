//! Decoding of dataops response bodies.
//!
//! The service signals absence and authorization denials with bare JSON
//! strings in place of the expected object or array. Those strings are a
//! fixed contract shared with other consumers of the same backend, so they
//! are matched exactly and translated into typed values here, and nowhere
//! else. Anything that is neither the expected shape nor a known sentinel
//! is a decode failure, never "no data".

use frontdesk::{BackendError, BackendResult, Denial, Lookup, Record, ReportOutcome};
use serde_json::Value;

/// The absence sentinel, bit-for-bit.
pub(crate) const NOT_FOUND: &str = "Not Found";

pub(crate) fn decode_record(value: Value) -> BackendResult<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(unexpected("a record object", &other)),
    }
}

pub(crate) fn decode_rows(value: Value) -> BackendResult<Vec<Record>> {
    match value {
        Value::Array(items) => items.into_iter().map(decode_record).collect(),
        other => Err(unexpected("an array of records", &other)),
    }
}

pub(crate) fn decode_lookup(value: Value) -> BackendResult<Lookup<Record>> {
    match value {
        Value::String(s) if s == NOT_FOUND => Ok(Lookup::Missing),
        Value::Object(map) => Ok(Lookup::Found(map)),
        other => Err(unexpected("a record or the absence sentinel", &other)),
    }
}

pub(crate) fn decode_lookup_rows(value: Value) -> BackendResult<Lookup<Vec<Record>>> {
    match value {
        Value::String(s) if s == NOT_FOUND => Ok(Lookup::Missing),
        Value::Array(items) => Ok(Lookup::Found(
            items
                .into_iter()
                .map(decode_record)
                .collect::<BackendResult<_>>()?,
        )),
        other => Err(unexpected("rows or the absence sentinel", &other)),
    }
}

pub(crate) fn decode_report(value: Value) -> BackendResult<ReportOutcome> {
    match value {
        Value::String(s) => Denial::from_sentinel(&s)
            .map(ReportOutcome::Denied)
            .ok_or_else(|| BackendError::Decode {
                message: format!("unrecognized backend sentinel: {s:?}"),
            }),
        Value::Array(items) => Ok(ReportOutcome::Table(
            items
                .into_iter()
                .map(decode_record)
                .collect::<BackendResult<_>>()?,
        )),
        other => Err(unexpected("report rows or a denial sentinel", &other)),
    }
}

/// The quote endpoint answers with `[]` when the (room-slot, client) pair
/// is already reserved, or `[{"Total Cost": <amount>}]` when it is free.
pub(crate) fn decode_quote(value: Value) -> BackendResult<Option<f64>> {
    let rows = match value {
        Value::Array(rows) => rows,
        other => return Err(unexpected("a quote array", &other)),
    };
    let Some(first) = rows.into_iter().next() else {
        return Ok(None);
    };
    first
        .get("Total Cost")
        .and_then(cost_value)
        .map(Some)
        .ok_or_else(|| BackendError::Decode {
            message: "quote row is missing its Total Cost column".to_string(),
        })
}

fn cost_value(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn unexpected(wanted: &str, got: &Value) -> BackendError {
    BackendError::Decode {
        message: format!("expected {wanted}, got: {got}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absence_sentinel_decodes_to_missing() {
        assert_eq!(decode_lookup(json!("Not Found")).unwrap(), Lookup::Missing);
        assert_eq!(
            decode_lookup_rows(json!("Not Found")).unwrap(),
            Lookup::Missing
        );
    }

    #[test]
    fn sentinel_matching_is_exact() {
        assert!(decode_lookup(json!("not found")).is_err());
        assert!(decode_lookup(json!("Not Found ")).is_err());
    }

    #[test]
    fn records_and_rows_decode() {
        let record = decode_lookup(json!({"chid": 3, "cname": "Acme"}))
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(record.get("chid"), Some(&json!(3)));

        let rows = decode_rows(json!([{"hid": 1}, {"hid": 2}])).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn denial_sentences_become_typed_denials() {
        assert_eq!(
            decode_report(json!("Employee is not an Administrator")).unwrap(),
            ReportOutcome::Denied(Denial::NotAdministrator)
        );
        assert_eq!(
            decode_report(json!("User is not a regular employee of this hotel")).unwrap(),
            ReportOutcome::Denied(Denial::NotHotelEmployee)
        );
        // An unknown sentence is a decode failure, not an empty table.
        assert!(decode_report(json!("Service temporarily down")).is_err());
    }

    #[test]
    fn empty_report_is_data_not_denial() {
        assert_eq!(decode_report(json!([])).unwrap(), ReportOutcome::Table(vec![]));
    }

    #[test]
    fn quotes_decode_from_numbers_and_strings() {
        assert_eq!(
            decode_quote(json!([{"Total Cost": 512.25}])).unwrap(),
            Some(512.25)
        );
        assert_eq!(
            decode_quote(json!([{"Total Cost": "512.25"}])).unwrap(),
            Some(512.25)
        );
        assert_eq!(decode_quote(json!([])).unwrap(), None);
        assert!(decode_quote(json!([{"cost": 1}])).is_err());
    }
}
