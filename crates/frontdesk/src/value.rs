//! Typed payload values produced by the validation pipeline.
//!
//! Raw form text is coerced into `FieldValue`s; a `Payload` is the ordered,
//! fully-typed field set that gets serialized into a mutation body. The
//! client never builds a payload any other way, which is what guarantees
//! that nothing unvalidated reaches the wire.

use chrono::NaiveDate;
use serde_json::Value;

/// Wire format for date-typed fields, matching what the backend accepts.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Flag(bool),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(n) => Value::from(*n),
            Self::Real(v) => Value::from(*v),
            Self::Text(s) => Value::from(s.as_str()),
            Self::Flag(b) => Value::from(*b),
            Self::Date(d) => Value::from(d.format(DATE_FORMAT).to_string()),
        }
    }
}

/// An ordered field-name -> value map in schema field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(&'static str, FieldValue)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value for the same field.
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(FieldValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            map.insert((*name).to_string(), value.to_json());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_serializes_in_insertion_order_with_typed_values() {
        let mut payload = Payload::new();
        payload.insert("cname", FieldValue::Text("Acme".into()));
        payload.insert("springmkup", FieldValue::Real(10.5));
        payload.insert("guests", FieldValue::Integer(4));
        payload.insert("ishandicap", FieldValue::Flag(false));
        payload.insert(
            "startdate",
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        );

        assert_eq!(
            payload.to_json(),
            json!({
                "cname": "Acme",
                "springmkup": 10.5,
                "guests": 4,
                "ishandicap": false,
                "startdate": "2024-03-01",
            })
        );
    }

    #[test]
    fn insert_replaces_an_existing_field() {
        let mut payload = Payload::new();
        payload.insert("total_cost", FieldValue::Real(100.0));
        payload.insert("total_cost", FieldValue::Real(250.0));
        assert_eq!(payload.get("total_cost"), Some(&FieldValue::Real(250.0)));
        assert_eq!(payload.iter().count(), 1);
    }

    #[test]
    fn typed_accessors_ignore_mismatched_kinds() {
        let mut payload = Payload::new();
        payload.insert("age", FieldValue::Text("35".into()));
        assert_eq!(payload.integer("age"), None);
        assert_eq!(payload.text("age"), Some("35"));
    }
}
