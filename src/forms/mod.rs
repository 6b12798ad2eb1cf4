//! Form input handling: raw submissions, validation rules and sanitizers

pub mod rules;
pub mod sanitize;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

pub use rules::{validate, FieldError, FieldRules, Rule};
pub use sanitize::{sanitize, FieldSanitizers, SanitizedInput, SanitizedValue, Sanitizer};

/// A submitted field value; a key repeated in the body becomes `Multi`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::Single(value) => vec![value.as_str()],
            FieldValue::Multi(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// Raw form submission, fields in body order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: IndexMap<String, FieldValue>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `key=value` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::new();
        for (key, value) in pairs {
            form.push(key, value);
        }
        form
    }

    /// Append a value, turning an existing field into `Multi`
    pub fn push(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.fields.entry(field.into()) {
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(FieldValue::Single(value));
            }
            indexmap::map::Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = match std::mem::replace(slot, FieldValue::Multi(Vec::new())) {
                    FieldValue::Single(first) => FieldValue::Multi(vec![first, value]),
                    FieldValue::Multi(mut values) => {
                        values.push(value);
                        FieldValue::Multi(values)
                    }
                };
            }
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Coerce `field` to list shape: absent becomes empty, a scalar a
    /// single-element list.
    pub fn normalize_list(&mut self, field: &str) {
        let normalized = match self.fields.shift_remove(field) {
            None => Vec::new(),
            Some(FieldValue::Single(value)) => vec![value],
            Some(FieldValue::Multi(values)) => values,
        };
        self.fields
            .insert(field.to_string(), FieldValue::Multi(normalized));
    }
}

/// Parse an ISO-8601 calendar date or date-time, keeping the date part
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}
