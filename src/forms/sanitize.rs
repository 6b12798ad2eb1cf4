//! Input sanitizers
//!
//! Sanitizers run regardless of the validation outcome, so rejected input can
//! be shown back to the user without injecting markup.

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use uuid::Uuid;

use super::{parse_iso_date, FieldValue, FormData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    Trim,
    /// Replace `& < > " ' /` with HTML entities
    Escape,
    /// Convert to a calendar date, empty or unparsable input gives none
    ToDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Field(&'static str),
    All,
}

/// Sanitizer chain for one field, or for every submitted field
#[derive(Debug, Clone)]
pub struct FieldSanitizers {
    target: Target,
    steps: Vec<Sanitizer>,
}

impl FieldSanitizers {
    pub fn field(field: &'static str) -> Self {
        Self {
            target: Target::Field(field),
            steps: Vec::new(),
        }
    }

    pub fn all() -> Self {
        Self {
            target: Target::All,
            steps: Vec::new(),
        }
    }

    pub fn trim(mut self) -> Self {
        self.steps.push(Sanitizer::Trim);
        self
    }

    pub fn escape(mut self) -> Self {
        self.steps.push(Sanitizer::Escape);
        self
    }

    pub fn to_date(mut self) -> Self {
        self.steps.push(Sanitizer::ToDate);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizedValue {
    Text(String),
    List(Vec<String>),
    Date(Option<NaiveDate>),
}

impl SanitizedValue {
    fn apply(self, step: Sanitizer) -> Self {
        match (step, self) {
            (Sanitizer::Trim, SanitizedValue::Text(s)) => {
                SanitizedValue::Text(s.trim().to_string())
            }
            (Sanitizer::Trim, SanitizedValue::List(values)) => SanitizedValue::List(
                values.into_iter().map(|s| s.trim().to_string()).collect(),
            ),
            (Sanitizer::Escape, SanitizedValue::Text(s)) => SanitizedValue::Text(escape(&s)),
            (Sanitizer::Escape, SanitizedValue::List(values)) => {
                SanitizedValue::List(values.iter().map(|s| escape(s)).collect())
            }
            (Sanitizer::ToDate, SanitizedValue::Text(s)) => {
                SanitizedValue::Date(parse_iso_date(&s))
            }
            (Sanitizer::ToDate, SanitizedValue::List(values)) => {
                SanitizedValue::Date(values.first().and_then(|s| parse_iso_date(s)))
            }
            (_, value @ SanitizedValue::Date(_)) => value,
        }
    }
}

fn escape(value: &str) -> String {
    html_escape::encode_safe(value).into_owned()
}

/// Field values after sanitization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedInput {
    values: IndexMap<String, SanitizedValue>,
}

impl SanitizedInput {
    pub fn get(&self, field: &str) -> Option<&SanitizedValue> {
        self.values.get(field)
    }

    /// Text value, empty when absent
    pub fn text(&self, field: &str) -> String {
        match self.values.get(field) {
            Some(SanitizedValue::Text(s)) => s.clone(),
            Some(SanitizedValue::List(values)) => values.first().cloned().unwrap_or_default(),
            Some(SanitizedValue::Date(Some(date))) => date.format("%Y-%m-%d").to_string(),
            Some(SanitizedValue::Date(None)) | None => String::new(),
        }
    }

    /// Values as a list: absent gives none, a scalar one
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.values.get(field) {
            Some(SanitizedValue::List(values)) => values.clone(),
            Some(SanitizedValue::Text(s)) => vec![s.clone()],
            Some(SanitizedValue::Date(Some(date))) => vec![date.format("%Y-%m-%d").to_string()],
            Some(SanitizedValue::Date(None)) | None => Vec::new(),
        }
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field) {
            Some(SanitizedValue::Date(date)) => *date,
            Some(SanitizedValue::Text(s)) => parse_iso_date(s),
            _ => None,
        }
    }

    /// Single record id, none when absent or malformed
    pub fn reference(&self, field: &str) -> Option<Uuid> {
        Uuid::parse_str(self.text(field).trim()).ok()
    }

    /// Set of record ids, malformed entries dropped, submission order kept
    pub fn references(&self, field: &str) -> IndexSet<Uuid> {
        self.list(field)
            .iter()
            .filter_map(|s| Uuid::parse_str(s.trim()).ok())
            .collect()
    }
}

/// Apply `sanitizers` in order. Fields without a sanitizer pass through.
pub fn sanitize(form: &FormData, sanitizers: &[FieldSanitizers]) -> SanitizedInput {
    let mut values: IndexMap<String, SanitizedValue> = form
        .iter()
        .map(|(field, value)| {
            let value = match value {
                FieldValue::Single(s) => SanitizedValue::Text(s.clone()),
                FieldValue::Multi(values) => SanitizedValue::List(values.clone()),
            };
            (field.to_string(), value)
        })
        .collect();

    for chain in sanitizers {
        let fields: Vec<String> = match chain.target {
            Target::All => values.keys().cloned().collect(),
            Target::Field(field) => vec![field.to_string()],
        };
        for field in fields {
            let current = values
                .shift_remove(&field)
                .unwrap_or_else(|| SanitizedValue::Text(String::new()));
            let sanitized = chain
                .steps
                .iter()
                .fold(current, |value, step| value.apply(*step));
            values.insert(field, sanitized);
        }
    }

    SanitizedInput { values }
}
