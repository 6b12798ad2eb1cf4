//! Declarative field validation
//!
//! Each field gets an ordered list of [`Rule`] descriptors. [`validate`]
//! evaluates every rule against the trimmed value and reports each failure,
//! so a field can produce several messages at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;
use validator::ValidateLength;

use super::{parse_iso_date, FieldValue, FormData};

/// ASCII letters and digits only
pub static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z]+$").expect("valid alphanumeric pattern"));

/// A single check applied to a field value
#[derive(Clone)]
pub enum Rule {
    /// Non-empty after trimming
    Required { message: &'static str },
    /// Length in characters within bounds
    Length {
        min: Option<u64>,
        max: Option<u64>,
        message: &'static str,
    },
    Pattern {
        regex: &'static Regex,
        message: &'static str,
    },
    /// ISO-8601 date or date-time
    Date { message: &'static str },
    /// Well-formed record id
    Reference { message: &'static str },
    Custom {
        check: fn(&str) -> bool,
        message: &'static str,
    },
}

impl Rule {
    pub fn check(&self, value: &str) -> bool {
        match self {
            Rule::Required { .. } => !value.is_empty(),
            Rule::Length { min, max, .. } => {
                ValidateLength::<u64>::validate_length(&value.to_string(), *min, *max, None)
            }
            Rule::Pattern { regex, .. } => regex.is_match(value),
            Rule::Date { .. } => parse_iso_date(value).is_some(),
            Rule::Reference { .. } => Uuid::parse_str(value).is_ok(),
            Rule::Custom { check, .. } => check(value),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Rule::Required { message }
            | Rule::Length { message, .. }
            | Rule::Pattern { message, .. }
            | Rule::Date { message }
            | Rule::Reference { message }
            | Rule::Custom { message, .. } => message,
        }
    }
}

/// Ordered rules for one field
#[derive(Clone)]
pub struct FieldRules {
    pub field: &'static str,
    /// Skip every rule when the value is empty
    pub optional: bool,
    pub rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            optional: false,
            rules: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self, message: &'static str) -> Self {
        self.rule(Rule::Required { message })
    }

    pub fn length(self, min: Option<u64>, max: Option<u64>, message: &'static str) -> Self {
        self.rule(Rule::Length { min, max, message })
    }

    pub fn alphanumeric(self, message: &'static str) -> Self {
        self.rule(Rule::Pattern {
            regex: &ALPHANUMERIC,
            message,
        })
    }

    pub fn date(self, message: &'static str) -> Self {
        self.rule(Rule::Date { message })
    }

    pub fn reference(self, message: &'static str) -> Self {
        self.rule(Rule::Reference { message })
    }

    pub fn custom(self, check: fn(&str) -> bool, message: &'static str) -> Self {
        self.rule(Rule::Custom { check, message })
    }
}

/// A failed rule, shown next to its field on the redisplayed form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Evaluate `rules` against `form`, in declaration order.
///
/// An absent field is checked as an empty string. Every value of a
/// multi-valued field is checked.
pub fn validate(form: &FormData, rules: &[FieldRules]) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for spec in rules {
        let values = match form.get(spec.field) {
            Some(FieldValue::Multi(values)) if !values.is_empty() => {
                values.iter().map(String::as_str).collect()
            }
            Some(FieldValue::Single(value)) => vec![value.as_str()],
            _ => vec![""],
        };

        for value in values {
            let value = value.trim();
            if spec.optional && value.is_empty() {
                continue;
            }
            for rule in &spec.rules {
                if !rule.check(value) {
                    errors.push(FieldError::new(spec.field, rule.message()));
                }
            }
        }
    }
    errors
}
