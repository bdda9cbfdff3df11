//! One validation contract shared by the create forms of every record view
//! and by the policy payloads.
//!
//! Rules are declared up front as [`FieldRule`] tables and checked together,
//! so a rejected submission reports every failing field at once.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

pub const MAX_LABEL_LENGTH: usize = 200;
pub const MAX_TEXT_LENGTH: usize = 4_000;
pub const MAX_CONTENT_LENGTH: usize = 200_000;
pub const MAX_LIST_ITEMS: usize = 100;

static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+){0,2}$").expect("valid version regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|error| format!("{} {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// ISO `YYYY-MM-DD`.
    Date,
    Choice(&'static [&'static str]),
    /// Comma separated list.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn required(field: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            required: true,
            kind,
        }
    }

    pub const fn optional(field: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            required: false,
            kind,
        }
    }
}

/// Collects field errors; `finish` turns a non-empty set into an error.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn require_text(&mut self, field: &str, value: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.reject(field, "is required");
        } else if value.chars().count() > max_len {
            self.reject(field, format!("exceeds {} characters", max_len));
        }
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max_len: usize) {
        if let Some(value) = value {
            if value.chars().count() > max_len {
                self.reject(field, format!("exceeds {} characters", max_len));
            }
        }
    }

    pub fn list(&mut self, field: &str, items: &[String]) {
        if items.len() > MAX_LIST_ITEMS {
            self.reject(field, format!("exceeds {} items", MAX_LIST_ITEMS));
        }
        if items.iter().any(|item| item.trim().is_empty()) {
            self.reject(field, "contains an empty item");
        }
    }

    pub fn version(&mut self, field: &str, value: &str) {
        if !VERSION_PATTERN.is_match(value.trim()) {
            self.reject(field, format!("'{}' is not a version like 1.0 or 2.1.3", value));
        }
    }

    /// Checks each rule against the raw string value returned by `lookup`.
    pub fn rules<'a>(&mut self, rules: &[FieldRule], lookup: impl Fn(&str) -> Option<&'a str>) {
        for rule in rules {
            let value = lookup(rule.field).map(str::trim).filter(|value| !value.is_empty());
            let Some(value) = value else {
                if rule.required {
                    self.reject(rule.field, "is required");
                }
                continue;
            };
            if let Some(message) = check_kind(rule.kind, value) {
                self.reject(rule.field, message);
            }
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

fn check_kind(kind: FieldKind, value: &str) -> Option<String> {
    match kind {
        FieldKind::Text => {
            (value.chars().count() > MAX_TEXT_LENGTH).then(|| format!("exceeds {} characters", MAX_TEXT_LENGTH))
        }
        FieldKind::Number => match value.parse::<f64>() {
            Ok(number) if number.is_finite() => None,
            _ => Some(format!("'{}' is not a number", value)),
        },
        FieldKind::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .err()
            .map(|_| format!("'{}' is not a YYYY-MM-DD date", value)),
        FieldKind::Choice(allowed) => (!allowed.contains(&value))
            .then(|| format!("must be one of: {}", allowed.join(", "))),
        FieldKind::List => {
            let count = split_list(value).len();
            (count > MAX_LIST_ITEMS).then(|| format!("exceeds {} items", MAX_LIST_ITEMS))
        }
    }
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{split_list, FieldKind, FieldRule, Validator};
    use std::collections::BTreeMap;

    const RULES: &[FieldRule] = &[
        FieldRule::required("title", FieldKind::Text),
        FieldRule::required("status", FieldKind::Choice(&["draft", "executed"])),
        FieldRule::optional("value", FieldKind::Number),
        FieldRule::optional("startDate", FieldKind::Date),
    ];

    fn form(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn reports_every_failing_field_together() {
        let values = form(&[("title", "  "), ("status", "signed"), ("value", "12x"), ("startDate", "2024-13-01")]);
        let mut validator = Validator::new();
        validator.rules(RULES, |field| values.get(field).map(String::as_str));
        let errors = validator.finish().expect_err("form must be rejected");

        assert_eq!(errors.fields().len(), 4);
        assert!(errors.contains("title"));
        assert!(errors.contains("status"));
        assert!(errors.contains("value"));
        assert!(errors.contains("startDate"));
    }

    #[test]
    fn optional_fields_may_be_blank() {
        let values = form(&[("title", "Lease renewal"), ("status", "draft"), ("value", "")]);
        let mut validator = Validator::new();
        validator.rules(RULES, |field| values.get(field).map(String::as_str));
        assert!(validator.finish().is_ok());
    }

    #[test]
    fn negative_and_zero_numbers_are_accepted() {
        let values = form(&[("title", "Refund"), ("status", "draft"), ("value", "-250.5")]);
        let mut validator = Validator::new();
        validator.rules(RULES, |field| values.get(field).map(String::as_str));
        assert!(validator.finish().is_ok());
    }

    #[test]
    fn version_pattern_accepts_dotted_numbers_only() {
        let mut validator = Validator::new();
        validator.version("version", "2.1.3");
        validator.version("version", "1");
        assert!(validator.finish().is_ok());

        let mut validator = Validator::new();
        validator.version("version", "v2");
        assert!(validator.finish().is_err());
    }

    #[test]
    fn split_list_drops_blank_items() {
        assert_eq!(split_list("gdpr, , privacy ,"), vec!["gdpr", "privacy"]);
    }
}
