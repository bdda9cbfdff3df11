use super::{Record, RecordStore};
use crate::errors::{AppError, AppResult};
use crate::validation::{split_list, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Raw field values of a create form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    values: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: &str) {
        self.values.insert(field.to_string(), value.to_string());
    }

    /// Accepts a JSON object; scalars are stringified and string arrays are
    /// joined with commas the way a tag input would submit them, so array
    /// items may not contain commas themselves.
    pub fn from_json(body: &Value) -> AppResult<Self> {
        let Value::Object(map) = body else {
            return Err(AppError::invalid("body", "must be a JSON object"));
        };
        let mut form = Self::new();
        for (field, value) in map {
            let raw = match value {
                Value::Null => continue,
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Array(items) => {
                    let mut joined = Vec::with_capacity(items.len());
                    for item in items {
                        let text = match item {
                            Value::String(text) => text.clone(),
                            other => other.to_string(),
                        };
                        // Lists travel comma-separated; an embedded comma would split the item.
                        if text.contains(',') {
                            return Err(AppError::invalid(field, format!("item '{}' cannot contain a comma", text)));
                        }
                        joined.push(text);
                    }
                    joined.join(",")
                }
                Value::Object(_) => {
                    return Err(AppError::invalid(field, "nested objects are not accepted"));
                }
            };
            form.values.insert(field.clone(), raw);
        }
        Ok(form)
    }

    /// Trimmed value, `None` when absent or blank.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn text(&self, field: &str) -> String {
        self.get(field).unwrap_or_default().to_string()
    }

    pub fn optional_text(&self, field: &str) -> Option<String> {
        self.get(field).map(ToString::to_string)
    }

    /// Blank numbers read as zero.
    pub fn number(&self, field: &str) -> AppResult<f64> {
        match self.get(field) {
            None => Ok(0.0),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| AppError::invalid(field, format!("'{}' is not a number", raw))),
        }
    }

    pub fn list(&self, field: &str) -> Vec<String> {
        self.get(field).map(split_list).unwrap_or_default()
    }

    pub fn date_or(&self, field: &str, fallback: DateTime<Utc>) -> String {
        self.optional_text(field)
            .unwrap_or_else(|| fallback.date_naive().format("%Y-%m-%d").to_string())
    }

    pub fn choice<T: FromStr>(&self, field: &str) -> AppResult<Option<T>> {
        let Some(raw) = self.get(field) else {
            return Ok(None);
        };
        T::from_str(raw)
            .map(Some)
            .map_err(|_| AppError::invalid(field, format!("'{}' is not an accepted value", raw)))
    }

    pub fn choice_or<T: FromStr>(&self, field: &str, fallback: T) -> AppResult<T> {
        Ok(self.choice(field)?.unwrap_or(fallback))
    }

    pub fn validate<R: Record>(&self) -> Result<(), ValidationErrors> {
        let mut validator = Validator::new();
        validator.rules(R::form_rules(), |field| self.get(field));
        validator.finish()
    }
}

/// `<prefix>-<unix millis>`, suffixed with `-<n>` until unused in `store`.
pub fn generate_id<R: Record>(store: &RecordStore<R>, now: DateTime<Utc>) -> String {
    let base = format!("{}-{}", R::ID_PREFIX, now.timestamp_millis());
    if !store.contains(&base) {
        return base;
    }
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !store.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Validates the form, synthesizes the record and inserts it into the store.
pub fn submit<R: Record>(store: &mut RecordStore<R>, form: &FormData, now: DateTime<Utc>) -> AppResult<R> {
    if let Err(errors) = form.validate::<R>() {
        tracing::warn!(kind = R::ID_PREFIX, errors = %errors, "create form rejected");
        return Err(AppError::Validation(errors));
    }
    let id = generate_id(store, now);
    let record = R::from_form(id, form, now)?;
    store.insert(record.clone())?;
    tracing::info!(kind = R::ID_PREFIX, id = %record.id(), total = store.len(), "record created");
    Ok(record)
}
