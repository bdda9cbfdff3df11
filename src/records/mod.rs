//! Generic list-view pipeline shared by every record kind.
//!
//! A record kind describes itself through [`Record`]: which fields free-text
//! search covers, which fields accept equality filters, which aggregates
//! summarize the collection and which rules its create form obeys. The
//! store, filter chain, aggregates, selection and form shell are written
//! once against that description.

pub mod aggregate;
pub mod filter;
pub mod form;
pub mod selection;
pub mod store;

use crate::errors::AppResult;
use crate::validation::FieldRule;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

pub use aggregate::{Aggregate, AggregateSpec, Measure, ValueFormat};
pub use filter::{FieldFilter, SortDirection, SortKey, ViewQuery};
pub use form::FormData;
pub use selection::Selection;
pub use store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Front,
    Back,
}

/// Borrowed view of one record field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    /// Ordinal label such as a priority; sorts by `rank`, matches by `label`.
    Rank { label: &'static str, rank: u8 },
    List(&'a [String]),
}

impl FieldValue<'_> {
    /// `needle` must already be lowercased.
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            Self::Text(value) => value.to_lowercase().contains(needle),
            Self::Rank { label, .. } => label.to_lowercase().contains(needle),
            Self::List(items) => items.iter().any(|item| item.to_lowercase().contains(needle)),
            Self::Number(_) => false,
        }
    }

    pub fn equals(&self, expected: &str) -> bool {
        match self {
            Self::Text(value) => *value == expected,
            Self::Rank { label, .. } => *label == expected,
            Self::List(items) => items.iter().any(|item| item == expected),
            Self::Number(value) => expected
                .trim()
                .parse::<f64>()
                .map(|parsed| parsed == *value)
                .unwrap_or(false),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => {
                a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
            }
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Rank { rank: a, .. }, FieldValue::Rank { rank: b, .. }) => a.cmp(b),
            (FieldValue::List(a), FieldValue::List(b)) => a.len().cmp(&b.len()),
            _ => Ordering::Equal,
        }
    }
}

pub trait Record: Clone + Serialize + Send + Sync + 'static {
    /// Prefix of generated ids, e.g. `contract` in `contract-1718000000000`.
    const ID_PREFIX: &'static str;
    const INSERT_AT: InsertPosition;

    fn id(&self) -> &str;

    /// `None` when the field is unknown or the optional value is absent.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;

    fn search_fields() -> &'static [&'static str];
    fn filter_fields() -> &'static [&'static str];
    fn sort_fields() -> &'static [&'static str];
    fn aggregates() -> &'static [AggregateSpec];
    fn form_rules() -> &'static [FieldRule];

    /// Builds a record from a form that already passed `form_rules`.
    fn from_form(id: String, form: &FormData, now: DateTime<Utc>) -> AppResult<Self>;
}
