use super::Record;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Count,
    /// Records whose field equals any of `values`.
    CountWhere {
        field: &'static str,
        values: &'static [&'static str],
    },
    Sum(&'static str),
    Average(&'static str),
    /// `CountWhere` as a percentage of the whole collection.
    Share {
        field: &'static str,
        values: &'static [&'static str],
    },
    /// `sum(numerator) / sum(denominator)` as a percentage.
    Ratio {
        numerator: &'static str,
        denominator: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueFormat {
    Count,
    Currency,
    Percent,
    Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub measure: Measure,
    pub format: ValueFormat,
}

impl AggregateSpec {
    pub const fn new(key: &'static str, label: &'static str, measure: Measure, format: ValueFormat) -> Self {
        Self {
            key,
            label,
            measure,
            format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub key: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub format: ValueFormat,
    pub display: String,
}

pub fn count_where<R: Record>(records: &[R], field: &str, values: &[&str]) -> usize {
    records
        .iter()
        .filter(|record| {
            record
                .field(field)
                .map(|value| values.iter().any(|expected| value.equals(expected)))
                .unwrap_or(false)
        })
        .count()
}

/// Missing or non-numeric values contribute nothing.
pub fn sum<R: Record>(records: &[R], field: &str) -> f64 {
    records
        .iter()
        .filter_map(|record| record.field(field).and_then(|value| value.as_number()))
        .fold(0.0, |total, value| total + value)
}

pub fn average<R: Record>(records: &[R], field: &str) -> f64 {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| record.field(field).and_then(|value| value.as_number()))
        .collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().fold(0.0, |total, value| total + value) / values.len() as f64
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

pub fn measure<R: Record>(records: &[R], measure: Measure) -> f64 {
    match measure {
        Measure::Count => records.len() as f64,
        Measure::CountWhere { field, values } => count_where(records, field, values) as f64,
        Measure::Sum(field) => sum(records, field),
        Measure::Average(field) => average(records, field),
        Measure::Share { field, values } => percentage(count_where(records, field, values) as f64, records.len() as f64),
        Measure::Ratio { numerator, denominator } => percentage(sum(records, numerator), sum(records, denominator)),
    }
}

/// Evaluates every aggregate the kind declares, each as its own scan.
pub fn compute<R: Record>(records: &[R]) -> Vec<Aggregate> {
    R::aggregates()
        .iter()
        .map(|spec| {
            let value = measure(records, spec.measure);
            Aggregate {
                key: spec.key,
                label: spec.label,
                value,
                format: spec.format,
                display: format_value(value, spec.format),
            }
        })
        .collect()
}

pub fn format_value(value: f64, format: ValueFormat) -> String {
    match format {
        ValueFormat::Count => group_thousands(value.round().abs() as u64, value < 0.0),
        ValueFormat::Currency => format_currency(value),
        ValueFormat::Percent => format!("{:.1}%", value),
        ValueFormat::Decimal => format!("{:.2}", value),
    }
}

/// US dollar formatting, e.g. `$4,431,096.01`.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100, false);
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, whole, cents % 100)
}

fn group_thousands(value: u64, negative: bool) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative && value > 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::{fixtures, Contract, SpendLine};

    #[test]
    fn status_partition_covers_the_collection() {
        let contracts = fixtures::contracts();
        for status in ["draft", "pending", "executed", "expired", "unknown"] {
            let matching = count_where(&contracts, "status", &[status]);
            let rest = contracts
                .iter()
                .filter(|contract| contract.status.as_str() != status)
                .count();
            assert_eq!(matching + rest, contracts.len(), "partition on {}", status);
        }
    }

    #[test]
    fn averages_and_ratios_of_empty_collections_are_zero() {
        let empty: Vec<SpendLine> = Vec::new();
        assert_eq!(average(&empty, "amount"), 0.0);
        assert_eq!(measure(&empty, Measure::Ratio {
            numerator: "amount",
            denominator: "budget",
        }), 0.0);
        assert_eq!(measure(&empty, Measure::Share {
            field: "status",
            values: &["paid"],
        }), 0.0);
    }

    #[test]
    fn aggregates_ignore_any_view_filtering() {
        let contracts = fixtures::contracts();
        let aggregates = compute::<Contract>(&contracts);
        let total = aggregates
            .iter()
            .find(|aggregate| aggregate.key == "total")
            .expect("total aggregate");
        assert_eq!(total.value, contracts.len() as f64);
    }

    #[test]
    fn currency_display_groups_and_rounds() {
        assert_eq!(format_currency(4_431_096.01), "$4,431,096.01");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-1234.567), "-$1,234.57");
        assert_eq!(format_value(1234.0, ValueFormat::Count), "1,234");
        assert_eq!(format_value(42.26, ValueFormat::Percent), "42.3%");
    }
}
