use super::{FieldValue, Record};
use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Filter value meaning "no constraint on this field".
pub const ALL: &str = "all";

const MAX_PAGE_SIZE: u32 = 500;
const RESERVED_PARAMS: &[&str] = &["q", "sort", "limit", "cursor"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub query: String,
    pub filters: Vec<FieldFilter>,
    pub sort: Vec<SortKey>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub next_cursor: Option<String>,
}

impl ViewQuery {
    pub fn search(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, field: &str, value: &str) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn sort_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort.push(SortKey {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Reads `q`, `sort` (`field:asc,other:desc`), `limit` and `cursor`; every
    /// other key becomes an equality filter.
    pub fn from_params(params: &BTreeMap<String, String>) -> AppResult<Self> {
        let mut query = Self {
            query: params.get("q").cloned().unwrap_or_default(),
            cursor: params.get("cursor").filter(|value| !value.is_empty()).cloned(),
            ..Self::default()
        };

        if let Some(limit) = params.get("limit").filter(|value| !value.is_empty()) {
            let parsed = limit
                .parse::<u32>()
                .map_err(|_| AppError::invalid("limit", format!("'{}' is not a positive integer", limit)))?;
            query.limit = Some(parsed);
        }

        if let Some(sort) = params.get("sort") {
            for entry in sort.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
                let (field, direction) = match entry.split_once(':') {
                    Some((field, direction)) if direction.eq_ignore_ascii_case("desc") => (field, SortDirection::Desc),
                    Some((field, direction)) if direction.eq_ignore_ascii_case("asc") => (field, SortDirection::Asc),
                    Some(_) => {
                        return Err(AppError::invalid("sort", format!("'{}' must use asc or desc", entry)));
                    }
                    None => (entry, SortDirection::Asc),
                };
                query = query.sort_by(field, direction);
            }
        }

        for (field, value) in params {
            if RESERVED_PARAMS.contains(&field.as_str()) {
                continue;
            }
            query = query.filter(field, value);
        }

        Ok(query)
    }

    /// Rejects filters and sort keys the record kind does not declare.
    pub fn validate<R: Record>(&self) -> AppResult<()> {
        for filter in &self.filters {
            if !R::filter_fields().contains(&filter.field.as_str()) {
                return Err(AppError::invalid(
                    &filter.field,
                    format!("is not filterable; use one of: {}", R::filter_fields().join(", ")),
                ));
            }
        }
        for key in &self.sort {
            if !R::sort_fields().contains(&key.field.as_str()) {
                return Err(AppError::invalid(
                    "sort",
                    format!("'{}' is not sortable; use one of: {}", key.field, R::sort_fields().join(", ")),
                ));
            }
        }
        Ok(())
    }
}

/// Text match over the kind's search fields, OR-combined.
pub fn matches_query<R: Record>(record: &R, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    R::search_fields()
        .iter()
        .filter_map(|field| record.field(field))
        .any(|value| value.contains_text(needle))
}

/// Every equality filter must hold; `all` never restricts.
pub fn matches_filters<R: Record>(record: &R, filters: &[FieldFilter]) -> bool {
    filters.iter().all(|filter| {
        if filter.value == ALL {
            return true;
        }
        record
            .field(&filter.field)
            .map(|value| value.equals(&filter.value))
            .unwrap_or(false)
    })
}

/// Stable subsequence of `records` satisfying the text query and all filters.
pub fn filter_records<'a, R: Record>(records: &'a [R], query: &ViewQuery) -> Vec<&'a R> {
    let needle = query.query.to_lowercase();
    records
        .iter()
        .filter(|record| matches_query(*record, &needle) && matches_filters(*record, &query.filters))
        .collect()
}

pub fn sort_records<R: Record>(records: &mut [&R], sort: &[SortKey]) {
    if sort.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare_records(*a, *b, sort));
}

fn compare_records<R: Record>(a: &R, b: &R, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ordering = match (a.field(&key.field), b.field(&key.field)) {
            (Some(left), Some(right)) => left.compare(&right),
            // Absent values sort last in either direction.
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

pub fn paginate<T>(items: Vec<T>, limit: Option<u32>, cursor: Option<&str>) -> AppResult<Page<T>> {
    let total = items.len();
    let offset = parse_cursor(cursor)?;
    let Some(limit) = limit else {
        let items: Vec<T> = items.into_iter().skip(offset).collect();
        return Ok(Page {
            items,
            total,
            next_cursor: None,
        });
    };

    let page_size = limit.clamp(1, MAX_PAGE_SIZE) as usize;
    let page_items: Vec<T> = items.into_iter().skip(offset).take(page_size).collect();
    let consumed = offset + page_items.len();
    let next_cursor = (consumed < total).then(|| consumed.to_string());

    Ok(Page {
        items: page_items,
        total,
        next_cursor,
    })
}

fn parse_cursor(cursor: Option<&str>) -> AppResult<usize> {
    let Some(value) = cursor else {
        return Ok(0);
    };
    value
        .parse::<usize>()
        .map_err(|_| AppError::invalid("cursor", format!("'{}' is not a numeric offset", value)))
}

/// Validates, filters, sorts and pages in one pass over the store.
pub fn run_query<'a, R: Record>(records: &'a [R], query: &ViewQuery) -> AppResult<Page<&'a R>> {
    query.validate::<R>()?;
    let mut matched = filter_records(records, query);
    sort_records(&mut matched, &query.sort);
    paginate(matched, query.limit, query.cursor.as_deref())
}

/// Field value helper for kinds whose optional text may be absent.
pub fn optional_text(value: &Option<String>) -> Option<FieldValue<'_>> {
    value.as_deref().map(FieldValue::Text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::{fixtures, Client, Contract, Matter};

    fn titles<'a>(records: &[&'a Contract]) -> Vec<&'a str> {
        records.iter().map(|contract| contract.title.as_str()).collect()
    }

    #[test]
    fn empty_query_is_identity() {
        let contracts = fixtures::contracts();
        let result = filter_records(&contracts, &ViewQuery::default());
        assert_eq!(result.len(), contracts.len());
        assert!(result.iter().zip(contracts.iter()).all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn result_is_an_ordered_subsequence() {
        let matters = fixtures::matters();
        for needle in ["a", "corp", "LLC", "zzz", "e"] {
            let result = filter_records(&matters, &ViewQuery::search(needle));
            let mut cursor = matters.iter();
            for item in result {
                assert!(cursor.any(|candidate| candidate.id == item.id), "'{}' broke ordering", needle);
            }
        }
    }

    #[test]
    fn all_adds_no_restriction() {
        let contracts = fixtures::contracts();
        let base = filter_records(&contracts, &ViewQuery::search("e"));
        let with_all = filter_records(
            &contracts,
            &ViewQuery::search("e").filter("status", ALL).filter("type", ALL),
        );
        assert_eq!(titles(&base), titles(&with_all));
    }

    #[test]
    fn text_and_filters_combine_with_and() {
        let contracts = fixtures::contracts();
        let employment = filter_records(&contracts, &ViewQuery::search("employment"));
        assert_eq!(employment.len(), 3);

        let executed = filter_records(&contracts, &ViewQuery::search("employment").filter("status", "executed"));
        assert!(executed.len() < employment.len());
        assert!(executed.iter().all(|contract| contract.status.as_str() == "executed"));
    }

    #[test]
    fn search_is_case_insensitive() {
        let matters = fixtures::matters();
        let lower = filter_records(&matters, &ViewQuery::search("acme"));
        let upper = filter_records(&matters, &ViewQuery::search("ACME"));
        assert!(!lower.is_empty());
        assert_eq!(lower.len(), upper.len());
    }

    #[test]
    fn unknown_filter_field_is_rejected() {
        let matters = fixtures::matters();
        let error = run_query(&matters, &ViewQuery::default().filter("budgetCode", "x"))
            .expect_err("unknown field");
        assert!(error.to_string().contains("budgetCode"));
    }

    #[test]
    fn sorts_priority_by_rank() {
        let matters = fixtures::matters();
        let query = ViewQuery::default().sort_by("priority", SortDirection::Desc);
        let page = run_query::<Matter>(&matters, &query).expect("sorted");
        let ranks: Vec<u8> = page.items.iter().map(|matter| matter.priority.rank()).collect();
        let mut expected = ranks.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(ranks, expected);
    }

    #[test]
    fn pagination_walks_the_filtered_view() {
        let contracts = fixtures::contracts();
        let first = run_query(&contracts, &ViewQuery {
            limit: Some(3),
            ..ViewQuery::default()
        })
        .expect("first page");
        assert_eq!(first.items.len(), 3);
        assert_eq!(first.total, contracts.len());
        assert_eq!(first.next_cursor.as_deref(), Some("3"));

        let rest = run_query(&contracts, &ViewQuery {
            limit: Some(10),
            cursor: first.next_cursor.clone(),
            ..ViewQuery::default()
        })
        .expect("second page");
        assert_eq!(rest.items.len(), contracts.len() - 3);
        assert!(rest.next_cursor.is_none());
    }

    #[test]
    fn params_split_reserved_keys_from_filters() {
        let params: BTreeMap<String, String> = [
            ("q", "lease"),
            ("status", "draft"),
            ("sort", "value:desc,title"),
            ("limit", "5"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let query = ViewQuery::from_params(&params).expect("parse params");
        assert_eq!(query.query, "lease");
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.filters, vec![FieldFilter {
            field: "status".to_string(),
            value: "draft".to_string(),
        }]);
        assert_eq!(query.sort.len(), 2);
        assert_eq!(query.sort[0].direction, SortDirection::Desc);
        assert_eq!(query.sort[1].direction, SortDirection::Asc);

        let bad: BTreeMap<String, String> = [("cursor".to_string(), "x".to_string())].into_iter().collect();
        let query = ViewQuery::from_params(&bad).expect("cursor parsed lazily");
        assert!(run_query(&fixtures::contracts(), &query).is_err());
    }

    #[test]
    fn absent_values_sort_last_in_both_directions() {
        let matters = fixtures::matters();
        let ids = |direction: SortDirection| -> Vec<String> {
            run_query::<Matter>(&matters, &ViewQuery::default().sort_by("dueDate", direction))
                .expect("sorted")
                .items
                .into_iter()
                .map(|matter| matter.id.clone())
                .collect()
        };
        assert_eq!(
            ids(SortDirection::Asc),
            vec!["MAT-006", "MAT-002", "MAT-004", "MAT-005", "MAT-001", "MAT-003"]
        );
        assert_eq!(
            ids(SortDirection::Desc),
            vec!["MAT-001", "MAT-005", "MAT-004", "MAT-002", "MAT-006", "MAT-003"]
        );
    }

    #[test]
    fn absent_optional_search_field_never_matches() {
        let clients = fixtures::clients();
        let matched: Vec<&str> = filter_records::<Client>(&clients, &ViewQuery::search("example"))
            .into_iter()
            .map(|client| client.id.as_str())
            .collect();
        assert_eq!(matched, vec!["CLI-001", "CLI-002", "CLI-004"]);
        assert!(clients.iter().any(|client| client.contact_email.is_none()));
    }
}
