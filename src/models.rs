use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_POLICY_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Draft,
    UnderReview,
    Approved,
    Active,
    Retired,
}

impl PolicyStatus {
    pub const LABELS: &'static [&'static str] = &["draft", "under_review", "approved", "active", "retired"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::Retired => "retired",
        }
    }
}

impl FromStr for PolicyStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "draft" => Ok(Self::Draft),
            "under_review" => Ok(Self::UnderReview),
            "approved" => Ok(Self::Approved),
            "active" => Ok(Self::Active),
            "retired" => Ok(Self::Retired),
            other => Err(format!("Unknown policy status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    pub version: String,
    pub summary: String,
    pub author: Option<String>,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub policy_type: String,
    pub status: PolicyStatus,
    pub content: String,
    pub version: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub effective_date: Option<String>,
    pub review_date: Option<String>,
    pub approvers: Vec<String>,
    pub tags: Vec<String>,
    pub related_policies: Vec<String>,
    pub attachments: Vec<String>,
    pub change_log: Vec<ChangeLogEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every field defaults so missing values surface as field validation
/// errors; `status` stays a raw string for the same reason.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePolicyPayload {
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub policy_type: String,
    pub status: Option<String>,
    pub content: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub effective_date: Option<String>,
    pub review_date: Option<String>,
    pub approvers: Vec<String>,
    pub tags: Vec<String>,
    pub related_policies: Vec<String>,
    pub attachments: Vec<String>,
}

/// Partial update. Absent fields are left untouched; `changeSummary`
/// appends a change log entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicyPayload {
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub policy_type: Option<String>,
    pub status: Option<String>,
    pub content: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub effective_date: Option<String>,
    pub review_date: Option<String>,
    pub approvers: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub related_policies: Option<Vec<String>>,
    pub attachments: Option<Vec<String>>,
    pub change_summary: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPoliciesFilters {
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BooleanResponse {
    pub value: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_accepts_minimal_camel_case_body() {
        let payload: CreatePolicyPayload = serde_json::from_value(serde_json::json!({
            "title": "Data Retention",
            "category": "Privacy",
            "type": "internal",
            "content": "Records are kept for seven years.",
            "relatedPolicies": ["POL-7"]
        }))
        .expect("payload");
        assert_eq!(payload.policy_type, "internal");
        assert!(payload.version.is_none());
        assert_eq!(payload.related_policies, vec!["POL-7"]);
    }

    #[test]
    fn status_labels_parse_back() {
        for label in PolicyStatus::LABELS {
            assert_eq!(PolicyStatus::from_str(label).expect("label").as_str(), *label);
        }
        let json = serde_json::to_value(PolicyStatus::UnderReview).expect("json");
        assert_eq!(json, "under_review");
    }
}
