use super::{Priority, ELEVATED};
use crate::errors::AppResult;
use crate::records::filter::optional_text;
use crate::records::{AggregateSpec, FieldValue, FormData, InsertPosition, Measure, Record, ValueFormat};
use crate::validation::{FieldKind, FieldRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

closed_set!(ContractStatus {
    Draft => "draft",
    Pending => "pending",
    Executed => "executed",
    Expired => "expired",
});

closed_set!(ContractType {
    Employment => "Employment",
    Nda => "NDA",
    ServiceAgreement => "Service Agreement",
    Lease => "Lease",
    Vendor => "Vendor",
    License => "License",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    pub title: String,
    pub client: String,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub status: ContractStatus,
    pub value: f64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub risk_level: Priority,
    pub owner: Option<String>,
    pub tags: Vec<String>,
    pub ai_insights: Vec<String>,
}

const FORM_RULES: &[FieldRule] = &[
    FieldRule::required("title", FieldKind::Text),
    FieldRule::required("client", FieldKind::Text),
    FieldRule::required("type", FieldKind::Choice(ContractType::LABELS)),
    FieldRule::optional("status", FieldKind::Choice(ContractStatus::LABELS)),
    FieldRule::optional("value", FieldKind::Number),
    FieldRule::optional("startDate", FieldKind::Date),
    FieldRule::optional("endDate", FieldKind::Date),
    FieldRule::optional("riskLevel", FieldKind::Choice(Priority::LABELS)),
    FieldRule::optional("owner", FieldKind::Text),
    FieldRule::optional("tags", FieldKind::List),
];

const AGGREGATES: &[AggregateSpec] = &[
    AggregateSpec::new("total", "Total Contracts", Measure::Count, ValueFormat::Count),
    AggregateSpec::new(
        "executed",
        "Executed",
        Measure::CountWhere {
            field: "status",
            values: &["executed"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new(
        "pending",
        "Pending Signature",
        Measure::CountWhere {
            field: "status",
            values: &["pending"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new(
        "highRisk",
        "High Risk",
        Measure::CountWhere {
            field: "riskLevel",
            values: ELEVATED,
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new("totalValue", "Portfolio Value", Measure::Sum("value"), ValueFormat::Currency),
    AggregateSpec::new("averageValue", "Average Value", Measure::Average("value"), ValueFormat::Currency),
];

impl Record for Contract {
    const ID_PREFIX: &'static str = "contract";
    const INSERT_AT: InsertPosition = InsertPosition::Front;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "title" => Some(FieldValue::Text(&self.title)),
            "client" => Some(FieldValue::Text(&self.client)),
            "type" => Some(FieldValue::Text(self.contract_type.as_str())),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "value" => Some(FieldValue::Number(self.value)),
            "startDate" => Some(FieldValue::Text(&self.start_date)),
            "endDate" => optional_text(&self.end_date),
            "riskLevel" => Some(self.risk_level.field_value()),
            "owner" => optional_text(&self.owner),
            "tags" => Some(FieldValue::List(&self.tags)),
            "aiInsights" => Some(FieldValue::List(&self.ai_insights)),
            _ => None,
        }
    }

    fn search_fields() -> &'static [&'static str] {
        &["title", "client", "type"]
    }

    fn filter_fields() -> &'static [&'static str] {
        &["status", "type", "riskLevel"]
    }

    fn sort_fields() -> &'static [&'static str] {
        &["title", "client", "value", "startDate", "endDate", "riskLevel"]
    }

    fn aggregates() -> &'static [AggregateSpec] {
        AGGREGATES
    }

    fn form_rules() -> &'static [FieldRule] {
        FORM_RULES
    }

    fn from_form(id: String, form: &FormData, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            id,
            title: form.text("title"),
            client: form.text("client"),
            contract_type: form.choice_or("type", ContractType::ServiceAgreement)?,
            status: form.choice_or("status", ContractStatus::Draft)?,
            value: form.number("value")?,
            start_date: form.date_or("startDate", now),
            end_date: form.optional_text("endDate"),
            risk_level: form.choice_or("riskLevel", Priority::Low)?,
            owner: form.optional_text("owner"),
            tags: form.list("tags"),
            ai_insights: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::fixtures;
    use crate::records::filter::{filter_records, ViewQuery};

    #[test]
    fn risk_level_filter_matches_label() {
        let contracts = fixtures::contracts();
        let critical = filter_records(&contracts, &ViewQuery::default().filter("riskLevel", "critical"));
        assert!(!critical.is_empty());
        assert!(critical.iter().all(|contract| contract.risk_level == Priority::Critical));
    }

    #[test]
    fn insights_are_not_searched() {
        let contracts = fixtures::contracts();
        let insight = contracts[0].ai_insights[0].to_lowercase();
        let matched = filter_records(&contracts, &ViewQuery::search(&insight));
        assert!(matched.iter().all(|contract| contract.id != contracts[0].id));
    }
}
