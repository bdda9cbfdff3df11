use super::Priority;
use crate::errors::AppResult;
use crate::records::filter::optional_text;
use crate::records::{AggregateSpec, FieldValue, FormData, InsertPosition, Measure, Record, ValueFormat};
use crate::validation::{FieldKind, FieldRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

closed_set!(ClientStatus {
    Active => "active",
    Inactive => "inactive",
    Prospect => "prospect",
});

closed_set!(ClientType {
    Corporate => "corporate",
    Individual => "individual",
    Government => "government",
    Nonprofit => "nonprofit",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub industry: String,
    #[serde(rename = "type")]
    pub client_type: ClientType,
    pub status: ClientStatus,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub relationship_partner: Option<String>,
    pub total_billed: f64,
    pub active_matters: f64,
    pub risk_level: Priority,
    pub client_since: String,
    pub tags: Vec<String>,
}

const FORM_RULES: &[FieldRule] = &[
    FieldRule::required("name", FieldKind::Text),
    FieldRule::required("industry", FieldKind::Text),
    FieldRule::required("type", FieldKind::Choice(ClientType::LABELS)),
    FieldRule::optional("status", FieldKind::Choice(ClientStatus::LABELS)),
    FieldRule::optional("contactName", FieldKind::Text),
    FieldRule::optional("contactEmail", FieldKind::Text),
    FieldRule::optional("relationshipPartner", FieldKind::Text),
    FieldRule::optional("totalBilled", FieldKind::Number),
    FieldRule::optional("activeMatters", FieldKind::Number),
    FieldRule::optional("riskLevel", FieldKind::Choice(Priority::LABELS)),
    FieldRule::optional("clientSince", FieldKind::Date),
    FieldRule::optional("tags", FieldKind::List),
];

const AGGREGATES: &[AggregateSpec] = &[
    AggregateSpec::new("total", "Total Clients", Measure::Count, ValueFormat::Count),
    AggregateSpec::new(
        "active",
        "Active Clients",
        Measure::CountWhere {
            field: "status",
            values: &["active"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new(
        "prospects",
        "Prospects",
        Measure::CountWhere {
            field: "status",
            values: &["prospect"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new("activeMatters", "Open Matters", Measure::Sum("activeMatters"), ValueFormat::Count),
    AggregateSpec::new("totalBilled", "Total Billed", Measure::Sum("totalBilled"), ValueFormat::Currency),
    AggregateSpec::new("averageBilled", "Average Billed", Measure::Average("totalBilled"), ValueFormat::Currency),
];

impl Record for Client {
    const ID_PREFIX: &'static str = "client";
    const INSERT_AT: InsertPosition = InsertPosition::Back;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "name" => Some(FieldValue::Text(&self.name)),
            "industry" => Some(FieldValue::Text(&self.industry)),
            "type" => Some(FieldValue::Text(self.client_type.as_str())),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "contactName" => optional_text(&self.contact_name),
            "contactEmail" => optional_text(&self.contact_email),
            "relationshipPartner" => optional_text(&self.relationship_partner),
            "totalBilled" => Some(FieldValue::Number(self.total_billed)),
            "activeMatters" => Some(FieldValue::Number(self.active_matters)),
            "riskLevel" => Some(self.risk_level.field_value()),
            "clientSince" => Some(FieldValue::Text(&self.client_since)),
            "tags" => Some(FieldValue::List(&self.tags)),
            _ => None,
        }
    }

    fn search_fields() -> &'static [&'static str] {
        &["name", "industry", "contactEmail"]
    }

    fn filter_fields() -> &'static [&'static str] {
        &["status", "type", "riskLevel"]
    }

    fn sort_fields() -> &'static [&'static str] {
        &["name", "industry", "totalBilled", "activeMatters", "riskLevel", "clientSince"]
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
            name: form.text("name"),
            industry: form.text("industry"),
            client_type: form.choice_or("type", ClientType::Corporate)?,
            status: form.choice_or("status", ClientStatus::Prospect)?,
            contact_name: form.optional_text("contactName"),
            contact_email: form.optional_text("contactEmail"),
            relationship_partner: form.optional_text("relationshipPartner"),
            total_billed: form.number("totalBilled")?,
            active_matters: form.number("activeMatters")?,
            risk_level: form.choice_or("riskLevel", Priority::Low)?,
            client_since: form.date_or("clientSince", now),
            tags: form.list("tags"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::fixtures;
    use crate::records::filter::{filter_records, ViewQuery};

    #[test]
    fn clients_without_email_do_not_match_on_email() {
        let clients = fixtures::clients();
        assert!(clients.iter().any(|client| client.contact_email.is_none()));
        let matched = filter_records(&clients, &ViewQuery::search("@"));
        assert!(matched.iter().all(|client| client.contact_email.is_some()));
    }

    #[test]
    fn new_clients_start_as_prospects() {
        let form = FormData::new()
            .with("name", "Vandelay Industries")
            .with("industry", "Import/Export")
            .with("type", "corporate");
        let client = Client::from_form("client-1".to_string(), &form, Utc::now()).expect("client");
        assert_eq!(client.status, ClientStatus::Prospect);
    }
}
