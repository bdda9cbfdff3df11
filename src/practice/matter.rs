use super::{Priority, ELEVATED};
use crate::errors::AppResult;
use crate::records::filter::optional_text;
use crate::records::{AggregateSpec, FieldValue, FormData, InsertPosition, Measure, Record, ValueFormat};
use crate::validation::{FieldKind, FieldRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

closed_set!(MatterStatus {
    Active => "active",
    Pending => "pending",
    OnHold => "on_hold",
    Closed => "closed",
});

closed_set!(MatterType {
    Litigation => "Litigation",
    Corporate => "Corporate",
    IntellectualProperty => "Intellectual Property",
    Employment => "Employment",
    Regulatory => "Regulatory",
    RealEstate => "Real Estate",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matter {
    pub id: String,
    pub title: String,
    pub client: String,
    #[serde(rename = "type")]
    pub matter_type: MatterType,
    pub status: MatterStatus,
    pub priority: Priority,
    pub assigned_to: String,
    pub start_date: String,
    pub due_date: Option<String>,
    pub estimated_value: f64,
    pub hours_logged: f64,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

const FORM_RULES: &[FieldRule] = &[
    FieldRule::required("title", FieldKind::Text),
    FieldRule::required("client", FieldKind::Text),
    FieldRule::required("type", FieldKind::Choice(MatterType::LABELS)),
    FieldRule::optional("status", FieldKind::Choice(MatterStatus::LABELS)),
    FieldRule::optional("priority", FieldKind::Choice(Priority::LABELS)),
    FieldRule::optional("assignedTo", FieldKind::Text),
    FieldRule::optional("startDate", FieldKind::Date),
    FieldRule::optional("dueDate", FieldKind::Date),
    FieldRule::optional("estimatedValue", FieldKind::Number),
    FieldRule::optional("hoursLogged", FieldKind::Number),
    FieldRule::optional("description", FieldKind::Text),
    FieldRule::optional("tags", FieldKind::List),
];

const AGGREGATES: &[AggregateSpec] = &[
    AggregateSpec::new("total", "Total Matters", Measure::Count, ValueFormat::Count),
    AggregateSpec::new(
        "active",
        "Active Matters",
        Measure::CountWhere {
            field: "status",
            values: &["active"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new(
        "highPriority",
        "High Priority",
        Measure::CountWhere {
            field: "priority",
            values: ELEVATED,
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new("hoursLogged", "Hours Logged", Measure::Sum("hoursLogged"), ValueFormat::Decimal),
    AggregateSpec::new("averageHours", "Average Hours", Measure::Average("hoursLogged"), ValueFormat::Decimal),
    AggregateSpec::new(
        "pipelineValue",
        "Estimated Value",
        Measure::Sum("estimatedValue"),
        ValueFormat::Currency,
    ),
];

impl Record for Matter {
    const ID_PREFIX: &'static str = "matter";
    const INSERT_AT: InsertPosition = InsertPosition::Front;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "title" => Some(FieldValue::Text(&self.title)),
            "client" => Some(FieldValue::Text(&self.client)),
            "type" => Some(FieldValue::Text(self.matter_type.as_str())),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "priority" => Some(self.priority.field_value()),
            "assignedTo" => Some(FieldValue::Text(&self.assigned_to)),
            "startDate" => Some(FieldValue::Text(&self.start_date)),
            "dueDate" => optional_text(&self.due_date),
            "estimatedValue" => Some(FieldValue::Number(self.estimated_value)),
            "hoursLogged" => Some(FieldValue::Number(self.hours_logged)),
            "description" => optional_text(&self.description),
            "tags" => Some(FieldValue::List(&self.tags)),
            _ => None,
        }
    }

    fn search_fields() -> &'static [&'static str] {
        &["title", "client", "assignedTo"]
    }

    fn filter_fields() -> &'static [&'static str] {
        &["status", "type", "priority"]
    }

    fn sort_fields() -> &'static [&'static str] {
        &["title", "client", "priority", "startDate", "dueDate", "estimatedValue", "hoursLogged"]
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
            matter_type: form.choice_or("type", MatterType::Corporate)?,
            status: form.choice_or("status", MatterStatus::Active)?,
            priority: form.choice_or("priority", Priority::Medium)?,
            assigned_to: form.text("assignedTo"),
            start_date: form.date_or("startDate", now),
            due_date: form.optional_text("dueDate"),
            estimated_value: form.number("estimatedValue")?,
            hours_logged: form.number("hoursLogged")?,
            description: form.optional_text("description"),
            tags: form.list("tags"),
        })
    }
}
