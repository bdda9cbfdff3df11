use crate::errors::AppResult;
use crate::records::filter::optional_text;
use crate::records::{AggregateSpec, FieldValue, FormData, InsertPosition, Measure, Record, ValueFormat};
use crate::validation::{FieldKind, FieldRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

closed_set!(EntityStatus {
    Active => "active",
    Dormant => "dormant",
    Pending => "pending",
    Dissolved => "dissolved",
});

closed_set!(EntityType {
    Corporation => "corporation",
    Llc => "llc",
    Partnership => "partnership",
    Trust => "trust",
    Subsidiary => "subsidiary",
});

const DEFAULT_OFFICER_ROLE: &str = "Director";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub name: String,
    pub role: String,
}

impl Officer {
    /// Parses `Name:Role`; a bare name is recorded as a director.
    fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((name, role)) if !role.trim().is_empty() => Self {
                name: name.trim().to_string(),
                role: role.trim().to_string(),
            },
            Some((name, _)) => Self {
                name: name.trim().to_string(),
                role: DEFAULT_OFFICER_ROLE.to_string(),
            },
            None => Self {
                name: raw.trim().to_string(),
                role: DEFAULT_OFFICER_ROLE.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalEntity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub jurisdiction: String,
    pub status: EntityStatus,
    pub registration_number: String,
    pub incorporation_date: String,
    pub parent_entity: Option<String>,
    pub officers: Vec<Officer>,
    pub compliance_score: f64,
    pub next_filing_date: Option<String>,
}

const FORM_RULES: &[FieldRule] = &[
    FieldRule::required("name", FieldKind::Text),
    FieldRule::required("type", FieldKind::Choice(EntityType::LABELS)),
    FieldRule::required("jurisdiction", FieldKind::Text),
    FieldRule::optional("status", FieldKind::Choice(EntityStatus::LABELS)),
    FieldRule::optional("registrationNumber", FieldKind::Text),
    FieldRule::optional("incorporationDate", FieldKind::Date),
    FieldRule::optional("parentEntity", FieldKind::Text),
    FieldRule::optional("officers", FieldKind::List),
    FieldRule::optional("complianceScore", FieldKind::Number),
    FieldRule::optional("nextFilingDate", FieldKind::Date),
];

const AGGREGATES: &[AggregateSpec] = &[
    AggregateSpec::new("total", "Total Entities", Measure::Count, ValueFormat::Count),
    AggregateSpec::new(
        "active",
        "Active",
        Measure::CountWhere {
            field: "status",
            values: &["active"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new(
        "subsidiaries",
        "Subsidiaries",
        Measure::CountWhere {
            field: "type",
            values: &["subsidiary"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new(
        "averageCompliance",
        "Average Compliance",
        Measure::Average("complianceScore"),
        ValueFormat::Percent,
    ),
    AggregateSpec::new(
        "inGoodStanding",
        "In Good Standing",
        Measure::Share {
            field: "status",
            values: &["active"],
        },
        ValueFormat::Percent,
    ),
];

impl Record for LegalEntity {
    const ID_PREFIX: &'static str = "entity";
    const INSERT_AT: InsertPosition = InsertPosition::Back;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "name" => Some(FieldValue::Text(&self.name)),
            "type" => Some(FieldValue::Text(self.entity_type.as_str())),
            "jurisdiction" => Some(FieldValue::Text(&self.jurisdiction)),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "registrationNumber" => Some(FieldValue::Text(&self.registration_number)),
            "incorporationDate" => Some(FieldValue::Text(&self.incorporation_date)),
            "parentEntity" => optional_text(&self.parent_entity),
            "complianceScore" => Some(FieldValue::Number(self.compliance_score)),
            "officerCount" => Some(FieldValue::Number(self.officers.len() as f64)),
            "nextFilingDate" => optional_text(&self.next_filing_date),
            _ => None,
        }
    }

    fn search_fields() -> &'static [&'static str] {
        &["name", "jurisdiction", "registrationNumber"]
    }

    fn filter_fields() -> &'static [&'static str] {
        &["status", "type", "jurisdiction"]
    }

    fn sort_fields() -> &'static [&'static str] {
        &[
            "name",
            "jurisdiction",
            "incorporationDate",
            "complianceScore",
            "officerCount",
            "nextFilingDate",
        ]
    }

    fn aggregates() -> &'static [AggregateSpec] {
        AGGREGATES
    }

    fn form_rules() -> &'static [FieldRule] {
        FORM_RULES
    }

    fn from_form(id: String, form: &FormData, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            registration_number: form
                .optional_text("registrationNumber")
                .unwrap_or_else(|| id.to_uppercase()),
            id,
            name: form.text("name"),
            entity_type: form.choice_or("type", EntityType::Corporation)?,
            jurisdiction: form.text("jurisdiction"),
            status: form.choice_or("status", EntityStatus::Pending)?,
            incorporation_date: form.date_or("incorporationDate", now),
            parent_entity: form.optional_text("parentEntity"),
            officers: form.list("officers").iter().map(|raw| Officer::parse(raw)).collect(),
            compliance_score: form.number("complianceScore")?,
            next_filing_date: form.optional_text("nextFilingDate"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::fixtures;
    use crate::records::filter::{filter_records, ViewQuery};

    #[test]
    fn officers_parse_with_default_role() {
        let form = FormData::new()
            .with("name", "Kestrel Holdings Ltd")
            .with("type", "subsidiary")
            .with("jurisdiction", "Ireland")
            .with("officers", "Aoife Byrne:Secretary, Liam Walsh");
        let entity = LegalEntity::from_form("entity-7".to_string(), &form, Utc::now()).expect("entity");
        assert_eq!(entity.status, EntityStatus::Pending);
        assert_eq!(entity.officers.len(), 2);
        assert_eq!(entity.officers[0].role, "Secretary");
        assert_eq!(entity.officers[1].role, DEFAULT_OFFICER_ROLE);
        assert_eq!(entity.registration_number, "ENTITY-7");
    }

    #[test]
    fn jurisdiction_is_both_searchable_and_filterable() {
        let entities = fixtures::entities();
        let searched = filter_records(&entities, &ViewQuery::search("delaware"));
        let filtered = filter_records(&entities, &ViewQuery::default().filter("jurisdiction", "Delaware"));
        assert!(!filtered.is_empty());
        assert_eq!(searched.len(), filtered.len());
    }
}
