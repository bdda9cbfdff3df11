use crate::errors::AppResult;
use crate::records::{AggregateSpec, FieldValue, FormData, InsertPosition, Measure, Record, ValueFormat};
use crate::validation::{FieldKind, FieldRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

closed_set!(KnowledgeStatus {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

closed_set!(KnowledgeCategory {
    Precedent => "precedent",
    Template => "template",
    Memo => "memo",
    Guide => "guide",
    Checklist => "checklist",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeItem {
    pub id: String,
    pub title: String,
    pub category: KnowledgeCategory,
    pub status: KnowledgeStatus,
    pub practice_area: String,
    pub author: String,
    pub summary: String,
    pub updated_at: String,
    pub views: f64,
    pub tags: Vec<String>,
}

const FORM_RULES: &[FieldRule] = &[
    FieldRule::required("title", FieldKind::Text),
    FieldRule::required("category", FieldKind::Choice(KnowledgeCategory::LABELS)),
    FieldRule::required("practiceArea", FieldKind::Text),
    FieldRule::required("author", FieldKind::Text),
    FieldRule::optional("status", FieldKind::Choice(KnowledgeStatus::LABELS)),
    FieldRule::optional("summary", FieldKind::Text),
    FieldRule::optional("tags", FieldKind::List),
];

const AGGREGATES: &[AggregateSpec] = &[
    AggregateSpec::new("total", "Knowledge Items", Measure::Count, ValueFormat::Count),
    AggregateSpec::new(
        "published",
        "Published",
        Measure::CountWhere {
            field: "status",
            values: &["published"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new(
        "templates",
        "Templates & Precedents",
        Measure::CountWhere {
            field: "category",
            values: &["template", "precedent"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new("views", "Total Views", Measure::Sum("views"), ValueFormat::Count),
    AggregateSpec::new(
        "publishedShare",
        "Published Share",
        Measure::Share {
            field: "status",
            values: &["published"],
        },
        ValueFormat::Percent,
    ),
];

impl Record for KnowledgeItem {
    const ID_PREFIX: &'static str = "knowledge";
    const INSERT_AT: InsertPosition = InsertPosition::Front;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "title" => Some(FieldValue::Text(&self.title)),
            "category" => Some(FieldValue::Text(self.category.as_str())),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "practiceArea" => Some(FieldValue::Text(&self.practice_area)),
            "author" => Some(FieldValue::Text(&self.author)),
            "summary" => Some(FieldValue::Text(&self.summary)),
            "updatedAt" => Some(FieldValue::Text(&self.updated_at)),
            "views" => Some(FieldValue::Number(self.views)),
            "tags" => Some(FieldValue::List(&self.tags)),
            _ => None,
        }
    }

    fn search_fields() -> &'static [&'static str] {
        &["title", "author", "summary"]
    }

    fn filter_fields() -> &'static [&'static str] {
        &["category", "status", "practiceArea"]
    }

    fn sort_fields() -> &'static [&'static str] {
        &["title", "author", "updatedAt", "views"]
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
            category: form.choice_or("category", KnowledgeCategory::Memo)?,
            status: form.choice_or("status", KnowledgeStatus::Draft)?,
            practice_area: form.text("practiceArea"),
            author: form.text("author"),
            summary: form.text("summary"),
            updated_at: form.date_or("updatedAt", now),
            views: 0.0,
            tags: form.list("tags"),
        })
    }
}
