use crate::errors::AppResult;
use crate::records::{AggregateSpec, FieldValue, FormData, InsertPosition, Measure, Record, ValueFormat};
use crate::validation::{FieldKind, FieldRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

closed_set!(SpendStatus {
    Pending => "pending",
    Approved => "approved",
    Paid => "paid",
    Disputed => "disputed",
});

closed_set!(SpendCategory {
    LegalFees => "legal_fees",
    ExpertWitness => "expert_witness",
    CourtCosts => "court_costs",
    FilingFees => "filing_fees",
    Travel => "travel",
});

/// One invoice line charged against a matter budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendLine {
    pub id: String,
    pub vendor: String,
    pub matter: String,
    pub description: String,
    pub category: SpendCategory,
    pub status: SpendStatus,
    pub amount: f64,
    pub budget: f64,
    pub invoice_date: String,
}

const FORM_RULES: &[FieldRule] = &[
    FieldRule::required("vendor", FieldKind::Text),
    FieldRule::required("matter", FieldKind::Text),
    FieldRule::required("category", FieldKind::Choice(SpendCategory::LABELS)),
    FieldRule::required("amount", FieldKind::Number),
    FieldRule::optional("budget", FieldKind::Number),
    FieldRule::optional("status", FieldKind::Choice(SpendStatus::LABELS)),
    FieldRule::optional("description", FieldKind::Text),
    FieldRule::optional("invoiceDate", FieldKind::Date),
];

const AGGREGATES: &[AggregateSpec] = &[
    AggregateSpec::new("totalSpend", "Total Spend", Measure::Sum("amount"), ValueFormat::Currency),
    AggregateSpec::new("totalBudget", "Total Budget", Measure::Sum("budget"), ValueFormat::Currency),
    AggregateSpec::new(
        "budgetUtilization",
        "Budget Utilization",
        Measure::Ratio {
            numerator: "amount",
            denominator: "budget",
        },
        ValueFormat::Percent,
    ),
    AggregateSpec::new(
        "pendingApproval",
        "Pending Approval",
        Measure::CountWhere {
            field: "status",
            values: &["pending"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new(
        "disputed",
        "Disputed",
        Measure::CountWhere {
            field: "status",
            values: &["disputed"],
        },
        ValueFormat::Count,
    ),
    AggregateSpec::new("averageInvoice", "Average Invoice", Measure::Average("amount"), ValueFormat::Currency),
];

impl Record for SpendLine {
    const ID_PREFIX: &'static str = "spend";
    const INSERT_AT: InsertPosition = InsertPosition::Back;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(&self.id)),
            "vendor" => Some(FieldValue::Text(&self.vendor)),
            "matter" => Some(FieldValue::Text(&self.matter)),
            "description" => Some(FieldValue::Text(&self.description)),
            "category" => Some(FieldValue::Text(self.category.as_str())),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "amount" => Some(FieldValue::Number(self.amount)),
            "budget" => Some(FieldValue::Number(self.budget)),
            "invoiceDate" => Some(FieldValue::Text(&self.invoice_date)),
            _ => None,
        }
    }

    fn search_fields() -> &'static [&'static str] {
        &["vendor", "matter", "description"]
    }

    fn filter_fields() -> &'static [&'static str] {
        &["category", "status"]
    }

    fn sort_fields() -> &'static [&'static str] {
        &["vendor", "matter", "amount", "budget", "invoiceDate"]
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
            vendor: form.text("vendor"),
            matter: form.text("matter"),
            description: form.text("description"),
            category: form.choice_or("category", SpendCategory::LegalFees)?,
            status: form.choice_or("status", SpendStatus::Pending)?,
            amount: form.number("amount")?,
            budget: form.number("budget")?,
            invoice_date: form.date_or("invoiceDate", now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::fixtures;
    use crate::records::aggregate::compute;

    #[test]
    fn utilization_is_spend_over_budget() {
        let lines = fixtures::spend_lines();
        let spend: f64 = lines.iter().map(|line| line.amount).sum();
        let budget: f64 = lines.iter().map(|line| line.budget).sum();
        let aggregates = compute(&lines);
        let utilization = aggregates
            .iter()
            .find(|aggregate| aggregate.key == "budgetUtilization")
            .expect("utilization");
        assert!((utilization.value - spend / budget * 100.0).abs() < 1e-9);
        assert!(utilization.display.ends_with('%'));
    }

    #[test]
    fn amount_is_required() {
        let form = FormData::new()
            .with("vendor", "Veritext")
            .with("matter", "Acme v. Globex")
            .with("category", "court_costs");
        let errors = form.validate::<SpendLine>().expect_err("amount missing");
        assert!(errors.contains("amount"));
    }
}
