use crate::config::AppConfig;
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::generation::{DocumentGenerator, GenerationJob, GenerationRequest};
use crate::models::{
    BooleanResponse, ChangeLogEntry, CreatePolicyPayload, ListPoliciesFilters, Policy, PolicyStatus,
    UpdatePolicyPayload, DEFAULT_POLICY_VERSION,
};
use crate::records::{FormData, Selection, ViewQuery};
use crate::validation::{
    FieldKind, FieldRule, Validator, MAX_CONTENT_LENGTH, MAX_LABEL_LENGTH, MAX_TEXT_LENGTH,
};
use crate::views::{ViewKind, ViewPage, ViewRegistry, ViewSummary};
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

const POLICY_RULES: &[FieldRule] = &[
    FieldRule::optional("status", FieldKind::Choice(PolicyStatus::LABELS)),
    FieldRule::optional("effectiveDate", FieldKind::Date),
    FieldRule::optional("reviewDate", FieldKind::Date),
];

/// Entry point for every operation the HTTP layer exposes.
pub struct PracticeService {
    db: Arc<Database>,
    views: ViewRegistry,
    generator: DocumentGenerator,
}

impl PracticeService {
    pub fn new(config: &AppConfig) -> AppResult<Arc<Self>> {
        let db = Arc::new(Database::new(&config.database_path())?);
        let views = if config.storage.seed_fixtures {
            ViewRegistry::seeded()?
        } else {
            ViewRegistry::empty()
        };
        let generator = DocumentGenerator::new(
            config.generation_delay(),
            config.generation.max_pending,
            config.generation.retain_ready,
        );
        tracing::info!(
            database = %db.path().display(),
            policies = db.count_policies()?,
            seeded = config.storage.seed_fixtures,
            "practice service ready"
        );
        Ok(Arc::new(Self::from_parts(db, views, generator)))
    }

    pub fn from_parts(db: Arc<Database>, views: ViewRegistry, generator: DocumentGenerator) -> Self {
        Self { db, views, generator }
    }

    pub fn create_policy(&self, payload: CreatePolicyPayload) -> AppResult<Policy> {
        validate_create(&payload)?;
        let now = timestamp();
        let status = match payload.status.as_deref().map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => parse_status(raw)?,
            None => PolicyStatus::Draft,
        };
        let policy = Policy {
            id: Uuid::new_v4().to_string(),
            title: payload.title.trim().to_string(),
            category: payload.category.trim().to_string(),
            policy_type: payload.policy_type.trim().to_string(),
            status,
            content: payload.content,
            version: non_blank(payload.version).unwrap_or_else(|| DEFAULT_POLICY_VERSION.to_string()),
            description: non_blank(payload.description),
            owner: non_blank(payload.owner),
            effective_date: non_blank(payload.effective_date),
            review_date: non_blank(payload.review_date),
            approvers: payload.approvers,
            tags: payload.tags,
            related_policies: payload.related_policies,
            attachments: payload.attachments,
            change_log: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_policy(&policy)?;
        tracing::info!(policy_id = %policy.id, status = policy.status.as_str(), "policy created");
        Ok(policy)
    }

    pub fn list_policies(&self, filters: ListPoliciesFilters) -> AppResult<Vec<Policy>> {
        if let Some(status) = &filters.status {
            parse_status(status)?;
        }
        tracing::debug!(
            status = ?filters.status,
            category = ?filters.category,
            search = ?filters.search,
            limit = ?filters.limit,
            "listing policies"
        );
        self.db.list_policies(&filters)
    }

    pub fn get_policy(&self, id: &str) -> AppResult<Policy> {
        let id = parse_policy_id(id)?;
        self.db.get_policy(&id)?.ok_or_else(|| policy_not_found(&id))
    }

    pub fn update_policy(&self, id: &str, payload: UpdatePolicyPayload) -> AppResult<Policy> {
        let id = parse_policy_id(id)?;
        validate_update(&payload)?;
        let policy = self
            .db
            .update_policy_with(&id, |policy| apply_update(policy, payload, timestamp()))?
            .ok_or_else(|| policy_not_found(&id))?;
        tracing::info!(policy_id = %policy.id, version = %policy.version, "policy updated");
        Ok(policy)
    }

    pub fn delete_policy(&self, id: &str) -> AppResult<BooleanResponse> {
        let id = parse_policy_id(id)?;
        if !self.db.delete_policy(&id)? {
            return Err(policy_not_found(&id));
        }
        tracing::info!(policy_id = %id, "policy deleted");
        Ok(BooleanResponse { value: true })
    }

    pub fn view_summaries(&self) -> AppResult<Vec<ViewSummary>> {
        self.views.summaries()
    }

    pub fn list_view(&self, kind: &str, params: &BTreeMap<String, String>) -> AppResult<ViewPage> {
        let view = self.views.get(ViewKind::from_str(kind)?)?;
        let query = ViewQuery::from_params(params)?;
        view.list(&query)
    }

    pub fn view_detail(&self, kind: &str, id: &str) -> AppResult<Selection<Value>> {
        self.views.get(ViewKind::from_str(kind)?)?.detail(id)
    }

    pub fn create_record(&self, kind: &str, body: &Value) -> AppResult<Value> {
        let view = self.views.get(ViewKind::from_str(kind)?)?;
        let form = FormData::from_json(body)?;
        view.create(&form, Utc::now())
    }

    pub async fn enqueue_generation(&self, request: GenerationRequest) -> AppResult<GenerationJob> {
        self.generator.enqueue(request).await
    }

    pub async fn generation_job(&self, id: &str) -> AppResult<GenerationJob> {
        self.generator.get(id).await
    }

    pub async fn generation_jobs(&self) -> Vec<GenerationJob> {
        self.generator.list().await
    }
}

fn apply_update(policy: &mut Policy, payload: UpdatePolicyPayload, now: DateTime<Utc>) -> AppResult<()> {
    if let Some(title) = payload.title {
        policy.title = title.trim().to_string();
    }
    if let Some(category) = payload.category {
        policy.category = category.trim().to_string();
    }
    if let Some(policy_type) = payload.policy_type {
        policy.policy_type = policy_type.trim().to_string();
    }
    if let Some(status) = payload.status {
        policy.status = parse_status(status.trim())?;
    }
    if let Some(content) = payload.content {
        policy.content = content;
    }
    let version_changed = match payload.version {
        Some(version) if version.trim() != policy.version => {
            policy.version = version.trim().to_string();
            true
        }
        _ => false,
    };
    if let Some(description) = payload.description {
        policy.description = non_blank(Some(description));
    }
    if let Some(owner) = payload.owner {
        policy.owner = non_blank(Some(owner));
    }
    if let Some(effective_date) = payload.effective_date {
        policy.effective_date = non_blank(Some(effective_date));
    }
    if let Some(review_date) = payload.review_date {
        policy.review_date = non_blank(Some(review_date));
    }
    if let Some(approvers) = payload.approvers {
        policy.approvers = approvers;
    }
    if let Some(tags) = payload.tags {
        policy.tags = tags;
    }
    if let Some(related_policies) = payload.related_policies {
        policy.related_policies = related_policies;
    }
    if let Some(attachments) = payload.attachments {
        policy.attachments = attachments;
    }

    let summary = non_blank(payload.change_summary)
        .or_else(|| version_changed.then(|| format!("Version {}", policy.version)));
    if let Some(summary) = summary {
        policy.change_log.push(ChangeLogEntry {
            version: policy.version.clone(),
            summary,
            author: non_blank(payload.author),
            changed_at: now,
        });
    }
    policy.updated_at = now;
    Ok(())
}

/// Stored timestamps keep microsecond precision; trimming here keeps the
/// returned value equal to what a later read yields.
fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_status(raw: &str) -> AppResult<PolicyStatus> {
    PolicyStatus::from_str(raw).map_err(|_| {
        AppError::invalid(
            "status",
            format!("must be one of: {}", PolicyStatus::LABELS.join(", ")),
        )
    })
}

/// Policy ids are UUIDs; anything else is rejected before touching storage.
fn parse_policy_id(raw: &str) -> AppResult<String> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| AppError::invalid("id", format!("'{}' is not a valid UUID", raw)))
}

fn policy_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Policy '{}' not found", id))
}

fn validate_lists(validator: &mut Validator, lists: [(&str, Option<&Vec<String>>); 4]) {
    for (field, items) in lists {
        if let Some(items) = items {
            validator.list(field, items);
        }
    }
}

fn validate_create(payload: &CreatePolicyPayload) -> AppResult<()> {
    let mut validator = Validator::new();
    validator.require_text("title", &payload.title, MAX_LABEL_LENGTH);
    validator.require_text("category", &payload.category, MAX_LABEL_LENGTH);
    validator.require_text("type", &payload.policy_type, MAX_LABEL_LENGTH);
    validator.require_text("content", &payload.content, MAX_CONTENT_LENGTH);
    validator.optional_text("description", payload.description.as_deref(), MAX_TEXT_LENGTH);
    validator.optional_text("owner", payload.owner.as_deref(), MAX_LABEL_LENGTH);
    if let Some(version) = payload.version.as_deref().filter(|value| !value.trim().is_empty()) {
        validator.version("version", version);
    }
    validate_lists(
        &mut validator,
        [
            ("approvers", Some(&payload.approvers)),
            ("tags", Some(&payload.tags)),
            ("relatedPolicies", Some(&payload.related_policies)),
            ("attachments", Some(&payload.attachments)),
        ],
    );
    validator.rules(POLICY_RULES, |field| match field {
        "status" => payload.status.as_deref(),
        "effectiveDate" => payload.effective_date.as_deref(),
        "reviewDate" => payload.review_date.as_deref(),
        _ => None,
    });
    finish(validator)
}

fn validate_update(payload: &UpdatePolicyPayload) -> AppResult<()> {
    let mut validator = Validator::new();
    if let Some(title) = &payload.title {
        validator.require_text("title", title, MAX_LABEL_LENGTH);
    }
    if let Some(category) = &payload.category {
        validator.require_text("category", category, MAX_LABEL_LENGTH);
    }
    if let Some(policy_type) = &payload.policy_type {
        validator.require_text("type", policy_type, MAX_LABEL_LENGTH);
    }
    if let Some(content) = &payload.content {
        validator.require_text("content", content, MAX_CONTENT_LENGTH);
    }
    if let Some(version) = &payload.version {
        validator.version("version", version);
    }
    if let Some(status) = payload.status.as_deref() {
        if status.trim().is_empty() {
            validator.reject("status", "cannot be blank");
        }
    }
    validator.optional_text("description", payload.description.as_deref(), MAX_TEXT_LENGTH);
    validator.optional_text("owner", payload.owner.as_deref(), MAX_LABEL_LENGTH);
    validator.optional_text("changeSummary", payload.change_summary.as_deref(), MAX_TEXT_LENGTH);
    validate_lists(
        &mut validator,
        [
            ("approvers", payload.approvers.as_ref()),
            ("tags", payload.tags.as_ref()),
            ("relatedPolicies", payload.related_policies.as_ref()),
            ("attachments", payload.attachments.as_ref()),
        ],
    );
    validator.rules(POLICY_RULES, |field| match field {
        "status" => payload.status.as_deref(),
        "effectiveDate" => payload.effective_date.as_deref(),
        "reviewDate" => payload.review_date.as_deref(),
        _ => None,
    });
    finish(validator)
}

fn finish(validator: Validator) -> AppResult<()> {
    validator.finish().map_err(|errors| {
        tracing::warn!(errors = %errors, "policy payload rejected");
        AppError::Validation(errors)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Duration;

    fn service(seeded: bool) -> (tempfile::TempDir, PracticeService) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Arc::new(Database::new(&dir.path().join("policies.db")).expect("db"));
        let views = if seeded {
            ViewRegistry::seeded().expect("views")
        } else {
            ViewRegistry::empty()
        };
        let generator = DocumentGenerator::new(Duration::from_millis(10), 4, 16);
        (dir, PracticeService::from_parts(db, views, generator))
    }

    fn payload(title: &str) -> CreatePolicyPayload {
        CreatePolicyPayload {
            title: title.to_string(),
            category: "Privacy".to_string(),
            policy_type: "internal".to_string(),
            content: "Personal data is retained for no longer than necessary.".to_string(),
            tags: vec!["gdpr".to_string()],
            ..CreatePolicyPayload::default()
        }
    }

    #[test]
    fn create_defaults_version_and_status() {
        let (_dir, service) = service(false);
        let created = service.create_policy(payload("Data Retention")).expect("create");
        assert_eq!(created.version, DEFAULT_POLICY_VERSION);
        assert_eq!(created.status, PolicyStatus::Draft);
        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(service.get_policy(&created.id).expect("get"), created);
    }

    #[test]
    fn create_reports_every_invalid_field() {
        let (_dir, service) = service(false);
        let error = service
            .create_policy(CreatePolicyPayload {
                status: Some("published".to_string()),
                version: Some("v2".to_string()),
                effective_date: Some("01/02/2024".to_string()),
                ..CreatePolicyPayload::default()
            })
            .expect_err("invalid");
        let AppError::Validation(errors) = error else {
            panic!("expected validation error");
        };
        for field in ["title", "category", "type", "content", "status", "version", "effectiveDate"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
    }

    #[test]
    fn malformed_and_missing_ids_map_to_distinct_errors() {
        let (_dir, service) = service(false);
        assert_eq!(service.get_policy("42").expect_err("malformed").code(), "VALIDATION");
        let missing = Uuid::new_v4().to_string();
        assert_eq!(service.get_policy(&missing).expect_err("missing").code(), "NOT_FOUND");
        assert_eq!(service.delete_policy(&missing).expect_err("missing").code(), "NOT_FOUND");
    }

    #[test]
    fn update_bumps_version_and_records_change_log() {
        let (_dir, service) = service(false);
        let created = service.create_policy(payload("Data Retention")).expect("create");
        let updated = service
            .update_policy(
                &created.id,
                UpdatePolicyPayload {
                    status: Some("under_review".to_string()),
                    version: Some("1.1".to_string()),
                    author: Some("Dana Whitfield".to_string()),
                    ..UpdatePolicyPayload::default()
                },
            )
            .expect("update");
        assert_eq!(updated.status, PolicyStatus::UnderReview);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.change_log.len(), 1);
        assert_eq!(updated.change_log[0].version, "1.1");
        assert_eq!(updated.change_log[0].author.as_deref(), Some("Dana Whitfield"));

        let title_only = service
            .update_policy(
                &created.id,
                UpdatePolicyPayload {
                    title: Some("Record Retention".to_string()),
                    ..UpdatePolicyPayload::default()
                },
            )
            .expect("rename");
        assert_eq!(title_only.title, "Record Retention");
        assert_eq!(title_only.change_log.len(), 1);
    }

    #[test]
    fn concurrent_updates_append_every_change_summary() {
        let (_dir, service) = service(false);
        let service = Arc::new(service);
        let created = service.create_policy(payload("Data Retention")).expect("create");

        let workers: Vec<_> = (0..16)
            .map(|worker| {
                let service = Arc::clone(&service);
                let id = created.id.clone();
                std::thread::spawn(move || {
                    for step in 0..10 {
                        service
                            .update_policy(
                                &id,
                                UpdatePolicyPayload {
                                    change_summary: Some(format!("worker {} edit {}", worker, step)),
                                    ..UpdatePolicyPayload::default()
                                },
                            )
                            .expect("update");
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker");
        }

        let stored = service.get_policy(&created.id).expect("get");
        assert_eq!(stored.change_log.len(), 160);
    }

    #[test]
    fn delete_removes_the_policy() {
        let (_dir, service) = service(false);
        let created = service.create_policy(payload("Travel")).expect("create");
        assert!(service.delete_policy(&created.id).expect("delete").value);
        assert!(service.list_policies(ListPoliciesFilters::default()).expect("list").is_empty());
    }

    #[test]
    fn list_rejects_unknown_status_filter() {
        let (_dir, service) = service(false);
        let error = service
            .list_policies(ListPoliciesFilters {
                status: Some("live".to_string()),
                ..ListPoliciesFilters::default()
            })
            .expect_err("unknown status");
        assert_eq!(error.code(), "VALIDATION");
    }

    #[test]
    fn views_are_addressed_by_path_name() {
        let (_dir, service) = service(true);
        let params: BTreeMap<String, String> = [("q".to_string(), "Employment".to_string())].into_iter().collect();
        let page = service.list_view("contracts", &params).expect("contracts");
        assert_eq!(page.total, 3);
        assert_eq!(service.list_view("calendar", &params).expect_err("unknown").code(), "NOT_FOUND");

        let created = service
            .create_record(
                "contracts",
                &serde_json::json!({"title": "Vendor MSA", "client": "Globex", "type": "Vendor", "value": 1200}),
            )
            .expect("create");
        assert_eq!(created["status"], "draft");
        let after = service.list_view("contracts", &BTreeMap::new()).expect("contracts");
        assert_eq!(after.items[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn generation_jobs_are_reachable_through_the_service() {
        let (_dir, service) = service(false);
        let job = service
            .enqueue_generation(GenerationRequest {
                kind: crate::generation::GenerationKind::Document,
                subject: "Engagement letter".to_string(),
            })
            .await
            .expect("enqueue");
        assert_eq!(service.generation_job(&job.id).await.expect("job").id, job.id);
        assert_eq!(service.generation_jobs().await.len(), 1);
    }
}
