use crate::errors::{AppError, AppResult};
use crate::validation::{Validator, MAX_LABEL_LENGTH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Document,
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Ready,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub kind: GenerationKind,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub id: String,
    pub kind: GenerationKind,
    pub subject: String,
    pub status: JobStatus,
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

fn canned_result(kind: GenerationKind, subject: &str) -> String {
    match kind {
        GenerationKind::Document => {
            format!("Draft '{}' assembled from the firm template library.", subject)
        }
        GenerationKind::Analysis => format!(
            "Review of '{}' complete: 3 clauses flagged for attorney review, overall risk moderate.",
            subject
        ),
    }
}

/// Drops the oldest completed jobs beyond `retain`.
fn evict_ready(jobs: &mut HashMap<String, GenerationJob>, retain: usize) {
    let mut ready: Vec<(DateTime<Utc>, String)> = jobs
        .values()
        .filter(|job| job.status == JobStatus::Ready)
        .map(|job| (job.completed_at.unwrap_or(job.created_at), job.id.clone()))
        .collect();
    if ready.len() <= retain {
        return;
    }
    ready.sort();
    let excess = ready.len() - retain;
    for (_, id) in ready.into_iter().take(excess) {
        jobs.remove(&id);
    }
    tracing::debug!(evicted = excess, retained = retain, "evicted completed generation jobs");
}

/// Simulated document drafting and AI analysis. Each job resolves to a
/// canned result once the configured delay elapses.
#[derive(Clone)]
pub struct DocumentGenerator {
    jobs: Arc<Mutex<HashMap<String, GenerationJob>>>,
    delay: Duration,
    max_pending: usize,
    retain_ready: usize,
}

impl DocumentGenerator {
    /// The table never holds more than `max_pending + retain_ready` jobs.
    pub fn new(delay: Duration, max_pending: usize, retain_ready: usize) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            delay,
            max_pending,
            retain_ready,
        }
    }

    pub async fn enqueue(&self, request: GenerationRequest) -> AppResult<GenerationJob> {
        let mut validator = Validator::new();
        validator.require_text("subject", &request.subject, MAX_LABEL_LENGTH);
        validator.finish()?;

        let job = GenerationJob {
            id: uuid::Uuid::new_v4().to_string(),
            kind: request.kind,
            subject: request.subject.trim().to_string(),
            status: JobStatus::Pending,
            result: None,
            created_at: Utc::now(),
            completed_at: None,
        };

        {
            let mut jobs = self.jobs.lock().await;
            let pending = jobs.values().filter(|job| job.status == JobStatus::Pending).count();
            if pending >= self.max_pending {
                tracing::warn!(pending, max_pending = self.max_pending, "generation queue full");
                return Err(AppError::Capacity(format!(
                    "Generation queue is full (max {} pending jobs).",
                    self.max_pending
                )));
            }
            jobs.insert(job.id.clone(), job.clone());
        }

        let jobs = self.jobs.clone();
        let delay = self.delay;
        let retain_ready = self.retain_ready;
        let job_id = job.id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut jobs = jobs.lock().await;
            if let Some(job) = jobs.get_mut(&job_id) {
                job.result = Some(canned_result(job.kind, &job.subject));
                job.status = JobStatus::Ready;
                job.completed_at = Some(Utc::now());
                tracing::info!(job_id = %job_id, kind = ?job.kind, "generation job ready");
            }
            evict_ready(&mut jobs, retain_ready);
        });

        tracing::info!(job_id = %job.id, kind = ?job.kind, delay_ms = self.delay.as_millis() as u64, "generation job queued");
        Ok(job)
    }

    pub async fn get(&self, id: &str) -> AppResult<GenerationJob> {
        self.jobs
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Generation job '{}' not found", id)))
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<GenerationJob> {
        let jobs = self.jobs.lock().await;
        let mut listed: Vec<GenerationJob> = jobs.values().cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        listed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(subject: &str) -> GenerationRequest {
        GenerationRequest {
            kind: GenerationKind::Analysis,
            subject: subject.to_string(),
        }
    }

    #[tokio::test]
    async fn job_flips_to_ready_after_the_delay() {
        let generator = DocumentGenerator::new(Duration::from_millis(20), 4, 8);
        let job = generator.enqueue(request("Vendor MSA")).await.expect("enqueue");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.result.is_none());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let ready = generator.get(&job.id).await.expect("job");
        assert_eq!(ready.status, JobStatus::Ready);
        assert!(ready.result.as_deref().unwrap_or_default().contains("Vendor MSA"));
        assert!(ready.completed_at.is_some());
    }

    #[tokio::test]
    async fn pending_jobs_are_bounded() {
        let generator = DocumentGenerator::new(Duration::from_secs(60), 2, 8);
        generator.enqueue(request("first")).await.expect("first");
        generator.enqueue(request("second")).await.expect("second");
        let error = generator.enqueue(request("third")).await.expect_err("capacity");
        assert_eq!(error.code(), "CAPACITY");
        assert_eq!(generator.list().await.len(), 2);
    }

    #[tokio::test]
    async fn blank_subjects_are_rejected() {
        let generator = DocumentGenerator::new(Duration::from_millis(1), 1, 8);
        let error = generator.enqueue(request("   ")).await.expect_err("blank");
        assert_eq!(error.code(), "VALIDATION");
        assert!(generator.get("missing").await.is_err());
    }

    #[tokio::test]
    async fn completed_jobs_are_evicted_oldest_first() {
        let generator = DocumentGenerator::new(Duration::from_millis(1), 2, 3);
        let mut ids = Vec::new();
        for index in 0..20 {
            let job = generator.enqueue(request(&format!("matter {}", index))).await.expect("enqueue");
            ids.push(job.id);
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(generator.list().await.len() <= 5);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        let retained = generator.list().await;
        assert_eq!(retained.len(), 3);
        assert!(retained.iter().all(|job| job.status == JobStatus::Ready));
        assert_eq!(generator.get(&ids[19]).await.expect("newest").id, ids[19]);
        assert_eq!(generator.get(&ids[0]).await.expect_err("evicted").code(), "NOT_FOUND");
    }
}
