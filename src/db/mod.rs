use crate::errors::{AppError, AppResult};
use crate::models::{ChangeLogEntry, ListPoliciesFilters, Policy, PolicyStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("schema.sql");

const POLICY_COLUMNS: &str = "id, title, category, type, status, content, version, description, owner,
     effective_date, review_date, approvers_json, tags_json, related_policies_json, attachments_json,
     change_log_json, created_at, updated_at";

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;
        tracing::debug!(path = %path.display(), "database opened");

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    pub fn insert_policy(&self, policy: &Policy) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO policies ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                POLICY_COLUMNS
            ),
            params![
                policy.id,
                policy.title,
                policy.category,
                policy.policy_type,
                policy.status.as_str(),
                policy.content,
                policy.version,
                policy.description,
                policy.owner,
                policy.effective_date,
                policy.review_date,
                serde_json::to_string(&policy.approvers)?,
                serde_json::to_string(&policy.tags)?,
                serde_json::to_string(&policy.related_policies)?,
                serde_json::to_string(&policy.attachments)?,
                serde_json::to_string(&policy.change_log)?,
                format_time(policy.created_at),
                format_time(policy.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn list_policies(&self, filters: &ListPoliciesFilters) -> AppResult<Vec<Policy>> {
        let conn = self.lock()?;
        let mut query = format!("SELECT {} FROM policies WHERE 1 = 1", POLICY_COLUMNS);
        let mut params_vec: Vec<String> = Vec::new();

        if let Some(status) = &filters.status {
            query.push_str(" AND status = ?");
            params_vec.push(status.clone());
        }
        if let Some(category) = &filters.category {
            query.push_str(" AND category = ?");
            params_vec.push(category.clone());
        }
        if let Some(search) = &filters.search {
            query.push_str(" AND title LIKE ? ESCAPE '\\'");
            params_vec.push(format!("%{}%", escape_like(search)));
        }

        query.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?");

        // SQLite treats a negative LIMIT as unbounded.
        let limit: i64 = filters.limit.map(i64::from).unwrap_or(-1);
        let offset: i64 = filters.offset.map(i64::from).unwrap_or(0);

        let mut statement = conn.prepare(&query)?;
        let mut dyn_params: Vec<&dyn rusqlite::ToSql> = params_vec
            .iter()
            .map(|param| param as &dyn rusqlite::ToSql)
            .collect();
        dyn_params.push(&limit);
        dyn_params.push(&offset);

        let rows = statement.query_map(rusqlite::params_from_iter(dyn_params), parse_policy_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn get_policy(&self, id: &str) -> AppResult<Option<Policy>> {
        let conn = self.lock()?;
        select_policy(&conn, id)
    }

    /// Read-modify-write of one policy inside a single transaction while the
    /// connection lock is held, so concurrent updates apply one after another.
    /// `apply` failing rolls the transaction back. `None` when no row matched.
    pub fn update_policy_with<F>(&self, id: &str, apply: F) -> AppResult<Option<Policy>>
    where
        F: FnOnce(&mut Policy) -> AppResult<()>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let Some(mut policy) = select_policy(&tx, id)? else {
            return Ok(None);
        };
        apply(&mut policy)?;
        write_policy(&tx, &policy)?;
        tx.commit()?;
        Ok(Some(policy))
    }

    pub fn delete_policy(&self, id: &str) -> AppResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM policies WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    pub fn count_policies(&self) -> AppResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(1) FROM policies", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn select_policy(conn: &Connection, id: &str) -> AppResult<Option<Policy>> {
    conn.query_row(
        &format!("SELECT {} FROM policies WHERE id = ?1", POLICY_COLUMNS),
        [id],
        parse_policy_row,
    )
    .optional()
    .map_err(AppError::from)
}

/// Rewrites every mutable column; `id` and `created_at` are never touched.
fn write_policy(conn: &Connection, policy: &Policy) -> AppResult<()> {
    conn.execute(
        "UPDATE policies SET
           title = ?1, category = ?2, type = ?3, status = ?4, content = ?5, version = ?6,
           description = ?7, owner = ?8, effective_date = ?9, review_date = ?10,
           approvers_json = ?11, tags_json = ?12, related_policies_json = ?13,
           attachments_json = ?14, change_log_json = ?15, updated_at = ?16
         WHERE id = ?17",
        params![
            policy.title,
            policy.category,
            policy.policy_type,
            policy.status.as_str(),
            policy.content,
            policy.version,
            policy.description,
            policy.owner,
            policy.effective_date,
            policy.review_date,
            serde_json::to_string(&policy.approvers)?,
            serde_json::to_string(&policy.tags)?,
            serde_json::to_string(&policy.related_policies)?,
            serde_json::to_string(&policy.attachments)?,
            serde_json::to_string(&policy.change_log)?,
            format_time(policy.updated_at),
            policy.id,
        ],
    )?;
    Ok(())
}

/// `%` and `_` in user input match literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_policy_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Policy> {
    Ok(Policy {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        policy_type: row.get(3)?,
        status: parse_status(&row.get::<_, String>(4)?)?,
        content: row.get(5)?,
        version: row.get(6)?,
        description: row.get(7)?,
        owner: row.get(8)?,
        effective_date: row.get(9)?,
        review_date: row.get(10)?,
        approvers: parse_json(row, 11)?,
        tags: parse_json(row, 12)?,
        related_policies: parse_json(row, 13)?,
        attachments: parse_json(row, 14)?,
        change_log: parse_json::<Vec<ChangeLogEntry>>(row, 15)?,
        created_at: parse_time(&row.get::<_, String>(16)?)?,
        updated_at: parse_time(&row.get::<_, String>(17)?)?,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(row: &rusqlite::Row<'_>, column: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|error| conversion_error(column, error.to_string()))
}

fn parse_status(raw: &str) -> rusqlite::Result<PolicyStatus> {
    PolicyStatus::from_str(raw).map_err(|message| conversion_error(4, message))
}

fn parse_time(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| conversion_error(0, error.to_string()))
}

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically.
fn format_time(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::errors::AppError;
    use crate::models::{ChangeLogEntry, ListPoliciesFilters, Policy, PolicyStatus};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn policy(id: &str, title: &str, category: &str, minutes: i64) -> Policy {
        let created = Utc
            .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .expect("timestamp")
            + Duration::minutes(minutes);
        Policy {
            id: id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            policy_type: "internal".to_string(),
            status: PolicyStatus::Draft,
            content: "Body".to_string(),
            version: "1.0".to_string(),
            description: None,
            owner: Some("Legal Ops".to_string()),
            effective_date: None,
            review_date: Some("2025-01-01".to_string()),
            approvers: vec!["General Counsel".to_string()],
            tags: vec!["gdpr".to_string(), "privacy".to_string()],
            related_policies: Vec::new(),
            attachments: Vec::new(),
            change_log: Vec::new(),
            created_at: created,
            updated_at: created,
        }
    }

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(&dir.path().join("nested").join("policies.db")).expect("db");
        (dir, db)
    }

    #[test]
    fn database_can_insert_and_read_policy() {
        let (_dir, db) = open();
        let stored = policy("7d8b5a0e-4d1c-4a4a-9d6f-0c9b8f0d1e21", "Data Retention", "Privacy", 0);
        db.insert_policy(&stored).expect("insert");

        let loaded = db.get_policy(&stored.id).expect("get").expect("present");
        assert_eq!(loaded, stored);
        assert!(db.get_policy("missing").expect("get").is_none());
    }

    #[test]
    fn list_filters_and_orders_newest_first() {
        let (_dir, db) = open();
        db.insert_policy(&policy("a", "Data Retention", "Privacy", 0)).expect("a");
        db.insert_policy(&policy("b", "Travel Expenses", "Finance", 5)).expect("b");
        db.insert_policy(&policy("c", "Data Breach Response", "Privacy", 10)).expect("c");

        let all = db.list_policies(&ListPoliciesFilters::default()).expect("all");
        let ids: Vec<&str> = all.iter().map(|policy| policy.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        let privacy = db
            .list_policies(&ListPoliciesFilters {
                category: Some("Privacy".to_string()),
                search: Some("Breach".to_string()),
                ..ListPoliciesFilters::default()
            })
            .expect("filtered");
        assert_eq!(privacy.len(), 1);
        assert_eq!(privacy[0].id, "c");

        let paged = db
            .list_policies(&ListPoliciesFilters {
                limit: Some(1),
                offset: Some(1),
                ..ListPoliciesFilters::default()
            })
            .expect("paged");
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].id, "b");
    }

    #[test]
    fn update_and_delete_report_whether_a_row_matched() {
        let (_dir, db) = open();
        let stored = policy("a", "Data Retention", "Privacy", 0);
        db.insert_policy(&stored).expect("insert");

        let updated = db
            .update_policy_with("a", |policy| {
                policy.status = PolicyStatus::Approved;
                policy.version = "1.1".to_string();
                policy.updated_at = policy.created_at + Duration::hours(1);
                policy.change_log.push(ChangeLogEntry {
                    version: "1.1".to_string(),
                    summary: "Shortened retention window".to_string(),
                    author: None,
                    changed_at: policy.updated_at,
                });
                Ok(())
            })
            .expect("update")
            .expect("row matched");
        assert_eq!(db.get_policy("a").expect("get"), Some(updated.clone()));
        assert_eq!(updated.created_at, stored.created_at);

        assert!(db.update_policy_with("ghost", |_| Ok(())).expect("update ghost").is_none());

        assert!(db.delete_policy("a").expect("delete"));
        assert!(!db.delete_policy("a").expect("delete again"));
        assert_eq!(db.count_policies().expect("count"), 0);
    }

    #[test]
    fn failed_update_leaves_the_row_untouched() {
        let (_dir, db) = open();
        let stored = policy("a", "Data Retention", "Privacy", 0);
        db.insert_policy(&stored).expect("insert");

        let error = db
            .update_policy_with("a", |policy| {
                policy.title = "Half applied".to_string();
                Err(AppError::invalid("status", "rejected"))
            })
            .expect_err("rejected");
        assert_eq!(error.code(), "VALIDATION");
        assert_eq!(db.get_policy("a").expect("get"), Some(stored));
    }

    #[test]
    fn concurrent_updates_keep_every_change_log_entry() {
        let (_dir, db) = open();
        db.insert_policy(&policy("a", "Data Retention", "Privacy", 0)).expect("insert");
        let db = Arc::new(db);

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || {
                    for step in 0..10 {
                        db.update_policy_with("a", |policy| {
                            policy.change_log.push(ChangeLogEntry {
                                version: policy.version.clone(),
                                summary: format!("worker {} step {}", worker, step),
                                author: None,
                                changed_at: policy.updated_at,
                            });
                            Ok(())
                        })
                        .expect("update")
                        .expect("row matched");
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker");
        }

        let stored = db.get_policy("a").expect("get").expect("present");
        assert_eq!(stored.change_log.len(), 80);
    }

    #[test]
    fn search_treats_like_wildcards_literally() {
        let (_dir, db) = open();
        db.insert_policy(&policy("a", "100% Remote Work", "HR", 0)).expect("a");
        db.insert_policy(&policy("b", "1000 Hour Rule", "HR", 5)).expect("b");
        db.insert_policy(&policy("c", "Snake_case Naming", "Engineering", 10)).expect("c");
        db.insert_policy(&policy("d", "Snakes Policy", "Engineering", 15)).expect("d");

        let search = |needle: &str| -> Vec<String> {
            db.list_policies(&ListPoliciesFilters {
                search: Some(needle.to_string()),
                ..ListPoliciesFilters::default()
            })
            .expect("search")
            .into_iter()
            .map(|policy| policy.id)
            .collect()
        };
        assert_eq!(search("100%"), vec!["a"]);
        assert_eq!(search("Snake_"), vec!["c"]);
        assert_eq!(search("%"), vec!["a"]);
    }

    #[test]
    fn corrupt_list_columns_fail_the_read() {
        let (_dir, db) = open();
        db.insert_policy(&policy("a", "Data Retention", "Privacy", 0)).expect("insert");
        db.lock()
            .expect("lock")
            .execute("UPDATE policies SET change_log_json = 'not json' WHERE id = 'a'", [])
            .expect("corrupt");

        assert_eq!(db.get_policy("a").expect_err("corrupt").code(), "INTERNAL");
        assert!(db.update_policy_with("a", |_| Ok(())).is_err());
    }
}
