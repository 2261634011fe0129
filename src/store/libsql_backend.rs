//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::llm::Role;
use crate::onboarding::model::SocialLinks;
use crate::projects::{Project, ProjectId, ProjectStatus};
use crate::proxy::assistant::AssistantConfig;
use crate::store::migrations;
use crate::store::traits::{Database, LlmCallRecord, LlmCostSummary, ThreadMessage};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

const PROJECT_COLUMNS: &str = "id, name, website, social_links, industry, target_audience, goal, status, created_at, updated_at";

/// Map a libsql Row to a Project. Column order matches PROJECT_COLUMNS.
fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    let read = |e: libsql::Error| DatabaseError::Query(format!("read project row: {e}"));

    let id_str: String = row.get(0).map_err(read)?;
    let social_str: String = row.get::<String>(3).unwrap_or_else(|_| "{}".into());
    let status_str: String = row.get(7).map_err(read)?;
    let created_str: String = row.get(8).map_err(read)?;
    let updated_str: String = row.get(9).map_err(read)?;

    let social_links: SocialLinks = serde_json::from_str(&social_str)
        .map_err(|e| DatabaseError::Serialization(format!("social_links: {e}")))?;

    Ok(Project {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| DatabaseError::Serialization(format!("project id: {e}")))?,
        name: row.get(1).map_err(read)?,
        website: row.get(2).unwrap_or_default(),
        social_links,
        industry: row.get(4).unwrap_or_default(),
        target_audience: row.get(5).unwrap_or_default(),
        goal: row.get(6).unwrap_or_default(),
        status: ProjectStatus::from_str(&status_str).unwrap_or_default(),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

async fn parse_cost_summary_row(rows: &mut libsql::Rows) -> Result<LlmCostSummary, DatabaseError> {
    match rows.next().await {
        Ok(Some(row)) => {
            // TOTAL() always returns f64 in SQLite/libsql
            let cost_f64: f64 = row.get(0).unwrap_or(0.0);
            let total_cost = Decimal::from_str(&format!("{cost_f64:.10}"))
                .unwrap_or(Decimal::ZERO)
                .normalize();
            let input_tokens: f64 = row.get(1).unwrap_or(0.0);
            let output_tokens: f64 = row.get(2).unwrap_or(0.0);
            let call_count = row.get::<i64>(3).unwrap_or(0);

            Ok(LlmCostSummary {
                total_cost,
                total_input_tokens: input_tokens as u64,
                total_output_tokens: output_tokens as u64,
                call_count: call_count as u64,
            })
        }
        _ => Ok(LlmCostSummary::default()),
    }
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Projects ────────────────────────────────────────────────────

    async fn insert_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let social = serde_json::to_string(&project.social_links)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        self.conn()
            .execute(
                "INSERT INTO projects (id, name, website, social_links, industry, target_audience, goal, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    project.id.to_string(),
                    project.name.as_str(),
                    project.website.as_str(),
                    social,
                    project.industry.as_str(),
                    project.target_audience.as_str(),
                    project.goal.as_str(),
                    project.status.as_str(),
                    project.created_at.to_rfc3339(),
                    project.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_project: {e}")))?;

        debug!(project_id = %project.id, "Project inserted");
        Ok(())
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_project: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_project(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_project: {e}"))),
        }
    }

    async fn list_projects(&self) -> Result<Vec<Project>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, rowid DESC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_projects: {e}")))?;

        let mut projects = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            projects.push(row_to_project(&row)?);
        }
        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let social = serde_json::to_string(&project.social_links)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        let changed = self
            .conn()
            .execute(
                "UPDATE projects SET name = ?2, website = ?3, social_links = ?4, industry = ?5, target_audience = ?6, goal = ?7, status = ?8, updated_at = ?9 WHERE id = ?1",
                params![
                    project.id.to_string(),
                    project.name.as_str(),
                    project.website.as_str(),
                    social,
                    project.industry.as_str(),
                    project.target_audience.as_str(),
                    project.goal.as_str(),
                    project.status.as_str(),
                    project.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_project: {e}")))?;

        if changed == 0 {
            return Err(DatabaseError::NotFound {
                entity: "project".into(),
                id: project.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> Result<bool, DatabaseError> {
        let deleted = self
            .conn()
            .execute(
                "DELETE FROM projects WHERE id = ?1",
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_project: {e}")))?;
        Ok(deleted > 0)
    }

    // ── Threads ─────────────────────────────────────────────────────

    async fn create_thread(&self, id: &str) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO threads (id, created_at, last_activity) VALUES (?1, ?2, ?2)
                 ON CONFLICT (id) DO UPDATE SET last_activity = ?2",
                params![id, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create_thread: {e}")))?;
        Ok(())
    }

    async fn thread_exists(&self, id: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM threads WHERE id = ?1", params![id])
            .await
            .map_err(|e| DatabaseError::Query(format!("thread_exists: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0) > 0),
            Ok(None) => Ok(false),
            Err(e) => Err(DatabaseError::Query(format!("thread_exists: {e}"))),
        }
    }

    async fn add_thread_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO thread_messages (thread_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![thread_id, role.as_str(), content, now.as_str()],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("add_thread_message: {e}")))?;

        // Touch last_activity
        let _ = conn
            .execute(
                "UPDATE threads SET last_activity = ?2 WHERE id = ?1",
                params![thread_id, now],
            )
            .await;

        Ok(())
    }

    async fn list_thread_messages(
        &self,
        thread_id: &str,
        limit: usize,
    ) -> Result<Vec<ThreadMessage>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT role, content, created_at FROM (
                    SELECT seq, role, content, created_at FROM thread_messages
                    WHERE thread_id = ?1 ORDER BY seq DESC LIMIT ?2
                 ) ORDER BY seq ASC",
                params![thread_id, limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_thread_messages: {e}")))?;

        let mut messages = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let role_str: String = row.get(0).unwrap_or_default();
            let content: String = row.get(1).unwrap_or_default();
            let created_str: String = row.get(2).unwrap_or_default();
            let role = Role::from_str(&role_str).map_err(DatabaseError::Serialization)?;
            messages.push(ThreadMessage {
                role,
                content,
                created_at: parse_datetime(&created_str),
            });
        }
        Ok(messages)
    }

    // ── Assistants ──────────────────────────────────────────────────

    async fn insert_assistant(&self, config: &AssistantConfig) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO assistants (id, name, model, instructions, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    config.id.as_str(),
                    config.name.as_str(),
                    config.model.as_str(),
                    config.instructions.as_str(),
                    config.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_assistant: {e}")))?;
        Ok(())
    }

    async fn latest_assistant(&self) -> Result<Option<AssistantConfig>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, name, model, instructions, created_at FROM assistants
                 ORDER BY seq DESC LIMIT 1",
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("latest_assistant: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let created_str: String = row.get(4).unwrap_or_default();
                Ok(Some(AssistantConfig {
                    id: row.get(0).unwrap_or_default(),
                    name: row.get(1).unwrap_or_default(),
                    model: row.get(2).unwrap_or_default(),
                    instructions: row.get(3).unwrap_or_default(),
                    created_at: parse_datetime(&created_str),
                }))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("latest_assistant: {e}"))),
        }
    }

    // ── LLM Call Tracking ────────────────────────────────────────────

    async fn record_llm_call(&self, record: &LlmCallRecord<'_>) -> Result<Uuid, DatabaseError> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO llm_calls (id, thread_id, provider, model, input_tokens, output_tokens, cost, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id.to_string(),
                    opt_text(record.thread_id),
                    record.provider,
                    record.model,
                    record.input_tokens as i64,
                    record.output_tokens as i64,
                    record.cost.to_string(),
                    now,
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("record_llm_call: {e}")))?;

        Ok(id)
    }

    async fn get_thread_cost(&self, thread_id: &str) -> Result<LlmCostSummary, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT TOTAL(CAST(cost AS REAL)), TOTAL(input_tokens), TOTAL(output_tokens), COUNT(*) FROM llm_calls WHERE thread_id = ?1",
                params![thread_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_thread_cost: {e}")))?;

        parse_cost_summary_row(&mut rows).await
    }
}
