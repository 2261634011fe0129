//! Backend-agnostic `Database` trait: one async interface for projects,
//! proxy threads, assistant configurations and LLM call tracking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::llm::Role;
use crate::projects::{Project, ProjectId};
use crate::proxy::assistant::AssistantConfig;

/// A message stored in a proxy thread.
#[derive(Debug, Clone)]
pub struct ThreadMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One completed LLM call, for cost tracking.
#[derive(Debug, Clone)]
pub struct LlmCallRecord<'a> {
    pub thread_id: Option<&'a str>,
    pub provider: &'a str,
    pub model: &'a str,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: Decimal,
}

/// Aggregated spend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmCostSummary {
    pub total_cost: Decimal,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub call_count: u64,
}

#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Projects ────────────────────────────────────────────────────

    async fn insert_project(&self, project: &Project) -> Result<(), DatabaseError>;

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, DatabaseError>;

    /// All projects, newest first.
    async fn list_projects(&self) -> Result<Vec<Project>, DatabaseError>;

    /// Overwrite a stored project. Fails with `NotFound` if it is absent.
    async fn update_project(&self, project: &Project) -> Result<(), DatabaseError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_project(&self, id: ProjectId) -> Result<bool, DatabaseError>;

    // ── Threads ─────────────────────────────────────────────────────

    async fn create_thread(&self, id: &str) -> Result<(), DatabaseError>;

    async fn thread_exists(&self, id: &str) -> Result<bool, DatabaseError>;

    /// Append a message and touch the thread's `last_activity`.
    async fn add_thread_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<(), DatabaseError>;

    /// The most recent `limit` messages, oldest first.
    async fn list_thread_messages(
        &self,
        thread_id: &str,
        limit: usize,
    ) -> Result<Vec<ThreadMessage>, DatabaseError>;

    // ── Assistants ──────────────────────────────────────────────────

    async fn insert_assistant(&self, config: &AssistantConfig) -> Result<(), DatabaseError>;

    /// The most recently registered assistant, if any.
    async fn latest_assistant(&self) -> Result<Option<AssistantConfig>, DatabaseError>;

    // ── LLM call tracking ───────────────────────────────────────────

    async fn record_llm_call(&self, record: &LlmCallRecord<'_>) -> Result<Uuid, DatabaseError>;

    async fn get_thread_cost(&self, thread_id: &str) -> Result<LlmCostSummary, DatabaseError>;
}
