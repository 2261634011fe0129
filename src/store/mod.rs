//! Persistence layer: libSQL-backed storage for projects, proxy threads,
//! assistant configurations and LLM call costs.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, LlmCallRecord, LlmCostSummary, ThreadMessage};
