//! Error types for the plan builder.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited")]
    RateLimited { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Errors raised while talking to the completion-service proxy.
///
/// These never reach callers of `ChatSession::send_message`; the session
/// turns them into a degraded reply.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Completion service returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Completion service returned an empty reply")]
    EmptyReply,

    #[error("Session store error: {0}")]
    Store(String),
}

/// Project submission and lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("A project submission is already in flight")]
    SubmissionInFlight,

    #[error("Onboarding is at step {step}, submission is only possible from the summary")]
    NotAtSummary { step: String },

    #[error("Invalid project: {0}")]
    Invalid(String),

    #[error("Project endpoint returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
