//! HTTP server: the completion-service proxy the chat assistant talks to,
//! plus the project records the onboarding flow creates.

pub mod assistant;
pub mod chat;
pub mod error;
pub mod routes;

pub use assistant::AssistantConfig;
pub use chat::{ChatLimits, ChatProxy};
pub use error::ApiError;
pub use routes::{ProxyState, app_routes};
