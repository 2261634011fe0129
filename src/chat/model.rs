//! Chat session data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a chat message as seen by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of a session's append-only message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Opaque token correlating chat turns into one remote conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadHandle(String);

impl ThreadHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThreadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of `ChatSession::send_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// The remote assistant answered. `thread` is set when the remote side
    /// issued a new or different handle.
    Ok {
        reply: String,
        thread: Option<ThreadHandle>,
    },
    /// The remote call failed; `reply` comes from the local fallback table.
    Degraded { reply: String, reason: String },
    /// Nothing was sent.
    Fatal { reason: String },
}

impl ChatReply {
    /// Text to show the user, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Ok { reply, .. } | Self::Degraded { reply, .. } => Some(reply),
            Self::Fatal { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}
