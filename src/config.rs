//! Configuration types, read from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::proxy::ChatLimits;

/// Settings for `plan-builder serve`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub limits: ChatLimits,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".into()))?;

        Ok(Self {
            port: parse_or(&lookup, "PLAN_BUILDER_PORT", 8080)?,
            db_path: lookup("PLAN_BUILDER_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/plan-builder.db")),
            api_key: SecretString::from(api_key),
            model: lookup("PLAN_BUILDER_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            limits: ChatLimits {
                max_message_chars: parse_or(&lookup, "PLAN_BUILDER_MAX_MESSAGE_CHARS", 8000)?,
                max_history_messages: parse_or(&lookup, "PLAN_BUILDER_MAX_HISTORY", 40)?,
                max_reply_tokens: parse_or(&lookup, "PLAN_BUILDER_MAX_REPLY_TOKENS", 1024)?,
            },
        })
    }
}

/// Settings for `plan-builder wizard`.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Base URL of a running `plan-builder serve`.
    pub api_url: String,
    /// Holds the saved thread handle and the wizard log.
    pub state_dir: PathBuf,
}

impl WizardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let state_dir = lookup("PLAN_BUILDER_STATE_DIR")
            .map(PathBuf::from)
            .or_else(|| lookup("HOME").map(|home| PathBuf::from(home).join(".plan-builder")))
            .unwrap_or_else(|| PathBuf::from(".plan-builder"));

        Self {
            api_url: lookup("PLAN_BUILDER_API_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8080".to_string()),
            state_dir,
        }
    }

    pub fn thread_store_path(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
    }
}
