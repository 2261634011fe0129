//! Registered assistant configurations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::onboarding::prompts::DEFAULT_ASSISTANT_INSTRUCTIONS;

pub const DEFAULT_ASSISTANT_NAME: &str = "Plan Builder Assistant";

/// An assistant the proxy can answer as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    pub id: String,
    pub name: String,
    pub model: String,
    pub instructions: String,
    pub created_at: DateTime<Utc>,
}

impl AssistantConfig {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("asst_{}", Uuid::new_v4().simple()),
            name: name.into(),
            model: model.into(),
            instructions: instructions.into(),
            created_at: Utc::now(),
        }
    }
}

/// `POST /api/assistants` body. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterAssistant {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl RegisterAssistant {
    /// Fill blanks with the defaults. `default_model` is the server's model.
    pub fn into_config(self, default_model: &str) -> AssistantConfig {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        AssistantConfig::new(
            or_default(self.name, DEFAULT_ASSISTANT_NAME),
            or_default(self.model, default_model),
            or_default(self.instructions, DEFAULT_ASSISTANT_INSTRUCTIONS),
        )
    }
}

/// `POST /api/assistants` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantCreated {
    pub assistant_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = AssistantConfig::new("a", "m", "i");
        let b = AssistantConfig::new("a", "m", "i");
        assert!(a.id.starts_with("asst_"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn empty_request_gets_defaults() {
        let config = RegisterAssistant::default().into_config("gpt-4o-mini");
        assert_eq!(config.name, DEFAULT_ASSISTANT_NAME);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.instructions, DEFAULT_ASSISTANT_INSTRUCTIONS);
    }

    #[test]
    fn blank_fields_fall_back_to_defaults() {
        let req: RegisterAssistant =
            serde_json::from_str(r#"{"name":"  ","instructions":"Be terse."}"#).unwrap();
        let config = req.into_config("gpt-4o");
        assert_eq!(config.name, DEFAULT_ASSISTANT_NAME);
        assert_eq!(config.instructions, "Be terse.");
    }

    #[test]
    fn created_response_is_camel_case() {
        let json = serde_json::to_value(AssistantCreated {
            assistant_id: "asst_1".into(),
        })
        .unwrap();
        assert_eq!(json["assistantId"], "asst_1");
    }
}
