//! Server side of `POST /api/chat`: thread bookkeeping around one LLM call.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::ApiError;
use crate::chat::transport::{ProxyMessage, ProxyRequest, ProxyResponse};
use crate::llm::{ChatMessage, CompletionRequest, FinishReason, LlmProvider, Role};
use crate::onboarding::prompts::DEFAULT_ASSISTANT_INSTRUCTIONS;
use crate::store::{Database, LlmCallRecord};

/// Request limits enforced before anything is stored, plus the reply cap
/// passed to the provider.
#[derive(Debug, Clone, Copy)]
pub struct ChatLimits {
    pub max_message_chars: usize,
    pub max_history_messages: usize,
    pub max_reply_tokens: u32,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            max_message_chars: 8000,
            max_history_messages: 40,
            max_reply_tokens: 1024,
        }
    }
}

pub struct ChatProxy {
    db: Arc<dyn Database>,
    llm: Arc<dyn LlmProvider>,
    limits: ChatLimits,
}

impl ChatProxy {
    pub fn new(db: Arc<dyn Database>, llm: Arc<dyn LlmProvider>, limits: ChatLimits) -> Self {
        Self { db, llm, limits }
    }

    fn validate(&self, messages: &[ProxyMessage]) -> Result<(), ApiError> {
        if messages.is_empty() {
            return Err(ApiError::BadRequest("messages must not be empty".into()));
        }
        for message in messages {
            if message.role == Role::System {
                return Err(ApiError::BadRequest(
                    "system messages are not accepted".into(),
                ));
            }
            if message.content.trim().is_empty() {
                return Err(ApiError::BadRequest("message content must not be blank".into()));
            }
            if message.content.chars().count() > self.limits.max_message_chars {
                return Err(ApiError::BadRequest(format!(
                    "message content exceeds {} characters",
                    self.limits.max_message_chars
                )));
            }
        }
        Ok(())
    }

    /// The caller's thread if it exists. `None` means a new thread is opened
    /// once the reply is in.
    async fn existing_thread(&self, requested: Option<&str>) -> Result<Option<String>, ApiError> {
        let Some(id) = requested.map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        if self.db.thread_exists(id).await? {
            return Ok(Some(id.to_string()));
        }
        debug!(thread_id = %id, "Unknown thread id, opening a new thread");
        Ok(None)
    }

    async fn open_thread(&self) -> Result<String, ApiError> {
        let id = format!("thread_{}", Uuid::new_v4().simple());
        self.db.create_thread(&id).await?;
        info!(thread_id = %id, "Opened chat thread");
        Ok(id)
    }

    async fn instructions(&self) -> Result<String, ApiError> {
        Ok(self
            .db
            .latest_assistant()
            .await?
            .map(|a| a.instructions)
            .unwrap_or_else(|| DEFAULT_ASSISTANT_INSTRUCTIONS.to_string()))
    }

    /// Nothing is written to the thread unless the provider answers.
    pub async fn handle(&self, request: ProxyRequest) -> Result<ProxyResponse, ApiError> {
        self.validate(&request.messages)?;
        let existing = self.existing_thread(request.thread_id.as_deref()).await?;

        let mut history: Vec<ChatMessage> = match &existing {
            Some(id) => self
                .db
                .list_thread_messages(id, self.limits.max_history_messages)
                .await?
                .into_iter()
                .map(|m| ChatMessage {
                    role: m.role,
                    content: m.content,
                })
                .collect(),
            None => Vec::new(),
        };
        let incoming: Vec<ChatMessage> = request
            .messages
            .iter()
            .map(|m| ChatMessage {
                role: m.role,
                content: m.content.trim().to_string(),
            })
            .collect();
        history.extend(incoming.iter().cloned());
        let overflow = history.len().saturating_sub(self.limits.max_history_messages);

        let mut messages = Vec::with_capacity(history.len() - overflow + 1);
        messages.push(ChatMessage::system(self.instructions().await?));
        messages.extend(history.into_iter().skip(overflow));

        debug!(
            thread_id = existing.as_deref().unwrap_or("(new)"),
            messages = messages.len(),
            model = self.llm.model_name(),
            "Calling LLM"
        );

        let completion =
            CompletionRequest::new(messages).with_max_tokens(self.limits.max_reply_tokens);
        let response = match self.llm.complete(completion).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    thread_id = existing.as_deref().unwrap_or("(new)"),
                    error = %e,
                    "LLM call failed"
                );
                return Err(e.into());
            }
        };
        if response.finish_reason == FinishReason::Length {
            warn!(
                max_tokens = self.limits.max_reply_tokens,
                "LLM reply truncated at the token limit"
            );
        }

        let thread_id = match existing {
            Some(id) => id,
            None => self.open_thread().await?,
        };

        let cost = self.llm.cost_of(&response);
        if let Err(e) = self
            .db
            .record_llm_call(&LlmCallRecord {
                thread_id: Some(&thread_id),
                provider: self.llm.provider_name(),
                model: self.llm.model_name(),
                input_tokens: response.input_tokens,
                output_tokens: response.output_tokens,
                cost,
            })
            .await
        {
            warn!(thread_id = %thread_id, error = %e, "Failed to record LLM call");
        }

        for message in &incoming {
            self.db
                .add_thread_message(&thread_id, message.role, &message.content)
                .await?;
        }
        self.db
            .add_thread_message(&thread_id, Role::Assistant, &response.content)
            .await?;

        info!(
            thread_id = %thread_id,
            response_id = response.response_id.as_deref().unwrap_or("-"),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            cost = %cost,
            "Chat reply generated"
        );

        Ok(ProxyResponse {
            response: response.content,
            thread_id: Some(thread_id),
        })
    }
}
