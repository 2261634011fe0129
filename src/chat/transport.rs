//! Wire format of the completion-service proxy and the client side of it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChatError;
use crate::llm::Role;

/// One message in a proxy request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyMessage {
    pub role: Role,
    pub content: String,
}

/// `POST /api/chat` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub messages: Vec<ProxyMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// `POST /api/chat` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Sends one request to the completion service.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, ChatError>;
}

/// HTTP transport posting to `{base_url}/api/chat`.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, ChatError> {
        debug!(
            endpoint = %self.endpoint,
            messages = request.messages.len(),
            has_thread = request.thread_id.is_some(),
            "Posting chat request"
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<ProxyResponse>()
            .await
            .map_err(|e| ChatError::Transport(format!("invalid response body: {e}")))
    }
}
