//! Chat session adapter: one conversation with the plan assistant.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::fallback::FallbackTable;
use super::model::{ChatMessage, ChatReply, ThreadHandle};
use super::thread_store::ThreadStore;
use super::transport::{CompletionTransport, ProxyMessage, ProxyRequest};
use crate::error::ChatError;
use crate::inflight::InFlight;
use crate::llm::Role;

/// Sends messages through a `CompletionTransport`, keeps the message log,
/// and persists the remote thread handle.
///
/// Remote failures never surface as errors: the user gets a canned reply
/// from the fallback table and the conversation carries on. One message
/// may be outstanding at a time.
pub struct ChatSession {
    transport: Arc<dyn CompletionTransport>,
    store: Arc<dyn ThreadStore>,
    namespace: String,
    fallback: FallbackTable,
    thread: RwLock<Option<ThreadHandle>>,
    history: RwLock<Vec<ChatMessage>>,
    in_flight: InFlight,
}

impl ChatSession {
    /// Create a session, resuming the thread saved under `namespace` if any.
    pub async fn open(
        transport: Arc<dyn CompletionTransport>,
        store: Arc<dyn ThreadStore>,
        namespace: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        let thread = match store.get(&namespace).await {
            Ok(thread) => thread,
            Err(e) => {
                warn!(namespace = %namespace, "Failed to load thread handle: {}", e);
                None
            }
        };
        if let Some(ref handle) = thread {
            info!(namespace = %namespace, thread = %handle, "Resuming chat thread");
        }

        Self {
            transport,
            store,
            namespace,
            fallback: FallbackTable::default_rules(),
            thread: RwLock::new(thread),
            history: RwLock::new(Vec::new()),
            in_flight: InFlight::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackTable) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The handle of the remote conversation, if one has been issued.
    pub async fn thread(&self) -> Option<ThreadHandle> {
        self.thread.read().await.clone()
    }

    /// Snapshot of the message log, oldest first.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.read().await.clone()
    }

    /// Whether a message is outstanding. Front ends disable input while true.
    pub fn is_sending(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Send one user message and wait for the reply.
    pub async fn send_message(&self, text: &str) -> ChatReply {
        let text = text.trim();
        if text.is_empty() {
            return ChatReply::Fatal {
                reason: "message is empty".to_string(),
            };
        }

        let Some(_guard) = self.in_flight.try_begin() else {
            return ChatReply::Fatal {
                reason: "a message is already being sent".to_string(),
            };
        };

        self.history.write().await.push(ChatMessage::user(text));

        let current = self.thread.read().await.clone();
        let request = ProxyRequest {
            messages: vec![ProxyMessage {
                role: Role::User,
                content: text.to_string(),
            }],
            thread_id: current.as_ref().map(|t| t.as_str().to_string()),
        };

        let result = self.transport.send(request).await.and_then(|resp| {
            if resp.response.trim().is_empty() {
                Err(ChatError::EmptyReply)
            } else {
                Ok(resp)
            }
        });

        match result {
            Ok(resp) => {
                let issued = resp
                    .thread_id
                    .filter(|id| !id.trim().is_empty())
                    .map(ThreadHandle::new);
                let thread = match issued {
                    Some(handle) if current.as_ref() != Some(&handle) => {
                        self.adopt_thread(&handle).await;
                        Some(handle)
                    }
                    _ => None,
                };

                self.history
                    .write()
                    .await
                    .push(ChatMessage::assistant(resp.response.clone()));

                ChatReply::Ok {
                    reply: resp.response,
                    thread,
                }
            }
            Err(e) => {
                warn!(namespace = %self.namespace, "Chat request failed, using fallback reply: {}", e);
                let reply = self.fallback.reply_for(text).to_string();
                self.history
                    .write()
                    .await
                    .push(ChatMessage::assistant(reply.clone()));
                ChatReply::Degraded {
                    reply,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Forget the remote thread, in memory and in the store.
    pub async fn clear_thread(&self) -> Result<(), ChatError> {
        *self.thread.write().await = None;
        self.store.clear(&self.namespace).await?;
        info!(namespace = %self.namespace, "Chat thread cleared");
        Ok(())
    }

    async fn adopt_thread(&self, handle: &ThreadHandle) {
        *self.thread.write().await = Some(handle.clone());
        match self.store.set(&self.namespace, handle).await {
            Ok(()) => info!(namespace = %self.namespace, thread = %handle, "Chat thread saved"),
            Err(e) => warn!(
                namespace = %self.namespace,
                thread = %handle,
                "Failed to persist thread handle: {}",
                e
            ),
        }
    }
}
