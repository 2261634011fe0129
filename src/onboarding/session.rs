//! OnboardingSession: ties the step controller, the completion handler and
//! the chat session together.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::completion::CompletionHandler;
use super::model::{FormData, FormField, FormPatch};
use super::prompts::opening_message;
use super::state::StepController;
use super::steps::{Step, StepDefinition};
use super::summary::{SummaryRow, summarize};
use crate::chat::{ChatReply, ChatSession};
use crate::error::ProjectError;
use crate::projects::{ProjectApi, ProjectId};

/// Result of a successful `submit()`.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub project_id: ProjectId,
    /// The assistant's answer to the opening message.
    pub opening_reply: ChatReply,
}

/// One user's pass through the wizard. Shareable between tasks via `Arc`.
///
/// Navigation is refused while a submission is in flight.
pub struct OnboardingSession {
    controller: RwLock<StepController>,
    completion: CompletionHandler,
    chat: Arc<ChatSession>,
}

impl OnboardingSession {
    pub fn new(api: Arc<dyn ProjectApi>, chat: Arc<ChatSession>) -> Self {
        Self::with_controller(StepController::new(), api, chat)
    }

    pub fn with_controller(
        controller: StepController,
        api: Arc<dyn ProjectApi>,
        chat: Arc<ChatSession>,
    ) -> Self {
        Self {
            controller: RwLock::new(controller),
            completion: CompletionHandler::new(api),
            chat,
        }
    }

    pub fn chat(&self) -> &Arc<ChatSession> {
        &self.chat
    }

    pub async fn current_step(&self) -> Step {
        self.controller.read().await.current_step()
    }

    pub async fn definition(&self) -> &'static StepDefinition {
        self.controller.read().await.definition()
    }

    pub async fn form(&self) -> FormData {
        self.controller.read().await.form().clone()
    }

    pub async fn progress(&self) -> (usize, usize) {
        self.controller.read().await.progress()
    }

    pub async fn can_advance(&self) -> bool {
        self.controller.read().await.can_advance()
    }

    pub async fn summary(&self) -> Vec<SummaryRow> {
        summarize(self.controller.read().await.form())
    }

    pub async fn set_field(&self, field: FormField, value: impl Into<String>) {
        self.controller.write().await.set_field(field, value);
    }

    pub async fn merge(&self, patch: &FormPatch) {
        self.controller.write().await.merge(patch);
    }

    pub async fn advance(&self) -> bool {
        let mut controller = self.controller.write().await;
        !self.completion.is_submitting() && controller.advance()
    }

    pub async fn retreat(&self) -> bool {
        let mut controller = self.controller.write().await;
        !self.completion.is_submitting() && controller.retreat()
    }

    pub async fn reset(&self) -> bool {
        let mut controller = self.controller.write().await;
        if self.completion.is_submitting() {
            return false;
        }
        controller.reset();
        true
    }

    /// Jump straight to chat and open the conversation with whatever has
    /// been collected. `None` when skipping is not possible from here.
    pub async fn skip(&self) -> Option<ChatReply> {
        let form = {
            let mut controller = self.controller.write().await;
            if self.completion.is_submitting() {
                return None;
            }
            let from = controller.current_step();
            if !controller.skip() {
                return None;
            }
            info!(from = %from, "Onboarding skipped to chat");
            controller.form().clone()
        };
        Some(self.chat.send_message(&opening_message(&form)).await)
    }

    /// Create the project from the summary, then move to chat and send the
    /// opening message. On failure nothing changes and the call may be
    /// retried.
    pub async fn submit(&self) -> Result<SubmitOutcome, ProjectError> {
        // The slot is claimed under the write lock, which is where navigation
        // checks it, and held until the controller has entered chat.
        let (claim, form) = {
            let controller = self.controller.write().await;
            let step = controller.current_step();
            if step != Step::Summary {
                return Err(ProjectError::NotAtSummary {
                    step: step.to_string(),
                });
            }
            (self.completion.begin()?, controller.form().clone())
        };

        let project_id = self.completion.submit_claimed(&claim, &form).await?;

        if !self.controller.write().await.enter_chat() {
            warn!(project_id = %project_id, "Controller left the summary during submission");
        }
        drop(claim);
        info!(project_id = %project_id, "Onboarding complete, starting chat");

        let opening_reply = self.chat.send_message(&opening_message(&form)).await;
        Ok(SubmitOutcome {
            project_id,
            opening_reply,
        })
    }
}
