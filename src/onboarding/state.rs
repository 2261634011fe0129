//! Step controller: tracks which wizard step the user is on and owns the
//! form data collected so far.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::{FormData, FormField, FormPatch};
use super::steps::{STEPS, Step, StepDefinition, definition};

/// Pure, synchronous state machine over the step registry.
///
/// The index always stays within the registry. Moves that are not allowed
/// are no-ops and report `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawController")]
pub struct StepController {
    index: usize,
    form: FormData,
}

/// Unchecked wire shape; `index` is validated against the registry.
#[derive(Deserialize)]
struct RawController {
    index: usize,
    #[serde(default)]
    form: FormData,
}

impl TryFrom<RawController> for StepController {
    type Error = String;

    fn try_from(raw: RawController) -> Result<Self, Self::Error> {
        if raw.index >= STEPS.len() {
            return Err(format!(
                "step index {} out of range (0..{})",
                raw.index,
                STEPS.len()
            ));
        }
        Ok(Self {
            index: raw.index,
            form: raw.form,
        })
    }
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}

impl StepController {
    pub fn new() -> Self {
        Self {
            index: 0,
            form: FormData::default(),
        }
    }

    /// Start from previously collected data, on the welcome step.
    pub fn with_form(form: FormData) -> Self {
        Self { index: 0, form }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_step(&self) -> Step {
        self.definition().step
    }

    pub fn definition(&self) -> &'static StepDefinition {
        &STEPS[self.index]
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    /// Whether `advance()` would move forward right now.
    pub fn can_advance(&self) -> bool {
        let step = self.current_step();
        if matches!(step, Step::Summary | Step::Chat) {
            return false;
        }
        self.definition().allows_advance(&self.form)
    }

    /// Move one step forward if the current step allows it.
    ///
    /// Summary only leaves through a successful submit or `skip()`.
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        let from = self.current_step();
        self.index = (self.index + 1).min(STEPS.len() - 1);
        debug!(from = %from, to = %self.current_step(), "Step advanced");
        true
    }

    /// Move one step back, clamped at the welcome step. No-op in chat.
    pub fn retreat(&mut self) -> bool {
        if self.index == 0 || self.current_step().is_terminal() {
            return false;
        }
        let from = self.current_step();
        self.index -= 1;
        debug!(from = %from, to = %self.current_step(), "Step retreated");
        true
    }

    /// Jump straight to chat, bypassing the remaining structured steps.
    ///
    /// Allowed from any structured step after the welcome step, regardless
    /// of what has been filled in.
    pub fn skip(&mut self) -> bool {
        let step = self.current_step();
        if step == Step::Welcome || step.is_terminal() {
            return false;
        }
        self.index = Step::Chat.index();
        debug!(from = %step, "Skipped to chat");
        true
    }

    /// Move from the summary into chat after a successful submission.
    pub fn enter_chat(&mut self) -> bool {
        if self.current_step() != Step::Summary {
            return false;
        }
        self.index = Step::Chat.index();
        true
    }

    /// Back to the welcome step with an empty form.
    pub fn reset(&mut self) {
        self.index = 0;
        self.form = FormData::default();
    }

    /// Replace one field. The previous `FormData` value is discarded, not
    /// mutated.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form = self.form.with_field(field, value);
    }

    /// Apply a multi-field update committed by a step.
    pub fn merge(&mut self, patch: &FormPatch) {
        self.form = self.form.merge(patch);
    }

    /// `(completed, total)` structured steps, for progress indicators.
    pub fn progress(&self) -> (usize, usize) {
        let structured: Vec<&StepDefinition> =
            STEPS.iter().filter(|d| d.step.is_structured()).collect();
        let done = structured
            .iter()
            .filter(|d| d.step.index() < self.index)
            .count();
        (done, structured.len())
    }

    /// Whether a given step's predicate holds for the current form.
    pub fn is_step_complete(&self, step: Step) -> bool {
        (definition(step).is_complete)(&self.form)
    }
}
