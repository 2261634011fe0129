//! Onboarding wizard: a fixed sequence of steps collecting the details a
//! plan is built from.
//!
//! The controller walks the step registry and owns the form data. At the
//! summary the completion handler turns the form into a project; on
//! success (or when the user skips ahead) the session hands off to chat
//! with an opening message built from the answers.

pub mod completion;
pub mod model;
pub mod prompts;
pub mod session;
pub mod state;
pub mod steps;
pub mod summary;

pub use completion::CompletionHandler;
pub use model::{FormData, FormField, FormPatch, SocialLinks, SocialLinksPatch};
pub use session::{OnboardingSession, SubmitOutcome};
pub use state::StepController;
pub use steps::{STEPS, Step, StepDefinition};
pub use summary::{SummaryRow, render_text, summarize};
