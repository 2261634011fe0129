//! Step registry: the ordered list of wizard steps and their completion
//! predicates.

use serde::{Deserialize, Serialize};

use super::model::{FormData, is_filled};

/// The steps of the onboarding wizard.
///
/// Progresses linearly: Welcome → CompanyIdentity → Website → SocialMedia →
/// IndustryAudience → Goal → Summary → Chat. `Chat` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Welcome,
    CompanyIdentity,
    Website,
    SocialMedia,
    IndustryAudience,
    Goal,
    Summary,
    Chat,
}

impl Step {
    /// Whether this step is terminal (free-form chat).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Chat)
    }

    /// Structured steps are every step before free-form chat.
    pub fn is_structured(&self) -> bool {
        !self.is_terminal()
    }

    /// Position in the registry.
    pub fn index(&self) -> usize {
        STEPS
            .iter()
            .position(|def| def.step == *self)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::CompanyIdentity => "company_identity",
            Self::Website => "website",
            Self::SocialMedia => "social_media",
            Self::IndustryAudience => "industry_audience",
            Self::Goal => "goal",
            Self::Summary => "summary",
            Self::Chat => "chat",
        };
        write!(f, "{s}")
    }
}

/// Static description of one wizard step.
#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub step: Step,
    pub id: &'static str,
    pub title: &'static str,
    /// Whether the form holds what this step asks for.
    pub is_complete: fn(&FormData) -> bool,
    /// Skippable steps may be advanced past even when incomplete.
    pub skippable: bool,
}

impl StepDefinition {
    /// Whether `advance()` may leave this step with the given form.
    pub fn allows_advance(&self, form: &FormData) -> bool {
        self.skippable || (self.is_complete)(form)
    }
}

fn always(_: &FormData) -> bool {
    true
}

fn has_company(form: &FormData) -> bool {
    is_filled(&form.company_name)
}

fn has_website(form: &FormData) -> bool {
    is_filled(&form.website)
}

fn has_social(form: &FormData) -> bool {
    !form.social_links.is_empty()
}

fn has_industry_and_audience(form: &FormData) -> bool {
    is_filled(&form.industry) && is_filled(&form.target_audience)
}

fn has_goal(form: &FormData) -> bool {
    is_filled(&form.goal)
}

/// The wizard's steps in order.
pub static STEPS: &[StepDefinition] = &[
    StepDefinition {
        step: Step::Welcome,
        id: "welcome",
        title: "Welcome",
        is_complete: always,
        skippable: false,
    },
    StepDefinition {
        step: Step::CompanyIdentity,
        id: "company_identity",
        title: "What's your company called?",
        is_complete: has_company,
        skippable: false,
    },
    StepDefinition {
        step: Step::Website,
        id: "website",
        title: "Do you have a website?",
        is_complete: has_website,
        skippable: true,
    },
    StepDefinition {
        step: Step::SocialMedia,
        id: "social_media",
        title: "Where can people find you on social media?",
        is_complete: has_social,
        skippable: true,
    },
    StepDefinition {
        step: Step::IndustryAudience,
        id: "industry_audience",
        title: "Which industry are you in, and who are your customers?",
        is_complete: has_industry_and_audience,
        skippable: true,
    },
    StepDefinition {
        step: Step::Goal,
        id: "goal",
        title: "What's the main goal for this project?",
        is_complete: has_goal,
        skippable: false,
    },
    StepDefinition {
        step: Step::Summary,
        id: "summary",
        title: "Review your plan",
        is_complete: always,
        skippable: false,
    },
    StepDefinition {
        step: Step::Chat,
        id: "chat",
        title: "Chat with your plan assistant",
        is_complete: always,
        skippable: false,
    },
];

/// Look up a step definition.
pub fn definition(step: Step) -> &'static StepDefinition {
    &STEPS[step.index()]
}
