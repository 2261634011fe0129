//! Form data collected by the onboarding wizard.
//!
//! `FormData` is a value type: every edit produces a new value and leaves
//! the previous one untouched, so front ends can compare snapshots and keep
//! undo history without extra bookkeeping.

use serde::{Deserialize, Serialize};

/// Social profile links collected on the social media step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub instagram: String,
}

impl SocialLinks {
    /// `(network, url)` pairs in display order, blanks skipped.
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        [
            ("LinkedIn", self.linkedin.as_str()),
            ("Twitter", self.twitter.as_str()),
            ("Facebook", self.facebook.as_str()),
            ("Instagram", self.instagram.as_str()),
        ]
        .into_iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }
}

/// Everything the wizard accumulates before a project is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub goal: String,
}

/// Scalar field keys accepted by `FormData::with_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    CompanyName,
    Website,
    Linkedin,
    Twitter,
    Facebook,
    Instagram,
    Industry,
    TargetAudience,
    Goal,
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CompanyName => "company_name",
            Self::Website => "website",
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Industry => "industry",
            Self::TargetAudience => "target_audience",
            Self::Goal => "goal",
        };
        write!(f, "{s}")
    }
}

/// Partial update of the social links; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinksPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// Partial update committed by a step that edits several fields at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinksPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

fn pick(current: &str, update: &Option<String>) -> String {
    update.clone().unwrap_or_else(|| current.to_string())
}

impl FormData {
    /// Return a copy with one field replaced.
    pub fn with_field(&self, field: FormField, value: impl Into<String>) -> FormData {
        let value = value.into();
        let mut next = self.clone();
        match field {
            FormField::CompanyName => next.company_name = value,
            FormField::Website => next.website = value,
            FormField::Linkedin => next.social_links.linkedin = value,
            FormField::Twitter => next.social_links.twitter = value,
            FormField::Facebook => next.social_links.facebook = value,
            FormField::Instagram => next.social_links.instagram = value,
            FormField::Industry => next.industry = value,
            FormField::TargetAudience => next.target_audience = value,
            FormField::Goal => next.goal = value,
        }
        next
    }

    /// Return a copy with every `Some` field of `patch` applied.
    pub fn merge(&self, patch: &FormPatch) -> FormData {
        let social_links = match &patch.social_links {
            Some(links) => SocialLinks {
                linkedin: pick(&self.social_links.linkedin, &links.linkedin),
                twitter: pick(&self.social_links.twitter, &links.twitter),
                facebook: pick(&self.social_links.facebook, &links.facebook),
                instagram: pick(&self.social_links.instagram, &links.instagram),
            },
            None => self.social_links.clone(),
        };

        FormData {
            company_name: pick(&self.company_name, &patch.company_name),
            website: pick(&self.website, &patch.website),
            social_links,
            industry: pick(&self.industry, &patch.industry),
            target_audience: pick(&self.target_audience, &patch.target_audience),
            goal: pick(&self.goal, &patch.goal),
        }
    }

    /// Read a scalar field.
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::CompanyName => &self.company_name,
            FormField::Website => &self.website,
            FormField::Linkedin => &self.social_links.linkedin,
            FormField::Twitter => &self.social_links.twitter,
            FormField::Facebook => &self.social_links.facebook,
            FormField::Instagram => &self.social_links.instagram,
            FormField::Industry => &self.industry,
            FormField::TargetAudience => &self.target_audience,
            FormField::Goal => &self.goal,
        }
    }

    /// True when nothing has been entered yet.
    pub fn is_blank(&self) -> bool {
        *self == FormData::default()
    }
}

/// Whitespace-only counts as empty everywhere in the wizard.
pub fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}
