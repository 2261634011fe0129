//! Project records created from a finished onboarding flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProjectError;
use crate::onboarding::model::{FormData, SocialLinks, is_filled};

/// Identifier of a stored project.
pub type ProjectId = Uuid;

/// Lifecycle of a project record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(format!("Unknown project status: {other}")),
        }
    }
}

/// A stored project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
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
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation request for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
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

impl NewProject {
    /// Package the wizard's answers. Values are trimmed.
    pub fn from_form(form: &FormData) -> Self {
        let links = &form.social_links;
        Self {
            name: form.company_name.trim().to_string(),
            website: form.website.trim().to_string(),
            social_links: SocialLinks {
                linkedin: links.linkedin.trim().to_string(),
                twitter: links.twitter.trim().to_string(),
                facebook: links.facebook.trim().to_string(),
                instagram: links.instagram.trim().to_string(),
            },
            industry: form.industry.trim().to_string(),
            target_audience: form.target_audience.trim().to_string(),
            goal: form.goal.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        if !is_filled(&self.name) {
            return Err(ProjectError::Invalid("project name is required".to_string()));
        }
        Ok(())
    }

    /// Materialize a record with a fresh id.
    pub fn into_project(self) -> Project {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            name: self.name,
            website: self.website,
            social_links: self.social_links,
            industry: self.industry,
            target_audience: self.target_audience,
            goal: self.goal,
            status: ProjectStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

impl Project {
    /// Apply an update in place and bump `updated_at`.
    pub fn apply(&mut self, update: ProjectUpdate) -> Result<(), ProjectError> {
        if let Some(ref name) = update.name {
            if !is_filled(name) {
                return Err(ProjectError::Invalid("project name cannot be blank".to_string()));
            }
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(website) = update.website {
            self.website = website;
        }
        if let Some(links) = update.social_links {
            self.social_links = links;
        }
        if let Some(industry) = update.industry {
            self.industry = industry;
        }
        if let Some(audience) = update.target_audience {
            self.target_audience = audience;
        }
        if let Some(goal) = update.goal {
            self.goal = goal;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::FormField;

    #[test]
    fn from_form_trims_values() {
        let form = FormData::default()
            .with_field(FormField::CompanyName, "  Acme Co ")
            .with_field(FormField::Goal, "Increase Sales\n")
            .with_field(FormField::Twitter, " https://x.com/acme ");
        let new = NewProject::from_form(&form);
        assert_eq!(new.name, "Acme Co");
        assert_eq!(new.goal, "Increase Sales");
        assert_eq!(new.social_links.twitter, "https://x.com/acme");
        assert!(new.validate().is_ok());
    }

    #[test]
    fn blank_name_is_invalid() {
        let new = NewProject::from_form(&FormData::default());
        assert!(matches!(new.validate(), Err(ProjectError::Invalid(_))));
    }

    #[test]
    fn into_project_starts_as_draft() {
        let project = NewProject::from_form(
            &FormData::default().with_field(FormField::CompanyName, "Acme Co"),
        )
        .into_project();
        assert_eq!(project.status, ProjectStatus::Draft);
        assert_eq!(project.created_at, project.updated_at);
        assert!(!project.id.is_nil());
    }

    #[test]
    fn apply_updates_only_given_fields() {
        let mut project = NewProject::from_form(
            &FormData::default()
                .with_field(FormField::CompanyName, "Acme Co")
                .with_field(FormField::Industry, "Retail"),
        )
        .into_project();

        project
            .apply(ProjectUpdate {
                goal: Some("Open a second store".into()),
                status: Some(ProjectStatus::Active),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(project.name, "Acme Co");
        assert_eq!(project.industry, "Retail");
        assert_eq!(project.goal, "Open a second store");
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[test]
    fn apply_rejects_blank_name() {
        let mut project = NewProject::from_form(
            &FormData::default().with_field(FormField::CompanyName, "Acme Co"),
        )
        .into_project();
        let result = project.apply(ProjectUpdate {
            name: Some("  ".into()),
            goal: Some("ignored".into()),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(project.name, "Acme Co");
        assert!(project.goal.is_empty());
    }

    #[test]
    fn status_roundtrip() {
        for status in [ProjectStatus::Draft, ProjectStatus::Active, ProjectStatus::Archived] {
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", status.as_str())
            );
        }
    }
}
