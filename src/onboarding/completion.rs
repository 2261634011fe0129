//! Submits the finished form as a new project.

use std::sync::Arc;

use tracing::{info, warn};

use super::model::FormData;
use crate::error::ProjectError;
use crate::inflight::{InFlight, InFlightGuard};
use crate::projects::{NewProject, ProjectApi, ProjectId};

/// Sends the collected answers to the project endpoint, one submission at a
/// time. A failed submission can simply be retried.
pub struct CompletionHandler {
    api: Arc<dyn ProjectApi>,
    in_flight: InFlight,
}

impl CompletionHandler {
    pub fn new(api: Arc<dyn ProjectApi>) -> Self {
        Self {
            api,
            in_flight: InFlight::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub async fn submit(&self, form: &FormData) -> Result<ProjectId, ProjectError> {
        let claim = self.begin()?;
        self.submit_claimed(&claim, form).await
    }

    /// Claim the submission slot ahead of `submit_claimed`. The slot is held
    /// until the returned guard is dropped.
    pub fn begin(&self) -> Result<InFlightGuard<'_>, ProjectError> {
        self.in_flight.try_begin().ok_or_else(|| {
            warn!("Project submission rejected: another submission is in flight");
            ProjectError::SubmissionInFlight
        })
    }

    /// Send the project under a slot already taken with `begin()`.
    pub async fn submit_claimed(
        &self,
        _claim: &InFlightGuard<'_>,
        form: &FormData,
    ) -> Result<ProjectId, ProjectError> {
        let new = NewProject::from_form(form);
        new.validate()?;

        match self.api.create_project(&new).await {
            Ok(project) => {
                info!(project_id = %project.id, name = %project.name, "Project submitted");
                Ok(project.id)
            }
            Err(e) => {
                warn!(name = %new.name, error = %e, "Project submission failed");
                Err(e)
            }
        }
    }
}
