//! Project-creation endpoints used by the completion handler.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::model::{NewProject, Project, ProjectId};
use crate::error::ProjectError;
use crate::store::Database;

/// Where finished onboarding flows are submitted.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn create_project(&self, project: &NewProject) -> Result<Project, ProjectError>;

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, ProjectError>;
}

/// Talks to the server's `/api/projects` endpoints.
pub struct HttpProjectApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProjectApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn remote_error(resp: reqwest::Response) -> ProjectError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    ProjectError::Remote { status, body }
}

#[async_trait]
impl ProjectApi for HttpProjectApi {
    async fn create_project(&self, project: &NewProject) -> Result<Project, ProjectError> {
        let resp = self
            .client
            .post(self.url("/api/projects"))
            .json(project)
            .send()
            .await
            .map_err(|e| ProjectError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(remote_error(resp).await);
        }

        let created: Project = resp
            .json()
            .await
            .map_err(|e| ProjectError::Transport(format!("invalid response body: {e}")))?;
        debug!(project_id = %created.id, "Project created remotely");
        Ok(created)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, ProjectError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/projects/{id}")))
            .send()
            .await
            .map_err(|e| ProjectError::Transport(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(remote_error(resp).await);
        }
        resp.json()
            .await
            .map(Some)
            .map_err(|e| ProjectError::Transport(format!("invalid response body: {e}")))
    }
}

/// Writes projects straight into the database. Used by the server's REST
/// handlers and by in-process front ends.
pub struct LocalProjectApi {
    db: Arc<dyn Database>,
}

impl LocalProjectApi {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProjectApi for LocalProjectApi {
    async fn create_project(&self, project: &NewProject) -> Result<Project, ProjectError> {
        project.validate()?;
        let record = project.clone().into_project();
        self.db.insert_project(&record).await?;
        info!(project_id = %record.id, name = %record.name, "Project created");
        Ok(record)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, ProjectError> {
        Ok(self.db.get_project(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::{FormData, FormField};
    use crate::store::LibSqlBackend;

    async fn local_api() -> LocalProjectApi {
        let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        LocalProjectApi::new(db)
    }

    #[tokio::test]
    async fn local_create_then_get() {
        let api = local_api().await;
        let new = NewProject::from_form(
            &FormData::default()
                .with_field(FormField::CompanyName, "Acme Co")
                .with_field(FormField::Goal, "Increase Sales"),
        );

        let created = api.create_project(&new).await.unwrap();
        let fetched = api.get_project(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Acme Co");
        assert_eq!(fetched.goal, "Increase Sales");
    }

    #[tokio::test]
    async fn local_create_rejects_blank_name() {
        let api = local_api().await;
        let new = NewProject::from_form(&FormData::default());
        assert!(matches!(
            api.create_project(&new).await,
            Err(ProjectError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn local_get_missing_is_none() {
        let api = local_api().await;
        assert!(api.get_project(uuid::Uuid::new_v4()).await.unwrap().is_none());
    }

    #[test]
    fn http_url_joins_path() {
        let api = HttpProjectApi::new("http://localhost:8080/");
        assert_eq!(api.url("/api/projects"), "http://localhost:8080/api/projects");
    }
}
