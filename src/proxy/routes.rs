//! REST endpoints: chat proxy, assistant registration and project records.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::assistant::{AssistantConfig, AssistantCreated, RegisterAssistant};
use super::chat::ChatProxy;
use super::error::ApiError;
use crate::chat::transport::{ProxyRequest, ProxyResponse};
use crate::projects::{LocalProjectApi, NewProject, Project, ProjectApi, ProjectId, ProjectUpdate};
use crate::store::Database;

/// Shared state for all proxy routes.
#[derive(Clone)]
pub struct ProxyState {
    pub db: Arc<dyn Database>,
    pub chat: Arc<ChatProxy>,
    pub projects: Arc<LocalProjectApi>,
    /// Model recorded for assistants registered without one.
    pub default_model: String,
}

impl ProxyState {
    pub fn new(db: Arc<dyn Database>, chat: ChatProxy, default_model: impl Into<String>) -> Self {
        Self {
            projects: Arc::new(LocalProjectApi::new(Arc::clone(&db))),
            db,
            chat: Arc::new(chat),
            default_model: default_model.into(),
        }
    }
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/chat
async fn chat(
    State(state): State<ProxyState>,
    Json(request): Json<ProxyRequest>,
) -> Result<Json<ProxyResponse>, ApiError> {
    state.chat.handle(request).await.map(Json)
}

/// POST /api/assistants
async fn register_assistant(
    State(state): State<ProxyState>,
    body: Option<Json<RegisterAssistant>>,
) -> Result<Json<AssistantCreated>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let config = request.into_config(&state.default_model);
    state.db.insert_assistant(&config).await?;
    info!(assistant_id = %config.id, name = %config.name, "Assistant registered");
    Ok(Json(AssistantCreated {
        assistant_id: config.id,
    }))
}

/// GET /api/assistants/current
async fn current_assistant(
    State(state): State<ProxyState>,
) -> Result<Json<AssistantConfig>, ApiError> {
    state
        .db
        .latest_assistant()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no assistant registered".into()))
}

/// POST /api/projects
async fn create_project(
    State(state): State<ProxyState>,
    Json(new): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project = state.projects.create_project(&new).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects
async fn list_projects(State(state): State<ProxyState>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.db.list_projects().await?))
}

/// GET /api/projects/{id}
async fn get_project(
    State(state): State<ProxyState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<Project>, ApiError> {
    state
        .db
        .get_project(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("project {id} not found")))
}

/// PATCH /api/projects/{id}
async fn update_project(
    State(state): State<ProxyState>,
    Path(id): Path<ProjectId>,
    Json(update): Json<ProjectUpdate>,
) -> Result<Json<Project>, ApiError> {
    let mut project = state
        .db
        .get_project(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {id} not found")))?;
    project.apply(update)?;
    state.db.update_project(&project).await?;
    info!(project_id = %id, status = project.status.as_str(), "Project updated");
    Ok(Json(project))
}

/// DELETE /api/projects/{id}
async fn delete_project(
    State(state): State<ProxyState>,
    Path(id): Path<ProjectId>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_project(id).await? {
        info!(project_id = %id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("project {id} not found")))
    }
}

/// Build the full router with tracing and permissive CORS.
pub fn app_routes(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/assistants", post(register_assistant))
        .route("/api/assistants/current", get(current_assistant))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
