//! Project API endpoints.
//!
//! Projects own an ordered list of site inputs. Assessments are recomputed
//! from those inputs on every read.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::api::{rejection_response, store_error_response};
use crate::state::{AppState, Project, StoreError};
use sora_core::{ProjectAssessment, SiteInput};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub client: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub assessment: ProjectAssessment,
}

/// Create a new project.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_input",
                "field": "name",
                "value": request.name,
            })),
        )
            .into_response();
    }

    let project = state.create_project(name, request.client).await;
    tracing::info!("Created project '{}' ({})", project.name, project.project_id);

    (StatusCode::CREATED, Json(project)).into_response()
}

/// List all projects.
pub async fn list_projects(State(state): State<Arc<AppState>>) -> Json<Vec<Project>> {
    Json(state.list_projects())
}

/// Get a project with its aggregated assessment.
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Response {
    let Some(project) = state.get_project(&project_id) else {
        return store_error_response(StoreError::ProjectNotFound(project_id));
    };

    match state.assess_project(&project_id) {
        Ok(assessment) => Json(ProjectView {
            project,
            assessment,
        })
        .into_response(),
        Err(err) => store_error_response(err),
    }
}

/// Delete a project by ID.
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Response {
    if state.remove_project(&project_id).await {
        tracing::info!("Deleted project {}", project_id);
        StatusCode::NO_CONTENT.into_response()
    } else {
        store_error_response(StoreError::ProjectNotFound(project_id))
    }
}

/// Create or replace a site and return its fresh assessment.
pub async fn put_site(
    State(state): State<Arc<AppState>>,
    Path((project_id, site_id)): Path<(String, String)>,
    payload: Result<Json<SiteInput>, JsonRejection>,
) -> Response {
    let Json(mut input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    input.site_id = site_id;

    match state.upsert_site(&project_id, input).await {
        Ok(assessment) => Json(assessment).into_response(),
        Err(err) => store_error_response(err),
    }
}

/// Remove a site from a project.
pub async fn delete_site(
    State(state): State<Arc<AppState>>,
    Path((project_id, site_id)): Path<(String, String)>,
) -> Response {
    match state.remove_site(&project_id, &site_id).await {
        Ok(()) => {
            tracing::info!("Deleted site {} from project {}", site_id, project_id);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => store_error_response(err),
    }
}
