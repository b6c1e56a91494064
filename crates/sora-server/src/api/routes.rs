//! REST API routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::{assess, projects};
use crate::config::Config;
use crate::state::AppState;

/// Create the API router.
pub fn create_router(config: &Config) -> Router<Arc<AppState>> {
    let assessment_routes = Router::new()
        .route("/v1/tables", get(assess::get_tables))
        .route("/v1/sail", get(assess::lookup_sail))
        .route("/v1/assess/site", post(assess::assess_site))
        .route("/v1/assess/project", post(assess::assess_project));

    let project_routes = Router::new()
        .route(
            "/v1/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/v1/projects/:project_id",
            get(projects::get_project).delete(projects::delete_project),
        )
        .route(
            "/v1/projects/:project_id/sites/:site_id",
            put(projects::put_site).delete(projects::delete_site),
        );

    let allow_reset = config.allow_admin_reset;
    let admin_routes = Router::new().route(
        "/v1/admin/reset",
        post(
            move |state: State<Arc<AppState>>, body: Json<ResetRequest>| {
                admin_reset(allow_reset, state, body)
            },
        ),
    );

    assessment_routes.merge(project_routes).merge(admin_routes)
}

#[derive(Debug, Deserialize)]
struct ResetRequest {
    #[serde(default)]
    confirm: bool,
}

/// Drop every project. Requires `{"confirm": true}` and SORA_ALLOW_ADMIN_RESET.
async fn admin_reset(
    allowed: bool,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetRequest>,
) -> impl IntoResponse {
    if !allowed {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Admin reset is disabled" })),
        );
    }
    if !request.confirm {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Reset requires confirmation",
                "expected": { "confirm": true }
            })),
        );
    }

    match state.reset().await {
        Ok(()) => {
            tracing::warn!("All projects cleared by admin reset");
            (StatusCode::OK, Json(json!({ "status": "reset" })))
        }
        Err(err) => {
            tracing::error!("Admin reset failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Reset failed" })),
            )
        }
    }
}
