//! API routes for the assessment server.

pub mod assess;
pub mod projects;
pub mod request_id;
mod routes;

use crate::config::Config;
use crate::state::StoreError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use sora_core::SoraError;

pub fn routes(config: &Config) -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router(config)
}

/// Map a pipeline error onto an HTTP response.
pub(crate) fn sora_error_response(err: SoraError) -> Response {
    match err {
        SoraError::InvalidInput { field, value } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_input",
                "field": field,
                "value": value,
            })),
        )
            .into_response(),
        SoraError::InvalidTables(details) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "invalid_tables",
                "details": details,
            })),
        )
            .into_response(),
    }
}

pub(crate) fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::ProjectNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "project_not_found", "project_id": id })),
        )
            .into_response(),
        StoreError::SiteNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "site_not_found", "site_id": id })),
        )
            .into_response(),
        StoreError::Sora(err) => sora_error_response(err),
    }
}

/// Malformed JSON bodies (unknown enum tags included) are invalid input.
pub(crate) fn rejection_response(rejection: JsonRejection) -> Response {
    malformed_request("body", rejection.body_text())
}

/// Query strings that fail to parse, such as a GRC outside `u8`.
pub(crate) fn query_rejection_response(rejection: QueryRejection) -> Response {
    malformed_request("query", rejection.body_text())
}

/// Same `{error, field, value}` shape as [`sora_error_response`].
fn malformed_request(field: &'static str, detail: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_input",
            "field": field,
            "value": detail,
        })),
    )
        .into_response()
}
