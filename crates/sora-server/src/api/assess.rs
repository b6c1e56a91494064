//! Stateless assessment endpoints.
//!
//! Run the classification pipeline over request bodies without touching
//! the project store.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::{query_rejection_response, rejection_response, sora_error_response};
use crate::state::AppState;
use sora_core::{
    AirRiskClass, GrcValue, OsoRequirement, PopulationCategory, Robustness, Sail, SiteInput,
    SoraError, SoraTables, MIN_GRC,
};

/// Assess a single site.
pub async fn assess_site(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SiteInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match sora_core::assess_site(state.tables(), &input) {
        Ok(assessment) => Json(assessment).into_response(),
        Err(err) => {
            tracing::info!("Rejected site {}: {}", input.site_id, err);
            sora_error_response(err)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectAssessRequest {
    pub sites: Vec<SiteInput>,
}

/// Assess and aggregate a list of sites.
pub async fn assess_project(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProjectAssessRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match sora_core::assess_project(state.tables(), &request.sites) {
        Ok(assessment) => Json(assessment).into_response(),
        Err(err) => sora_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct SailQuery {
    pub grc: u8,
    pub arc: String,
    /// Adjacent area population for the containment lookup
    pub adjacent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SailLookupResponse {
    pub final_grc: u8,
    pub residual_arc: AirRiskClass,
    pub within_scope: bool,
    pub sail: Option<Sail>,
    pub containment: Option<Robustness>,
    pub required_osos: Vec<OsoRequirement>,
}

/// Direct SAIL matrix lookup for a final GRC and residual ARC.
pub async fn lookup_sail(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SailQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_response(rejection),
    };

    match build_sail_lookup(state.tables(), &query) {
        Ok(response) => Json(response).into_response(),
        Err(err) => sora_error_response(err),
    }
}

fn build_sail_lookup(
    tables: &SoraTables,
    query: &SailQuery,
) -> sora_core::Result<SailLookupResponse> {
    if query.grc < MIN_GRC {
        return Err(SoraError::invalid("grc", query.grc.to_string()));
    }
    let residual_arc: AirRiskClass = query.arc.parse()?;
    let adjacent = query
        .adjacent
        .as_deref()
        .map(str::parse::<PopulationCategory>)
        .transpose()?;

    let final_grc = GrcValue::Class(query.grc);
    let within_scope = sora_core::within_scope(tables, final_grc);
    let sail = if within_scope {
        sora_core::sail_for(tables, final_grc, residual_arc)
    } else {
        None
    };

    let (containment, required_osos) = match sail {
        Some(sail) => (
            Some(sora_core::containment_for(tables, sail, adjacent)?),
            sora_core::required_osos(tables, sail),
        ),
        None => (None, Vec::new()),
    };

    Ok(SailLookupResponse {
        final_grc: query.grc,
        residual_arc,
        within_scope: sail.is_some(),
        sail,
        containment,
        required_osos,
    })
}

/// Active reference tables.
pub async fn get_tables(State(state): State<Arc<AppState>>) -> Json<SoraTables> {
    Json(state.tables().clone())
}
