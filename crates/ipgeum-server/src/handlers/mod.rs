//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod companies;
pub mod deposits;
pub mod matching;
pub mod parse;

// Re-export all handlers for use in router
pub use companies::*;
pub use deposits::*;
pub use matching::*;
pub use parse::*;

use axum::{body::Bytes, Json};
use serde::{de::DeserializeOwned, Serialize};

use crate::AppError;

/// Decode a JSON request body, answering 400 on malformed input
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::bad_request("Invalid JSON"))
}

/// First candidate that is non-empty after trimming
pub(crate) fn first_text<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.trim().is_empty())
}

/// Response for newly created rows
#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
