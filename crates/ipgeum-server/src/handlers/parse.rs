//! Parse preview handler

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;

use super::{first_text, parse_body};
use crate::{AppError, AppState};
use ipgeum_core::{parse_text as parse_notification, ParsedTransaction};

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub input_string: Option<String>,
    pub text: Option<String>,
}

/// POST /api/parse - Parse a notification without storing it
///
/// Approved companies are attached, but no member lookup is made.
pub async fn parse_text(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ParsedTransaction>, AppError> {
    let req: ParseRequest = parse_body(&body)?;
    let text = first_text(&[&req.input_string, &req.text])
        .ok_or_else(|| AppError::bad_request("input_string or text is required"))?;

    let companies = state.db.approved_companies().map_err(AppError::from_core)?;
    Ok(Json(parse_notification(text, &companies)))
}
