//! Matching member handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{parse_body, CreatedResponse};
use crate::{AppError, AppState, SuccessResponse};
use ipgeum_core::models::{MatchingMember, NewMatchingMember};

#[derive(Debug, Deserialize)]
pub struct ListMatchingQuery {
    pub category: Option<String>,
}

/// Body for creating or replacing a member
#[derive(Debug, Deserialize)]
pub struct MatchingMemberRequest {
    pub category: String,
    /// Defaults to the account holder
    pub member_name: Option<String>,
    pub account_holder: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
}

impl From<MatchingMemberRequest> for NewMatchingMember {
    fn from(req: MatchingMemberRequest) -> Self {
        let member_name = req
            .member_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| req.account_holder.clone());
        Self {
            category: req.category,
            member_name,
            account_holder: req.account_holder,
            bank_name: req.bank_name,
            account_number: req.account_number,
        }
    }
}

/// GET /api/matching - List members, optionally for one category
pub async fn list_matching_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMatchingQuery>,
) -> Result<Json<Vec<MatchingMember>>, AppError> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let members = state
        .db
        .list_matching_members(category)
        .map_err(AppError::from_core)?;
    Ok(Json(members))
}

/// POST /api/matching
pub async fn create_matching_member(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CreatedResponse>, AppError> {
    let req: MatchingMemberRequest = parse_body(&body)?;
    let id = state
        .db
        .create_matching_member(&req.into())
        .map_err(AppError::from_core)?;
    Ok(Json(CreatedResponse { id }))
}

/// PUT /api/matching/:id - Replace a member's fields
pub async fn update_matching_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let req: MatchingMemberRequest = parse_body(&body)?;
    state
        .db
        .update_matching_member(id, &req.into())
        .map_err(AppError::from_core)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/matching/:id
pub async fn delete_matching_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .db
        .delete_matching_member(id)
        .map_err(AppError::from_core)?;
    Ok(Json(SuccessResponse { success: true }))
}
