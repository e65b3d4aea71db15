//! Company management handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_body, CreatedResponse};
use crate::{AppError, AppState, SuccessResponse};
use ipgeum_core::models::Company;

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    /// Approved unless stated otherwise
    #[serde(default = "default_approved")]
    pub approved: bool,
}

fn default_approved() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CompanyApprovalRequest {
    pub approved: bool,
}

#[derive(Serialize)]
pub struct DeleteCompanyResponse {
    pub success: bool,
    pub deleted_deposits: usize,
}

/// GET /api/companies
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Company>>, AppError> {
    let companies = state.db.list_companies().map_err(AppError::from_core)?;
    Ok(Json(companies))
}

/// POST /api/companies - Register (or re-approve) a company
pub async fn create_company(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CreatedResponse>, AppError> {
    let req: CreateCompanyRequest = parse_body(&body)?;
    let id = state
        .db
        .add_company(&req.name, req.approved)
        .map_err(AppError::from_core)?;
    Ok(Json(CreatedResponse { id }))
}

/// PUT /api/companies/:name/approval
pub async fn set_company_approval(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let req: CompanyApprovalRequest = parse_body(&body)?;
    state
        .db
        .set_company_approved(&name, req.approved)
        .map_err(AppError::from_core)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/companies/:name - Remove a company and its ledger rows
pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<DeleteCompanyResponse>, AppError> {
    let deleted_deposits = state.db.delete_company(&name).map_err(AppError::from_core)?;
    Ok(Json(DeleteCompanyResponse {
        success: true,
        deleted_deposits,
    }))
}
