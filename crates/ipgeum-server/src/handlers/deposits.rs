//! Deposit intake and ledger handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{first_text, parse_body};
use crate::{AppError, AppState, SuccessResponse, TimedLookup};
use ipgeum_core::intake::{self, has_transaction_keyword, Ingested};
use ipgeum_core::models::{Deposit, DepositFilter};
use ipgeum_core::ParseOptions;

/// Default page size for the ledger listing
const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct CreateDepositRequest {
    pub sms: Option<String>,
}

/// Inbound SMS from a forwarding app; the text may arrive under any of
/// these keys
#[derive(Debug, Deserialize)]
pub struct ReceiveSmsRequest {
    pub sms: Option<String>,
    pub message: Option<String>,
    pub text: Option<String>,
    pub content: Option<String>,
}

#[derive(Serialize)]
pub struct CreateDepositResponse {
    pub success: bool,
    pub id: i64,
    pub parse_success: bool,
}

/// Summary echoed back to SMS forwarders
#[derive(Serialize)]
pub struct ReceivedSummary {
    pub bank: String,
    pub amount: i64,
    pub sender: String,
    pub company: String,
    pub date: NaiveDateTime,
}

#[derive(Serialize)]
pub struct ReceiveSmsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub parsed: Option<ReceivedSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ListDepositsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub company: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UncheckedCountQuery {
    pub company: Option<String>,
}

#[derive(Serialize)]
pub struct UncheckedCountResponse {
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckDepositRequest {
    pub is_checked: bool,
}

/// Parse, evaluate and store one message. Failed parses are stored too.
async fn ingest(state: &AppState, sms: &str) -> Result<Ingested, AppError> {
    let lookup = TimedLookup::new(&state.db, state.config.lookup_timeout);
    let options = ParseOptions {
        today: None,
        on_lookup_error: state.config.lookup_failure,
    };

    intake::ingest(&state.db, sms, &lookup, &options, Local::now().naive_local())
        .await
        .map_err(AppError::from_core)
}

/// POST /api/deposits - Parse and store a pasted SMS
pub async fn create_deposit(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CreateDepositResponse>, AppError> {
    let req: CreateDepositRequest = parse_body(&body)?;
    let sms = first_text(&[&req.sms]).ok_or_else(|| AppError::bad_request("sms is required"))?;

    let ingested = ingest(&state, sms).await?;

    Ok(Json(CreateDepositResponse {
        success: ingested.outcome.parse_success,
        id: ingested.id,
        parse_success: ingested.outcome.parse_success,
    }))
}

/// POST /api/deposits/receive-sms - Intake endpoint for SMS forwarders
///
/// Texts without any transaction keyword are acknowledged and dropped.
pub async fn receive_sms(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ReceiveSmsResponse>, AppError> {
    let req: ReceiveSmsRequest = parse_body(&body)?;
    let sms = first_text(&[&req.sms, &req.message, &req.text, &req.content])
        .ok_or_else(|| AppError::bad_request("sms is required"))?;

    if !has_transaction_keyword(sms) {
        info!("Skipping SMS without transaction keywords");
        return Ok(Json(ReceiveSmsResponse {
            success: true,
            id: None,
            parse_success: None,
            skipped: Some(true),
            reason: Some("No deposit or withdrawal keyword found".to_string()),
            parsed: None,
        }));
    }

    let ingested = ingest(&state, sms).await?;
    let parsed = ingested.outcome.deposit.map(|d| ReceivedSummary {
        bank: d.bank,
        amount: d.amount,
        sender: d.sender,
        company: d.company,
        date: d.date,
    });

    Ok(Json(ReceiveSmsResponse {
        success: true,
        id: Some(ingested.id),
        parse_success: Some(ingested.outcome.parse_success),
        skipped: None,
        reason: None,
        parsed,
    }))
}

/// GET /api/deposits - List ledger rows, newest first
pub async fn list_deposits(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDepositsQuery>,
) -> Result<Json<Vec<Deposit>>, AppError> {
    let filter = DepositFilter {
        company: query.company.filter(|c| !c.is_empty()),
        search: query.search,
        limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        offset: query.offset.unwrap_or(0),
    };
    let deposits = state.db.list_deposits(&filter).map_err(AppError::from_core)?;
    Ok(Json(deposits))
}

/// GET /api/deposits/:id
pub async fn get_deposit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Deposit>, AppError> {
    state
        .db
        .get_deposit(id)
        .map_err(AppError::from_core)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Deposit not found"))
}

/// DELETE /api/deposits/:id
pub async fn delete_deposit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_deposit(id).map_err(AppError::from_core)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/deposits/companies - Companies that appear in the ledger
pub async fn deposit_companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    let companies = state.db.deposit_companies().map_err(AppError::from_core)?;
    Ok(Json(companies))
}

/// GET /api/deposits/unchecked-count
pub async fn unchecked_count(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UncheckedCountQuery>,
) -> Result<Json<UncheckedCountResponse>, AppError> {
    let company = query.company.as_deref().filter(|c| !c.is_empty());
    let count = state.db.unchecked_count(company).map_err(AppError::from_core)?;
    Ok(Json(UncheckedCountResponse { count }))
}

/// PUT /api/deposits/:id/check - Mark a row as reviewed
pub async fn check_deposit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let req: CheckDepositRequest = parse_body(&body)?;
    state
        .db
        .set_deposit_checked(id, req.is_checked)
        .map_err(AppError::from_core)?;
    Ok(Json(SuccessResponse { success: true }))
}
