//! Loan repayment handlers
//!
//! Caller identity comes from the `x-user-id` header; a loan belonging to
//! another user is indistinguishable from a missing one.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{get_user_id, AppError, AppState, SuccessResponse};
use outlay_core::models::{Repayment, RepaymentEvent};

/// GET /api/repayments - List with summary aggregates
pub async fn list_repayments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = get_user_id(&headers)?;
    let (repayments, summary) = state.db.list_repayments(&user_id)?;
    Ok(Json(serde_json::json!({
        "repayments": repayments,
        "summary": summary,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateRepaymentRequest {
    #[serde(rename = "type")]
    pub loan_type: String,
    pub institution: String,
    pub principal: f64,
    pub interest_rate: f64,
    pub emi_amount: f64,
    pub tenure_months: i64,
    pub start_date: String,
    pub due_date: String,
}

/// POST /api/repayments - Create a loan (201)
pub async fn create_repayment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateRepaymentRequest>,
) -> Result<(StatusCode, Json<Repayment>), AppError> {
    let user_id = get_user_id(&headers)?;
    if req.loan_type.trim().is_empty() || req.institution.trim().is_empty() {
        return Err(AppError::bad_request("Missing type or institution"));
    }
    if req.principal <= 0.0 {
        return Err(AppError::bad_request("principal must be positive"));
    }

    let repayment = state.db.create_repayment(
        &user_id,
        req.loan_type.trim(),
        req.institution.trim(),
        req.principal,
        req.interest_rate,
        req.emi_amount,
        req.tenure_months,
        &req.start_date,
        &req.due_date,
    )?;
    Ok((StatusCode::CREATED, Json(repayment)))
}

/// Resolve a repayment owned by the caller.
fn owned_repayment(state: &AppState, user_id: &str, id: i64) -> Result<Repayment, AppError> {
    let repayment = state
        .db
        .get_repayment(id)?
        .ok_or_else(|| AppError::not_found("Repayment not found"))?;
    if repayment.user_id != user_id {
        return Err(AppError::not_found("Repayment not found"));
    }
    Ok(repayment)
}

/// GET /api/repayments/:id
pub async fn get_repayment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Repayment>, AppError> {
    let user_id = get_user_id(&headers)?;
    let repayment = owned_repayment(&state, &user_id, id)?;
    Ok(Json(repayment))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRepaymentRequest {
    pub institution: Option<String>,
    pub interest_rate: Option<f64>,
    pub emi_amount: Option<f64>,
    pub outstanding_balance: Option<f64>,
    pub status: Option<String>,
}

/// PUT /api/repayments/:id - Partial update
pub async fn update_repayment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRepaymentRequest>,
) -> Result<Json<Repayment>, AppError> {
    let user_id = get_user_id(&headers)?;
    owned_repayment(&state, &user_id, id)?;

    let updated = state.db.update_repayment(
        id,
        req.institution.as_deref(),
        req.interest_rate,
        req.emi_amount,
        req.outstanding_balance,
        req.status.as_deref(),
    )?;
    if !updated {
        return Err(AppError::bad_request("No fields to update"));
    }

    let repayment = owned_repayment(&state, &user_id, id)?;
    Ok(Json(repayment))
}

/// DELETE /api/repayments/:id
pub async fn delete_repayment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_id = get_user_id(&headers)?;
    owned_repayment(&state, &user_id, id)?;

    state.db.delete_repayment(id)?;
    Ok(SuccessResponse::ok())
}

#[derive(Debug, Deserialize)]
pub struct PrepaymentRequest {
    pub amount: f64,
    pub payment_date: Option<String>,
    pub principal_component: Option<f64>,
    pub interest_component: Option<f64>,
}

/// POST /api/repayments/:id/prepayment - Record a prepayment (201)
pub async fn record_prepayment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<PrepaymentRequest>,
) -> Result<(StatusCode, Json<RepaymentEvent>), AppError> {
    let user_id = get_user_id(&headers)?;
    owned_repayment(&state, &user_id, id)?;
    if req.amount <= 0.0 {
        return Err(AppError::bad_request("amount must be positive"));
    }

    let payment_date = req
        .payment_date
        .unwrap_or_else(|| Utc::now().date_naive().to_string());
    let principal = req.principal_component.unwrap_or(req.amount);
    let interest = req.interest_component.unwrap_or(0.0);

    let event = state
        .db
        .record_prepayment(id, req.amount, &payment_date, principal, interest)?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/repayments/:id/history
pub async fn repayment_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RepaymentEvent>>, AppError> {
    let user_id = get_user_id(&headers)?;
    owned_repayment(&state, &user_id, id)?;

    let history = state.db.list_repayment_history(id)?;
    Ok(Json(history))
}
