//! Portfolio, holding, and investment transaction handlers
//!
//! All of these identify the caller via the `x-user-id` header.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{get_user_id, AppError, AppState, SuccessResponse};
use outlay_core::models::{Holding, InvestmentTxn, Portfolio};

#[derive(Debug, Deserialize)]
pub struct CreatePortfolioRequest {
    pub name: String,
}

/// POST /api/portfolios
pub async fn create_portfolio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreatePortfolioRequest>,
) -> Result<Json<Portfolio>, AppError> {
    let user_id = get_user_id(&headers)?;
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("Missing name"));
    }

    let portfolio = state.db.create_portfolio(&user_id, req.name.trim())?;
    Ok(Json(portfolio))
}

/// GET /api/portfolios
pub async fn list_portfolios(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Portfolio>>, AppError> {
    let user_id = get_user_id(&headers)?;
    let portfolios = state.db.list_portfolios(&user_id)?;
    Ok(Json(portfolios))
}

/// Resolve a portfolio and check it belongs to the caller.
fn owned_portfolio(state: &AppState, user_id: &str, portfolio_id: i64) -> Result<Portfolio, AppError> {
    let portfolio = state
        .db
        .get_portfolio(portfolio_id)?
        .ok_or_else(|| AppError::not_found("Portfolio not found"))?;
    if portfolio.user_id != user_id {
        return Err(AppError::not_found("Portfolio not found"));
    }
    Ok(portfolio)
}

#[derive(Debug, Deserialize)]
pub struct PutPlanRequest {
    #[serde(rename = "portfolioId")]
    pub portfolio_id: i64,
    pub plan: Value,
}

/// PUT /api/portfolios/plan - Upsert a portfolio's allocation plan
pub async fn put_allocation_plan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<PutPlanRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_id = get_user_id(&headers)?;
    owned_portfolio(&state, &user_id, req.portfolio_id)?;

    state.db.put_allocation_plan(req.portfolio_id, &req.plan)?;
    Ok(SuccessResponse::ok())
}

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    #[serde(rename = "portfolioId")]
    pub portfolio_id: i64,
}

/// GET /api/portfolios/plan
pub async fn get_allocation_plan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PlanQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = get_user_id(&headers)?;
    owned_portfolio(&state, &user_id, query.portfolio_id)?;

    let plan = state.db.get_allocation_plan(query.portfolio_id)?;
    Ok(Json(serde_json::json!({ "plan": plan })))
}

#[derive(Debug, Deserialize)]
pub struct CreateHoldingRequest {
    #[serde(rename = "portfolioId")]
    pub portfolio_id: i64,
    pub holding: Value,
}

/// POST /api/holdings - Store a holding with its derived role
pub async fn create_holding(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateHoldingRequest>,
) -> Result<Json<Holding>, AppError> {
    let user_id = get_user_id(&headers)?;
    owned_portfolio(&state, &user_id, req.portfolio_id)?;
    if !req.holding.is_object() {
        return Err(AppError::bad_request("holding must be an object"));
    }

    let holding = state.db.insert_holding(&user_id, req.portfolio_id, &req.holding)?;
    Ok(Json(holding))
}

#[derive(Debug, Deserialize)]
pub struct HoldingsQuery {
    #[serde(rename = "portfolioId")]
    pub portfolio_id: i64,
}

/// GET /api/holdings
pub async fn list_holdings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HoldingsQuery>,
) -> Result<Json<Vec<Holding>>, AppError> {
    let user_id = get_user_id(&headers)?;
    owned_portfolio(&state, &user_id, query.portfolio_id)?;

    let holdings = state.db.list_holdings(query.portfolio_id)?;
    Ok(Json(holdings))
}

/// DELETE /api/holdings/:id
pub async fn delete_holding(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    get_user_id(&headers)?;
    if !state.db.delete_holding(id)? {
        return Err(AppError::not_found("Holding not found"));
    }
    Ok(SuccessResponse::ok())
}

#[derive(Debug, Deserialize)]
pub struct CreateTxnRequest {
    #[serde(rename = "portfolioId")]
    pub portfolio_id: i64,
    pub date: Option<NaiveDate>,
    pub txn: Value,
}

/// POST /api/transactions - Record an investment transaction
pub async fn create_investment_txn(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateTxnRequest>,
) -> Result<Json<InvestmentTxn>, AppError> {
    let user_id = get_user_id(&headers)?;
    owned_portfolio(&state, &user_id, req.portfolio_id)?;

    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let txn = state.db.insert_investment_txn(req.portfolio_id, date, &req.txn)?;
    Ok(Json(txn))
}

#[derive(Debug, Deserialize)]
pub struct ListTxnsQuery {
    #[serde(rename = "portfolioId")]
    pub portfolio_id: i64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// GET /api/transactions - Transactions within an optional date range
pub async fn list_investment_txns(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListTxnsQuery>,
) -> Result<Json<Vec<InvestmentTxn>>, AppError> {
    let user_id = get_user_id(&headers)?;
    owned_portfolio(&state, &user_id, query.portfolio_id)?;

    let txns = state
        .db
        .list_investment_txns(query.portfolio_id, query.start, query.end)?;
    Ok(Json(txns))
}
