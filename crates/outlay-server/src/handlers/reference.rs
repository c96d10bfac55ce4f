//! Mutual fund and stock reference data handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use outlay_core::models::{MutualFund, StockCompany};

/// GET /api/mutual-funds - All schemes, sorted by name
pub async fn list_mutual_funds(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MutualFund>>, AppError> {
    let funds = state.db.list_mutual_funds()?;
    Ok(Json(funds))
}

#[derive(Debug, Deserialize)]
pub struct FundSearchQuery {
    pub q: String,
    pub is_etf: Option<bool>,
}

/// GET /api/mutual-funds/search - Substring search, top 10
pub async fn search_mutual_funds(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FundSearchQuery>,
) -> Result<Json<Vec<MutualFund>>, AppError> {
    if query.q.trim().is_empty() {
        return Err(AppError::bad_request("Missing query"));
    }
    let funds = state.db.search_mutual_funds(query.q.trim(), query.is_etf)?;
    Ok(Json(funds))
}

/// GET /api/stocks - All companies, sorted by name
pub async fn list_stocks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StockCompany>>, AppError> {
    let stocks = state.db.list_stocks()?;
    Ok(Json(stocks))
}

#[derive(Debug, Deserialize)]
pub struct StockSearchQuery {
    pub q: String,
    pub exchange: Option<String>,
}

/// GET /api/stocks/search - Substring search on name or symbol, top 20
pub async fn search_stocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StockSearchQuery>,
) -> Result<Json<Vec<StockCompany>>, AppError> {
    if query.q.trim().is_empty() {
        return Err(AppError::bad_request("Missing query"));
    }
    let stocks = state
        .db
        .search_stocks(query.q.trim(), query.exchange.as_deref())?;
    Ok(Json(stocks))
}
