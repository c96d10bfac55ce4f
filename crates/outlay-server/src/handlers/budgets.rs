//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppError, AppState, SuccessResponse};

#[derive(Debug, Deserialize)]
pub struct BudgetsQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// GET /api/budgets - A user's budget map ({} when unset)
pub async fn get_budgets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BudgetsQuery>,
) -> Result<Json<Value>, AppError> {
    let budgets = state.db.get_budgets(&query.user_id)?;
    Ok(Json(serde_json::json!({ "budgets": budgets })))
}

#[derive(Debug, Deserialize)]
pub struct PutBudgetsRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub budgets: Value,
}

/// PUT /api/budgets - Replace a user's budget map
pub async fn put_budgets(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PutBudgetsRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    if req.user_id.trim().is_empty() {
        return Err(AppError::bad_request("Missing userId"));
    }
    if !req.budgets.is_object() {
        return Err(AppError::bad_request("budgets must be an object"));
    }

    state.db.put_budgets(&req.user_id, &req.budgets)?;
    Ok(SuccessResponse::ok())
}
