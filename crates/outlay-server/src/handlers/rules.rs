//! Category rule admin handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, SuccessResponse};
use outlay_core::categories::is_allowed;
use outlay_core::models::CategoryRule;
use outlay_core::rules::RuleStore;

/// GET /api/rules - All learned rules
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryRule>>, AppError> {
    let rules = state.db.scan_all()?;
    Ok(Json(rules))
}

#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    pub term: String,
    pub category: String,
}

/// POST /api/rules - Add a rule (first writer wins)
pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let term = req.term.trim().to_lowercase();
    if term.is_empty() {
        return Err(AppError::bad_request("Missing term"));
    }
    if !is_allowed(&req.category) {
        return Err(AppError::bad_request(&format!(
            "Unknown category: {}",
            req.category
        )));
    }

    let inserted = state.db.put_if_absent(&term, &req.category)?;
    Ok(Json(serde_json::json!({
        "term": term,
        "category": req.category,
        "inserted": inserted,
    })))
}

/// DELETE /api/rules/:term
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    Path(term): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete(&term)? {
        return Err(AppError::not_found("Rule not found"));
    }
    Ok(SuccessResponse::ok())
}
