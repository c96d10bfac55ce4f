//! Expense categorization and CRUD handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::{AppError, AppState, SuccessResponse};
use outlay_core::categories::ALLOWED_CATEGORIES;
use outlay_core::db::ExpenseFilter;
use outlay_core::extract::extract_term;
use outlay_core::models::{CategorySuggestion, Expense};
use outlay_core::rules::RuleStore;

/// Request body for categorizing a free-text entry
#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "rawText")]
    pub raw_text: Option<String>,
}

/// POST /api/expenses/categorize - Suggest a category for free text
pub async fn categorize_expense(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CategorizeRequest>,
) -> Result<Json<CategorySuggestion>, AppError> {
    let user_id = req
        .user_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing userId"))?;
    let raw_text = req
        .raw_text
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing rawText"))?;

    tracing::debug!(user_id = %user_id, "Categorize request");
    let suggestion = state.engine.suggest(&raw_text).await?;
    Ok(Json(suggestion))
}

/// Request body for recording an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "rawText")]
    pub raw_text: String,
    pub date: Option<NaiveDate>,
}

/// PUT /api/expenses - Record an expense
///
/// A confirmed category also teaches the rule store, so the same phrasing
/// resolves without the classifier next time. "Uncategorized" entries are
/// not learned.
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    if req.user_id.trim().is_empty() {
        return Err(AppError::bad_request("Missing userId"));
    }
    if req.category.trim().is_empty() {
        return Err(AppError::bad_request("Missing category"));
    }

    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let expense = state
        .db
        .insert_expense(&req.user_id, req.amount, &req.category, &req.raw_text, date)?;

    if req.category != "Uncategorized" {
        let term = extract_term(&req.raw_text);
        if !term.is_empty() {
            // Best-effort: a failed learn never fails the write.
            if let Err(e) = state.db.put_if_absent(&term, &req.category) {
                warn!(term = %term, error = %e, "Failed to learn rule from expense");
            }
        }
    }

    Ok(Json(expense))
}

/// Query parameters for expense listing
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
}

/// GET /api/expenses - List expenses with optional filters
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListExpensesQuery>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let filter = ExpenseFilter {
        start: query.start,
        end: query.end,
        category: query.category,
    };
    let expenses = state.db.list_expenses(&query.user_id, &filter)?;
    Ok(Json(expenses))
}

/// Request body for partially updating an expense
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<f64>,
    pub category: Option<String>,
    #[serde(rename = "rawText")]
    pub raw_text: Option<String>,
}

/// PATCH /api/expenses/:id - Partially update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    if req.amount.is_none() && req.category.is_none() && req.raw_text.is_none() {
        return Err(AppError::bad_request("No fields to update"));
    }

    let updated = state.db.update_expense(
        id,
        req.amount,
        req.category.as_deref(),
        req.raw_text.as_deref(),
    )?;
    if !updated {
        return Err(AppError::not_found("Expense not found"));
    }

    let expense = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    Ok(Json(expense))
}

/// DELETE /api/expenses/:id
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_expense(id)? {
        return Err(AppError::not_found("Expense not found"));
    }
    Ok(SuccessResponse::ok())
}

/// Query parameters for the monthly summary
#[derive(Debug, Deserialize)]
pub struct MonthlySummaryQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Month as YYYY-MM; defaults to the current month.
    pub month: Option<String>,
}

/// GET /api/expenses/summary/monthly - Per-category totals for one month
pub async fn monthly_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthlySummaryQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let month = query
        .month
        .unwrap_or_else(|| Utc::now().format("%Y-%m").to_string());

    let totals = state.db.monthly_summary(&query.user_id, &month)?;
    let by_category: serde_json::Map<String, serde_json::Value> = totals
        .into_iter()
        .map(|(category, total)| (category, serde_json::json!(total)))
        .collect();

    Ok(Json(serde_json::json!({
        "month": month,
        "totals": by_category,
    })))
}

/// Query parameters for the category summary
#[derive(Debug, Deserialize)]
pub struct CategorySummaryQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub category: String,
}

/// GET /api/expenses/summary/category - One category's items and total
pub async fn category_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategorySummaryQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (items, total) = state.db.category_summary(&query.user_id, &query.category)?;
    Ok(Json(serde_json::json!({
        "category": query.category,
        "items": items,
        "total": total,
    })))
}

/// GET /api/categories - The allowed category list
pub async fn list_categories() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "categories": ALLOWED_CATEGORIES }))
}
