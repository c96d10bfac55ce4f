//! Outlay Web Server
//!
//! Axum-based REST API for the Outlay expense tracker:
//! - Free-text expense categorization and expense CRUD
//! - Budgets, category rules, portfolios, reference data, loan repayments
//! - Restrictive CORS policy and sanitized error responses
//!
//! Requests are stateless; the database is the only shared state. The
//! portfolio and repayment surfaces identify the caller by the opaque
//! `x-user-id` header, the expense surface by a `userId` field.

use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use outlay_core::ai::{ClassifierBackend, ClassifierClient};
use outlay_core::db::Database;
use outlay_core::engine::CategorizationEngine;

mod handlers;

#[cfg(test)]
mod tests;

/// Header carrying the opaque caller identity.
const USER_ID_HEADER: &str = "x-user-id";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub engine: CategorizationEngine,
}

/// Generic success body for deletes and other void operations.
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Read the caller identity from the `x-user-id` header.
pub(crate) fn get_user_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::unauthorized("Missing x-user-id header"))
}

/// API error with a sanitized client-facing message.
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create the application router
pub fn create_router(
    db: Database,
    classifier: Option<ClassifierClient>,
    config: ServerConfig,
) -> Router {
    if let Some(ref client) = classifier {
        info!(
            "AI classifier configured: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        info!("AI classifier not configured (set GROQ_API_KEY to enable AI fallback)");
    }

    let engine = CategorizationEngine::new(Arc::new(db.clone()), classifier);
    let state = Arc::new(AppState { db, engine });

    let api_routes = Router::new()
        // Expenses
        .route("/expenses/categorize", post(handlers::categorize_expense))
        .route(
            "/expenses",
            put(handlers::create_expense).get(handlers::list_expenses),
        )
        .route(
            "/expenses/:id",
            axum::routing::patch(handlers::update_expense).delete(handlers::delete_expense),
        )
        .route("/expenses/summary/monthly", get(handlers::monthly_summary))
        .route("/expenses/summary/category", get(handlers::category_summary))
        .route("/categories", get(handlers::list_categories))
        // Budgets
        .route(
            "/budgets",
            get(handlers::get_budgets).put(handlers::put_budgets),
        )
        // Category rules
        .route(
            "/rules",
            get(handlers::list_rules).post(handlers::create_rule),
        )
        .route("/rules/:term", axum::routing::delete(handlers::delete_rule))
        // Portfolios
        .route(
            "/portfolios",
            post(handlers::create_portfolio).get(handlers::list_portfolios),
        )
        .route(
            "/portfolios/plan",
            put(handlers::put_allocation_plan).get(handlers::get_allocation_plan),
        )
        .route(
            "/holdings",
            post(handlers::create_holding).get(handlers::list_holdings),
        )
        .route(
            "/holdings/:id",
            axum::routing::delete(handlers::delete_holding),
        )
        .route(
            "/transactions",
            post(handlers::create_investment_txn).get(handlers::list_investment_txns),
        )
        // Reference data
        .route("/mutual-funds", get(handlers::list_mutual_funds))
        .route("/mutual-funds/search", get(handlers::search_mutual_funds))
        .route("/stocks", get(handlers::list_stocks))
        .route("/stocks/search", get(handlers::search_stocks))
        // Loan repayments
        .route(
            "/repayments",
            get(handlers::list_repayments).post(handlers::create_repayment),
        )
        .route(
            "/repayments/:id",
            get(handlers::get_repayment)
                .put(handlers::update_repayment)
                .delete(handlers::delete_repayment),
        )
        .route(
            "/repayments/:id/prepayment",
            post(handlers::record_prepayment),
        )
        .route("/repayments/:id/history", get(handlers::repayment_history));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::HeaderName::from_static(USER_ID_HEADER),
            ])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::HeaderName::from_static(USER_ID_HEADER),
            ])
    };

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let classifier = ClassifierClient::from_env();
    check_classifier_connection(&classifier).await;

    let app = create_router(db, classifier, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log classifier connection status
async fn check_classifier_connection(classifier: &Option<ClassifierClient>) {
    match classifier {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "Classifier connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "Classifier not reachable at {} - AI fallback will report Other",
                    client.host()
                );
            }
        }
        None => {
            info!("No classifier configured - AI fallback will report Other");
        }
    }
}
