//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use outlay_core::db::Database;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router(db, Some(ClassifierClient::mock()), ServerConfig::default())
}

fn setup_test_app_with_db() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    let app = create_router(
        db.clone(),
        Some(ClassifierClient::mock()),
        ServerConfig::default(),
    );
    (app, db)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", "u1")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", "u1")
        .body(Body::empty())
        .unwrap()
}

// ========== Health and categories ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();
    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_categories() {
    let app = setup_test_app();
    let response = app.oneshot(get_request("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories = json["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 17);
    assert_eq!(categories[0], "Food");
    assert_eq!(categories[16], "Other");
}

// ========== Categorization ==========

#[tokio::test]
async fn test_categorize_via_synonym() {
    let app = setup_test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/expenses/categorize",
            serde_json::json!({"userId": "u1", "rawText": "Lunch 250 at restaurant"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Food");
    assert_eq!(json["amount"], 250.0);
    assert_eq!(json["message"], "Parsed amount 250 and category Food");
    assert!(json.get("AIConfidence").is_none());
    assert!(json.get("options").is_none());
}

#[tokio::test]
async fn test_categorize_ai_fallback_includes_options() {
    let app = setup_test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/expenses/categorize",
            serde_json::json!({"userId": "u1", "rawText": "450 for vet visit"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json.get("AIConfidence").is_some());
    assert!(json["options"].as_array().unwrap().len() >= 17);
    assert!(json["message"].as_str().unwrap().contains("Pick a category"));
}

#[tokio::test]
async fn test_categorize_missing_fields() {
    let app = setup_test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/expenses/categorize",
            serde_json::json!({"userId": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Expense CRUD ==========

#[tokio::test]
async fn test_expense_lifecycle() {
    let app = setup_test_app();

    // Create
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/expenses",
            serde_json::json!({
                "userId": "u1",
                "amount": 250.0,
                "category": "Food",
                "rawText": "Lunch 250",
                "date": "2026-03-15"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = get_body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["category"], "Food");

    // List
    let response = app
        .clone()
        .oneshot(get_request("/api/expenses?userId=u1"))
        .await
        .unwrap();
    let listed = get_body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Patch
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/expenses/{}", id),
            serde_json::json!({"category": "Travel"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let patched = get_body_json(response).await;
    assert_eq!(patched["category"], "Travel");

    // Delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/expenses/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/expenses?userId=u1"))
        .await
        .unwrap();
    let listed = get_body_json(response).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_patch_with_no_fields_is_rejected() {
    let app = setup_test_app();
    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/expenses/1",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_confirmed_expense_teaches_rule_store() {
    let (app, db) = setup_test_app_with_db();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/expenses",
            serde_json::json!({
                "userId": "u1",
                "amount": 150.0,
                "category": "Shopping",
                "rawText": "150 for laptop repair"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    use outlay_core::rules::RuleStore;
    assert_eq!(
        db.get("laptop repair").unwrap().as_deref(),
        Some("Shopping")
    );
}

#[tokio::test]
async fn test_uncategorized_expense_is_not_learned() {
    let (app, db) = setup_test_app_with_db();

    app.oneshot(json_request(
        "PUT",
        "/api/expenses",
        serde_json::json!({
            "userId": "u1",
            "amount": 100.0,
            "category": "Uncategorized",
            "rawText": "100 for mystery thing"
        }),
    ))
    .await
    .unwrap();

    use outlay_core::rules::RuleStore;
    assert_eq!(db.get("mystery thing").unwrap(), None);
}

#[tokio::test]
async fn test_monthly_summary() {
    let (app, db) = setup_test_app_with_db();
    db.insert_expense("u1", 100.0, "Food", "a", "2026-03-01".parse().unwrap())
        .unwrap();
    db.insert_expense("u1", 200.0, "Travel", "b", "2026-03-10".parse().unwrap())
        .unwrap();

    let response = app
        .oneshot(get_request(
            "/api/expenses/summary/monthly?userId=u1&month=2026-03",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["month"], "2026-03");
    assert_eq!(json["totals"]["Food"], 100.0);
    assert_eq!(json["totals"]["Travel"], 200.0);
}

// ========== Budgets ==========

#[tokio::test]
async fn test_budgets_roundtrip_and_default_empty() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(get_request("/api/budgets?userId=u1"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["budgets"], serde_json::json!({}));

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/budgets",
            serde_json::json!({"userId": "u1", "budgets": {"Food": 5000}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/budgets?userId=u1"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["budgets"]["Food"], 5000);
}

// ========== Rules ==========

#[tokio::test]
async fn test_rule_admin_surface() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/rules",
            serde_json::json!({"term": "Dog Food", "category": "Pet Care"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["term"], "dog food");
    assert_eq!(json["inserted"], true);

    // Duplicate insert is reported, not an error
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/rules",
            serde_json::json!({"term": "dog food", "category": "Food"}),
        ))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["inserted"], false);

    let response = app.clone().oneshot(get_request("/api/rules")).await.unwrap();
    let rules = get_body_json(response).await;
    assert_eq!(rules.as_array().unwrap().len(), 1);
    assert_eq!(rules[0]["category"], "Pet Care");

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/rules/dog%20food")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rule_with_unknown_category_is_rejected() {
    let app = setup_test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/rules",
            serde_json::json!({"term": "snacks", "category": "Munchies"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Portfolios ==========

#[tokio::test]
async fn test_portfolio_requires_user_header() {
    let app = setup_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/portfolios")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_portfolio_holding_flow() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/portfolios",
            serde_json::json!({"name": "Core"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let portfolio = get_body_json(response).await;
    let pid = portfolio["portfolioId"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/holdings",
            serde_json::json!({
                "portfolioId": pid,
                "holding": {"asset_class": "Gold", "units": 5}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let holding = get_body_json(response).await;
    assert_eq!(holding["portfolio_role"], "Satellite");

    let response = app
        .oneshot(get_request(&format!("/api/holdings?portfolioId={}", pid)))
        .await
        .unwrap();
    let holdings = get_body_json(response).await;
    assert_eq!(holdings.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_portfolio_isolation_between_users() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/portfolios",
            serde_json::json!({"name": "Mine"}),
        ))
        .await
        .unwrap();
    let portfolio = get_body_json(response).await;
    let pid = portfolio["portfolioId"].as_i64().unwrap();

    // Another user cannot read this portfolio's plan
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/portfolios/plan?portfolioId={}", pid))
                .header("x-user-id", "intruder")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transaction_date_filter() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/portfolios",
            serde_json::json!({"name": "Core"}),
        ))
        .await
        .unwrap();
    let pid = get_body_json(response).await["portfolioId"].as_i64().unwrap();

    for (date, amt) in [("2026-01-10", 100), ("2026-02-10", 200)] {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/transactions",
                serde_json::json!({"portfolioId": pid, "date": date, "txn": {"amount": amt}}),
            ))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(get_request(&format!(
            "/api/transactions?portfolioId={}&start=2026-02-01&end=2026-02-28",
            pid
        )))
        .await
        .unwrap();
    let txns = get_body_json(response).await;
    assert_eq!(txns.as_array().unwrap().len(), 1);
}

// ========== Reference data ==========

#[tokio::test]
async fn test_fund_search() {
    let (app, db) = setup_test_app_with_db();
    db.upsert_mutual_fund(&outlay_core::models::MutualFund {
        scheme_code: "100001".to_string(),
        name: "Nifty 50 Index Fund".to_string(),
        full_name: "Nifty 50 Index Fund - Direct - Growth".to_string(),
        current_nav: 210.5,
        asset_class: "Equity MF".to_string(),
        portfolio_role: "Equity".to_string(),
        is_etf: false,
        amc: "Test AMC".to_string(),
        scheme_type: "Open Ended".to_string(),
        scheme_subtype: "Index".to_string(),
        option: "Growth".to_string(),
        plan: "Direct".to_string(),
        date: "2026-08-01".to_string(),
    })
    .unwrap();

    let response = app
        .oneshot(get_request("/api/mutual-funds/search?q=nifty"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let funds = get_body_json(response).await;
    assert_eq!(funds.as_array().unwrap().len(), 1);
    assert_eq!(funds[0]["schemeCode"], "100001");
}

// ========== Repayments ==========

#[tokio::test]
async fn test_repayment_lifecycle_with_prepayment() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/repayments",
            serde_json::json!({
                "type": "home",
                "institution": "HDFC",
                "principal": 5000000.0,
                "interest_rate": 8.5,
                "emi_amount": 45000.0,
                "tenure_months": 240,
                "start_date": "2024-01-01",
                "due_date": "2044-01-01"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let loan = get_body_json(response).await;
    let id = loan["id"].as_i64().unwrap();
    assert_eq!(loan["outstanding_balance"], 5000000.0);
    assert_eq!(loan["status"], "active");

    // Prepayment decrements the balance
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/repayments/{}/prepayment", id),
            serde_json::json!({"amount": 500000.0, "payment_date": "2026-03-01"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/repayments/{}", id)))
        .await
        .unwrap();
    let loan = get_body_json(response).await;
    assert_eq!(loan["outstanding_balance"], 4500000.0);

    // History records the event
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/repayments/{}/history", id)))
        .await
        .unwrap();
    let history = get_body_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["type"], "prepayment");

    // Summary reflects the new balance
    let response = app
        .oneshot(get_request("/api/repayments"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["summary"]["total_outstanding"], 4500000.0);
    assert_eq!(json["summary"]["total_repayments"], 1);
}

#[tokio::test]
async fn test_repayment_unknown_id_is_404() {
    let app = setup_test_app();
    let response = app
        .oneshot(get_request("/api/repayments/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
