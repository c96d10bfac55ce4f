//! Domain models for Outlay

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A learned term -> category mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub term: String,
    pub category: String,
}

/// Result of running the categorization engine over one free-text entry.
///
/// Transient: produced fresh per request, never persisted. `ai_confidence`
/// and `options` are present exactly when the AI-fallback path ran: rule and
/// synonym matches are trusted silently, AI suggestions ask the user to
/// confirm.
///
/// `ai_confidence` is doubly optional: outer `None` means the field is
/// absent (rule path), `Some(None)` serializes as an explicit `null` (AI
/// path, but no confidence from the classifier).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub amount: Option<f64>,
    pub category: String,
    pub message: String,
    #[serde(rename = "AIConfidence", default, skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// A recorded expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "rawText")]
    pub raw_text: String,
    pub date: NaiveDate,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A user's investment portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(rename = "portfolioId")]
    pub id: i64,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A portfolio holding. The instrument details stay an opaque JSON document
/// (`data`); asset class and portfolio role are lifted out for querying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub id: i64,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    #[serde(rename = "portfolioId")]
    pub portfolio_id: i64,
    pub data: serde_json::Value,
    pub asset_class: String,
    pub portfolio_role: String,
}

/// An investment buy/sell record attached to a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentTxn {
    pub id: i64,
    #[serde(rename = "portfolioId")]
    pub portfolio_id: i64,
    pub date: NaiveDate,
    pub data: serde_json::Value,
}

/// Mutual fund scheme reference data, read-only from this system's side.
/// Field names follow the JSON the API serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualFund {
    #[serde(rename = "schemeCode")]
    pub scheme_code: String,
    pub name: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "currentNAV")]
    pub current_nav: f64,
    pub asset_class: String,
    #[serde(rename = "portfolioRole")]
    pub portfolio_role: String,
    #[serde(rename = "isETF")]
    pub is_etf: bool,
    pub amc: String,
    #[serde(rename = "schemeType")]
    pub scheme_type: String,
    #[serde(rename = "schemeSubtype")]
    pub scheme_subtype: String,
    pub option: String,
    pub plan: String,
    pub date: String,
}

/// Listed stock company reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCompany {
    pub symbol: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "listingDate")]
    pub listing_date: Option<String>,
    #[serde(rename = "isinNumber")]
    pub isin_number: String,
    pub exchange: String,
}

/// A loan being repaid in installments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repayment {
    pub id: i64,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    #[serde(rename = "type")]
    pub loan_type: String,
    pub institution: String,
    pub principal: f64,
    pub interest_rate: f64,
    pub emi_amount: f64,
    pub tenure_months: i64,
    pub outstanding_balance: f64,
    pub start_date: String,
    pub due_date: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment event in a repayment's history (EMI or prepayment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentEvent {
    pub id: i64,
    pub repayment_id: i64,
    pub amount: f64,
    pub payment_date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub principal_component: f64,
    pub interest_component: f64,
    pub created_at: DateTime<Utc>,
}
