use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_error::AppResult;

// ============================================================================
// Port Types - Provider-agnostic checkout types
// ============================================================================

/// Client-generated transaction reference, shared by the transaction and its
/// invoice (as the invoice number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxRef(pub String);

impl TxRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!("tx_{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the provider needs to open a hosted checkout page.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub tx_ref: TxRef,
    pub amount_cents: i64,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub callback_url: String,
    pub return_url: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub checkout_url: String,
}

/// Result of asking the provider about a transaction by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentVerification {
    /// True only when both the API call and the payment itself succeeded.
    pub verified: bool,
    /// Provider-assigned reference, when the provider returned one.
    pub provider_reference: Option<String>,
    /// Raw payment status as reported by the provider.
    pub status: Option<String>,
}

// ============================================================================
// Port Trait
// ============================================================================

#[async_trait]
pub trait PaymentProviderPort: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn initialize_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession>;

    async fn verify_transaction(&self, tx_ref: &TxRef) -> AppResult<PaymentVerification>;
}

/// Formats minor units as the decimal string providers expect ("19.99").
pub fn format_amount(amount_cents: i64) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let abs = amount_cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parses a provider decimal string ("19.99", "20", "7.5") into minor units.
pub fn parse_amount(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (whole, frac) = match raw.split_once('.') {
        Some((w, f)) => (w, f),
        None => (raw, ""),
    };
    if whole.is_empty() || frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac_cents)
}
