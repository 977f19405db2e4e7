pub mod payment;
pub mod payment_pages;
pub mod payment_webhook;
pub mod subscription;

use axum::Router;

use crate::adapters::http::app_state::AppState;

/// JSON API, nested under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/subscription", subscription::router())
        .nest("/owner/payment", payment::router())
        .nest("/payment/chapa", payment_webhook::router())
}

/// Browser-facing pages the provider redirects to after checkout.
pub fn pages_router() -> Router<AppState> {
    Router::new().nest("/payment", payment_pages::router())
}
