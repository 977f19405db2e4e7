use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use serde::Deserialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppError,
    application::{
        email_templates::escape, use_cases::payment::ReturnOutcome, validators::is_valid_tx_ref,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/success", get(payment_success))
        .route("/cancel", get(payment_cancel))
}

/// The provider is inconsistent about the parameter name, so all three are
/// accepted in this order.
#[derive(Debug, Default, Deserialize)]
struct ReturnQuery {
    trx_ref: Option<String>,
    tx_ref: Option<String>,
    reference: Option<String>,
    status: Option<String>,
}

impl ReturnQuery {
    fn tx_ref(&self) -> Option<&str> {
        [&self.trx_ref, &self.tx_ref, &self.reference]
            .into_iter()
            .filter_map(|v| v.as_deref().map(str::trim))
            .find(|v| !v.is_empty())
    }
}

type Page = (StatusCode, Html<String>);

async fn payment_success(
    State(app_state): State<AppState>,
    Query(query): Query<ReturnQuery>,
) -> Page {
    let Some(tx_ref) = query.tx_ref() else {
        tracing::warn!("Payment return without transaction reference");
        return error_page(
            StatusCode::BAD_REQUEST,
            "Invalid payment reference. Please contact support if payment was deducted.",
        );
    };

    tracing::info!(tx_ref, status = ?query.status, "Payment return received");

    match app_state.payment_use_cases.confirm_return(tx_ref).await {
        Ok(ReturnOutcome::Confirmed { tx_ref, reconciled }) => {
            if !reconciled {
                tracing::warn!(tx_ref = %tx_ref, "Verified payment not yet reconciled");
            }
            (
                StatusCode::OK,
                Html(render_page(
                    "Payment Successful",
                    "Your payment was received and your subscription is now active.",
                    Some(&tx_ref),
                    "#16a34a",
                )),
            )
        }
        Ok(ReturnOutcome::NotVerified { tx_ref, status }) => {
            let status = status.or_else(|| query.status.clone()).unwrap_or_else(|| "unknown".into());
            (
                StatusCode::OK,
                Html(render_page(
                    "Payment Not Completed",
                    &format!("The payment could not be confirmed (status: {}).", status),
                    Some(&tx_ref),
                    "#dc2626",
                )),
            )
        }
        Err(AppError::InvalidInput(_)) => error_page(
            StatusCode::BAD_REQUEST,
            "Invalid payment reference. Please contact support if payment was deducted.",
        ),
        Err(e) => {
            tracing::error!(tx_ref, error = %e, "Payment verification failed");
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "We could not verify your payment right now. Please check back shortly.",
            )
        }
    }
}

async fn payment_cancel(Query(query): Query<ReturnQuery>) -> Page {
    let tx_ref = query.trx_ref.as_deref().filter(|r| is_valid_tx_ref(r));
    (
        StatusCode::OK,
        Html(render_page(
            "Payment Cancelled",
            "Payment was cancelled. You can try again.",
            tx_ref,
            "#6b7280",
        )),
    )
}

fn error_page(status: StatusCode, message: &str) -> Page {
    (
        status,
        Html(render_page("Payment Error", message, None, "#dc2626")),
    )
}

fn render_page(headline: &str, message: &str, tx_ref: Option<&str>, accent: &str) -> String {
    let reference = tx_ref
        .map(|r| {
            format!(
                r#"<p style="margin:16px 0 0;font-size:13px;color:#6b7280;">Reference: <code>{}</code></p>"#,
                escape(r)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head><meta charset="utf-8"><title>{headline} - MenuVista</title></head>
  <body style="background:#f8fafc;margin:0;padding:48px 24px;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:480px;margin:0 auto;background:#ffffff;border:1px solid #e5e7eb;border-radius:12px;padding:32px;text-align:center;">
      <h1 style="margin:0 0 12px;font-size:24px;color:{accent};">{headline}</h1>
      <p style="margin:0;font-size:15px;color:#111827;line-height:1.6;">{message}</p>
      {reference}
    </div>
  </body>
</html>
"#,
        headline = escape(headline),
        message = escape(message),
    )
}
