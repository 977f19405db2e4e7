use url::Url;

use crate::application::ports::{
    notification_sink::PaymentNotification, payment_provider::format_amount,
};

const BRAND_NAME: &str = "MenuVista";

pub const PAYMENT_SUCCESS_SUBJECT: &str = "Payment Confirmation - MenuVista";
pub const PAYMENT_FAILED_SUBJECT: &str = "Payment Failed - Action Required";
pub const PAYMENT_PENDING_SUBJECT: &str = "Payment Pending - MenuVista";

fn origin_label(app_origin: &str) -> String {
    Url::parse(app_origin)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()))
        .unwrap_or_else(|| app_origin.to_string())
}

pub fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn primary_button(url: &str, label: &str) -> String {
    format!(
        r#"<a href="{url}" style="display:inline-block;padding:12px 18px;background-color:#dc2626;color:#ffffff;text-decoration:none;border-radius:8px;font-weight:600;">{label}</a>"#
    )
}

/// Renders any payment notification into `(subject, html)`.
pub fn render(app_origin: &str, notification: &PaymentNotification) -> (String, String) {
    match notification {
        PaymentNotification::Succeeded {
            name,
            invoice_number,
            amount_cents,
            currency,
            ..
        } => payment_success_email(app_origin, name, invoice_number, *amount_cents, currency),
        PaymentNotification::Failed {
            name,
            update_payment_url,
            ..
        } => payment_failed_email(app_origin, name, update_payment_url),
        PaymentNotification::Pending { name, .. } => payment_pending_email(app_origin, name),
    }
}

pub fn payment_success_email(
    app_origin: &str,
    name: &str,
    invoice_number: &str,
    amount_cents: i64,
    currency: &str,
) -> (String, String) {
    let lead = format!(
        "Hi <strong>{}</strong>, thank you for your payment. Your subscription has been activated.",
        escape(name)
    );
    let body = format!(
        r#"<div style="margin:12px 0 0;padding:16px;background:#f9fafb;border-radius:8px;">
        <p style="margin:0 0 8px;color:#374151;"><strong>Invoice:</strong> {invoice}</p>
        <p style="margin:0 0 8px;color:#374151;"><strong>Amount:</strong> {amount} {currency}</p>
        <p style="margin:0;color:#059669;font-weight:600;"><strong>Status:</strong> Paid</p>
      </div>"#,
        invoice = escape(invoice_number),
        amount = format_amount(amount_cents),
        currency = escape(currency),
    );

    let html = wrap_email(
        app_origin,
        "Payment successful",
        &lead,
        &body,
        "you paid for a MenuVista subscription",
    );
    (PAYMENT_SUCCESS_SUBJECT.to_string(), html)
}

pub fn payment_failed_email(
    app_origin: &str,
    name: &str,
    update_payment_url: &str,
) -> (String, String) {
    let lead = format!(
        "Hi <strong>{}</strong>, we were unable to process your payment for your MenuVista subscription.",
        escape(name)
    );
    let button = primary_button(update_payment_url, "Update Payment Method");
    let body = format!(
        r#"<p style="margin:12px 0;color:#374151;">Your subscription is now past due. We will retry the charge, but you can update your payment method right away to avoid losing access.</p>{button}"#
    );

    let html = wrap_email(
        app_origin,
        "Payment failed",
        &lead,
        &body,
        "a payment for your MenuVista subscription failed",
    );
    (PAYMENT_FAILED_SUBJECT.to_string(), html)
}

pub fn payment_pending_email(app_origin: &str, name: &str) -> (String, String) {
    let lead = format!(
        "Hi <strong>{}</strong>, we have received your payment request and it is currently being processed.",
        escape(name)
    );
    let body = "<p style=\"margin:12px 0 0;color:#374151;\">We'll email you again as soon as the payment is confirmed.</p>";

    let html = wrap_email(
        app_origin,
        "Payment pending",
        &lead,
        body,
        "you started a payment for a MenuVista subscription",
    );
    (PAYMENT_PENDING_SUBJECT.to_string(), html)
}

pub fn wrap_email(
    app_origin: &str,
    headline: &str,
    lead: &str,
    body_html: &str,
    reason: &str,
) -> String {
    let origin = origin_label(app_origin);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <body style="background:#f8fafc;margin:0;padding:24px;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:560px;margin:0 auto;background:#ffffff;border:1px solid #e5e7eb;border-radius:12px;padding:24px;">
      <div style="font-size:12px;letter-spacing:0.08em;text-transform:uppercase;color:#6b7280;">{brand} - {origin}</div>
      <h1 style="margin:12px 0 8px;font-size:22px;color:#111827;">{headline}</h1>
      <p style="margin:0 0 12px;font-size:15px;color:#111827;line-height:1.6;">{lead}</p>
      {body_html}
      <div style="margin-top:20px;padding-top:16px;border-top:1px solid #e5e7eb;">
        <p style="margin:0;font-size:13px;color:#4b5563;">Why you got this email: {reason}.</p>
      </div>
      <p style="margin:14px 0 0;font-size:12px;color:#9ca3af;">Sent by {brand} - {origin}</p>
    </div>
  </body>
</html>
"#,
        brand = BRAND_NAME,
    )
}
