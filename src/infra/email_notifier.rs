use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::infra::http_client;
use crate::{
    app_error::{AppError, AppResult},
    application::{
        email_templates,
        ports::notification_sink::{NotificationSink, PaymentNotification},
    },
};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Clone)]
pub struct ResendEmailSender {
    client: Client,
    api_key: String,
    from_email: String,
}

#[derive(Serialize)]
struct ResendReq<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendEmailSender {
    pub fn new(api_key: String, from_email: String) -> Self {
        Self {
            client: http_client::build_client(),
            api_key,
            from_email,
        }
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let body = ResendReq {
            from: &self.from_email,
            to: [to],
            subject,
            html,
        };

        self.client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send email: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::Internal(format!("Email API error: {e}")))?;

        Ok(())
    }
}

/// Renders payment notifications and sends them on a background task.
#[derive(Clone)]
pub struct EmailNotificationSink {
    sender: ResendEmailSender,
    app_origin: String,
}

impl EmailNotificationSink {
    pub fn new(sender: ResendEmailSender, app_origin: String) -> Self {
        Self { sender, app_origin }
    }
}

#[async_trait]
impl NotificationSink for EmailNotificationSink {
    async fn enqueue(&self, notification: PaymentNotification) -> AppResult<()> {
        let (subject, html) = email_templates::render(&self.app_origin, &notification);
        let to = notification.recipient().to_string();
        let kind = notification.kind();
        let sender = self.sender.clone();

        tokio::spawn(async move {
            match sender.send(&to, &subject, &html).await {
                Ok(()) => tracing::info!(kind, "Notification email sent"),
                Err(e) => tracing::warn!(kind, error = %e, "Notification email failed"),
            }
        });

        Ok(())
    }
}
