use serde::{Deserialize, Serialize};

/// Event names the payment provider sends to the webhook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "payment.success")]
    PaymentSuccess,
    #[serde(rename = "payment.failed")]
    PaymentFailed,
    #[serde(rename = "payment.pending")]
    PaymentPending,
}

impl WebhookEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEventType::PaymentSuccess => "payment.success",
            WebhookEventType::PaymentFailed => "payment.failed",
            WebhookEventType::PaymentPending => "payment.pending",
        }
    }

    /// Unknown names yield `None`; callers log and acknowledge them.
    pub fn parse(event: &str) -> Option<Self> {
        match event {
            "payment.success" => Some(WebhookEventType::PaymentSuccess),
            "payment.failed" => Some(WebhookEventType::PaymentFailed),
            "payment.pending" => Some(WebhookEventType::PaymentPending),
            _ => None,
        }
    }

    /// Status string the provider reports inside `data.status` for this event.
    pub fn data_status(&self) -> &'static str {
        match self {
            WebhookEventType::PaymentSuccess => "success",
            WebhookEventType::PaymentFailed => "failed",
            WebhookEventType::PaymentPending => "pending",
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
