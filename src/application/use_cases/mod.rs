pub mod payment;
pub mod payment_webhook;
pub mod subscription;
pub mod tier_gate;
