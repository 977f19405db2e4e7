pub mod notification_sink;
pub mod payment_provider;
