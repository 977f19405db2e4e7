pub mod feature_limits;
pub mod gated_resource;
pub mod invoice_status;
pub mod payment_status;
pub mod payment_type;
pub mod subscription;
pub mod user_role;
pub mod webhook_event;
