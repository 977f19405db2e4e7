use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Role carried by every authenticated identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, AsRefStr, Display,
    EnumString,
)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UserRole {
    /// Platform operator. Exempt from tier limits.
    Admin,
    /// Tenant root. Owns restaurants and the subscription lineage.
    Owner,
    /// Bound to a single restaurant of one owner.
    Staff,
}
