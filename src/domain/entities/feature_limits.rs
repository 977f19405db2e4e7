use serde::{Deserialize, Serialize};

/// Entitlements decoded from a plan's `features` JSON.
///
/// Numeric limits of zero or below mean "unlimited". Missing keys decode to
/// zero, so an omitted limit is also unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureLimits {
    pub max_restaurants: i32,
    pub max_categories: i32,
    pub max_menu_items: i32,
    pub max_staff_accounts: i32,
    pub activity_log_enabled: bool,
    pub activity_log_days: i32,
    pub analytics_enabled: bool,
    pub analytics_history_days: i32,
    pub search_priority_boost: i32,
}

impl FeatureLimits {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone())
    }
}

/// The single comparison every gate uses.
pub fn limit_reached(limit: i32, current: i64) -> bool {
    limit > 0 && current >= i64::from(limit)
}
