use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::feature_limits::FeatureLimits;

/// Tenant-scoped entity kinds whose creation is capped by the plan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GatedResource {
    Restaurant,
    Category,
    MenuItem,
    Staff,
}

impl GatedResource {
    pub fn label(&self) -> &'static str {
        match self {
            GatedResource::Restaurant => "Restaurant",
            GatedResource::Category => "Category",
            GatedResource::MenuItem => "Menu item",
            GatedResource::Staff => "Staff",
        }
    }

    pub fn limit_in(&self, limits: &FeatureLimits) -> i32 {
        match self {
            GatedResource::Restaurant => limits.max_restaurants,
            GatedResource::Category => limits.max_categories,
            GatedResource::MenuItem => limits.max_menu_items,
            GatedResource::Staff => limits.max_staff_accounts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_matching_limit() {
        let limits = FeatureLimits {
            max_restaurants: 1,
            max_categories: 2,
            max_menu_items: 3,
            max_staff_accounts: 4,
            ..Default::default()
        };
        assert_eq!(GatedResource::Restaurant.limit_in(&limits), 1);
        assert_eq!(GatedResource::Category.limit_in(&limits), 2);
        assert_eq!(GatedResource::MenuItem.limit_in(&limits), 3);
        assert_eq!(GatedResource::Staff.limit_in(&limits), 4);
    }

    #[test]
    fn parses_path_segments() {
        assert_eq!(
            "menu_item".parse::<GatedResource>().unwrap(),
            GatedResource::MenuItem
        );
        assert!("table".parse::<GatedResource>().is_err());
    }
}
