use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Why a checkout was started. Informational: it shapes pricing and the
/// stored transaction reference, nothing else.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PaymentType {
    #[default]
    Registration,
    Renewal,
    Upgrade,
    /// Same-tier change. Never charged as an upgrade.
    Update,
}

/// The `"{type}:{plan_slug}"` value stored on a transaction so the plan can be
/// recovered at reconciliation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReference {
    pub payment_type: PaymentType,
    pub plan_slug: String,
}

impl PlanReference {
    pub fn new(payment_type: PaymentType, plan_slug: impl Into<String>) -> Self {
        Self {
            payment_type,
            plan_slug: plan_slug.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.payment_type, self.plan_slug)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let (kind, slug) = raw.split_once(':')?;
        if slug.is_empty() || slug.contains(':') {
            return None;
        }
        let payment_type = kind.parse().ok()?;
        Some(Self::new(payment_type, slug))
    }
}
