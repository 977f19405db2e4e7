use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    PastDue,
    Trialing,
    Incomplete,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Incomplete => "incomplete",
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, SubscriptionStatus::Incomplete)
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a subscription in `status` lets the tenant act at `now`.
///
/// Active rows are valid until `current_period_end`; trialing rows until
/// `trial_end`, and a trial without an end date is never valid. Both bounds
/// are exclusive.
pub fn grants_access(
    status: SubscriptionStatus,
    current_period_end: NaiveDateTime,
    trial_end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> bool {
    match status {
        SubscriptionStatus::Active => now < current_period_end,
        SubscriptionStatus::Trialing => trial_end.is_some_and(|end| now < end),
        SubscriptionStatus::Cancelled
        | SubscriptionStatus::PastDue
        | SubscriptionStatus::Incomplete => false,
    }
}

/// Calendar month after `start`, used for every billing period.
pub fn one_month_after(start: NaiveDateTime) -> NaiveDateTime {
    start
        .checked_add_months(Months::new(1))
        .unwrap_or(start + Duration::days(30))
}

/// Whole days from `now` until `end`, never negative.
pub fn days_remaining(end: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (end - now).num_days().max(0)
}
