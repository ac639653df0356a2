//! Global reward settings.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::RewardPeriodType;

/// How the configured amount scales into the distributed budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardBudgetType {
    /// The configured amount is the whole pool, split proportionally
    /// to points
    Fixed,
    /// Pool = amount × eligible member count, split proportionally
    /// to points
    FixedPerMember,
    /// Direct rate: each member gets points × amount, no pooling
    FixedPerPoint,
}

/// Reward configuration, one instance per deployment.
///
/// `period_type` and `budget_type` are optional because an unset
/// value is a configuration error the engine must surface, not
/// default away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSettings {
    pub period_type: Option<RewardPeriodType>,
    pub time_zone: Tz,
    pub budget_type: Option<RewardBudgetType>,
    /// Budget amount or per-unit rate, meaning depends on `budget_type`
    pub amount: Decimal,
    /// Minimum earned points for a budget share
    pub threshold: Decimal,
    /// Partition eligible members into team pools before splitting
    pub use_pools: bool,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            period_type: Some(RewardPeriodType::DEFAULT),
            time_zone: Tz::UTC,
            budget_type: Some(RewardBudgetType::Fixed),
            amount: Decimal::ZERO,
            threshold: Decimal::ZERO,
            use_pools: false,
        }
    }
}
