//! Reward teams (pools).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::IdentityId;

/// Budget policy of a single team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamBudgetType {
    /// The team's `budget` field is its whole pool
    Fixed,
    /// Pool = budget × member count
    FixedPerMember,
    /// Equal per-head share of whatever remains once all fixed teams
    /// are funded
    Computed,
}

/// A named subset of participants with its own budget policy.
///
/// Membership must not overlap between teams within one period; the
/// engine rejects duplicates instead of resolving them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTeam {
    pub id: u64,
    pub name: String,
    pub budget_type: TeamBudgetType,
    /// Ignored for `Computed` teams
    pub budget: Decimal,
    pub members: Vec<IdentityId>,
    pub disabled: bool,
}

impl RewardTeam {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
