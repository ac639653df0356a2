//! Budget allocation.
//!
//! Turns a configured amount and a budget type into per-identity token
//! amounts. The defining rule of the whole engine is the
//! proportional-to-points split of a fixed pool:
//! `amount[i] = points[i] * (budget / total_points)`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use lib_reward_types::{IdentityId, RewardBudgetType, RewardError, RewardResult};

/// Allocate the configured budget across the eligible set.
///
/// - `FixedPerPoint`: direct rate, `amount = points * configured_amount`
/// - `Fixed`: `configured_amount` is the whole pool
/// - `FixedPerMember`: pool = `configured_amount * eligible count`
///
/// A non-positive pool or zero total points yields an empty allocation
/// (nothing to distribute, not an error). A negative configured amount
/// is a fatal configuration error.
pub fn allocate(
    budget_type: RewardBudgetType,
    configured_amount: Decimal,
    eligible: &BTreeMap<IdentityId, Decimal>,
) -> RewardResult<BTreeMap<IdentityId, Decimal>> {
    if configured_amount < Decimal::ZERO {
        return Err(RewardError::NegativeConfiguredAmount(configured_amount));
    }
    match budget_type {
        RewardBudgetType::FixedPerPoint => Ok(eligible
            .iter()
            .map(|(id, points)| (*id, points * configured_amount))
            .collect()),
        RewardBudgetType::Fixed => Ok(split_pool(configured_amount, eligible)),
        RewardBudgetType::FixedPerMember => {
            let pool = configured_amount * Decimal::from(eligible.len() as u64);
            Ok(split_pool(pool, eligible))
        }
    }
}

/// Split `pool` across `members` proportional to their points.
///
/// Empty when the pool or the point total is non-positive.
pub(crate) fn split_pool(
    pool: Decimal,
    members: &BTreeMap<IdentityId, Decimal>,
) -> BTreeMap<IdentityId, Decimal> {
    if pool <= Decimal::ZERO {
        return BTreeMap::new();
    }
    let total_points: Decimal = members.values().copied().sum();
    if total_points <= Decimal::ZERO {
        return BTreeMap::new();
    }
    let amount_per_point = pool / total_points;
    members
        .iter()
        .map(|(id, points)| (*id, points * amount_per_point))
        .collect()
}
