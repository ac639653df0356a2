//! Participant screening.
//!
//! Splits the candidate set into the budget-eligible set and the
//! informational below-threshold set. Pure: returns new maps, never
//! mutates its inputs.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use lib_reward_types::{IdentityId, RewardError, RewardResult, Wallet};

/// Outcome of screening one period's candidates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Screening {
    /// Identities that receive a budget share, with their points
    pub eligible: BTreeMap<IdentityId, Decimal>,
    /// Earned points but fell below the threshold; retained as
    /// zero-amount rows so operators can see "earned but not rewarded"
    pub below_threshold: BTreeMap<IdentityId, Decimal>,
}

/// Screen wallet candidates against earned points and the threshold.
///
/// Policy, per identity:
/// - wallet disabled, uninitialized, deleted, or address-less: removed
///   entirely
/// - missing points: treated as zero
/// - negative points: scoring-source defect, fatal
/// - zero points: removed silently
/// - positive points below `threshold`: kept in `below_threshold`
pub fn screen_participants(
    earned: &BTreeMap<IdentityId, Decimal>,
    wallets: &BTreeMap<IdentityId, Wallet>,
    threshold: Decimal,
) -> RewardResult<Screening> {
    let mut screening = Screening::default();
    for (identity_id, wallet) in wallets {
        if !wallet.can_receive() {
            continue;
        }
        let points = earned.get(identity_id).copied().unwrap_or(Decimal::ZERO);
        if points < Decimal::ZERO {
            return Err(RewardError::NegativePoints {
                identity_id: *identity_id,
                points,
            });
        }
        if points == Decimal::ZERO {
            continue;
        }
        if points < threshold {
            screening.below_threshold.insert(*identity_id, points);
        } else {
            screening.eligible.insert(*identity_id, points);
        }
    }
    Ok(screening)
}
