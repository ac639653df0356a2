//! Merging a fresh computation into the period's report.
//!
//! Recomputation must never rewrite history: a reward whose
//! transaction is pending or succeeded keeps its in-flight amount,
//! everything else takes the freshly computed value. Points are always
//! refreshed.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use lib_reward_types::{IdentityId, RewardReport, RewardStatus, Wallet, WalletReward};

use crate::eligibility::Screening;
use crate::pools::PooledAllocation;

/// Merge screening and allocation results into `report`.
///
/// Rows are kept for every identity that either earned points this
/// computation (eligible or below threshold) or already has a row with
/// transaction history. Stored rows for identities that vanished from
/// the candidate set are preserved untouched.
pub fn merge_report(
    report: &mut RewardReport,
    wallets: &BTreeMap<IdentityId, Wallet>,
    screening: &Screening,
    allocation: &PooledAllocation,
) {
    for (identity_id, wallet) in wallets {
        let points = screening
            .eligible
            .get(identity_id)
            .or_else(|| screening.below_threshold.get(identity_id))
            .copied()
            .unwrap_or(Decimal::ZERO);
        let amount = allocation
            .amounts
            .get(identity_id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let pool_name = allocation
            .pool_names
            .get(identity_id)
            .cloned()
            .unwrap_or_default();

        match report.reward_of_mut(*identity_id) {
            Some(existing) => {
                existing.wallet = wallet.clone();
                existing.points = points;
                match existing.status() {
                    // In-flight or settled amounts are history
                    RewardStatus::Pending | RewardStatus::Success => {
                        debug!(
                            identity_id,
                            status = ?existing.status(),
                            "keeping transacted amount across recomputation"
                        );
                    }
                    RewardStatus::NotSent | RewardStatus::Failed => {
                        existing.amount = amount;
                        existing.pool_name = pool_name;
                    }
                }
            }
            None => {
                if points == Decimal::ZERO && amount == Decimal::ZERO {
                    continue;
                }
                let mut reward = WalletReward::new(wallet.clone(), points, amount);
                reward.pool_name = pool_name;
                report.rewards.push(reward);
            }
        }
    }
}
