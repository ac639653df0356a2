//! Per-period reward report aggregate and roll-ups.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::{RewardPeriod, RewardPeriodStatus};
use crate::reward::{RewardStatus, WalletReward};
use crate::IdentityId;

/// The complete allocation-and-send state of one period: one entry
/// per participant plus the owning period.
///
/// The report exclusively owns its `WalletReward` rows; roll-up
/// counters are always derived from the rows, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RewardReport {
    pub period: Option<RewardPeriod>,
    pub rewards: Vec<WalletReward>,
    /// Raw participation count in the period, informational only
    pub participations_count: u64,
}

impl RewardReport {
    pub fn new(period: RewardPeriod) -> Self {
        Self {
            period: Some(period),
            rewards: Vec::new(),
            participations_count: 0,
        }
    }

    pub fn reward_of(&self, identity_id: IdentityId) -> Option<&WalletReward> {
        self.rewards.iter().find(|r| r.identity_id == identity_id)
    }

    pub fn reward_of_mut(&mut self, identity_id: IdentityId) -> Option<&mut WalletReward> {
        self.rewards.iter_mut().find(|r| r.identity_id == identity_id)
    }

    fn count_status(&self, status: RewardStatus) -> u64 {
        self.rewards.iter().filter(|r| r.status() == status).count() as u64
    }

    pub fn pending_transaction_count(&self) -> u64 {
        self.count_status(RewardStatus::Pending)
    }

    pub fn success_transaction_count(&self) -> u64 {
        self.count_status(RewardStatus::Success)
    }

    pub fn failed_transaction_count(&self) -> u64 {
        self.count_status(RewardStatus::Failed)
    }

    pub fn transactions_count(&self) -> u64 {
        self.rewards.iter().filter(|r| r.transaction.is_some()).count() as u64
    }

    /// Entries that actually carry a budget share.
    pub fn valid_rewards(&self) -> impl Iterator<Item = &WalletReward> {
        self.rewards
            .iter()
            .filter(|r| r.amount > Decimal::ZERO && r.is_enabled())
    }

    pub fn valid_reward_count(&self) -> u64 {
        self.valid_rewards().count() as u64
    }

    /// Total allocated amount, sent or not.
    pub fn tokens_to_send(&self) -> Decimal {
        self.rewards.iter().map(|r| r.amount).sum()
    }

    /// Amount carried by in-flight or confirmed transactions.
    pub fn tokens_sent(&self) -> Decimal {
        self.rewards.iter().map(|r| r.tokens_sent()).sum()
    }

    /// Allocated amount not yet covered by a pending or succeeded
    /// transaction. This is what the admin wallet must hold before a
    /// send pass starts.
    pub fn remaining_tokens_to_send(&self) -> Decimal {
        self.rewards
            .iter()
            .filter(|r| r.tokens_sent() == Decimal::ZERO)
            .map(|r| r.amount)
            .sum()
    }

    pub fn has_pending_transactions(&self) -> bool {
        self.pending_transaction_count() > 0
    }

    /// Every valid reward has a succeeded transaction.
    ///
    /// Success count can exceed the valid count when a member was
    /// disabled after their transaction confirmed, hence `>=`.
    pub fn is_completely_proceeded(&self) -> bool {
        self.transactions_count() > 0
            && self.success_transaction_count() >= self.valid_reward_count()
    }

    /// Summary view for callers that only need the counters.
    pub fn status(&self) -> RewardReportStatus {
        RewardReportStatus {
            period: self.period.clone(),
            period_status: self
                .period
                .as_ref()
                .map(|p| p.status)
                .unwrap_or_default(),
            participant_count: self.rewards.len() as u64,
            valid_reward_count: self.valid_reward_count(),
            pending_transaction_count: self.pending_transaction_count(),
            success_transaction_count: self.success_transaction_count(),
            failed_transaction_count: self.failed_transaction_count(),
            tokens_to_send: self.tokens_to_send(),
            tokens_sent: self.tokens_sent(),
            remaining_tokens_to_send: self.remaining_tokens_to_send(),
            completely_proceeded: self.is_completely_proceeded(),
        }
    }
}

/// Read-only summary of a report, serializable for UIs and operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardReportStatus {
    pub period: Option<RewardPeriod>,
    pub period_status: RewardPeriodStatus,
    pub participant_count: u64,
    pub valid_reward_count: u64,
    pub pending_transaction_count: u64,
    pub success_transaction_count: u64,
    pub failed_transaction_count: u64,
    pub tokens_to_send: Decimal,
    pub tokens_sent: Decimal,
    pub remaining_tokens_to_send: Decimal,
    pub completely_proceeded: bool,
}
