//! Per-participant reward entries and their transactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::RewardPeriodType;
use crate::wallet::Wallet;
use crate::{EpochSeconds, IdentityId};

/// On-chain state of one submitted reward transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Submitted, not yet mined
    Pending,
    /// Mined successfully, immutable from here on
    Success,
    /// Mined but reverted, or dropped
    Failed,
}

/// A reward transfer submitted to the token ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTransaction {
    pub hash: String,
    pub period_type: RewardPeriodType,
    pub start_seconds: EpochSeconds,
    pub receiver_identity_id: IdentityId,
    pub status: TransactionStatus,
    pub tokens_sent: Decimal,
}

/// Derived send state of one reward entry.
///
/// `NotSent -> Pending -> {Success, Failed}`; `Failed` entries go
/// back through `Pending` on the next send pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStatus {
    NotSent,
    Pending,
    Success,
    Failed,
}

/// One participant's reward for one period.
///
/// `amount` is never negative; a positive amount means the identity
/// passed wallet and threshold checks at computation time. Once the
/// attached transaction succeeds the entry is append-only history and
/// recomputation must not change its amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletReward {
    pub identity_id: IdentityId,
    pub wallet: Wallet,
    /// Earned points, possibly zero
    pub points: Decimal,
    /// Allocated token amount
    pub amount: Decimal,
    /// Team name, empty outside pooled allocation
    pub pool_name: String,
    pub transaction: Option<RewardTransaction>,
}

impl WalletReward {
    pub fn new(wallet: Wallet, points: Decimal, amount: Decimal) -> Self {
        Self {
            identity_id: wallet.identity_id,
            wallet,
            points,
            amount,
            pool_name: String::new(),
            transaction: None,
        }
    }

    /// Eligibility snapshot of the underlying wallet.
    pub fn is_enabled(&self) -> bool {
        self.wallet.can_receive()
    }

    pub fn status(&self) -> RewardStatus {
        match &self.transaction {
            None => RewardStatus::NotSent,
            Some(tx) => match tx.status {
                TransactionStatus::Pending => RewardStatus::Pending,
                TransactionStatus::Success => RewardStatus::Success,
                TransactionStatus::Failed => RewardStatus::Failed,
            },
        }
    }

    /// Amount locked in an in-flight or confirmed transaction.
    pub fn tokens_sent(&self) -> Decimal {
        match &self.transaction {
            Some(tx) if tx.status != TransactionStatus::Failed => tx.tokens_sent,
            _ => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn wallet(id: IdentityId) -> Wallet {
        Wallet {
            identity_id: id,
            address: format!("0x{id:040x}"),
            enabled: true,
            initialized: true,
            deleted: false,
        }
    }

    fn tx(status: TransactionStatus, sent: Decimal) -> RewardTransaction {
        RewardTransaction {
            hash: "0xabc".into(),
            period_type: RewardPeriodType::Week,
            start_seconds: 0,
            receiver_identity_id: 1,
            status,
            tokens_sent: sent,
        }
    }

    #[test]
    fn status_follows_transaction() {
        let mut reward = WalletReward::new(wallet(1), dec!(10), dec!(25));
        assert_eq!(reward.status(), RewardStatus::NotSent);

        reward.transaction = Some(tx(TransactionStatus::Pending, dec!(25)));
        assert_eq!(reward.status(), RewardStatus::Pending);

        reward.transaction = Some(tx(TransactionStatus::Success, dec!(25)));
        assert_eq!(reward.status(), RewardStatus::Success);
    }

    #[test]
    fn failed_transaction_frees_tokens() {
        let mut reward = WalletReward::new(wallet(1), dec!(10), dec!(25));
        reward.transaction = Some(tx(TransactionStatus::Failed, dec!(25)));
        assert_eq!(reward.tokens_sent(), dec!(0));
        assert_eq!(reward.status(), RewardStatus::Failed);
    }

    #[test]
    fn disabled_wallet_is_not_enabled() {
        let mut w = wallet(2);
        w.enabled = false;
        assert!(!WalletReward::new(w, dec!(1), dec!(1)).is_enabled());
    }
}
