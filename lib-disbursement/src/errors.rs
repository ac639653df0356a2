//! Disbursement errors.
//!
//! Taxonomy: configuration and computation defects come in through
//! `RewardError`; precondition failures abort a send pass before any
//! transaction is submitted; per-item submission failures are *not*
//! here, they are caught and logged inside the pass.

use rust_decimal::Decimal;
use thiserror::Error;

use lib_reward_types::{EpochSeconds, RewardError};

/// Error talking to the token ledger.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("Transfer submission failed: {0}")]
    Submission(String),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Error in the storage capability.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Storage failure: {0}")]
    Backend(String),
}

/// Error during reward disbursement.
#[derive(Error, Debug)]
pub enum DisbursementError {
    /// Actor lacks the rewarding-admin capability
    #[error("Actor '{0}' is not allowed to send rewards")]
    PermissionDenied(String),

    /// Rewards are only sendable for a closed period
    #[error("Cannot send rewards for a period that ends at {end_seconds}, it is still open")]
    PeriodNotClosed { end_seconds: EpochSeconds },

    /// A previous pass has unresolved transactions; sending again
    /// would risk double payment
    #[error("{count} reward transaction(s) are still pending from a previous pass")]
    PendingTransactions { count: u64 },

    #[error("No admin wallet is configured")]
    AdminWalletMissing,

    #[error("Admin wallet balance {balance} is below the {required} required to send rewards")]
    InsufficientAdminBalance { balance: Decimal, required: Decimal },

    /// Another send pass is persisting its results right now
    #[error("A reward send pass is already in progress")]
    SendingInProgress,

    #[error("No stored reward references transaction {0}")]
    UnknownTransaction(String),

    #[error(transparent)]
    Computation(#[from] RewardError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type for disbursement operations.
pub type DisbursementResult<T> = Result<T, DisbursementError>;
