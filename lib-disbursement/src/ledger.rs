//! Token ledger capability.
//!
//! The blockchain client itself (signing, gas, nonces, mining) lives
//! behind this trait. The engine only needs to read balances and
//! submit transfers; confirmation is reported back later through
//! reconciliation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Static description of the reward token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    pub symbol: String,
    pub decimals: u8,
}

/// One transfer to submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    /// Short human-readable label shown next to the transaction
    pub label: String,
    /// Longer message describing how the amount was earned
    pub message: String,
}

/// Reference to a submitted, not yet confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHandle {
    pub hash: String,
}

/// Capability to move reward tokens.
///
/// Submissions may block and may fail independently of each other;
/// the orchestrator treats each call as its own retryable unit.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Address of the funded admin wallet transfers are sent from,
    /// `None` when not configured.
    async fn admin_wallet_address(&self) -> Result<Option<String>, LedgerError>;

    async fn balance_of(&self, address: &str) -> Result<Decimal, LedgerError>;

    /// Submit a transfer. Returning `Ok` means the transaction was
    /// accepted by the ledger, not that it is mined.
    async fn transfer(&self, request: TransferRequest) -> Result<TransactionHandle, LedgerError>;

    fn token_details(&self) -> TokenDetails;
}
