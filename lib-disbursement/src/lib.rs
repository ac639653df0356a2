//! Reward disbursement services.
//!
//! Glues the pure allocation engine to the outside world: identity
//! and scoring sources, the token ledger, storage and authorization
//! all arrive as injected capabilities. `RewardReportService` is the
//! entry point for computing, sending and reconciling reward reports;
//! `RewardSettingsService` owns the configuration they run under.

pub mod accounts;
pub mod errors;
pub mod ledger;
pub mod service;
pub mod settings;
pub mod storage;

pub use accounts::{AuthorizationCheck, IdentityResolver, PointsSource};
pub use errors::{DisbursementError, DisbursementResult, LedgerError, StorageError};
pub use ledger::{TokenDetails, TokenLedger, TransactionHandle, TransferRequest};
pub use service::{ReconcileOutcome, RewardReportService, SendOutcome};
pub use settings::RewardSettingsService;
pub use storage::{MemoryRewardStorage, RewardStorage};
