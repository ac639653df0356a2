//! Reward engine data model.
//! Stable, storage-neutral, behavior-light.
//!
//! These types are shared between the pure computation core
//! (`lib-reward-engine`) and the disbursement layer
//! (`lib-disbursement`). They carry no I/O: period boundary
//! resolution is plain calendar arithmetic, and the report
//! aggregate only derives counters from its own rows.

pub mod errors;
pub mod period;
pub mod report;
pub mod reward;
pub mod settings;
pub mod team;
pub mod wallet;

pub use errors::{RewardError, RewardResult};
pub use period::{RewardPeriod, RewardPeriodStatus, RewardPeriodType};
pub use report::{RewardReport, RewardReportStatus};
pub use reward::{RewardStatus, RewardTransaction, TransactionStatus, WalletReward};
pub use settings::{RewardBudgetType, RewardSettings};
pub use team::{RewardTeam, TeamBudgetType};
pub use wallet::Wallet;

/// Technical identifier of a participant (user identity).
pub type IdentityId = u64;

/// Epoch seconds (UTC).
pub type EpochSeconds = i64;
