//! Reward computation errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::IdentityId;

/// Error during reward computation.
///
/// Every variant is a fatal configuration or input defect: the
/// computation aborts before any side effect, nothing is partially
/// allocated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewardError {
    #[error("No reward period type is configured")]
    MissingPeriodType,

    #[error("No budget type is configured")]
    MissingBudgetType,

    #[error("Configured reward amount is negative: {0}")]
    NegativeConfiguredAmount(Decimal),

    #[error("Scoring source assigned negative points ({points}) to identity {identity_id}")]
    NegativePoints {
        identity_id: IdentityId,
        points: Decimal,
    },

    #[error("Identity {identity_id} is a member of more than one reward team")]
    DuplicateTeamMembership { identity_id: IdentityId },

    #[error("Fixed team budgets ({fixed}) meet or exceed the total configured budget ({total})")]
    FixedTeamBudgetsExceedTotal { fixed: Decimal, total: Decimal },
}

/// Result type for reward computation.
pub type RewardResult<T> = Result<T, RewardError>;
