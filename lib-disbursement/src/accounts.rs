//! Identity, scoring and authorization capabilities.
//!
//! All three are consumed as opaque interfaces; their implementations
//! belong to other subsystems.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use rust_decimal::Decimal;

use lib_reward_types::{EpochSeconds, IdentityId, Wallet};

/// Resolves who owns which wallet.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `None` when the identity has no wallet at all.
    async fn resolve_wallet(&self, identity_id: IdentityId) -> anyhow::Result<Option<Wallet>>;
}

/// Source of earned points per period.
///
/// Calls may fail transiently; the caller logs the failure and treats
/// it as "no points" for that computation instead of propagating.
#[async_trait]
pub trait PointsSource: Send + Sync {
    /// Identities with at least one scored participation in the window.
    async fn participants(
        &self,
        start_seconds: EpochSeconds,
        end_seconds: EpochSeconds,
    ) -> anyhow::Result<Vec<IdentityId>>;

    async fn earned_points(
        &self,
        identity_ids: &BTreeSet<IdentityId>,
        start_seconds: EpochSeconds,
        end_seconds: EpochSeconds,
    ) -> anyhow::Result<BTreeMap<IdentityId, Decimal>>;
}

/// Who may trigger a disbursement.
pub trait AuthorizationCheck: Send + Sync {
    fn is_rewarding_admin(&self, actor: &str) -> bool;
}
