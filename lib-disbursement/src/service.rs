//! Reward computation and send orchestration.
//!
//! # Design Principles
//! - Computation is re-runnable at any time; only `send_rewards`
//!   produces side effects outside storage.
//! - Preconditions are checked in a fixed order before the first
//!   transfer is submitted; after that point, per-item failures are
//!   logged and skipped so one bad wallet never blocks the rest.
//! - Persisting a send pass is serialized through an in-process flag;
//!   a second pass arriving mid-save is rejected, never queued.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use lib_reward_engine::{
    allocate, allocate_pooled, build_pools, merge_report, screen_participants, PooledAllocation,
};
use lib_reward_types::{
    EpochSeconds, IdentityId, RewardBudgetType, RewardError, RewardPeriod, RewardPeriodStatus,
    RewardReport, RewardReportStatus, RewardStatus, RewardTransaction, TransactionStatus, Wallet,
    WalletReward,
};

use crate::accounts::{AuthorizationCheck, IdentityResolver, PointsSource};
use crate::errors::{DisbursementError, DisbursementResult};
use crate::ledger::{TokenLedger, TransferRequest};
use crate::settings::RewardSettingsService;
use crate::storage::RewardStorage;

/// Result of a send pass that passed every precondition.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// At least one transfer was submitted this pass
    Submitted(RewardReport),
    /// Every valid reward is already in flight or settled
    NothingToSend(RewardReport),
}

/// Result of applying a transaction confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied,
    /// The transaction already reached a final succeeded state
    AlreadyDone,
}

/// Orchestrates reward computation, sending and reconciliation.
///
/// All collaborators are injected; the service holds no domain state
/// of its own beyond the in-flight send flag and the settings
/// generation each stored report was last computed under.
pub struct RewardReportService {
    identities: Arc<dyn IdentityResolver>,
    points: Arc<dyn PointsSource>,
    ledger: Arc<dyn TokenLedger>,
    storage: Arc<dyn RewardStorage>,
    auth: Arc<dyn AuthorizationCheck>,
    settings: Arc<RewardSettingsService>,
    sending_in_progress: AtomicBool,
    // period id -> settings generation the stored report reflects
    report_generations: Mutex<HashMap<u64, u64>>,
}

impl RewardReportService {
    pub fn new(
        identities: Arc<dyn IdentityResolver>,
        points: Arc<dyn PointsSource>,
        ledger: Arc<dyn TokenLedger>,
        storage: Arc<dyn RewardStorage>,
        auth: Arc<dyn AuthorizationCheck>,
        settings: Arc<RewardSettingsService>,
    ) -> Self {
        Self {
            identities,
            points,
            ledger,
            storage,
            auth,
            settings,
            sending_in_progress: AtomicBool::new(false),
            report_generations: Mutex::new(HashMap::new()),
        }
    }

    /// Compute (or recompute) the reward report covering `date`.
    ///
    /// Loads the stored report for the period when one exists so that
    /// transacted amounts survive, then merges a fresh screening and
    /// allocation over it. The result is not persisted.
    pub async fn compute_rewards(&self, date: NaiveDate) -> DisbursementResult<RewardReport> {
        let settings = self.settings.get_settings()?;
        let period_type = settings
            .period_type
            .ok_or(DisbursementError::Computation(RewardError::MissingPeriodType))?;
        let budget_type = settings
            .budget_type
            .ok_or(DisbursementError::Computation(RewardError::MissingBudgetType))?;
        let period = period_type.period_of(date, settings.time_zone);

        let mut report = match self.storage.load_report(period_type, period.start_seconds)? {
            Some(stored) => stored,
            None => RewardReport::new(period.clone()),
        };

        let participants = match self
            .points
            .participants(period.start_seconds, period.end_seconds)
            .await
        {
            Ok(ids) => ids,
            Err(error) => {
                warn!(%error, "participant lookup failed, computing over stored rows only");
                Vec::new()
            }
        };

        // Stored rows are re-screened too so wallet state and points
        // stay current across recomputations.
        let mut candidates: BTreeSet<IdentityId> = participants.iter().copied().collect();
        candidates.extend(report.rewards.iter().map(|r| r.identity_id));

        let earned = match self
            .points
            .earned_points(&candidates, period.start_seconds, period.end_seconds)
            .await
        {
            Ok(points) => points,
            Err(error) => {
                warn!(%error, "points lookup failed, treating all candidates as zero");
                BTreeMap::new()
            }
        };

        let mut wallets: BTreeMap<IdentityId, Wallet> = BTreeMap::new();
        for identity_id in &candidates {
            match self.identities.resolve_wallet(*identity_id).await {
                Ok(Some(wallet)) => {
                    wallets.insert(*identity_id, wallet);
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(identity_id, %error, "wallet resolution failed, skipping identity");
                }
            }
        }

        let screening = screen_participants(&earned, &wallets, settings.threshold)?;

        let allocation = if settings.use_pools && budget_type != RewardBudgetType::FixedPerPoint {
            if settings.amount < Decimal::ZERO {
                return Err(DisbursementError::Computation(
                    RewardError::NegativeConfiguredAmount(settings.amount),
                ));
            }
            let total_budget = match budget_type {
                RewardBudgetType::Fixed => settings.amount,
                RewardBudgetType::FixedPerMember => {
                    settings.amount * Decimal::from(screening.eligible.len() as u64)
                }
                RewardBudgetType::FixedPerPoint => unreachable!(),
            };
            if total_budget <= Decimal::ZERO {
                PooledAllocation::default()
            } else {
                let teams = self.storage.load_teams()?;
                let pools = build_pools(&teams, &screening.eligible)?;
                allocate_pooled(total_budget, &pools, &screening.eligible)?
            }
        } else {
            let amounts = allocate(budget_type, settings.amount, &screening.eligible)?;
            PooledAllocation {
                amounts,
                pool_names: BTreeMap::new(),
            }
        };

        merge_report(&mut report, &wallets, &screening, &allocation);
        report.participations_count = participants.len() as u64;
        debug!(
            period_start = period.start_seconds,
            participants = report.participations_count,
            valid_rewards = report.valid_reward_count(),
            "reward report computed"
        );
        Ok(report)
    }

    /// One identity's reward in the period covering `date`, if any.
    pub async fn compute_rewards_by_user(
        &self,
        date: NaiveDate,
        identity_id: IdentityId,
    ) -> DisbursementResult<Option<WalletReward>> {
        let report = self.compute_rewards(date).await?;
        Ok(report.reward_of(identity_id).cloned())
    }

    /// Report summary for the period covering `date`.
    ///
    /// Serves the stored report while the settings it was computed
    /// under are still current; a settings change forces exactly one
    /// recomputation per stored period.
    pub async fn get_report(&self, date: NaiveDate) -> DisbursementResult<RewardReportStatus> {
        let generation = self.settings.generation();
        let settings = self.settings.get_settings()?;
        let period_type = settings
            .period_type
            .ok_or(DisbursementError::Computation(RewardError::MissingPeriodType))?;
        let period = period_type.period_of(date, settings.time_zone);

        let stored = self.storage.load_report(period_type, period.start_seconds)?;
        let Some(stored) = stored else {
            return Ok(self.compute_rewards(date).await?.status());
        };
        let Some(period_id) = stored.period.as_ref().and_then(|p| p.id) else {
            return Ok(stored.status());
        };

        // Unknown generation means the report was persisted without
        // going through here (a send pass, or an earlier process), so
        // it counts as stale too.
        let seen = self
            .generation_map()
            .get(&period_id)
            .copied();
        match seen {
            Some(seen) if seen == generation => Ok(stored.status()),
            _ => {
                info!(period_id, generation, "stored report is stale, recomputing");
                let report = self.compute_rewards(date).await?;
                let stored = self.storage.save_report(&report)?;
                self.generation_map().insert(period_id, generation);
                Ok(stored.status())
            }
        }
    }

    /// Send the rewards of the period covering `date`.
    ///
    /// Precondition order: authorization, closed period, no pending
    /// transactions, admin wallet configured, sufficient balance. Each
    /// candidate transfer is then submitted independently; a failed
    /// submission leaves that reward sendable next pass.
    pub async fn send_rewards(
        &self,
        date: NaiveDate,
        actor: &str,
    ) -> DisbursementResult<SendOutcome> {
        if !self.auth.is_rewarding_admin(actor) {
            return Err(DisbursementError::PermissionDenied(actor.to_string()));
        }

        let generation = self.settings.generation();
        let mut report = self.compute_rewards(date).await?;
        let period = report
            .period
            .clone()
            .ok_or_else(|| DisbursementError::Computation(RewardError::MissingPeriodType))?;
        let now_seconds = chrono::Utc::now().timestamp();
        if !period.is_closed(now_seconds) {
            return Err(DisbursementError::PeriodNotClosed {
                end_seconds: period.end_seconds,
            });
        }
        let pending = report.pending_transaction_count();
        if pending > 0 {
            return Err(DisbursementError::PendingTransactions { count: pending });
        }

        let candidates: Vec<IdentityId> = report
            .rewards
            .iter()
            .filter(|r| {
                r.is_enabled()
                    && r.amount > Decimal::ZERO
                    && matches!(r.status(), RewardStatus::NotSent | RewardStatus::Failed)
            })
            .map(|r| r.identity_id)
            .collect();
        if candidates.is_empty() {
            return Ok(SendOutcome::NothingToSend(report));
        }

        let admin_address = self
            .ledger
            .admin_wallet_address()
            .await?
            .ok_or(DisbursementError::AdminWalletMissing)?;
        let required = report.remaining_tokens_to_send();
        let balance = self.ledger.balance_of(&admin_address).await?;
        if balance < required {
            return Err(DisbursementError::InsufficientAdminBalance { balance, required });
        }

        let token = self.ledger.token_details();
        let mut submitted: u64 = 0;
        for identity_id in candidates {
            let Some(reward) = report.reward_of(identity_id) else {
                continue;
            };
            let amount = reward.amount;
            let request = TransferRequest {
                from: admin_address.clone(),
                to: reward.wallet.address.clone(),
                amount,
                label: format!("Reward: {} {}", amount, token.symbol),
                message: reward_message(reward, &period),
            };
            match self.ledger.transfer(request).await {
                Ok(handle) => {
                    let transaction = RewardTransaction {
                        hash: handle.hash,
                        period_type: period.period_type,
                        start_seconds: period.start_seconds,
                        receiver_identity_id: identity_id,
                        status: TransactionStatus::Pending,
                        tokens_sent: amount,
                    };
                    if let Some(reward) = report.reward_of_mut(identity_id) {
                        reward.transaction = Some(transaction);
                    }
                    submitted += 1;
                }
                Err(error) => {
                    warn!(identity_id, %error, "transfer submission failed, reward stays sendable");
                }
            }
        }

        if submitted > 0 {
            if let Some(period) = report.period.as_mut() {
                period.status = RewardPeriodStatus::Pending;
            }
        }

        let stored = {
            let _guard = SendingGuard::acquire(&self.sending_in_progress)?;
            self.storage.save_report(&report)?
        };
        if let Some(period_id) = stored.period.as_ref().and_then(|p| p.id) {
            self.generation_map().insert(period_id, generation);
        }
        info!(
            period_start = period.start_seconds,
            submitted,
            tokens_sent = %stored.tokens_sent(),
            "reward send pass persisted"
        );
        if submitted > 0 {
            Ok(SendOutcome::Submitted(stored))
        } else {
            Ok(SendOutcome::NothingToSend(stored))
        }
    }

    /// Apply a ledger confirmation to the reward transaction `hash`.
    ///
    /// Succeeded transactions are immutable; re-confirming one is
    /// reported as `AlreadyDone`, never an error, so reconciliation
    /// can be replayed safely.
    pub fn reconcile_transaction(
        &self,
        hash: &str,
        status: TransactionStatus,
    ) -> DisbursementResult<ReconcileOutcome> {
        let mut report = self
            .storage
            .find_report_by_transaction(hash)?
            .ok_or_else(|| DisbursementError::UnknownTransaction(hash.to_string()))?;

        let reward = report
            .rewards
            .iter_mut()
            .find(|r| r.transaction.as_ref().is_some_and(|tx| tx.hash == hash))
            .ok_or_else(|| DisbursementError::UnknownTransaction(hash.to_string()))?;
        let transaction = reward
            .transaction
            .as_mut()
            .ok_or_else(|| DisbursementError::UnknownTransaction(hash.to_string()))?;
        if transaction.status == TransactionStatus::Success {
            return Ok(ReconcileOutcome::AlreadyDone);
        }
        transaction.status = status;

        if !report.has_pending_transactions() {
            let next_status = if report.is_completely_proceeded() {
                Some(RewardPeriodStatus::Success)
            } else if report.failed_transaction_count() > 0 {
                Some(RewardPeriodStatus::Error)
            } else {
                None
            };
            if let (Some(next_status), Some(period)) = (next_status, report.period.as_mut()) {
                period.status = next_status;
            }
        }

        self.storage.save_report(&report)?;
        info!(hash, ?status, "reward transaction reconciled");
        Ok(ReconcileOutcome::Applied)
    }

    /// Most recent rewards of one identity, newest first.
    pub fn list_rewards(
        &self,
        identity_id: IdentityId,
        limit: usize,
    ) -> DisbursementResult<Vec<WalletReward>> {
        Ok(self.storage.rewards_of_identity(identity_id, limit)?)
    }

    /// Periods with submitted but unconfirmed transactions.
    pub fn periods_in_progress(&self) -> DisbursementResult<Vec<RewardPeriod>> {
        Ok(self.storage.periods_by_status(RewardPeriodStatus::Pending)?)
    }

    /// Stored periods no send pass has touched yet.
    pub fn periods_not_sent(&self) -> DisbursementResult<Vec<RewardPeriod>> {
        Ok(self.storage.periods_by_status(RewardPeriodStatus::Estimation)?)
    }

    pub fn is_sending_in_progress(&self) -> bool {
        self.sending_in_progress.load(Ordering::SeqCst)
    }

    fn generation_map(&self) -> std::sync::MutexGuard<'_, HashMap<u64, u64>> {
        self.report_generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn reward_message(reward: &WalletReward, period: &RewardPeriod) -> String {
    let start = format_day(period.start_seconds, period.time_zone);
    let end = format_day(period.end_seconds - 1, period.time_zone);
    if reward.pool_name.is_empty() {
        format!(
            "You earned {} points between {start} and {end}",
            reward.points
        )
    } else {
        format!(
            "You earned {} points in pool '{}' between {start} and {end}",
            reward.points, reward.pool_name
        )
    }
}

fn format_day(seconds: EpochSeconds, zone: Tz) -> String {
    match chrono::DateTime::from_timestamp(seconds, 0) {
        Some(instant) => instant.with_timezone(&zone).format("%Y-%m-%d").to_string(),
        None => seconds.to_string(),
    }
}

/// Holds the in-flight flag for the duration of a persistence step.
struct SendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> DisbursementResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| DisbursementError::SendingInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
