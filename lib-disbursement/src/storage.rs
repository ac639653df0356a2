//! Reward storage capability and the in-memory implementation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lib_reward_types::{
    EpochSeconds, IdentityId, RewardPeriod, RewardPeriodStatus, RewardPeriodType, RewardReport,
    RewardSettings, RewardTeam, WalletReward,
};

use crate::errors::StorageError;

/// Persistence of reports, teams and settings.
///
/// `save_report` must be atomic with respect to the report's reward
/// and transaction rows: a crash mid-save never leaves a submitted
/// transaction unrecorded while recording its siblings.
pub trait RewardStorage: Send + Sync {
    fn load_report(
        &self,
        period_type: RewardPeriodType,
        start_seconds: EpochSeconds,
    ) -> Result<Option<RewardReport>, StorageError>;

    /// Persist the whole report, assigning the period id on first
    /// save. Returns the stored form.
    fn save_report(&self, report: &RewardReport) -> Result<RewardReport, StorageError>;

    fn load_teams(&self) -> Result<Vec<RewardTeam>, StorageError>;

    fn load_settings(&self) -> Result<Option<RewardSettings>, StorageError>;

    fn save_settings(&self, settings: &RewardSettings) -> Result<(), StorageError>;

    fn periods_by_status(
        &self,
        status: RewardPeriodStatus,
    ) -> Result<Vec<RewardPeriod>, StorageError>;

    /// Most recent rewards of one identity, newest period first.
    fn rewards_of_identity(
        &self,
        identity_id: IdentityId,
        limit: usize,
    ) -> Result<Vec<WalletReward>, StorageError>;

    /// The report owning the reward transaction with this hash.
    fn find_report_by_transaction(
        &self,
        hash: &str,
    ) -> Result<Option<RewardReport>, StorageError>;
}

#[derive(Default)]
struct MemoryState {
    reports: BTreeMap<(RewardPeriodType, EpochSeconds), RewardReport>,
    teams: Vec<RewardTeam>,
    settings: Option<RewardSettings>,
}

/// In-memory `RewardStorage`, used by tests and demos.
///
/// Whole-report replacement under one lock gives the atomicity the
/// trait requires for free.
#[derive(Default)]
pub struct MemoryRewardStorage {
    state: Mutex<MemoryState>,
    next_period_id: AtomicU64,
}

impl MemoryRewardStorage {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            next_period_id: AtomicU64::new(1),
        }
    }

    pub fn with_teams(self, teams: Vec<RewardTeam>) -> Self {
        self.lock().teams = teams;
        self
    }

    pub fn with_settings(self, settings: RewardSettings) -> Self {
        self.lock().settings = Some(settings);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RewardStorage for MemoryRewardStorage {
    fn load_report(
        &self,
        period_type: RewardPeriodType,
        start_seconds: EpochSeconds,
    ) -> Result<Option<RewardReport>, StorageError> {
        Ok(self.lock().reports.get(&(period_type, start_seconds)).cloned())
    }

    fn save_report(&self, report: &RewardReport) -> Result<RewardReport, StorageError> {
        let mut stored = report.clone();
        let period = stored
            .period
            .as_mut()
            .ok_or_else(|| StorageError::Backend("report has no period".into()))?;
        if period.id.is_none() {
            period.id = Some(self.next_period_id.fetch_add(1, Ordering::Relaxed));
        }
        let key = period.key();
        self.lock().reports.insert(key, stored.clone());
        Ok(stored)
    }

    fn load_teams(&self) -> Result<Vec<RewardTeam>, StorageError> {
        Ok(self.lock().teams.clone())
    }

    fn load_settings(&self) -> Result<Option<RewardSettings>, StorageError> {
        Ok(self.lock().settings.clone())
    }

    fn save_settings(&self, settings: &RewardSettings) -> Result<(), StorageError> {
        self.lock().settings = Some(settings.clone());
        Ok(())
    }

    fn periods_by_status(
        &self,
        status: RewardPeriodStatus,
    ) -> Result<Vec<RewardPeriod>, StorageError> {
        Ok(self
            .lock()
            .reports
            .values()
            .filter_map(|r| r.period.clone())
            .filter(|p| p.status == status)
            .collect())
    }

    fn rewards_of_identity(
        &self,
        identity_id: IdentityId,
        limit: usize,
    ) -> Result<Vec<WalletReward>, StorageError> {
        let state = self.lock();
        let mut rewards: Vec<(EpochSeconds, WalletReward)> = state
            .reports
            .values()
            .filter_map(|report| {
                let start = report.period.as_ref().map(|p| p.start_seconds)?;
                report
                    .reward_of(identity_id)
                    .map(|reward| (start, reward.clone()))
            })
            .collect();
        rewards.sort_by_key(|(start, _)| std::cmp::Reverse(*start));
        Ok(rewards.into_iter().take(limit).map(|(_, r)| r).collect())
    }

    fn find_report_by_transaction(
        &self,
        hash: &str,
    ) -> Result<Option<RewardReport>, StorageError> {
        Ok(self
            .lock()
            .reports
            .values()
            .find(|report| {
                report
                    .rewards
                    .iter()
                    .any(|r| r.transaction.as_ref().is_some_and(|tx| tx.hash == hash))
            })
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;
    use lib_reward_types::{RewardPeriodType, Wallet};
    use rust_decimal_macros::dec;

    fn report_for(date: chrono::NaiveDate) -> RewardReport {
        RewardReport::new(RewardPeriodType::Week.period_of(date, Tz::UTC))
    }

    fn wallet(id: IdentityId) -> Wallet {
        Wallet {
            identity_id: id,
            address: format!("0x{id:040x}"),
            enabled: true,
            initialized: true,
            deleted: false,
        }
    }

    #[test]
    fn save_assigns_period_id_once() {
        let storage = MemoryRewardStorage::new();
        let report = report_for(chrono::NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        let stored = storage.save_report(&report).unwrap();
        let id = stored.period.as_ref().unwrap().id;
        assert!(id.is_some());

        let again = storage.save_report(&stored).unwrap();
        assert_eq!(again.period.unwrap().id, id);
    }

    #[test]
    fn rewards_listed_newest_first() {
        let storage = MemoryRewardStorage::new();
        for (week, amount) in [(3u32, dec!(10)), (10, dec!(20)), (17, dec!(30))] {
            let mut report = report_for(chrono::NaiveDate::from_ymd_opt(2026, 8, week).unwrap());
            report
                .rewards
                .push(lib_reward_types::WalletReward::new(wallet(1), dec!(5), amount));
            storage.save_report(&report).unwrap();
        }
        let rewards = storage.rewards_of_identity(1, 2).unwrap();
        assert_eq!(rewards.len(), 2);
        assert_eq!(rewards[0].amount, dec!(30));
        assert_eq!(rewards[1].amount, dec!(20));
    }
}
