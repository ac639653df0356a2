//! Reward settings with a generation counter for cache invalidation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lib_reward_types::RewardSettings;

use crate::errors::DisbursementResult;
use crate::storage::RewardStorage;

/// Stored settings plus a monotonic generation.
///
/// Every save bumps the generation; report consumers remember the
/// generation a stored report was computed under and recompute when
/// it no longer matches.
pub struct RewardSettingsService {
    storage: Arc<dyn RewardStorage>,
    generation: AtomicU64,
}

impl RewardSettingsService {
    pub fn new(storage: Arc<dyn RewardStorage>) -> Self {
        Self {
            storage,
            generation: AtomicU64::new(1),
        }
    }

    /// Stored settings, or defaults when nothing has been saved yet.
    pub fn get_settings(&self) -> DisbursementResult<RewardSettings> {
        Ok(self.storage.load_settings()?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &RewardSettings) -> DisbursementResult<()> {
        self.storage.save_settings(settings)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(generation, "reward settings updated");
        Ok(())
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
