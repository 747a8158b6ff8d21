//! Periodic purge of consumed and expired verification codes
//!
//! Expiry is always checked when a code is read, so this task only keeps the
//! code table from growing without bound.

use chrono::Duration;
use std::sync::Arc;
use takip_shared::config::CleanupConfig;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::verification::VerificationStore;
use crate::services::clock::Clock;

/// Service for deleting stale verification codes
pub struct CodeCleanupService<S: VerificationStore + 'static> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: CleanupConfig,
}

impl<S: VerificationStore> CodeCleanupService<S> {
    /// Create a new code cleanup service
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: CleanupConfig) -> Self {
        Self { store, clock, config }
    }

    /// Run a single cleanup cycle
    ///
    /// Deletes codes that were used or expired more than `retention_days` ago.
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of the cycle
    /// * `Err(DomainError)` - If the store rejects the purge
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let cutoff = self.clock.now() - Duration::days(self.config.retention_days.max(0));
        let codes_deleted = self.store.purge_stale(cutoff).await?;

        info!(
            codes_deleted = codes_deleted,
            cutoff = %cutoff,
            backend = self.store.backend_name(),
            event = "code_cleanup_completed",
            "Verification code cleanup completed"
        );

        Ok(CleanupResult { codes_deleted })
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Verification code cleanup is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Code cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, event = "code_cleanup_failed", "Code cleanup cycle failed");
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupResult {
    /// Number of code records deleted
    pub codes_deleted: u64,
}
