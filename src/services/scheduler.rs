use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::notify::Notifier;
use crate::services::reminders::timestamp;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub delivered: usize,
    pub failed: usize,
}

/// Reminder scheduler.
/// Polls for reminders whose deadline has passed and hands each one to the notifier once.
pub struct ReminderScheduler {
    db: SqlitePool,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(db: SqlitePool, notifier: Arc<dyn Notifier>, interval_secs: u64) -> Self {
        Self {
            db,
            notifier,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// Runs forever; abort the task to stop it.
    pub async fn start(self) {
        info!("Starting reminder scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.dispatch_due(Utc::now()).await {
                Ok(stats) if stats.delivered + stats.failed > 0 => {
                    info!(
                        "Reminder tick - delivered: {}, failed: {}",
                        stats.delivered, stats.failed
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    // keep polling
                    warn!("Reminder tick failed: {:?}", e);
                }
            }
        }
    }

    /// Notifies every due reminder. Each one is claimed before delivery so
    /// overlapping passes never send it twice; failed deliveries release the
    /// claim and are retried next tick.
    pub async fn dispatch_due(&self, now: DateTime<Utc>) -> Result<DispatchStats, AppError> {
        let now = timestamp(now);
        let due = repository::fetch_due_reminders(&self.db, &now).await?;

        let mut stats = DispatchStats::default();
        for reminder in due {
            if !repository::claim_for_notification(&self.db, &reminder.id, &now).await? {
                debug!("Reminder {} already claimed, skipping", reminder.id);
                continue;
            }
            match self.notifier.notify(&reminder).await {
                Ok(()) => stats.delivered += 1,
                Err(e) => {
                    warn!("Failed to notify reminder {}: {}", reminder.id, e);
                    repository::release_claim(&self.db, &reminder.id, &now).await?;
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }
}
