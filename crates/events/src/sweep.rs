//! Periodic reminder sweep.
//!
//! [`ReminderSweep`] runs a background task that, on every tick, asks the
//! [`NotificationCenter`] to surface unread reminders due within the
//! configured horizon. The task is owned by the sweep: [`ReminderSweep::stop`]
//! cancels and joins it, and dropping the sweep cancels it.

use std::sync::Arc;
use std::time::Duration;

use ecourts_core::types::now_millis;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::center::NotificationCenter;

/// Default time between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default look-ahead window for due reminders.
pub const DEFAULT_REMINDER_HORIZON: Duration = Duration::from_secs(24 * 60 * 60);

/// Timing for the reminder sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Time between ticks. The first tick happens one interval after start.
    pub interval: Duration,
    /// Reminders due within this window of "now" are surfaced.
    pub horizon: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SWEEP_INTERVAL,
            horizon: DEFAULT_REMINDER_HORIZON,
        }
    }
}

// ---------------------------------------------------------------------------
// ReminderSweep
// ---------------------------------------------------------------------------

struct RunningSweep {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Start/stop handle around the background sweep task.
pub struct ReminderSweep {
    center: Arc<NotificationCenter>,
    config: SweepConfig,
    running: Option<RunningSweep>,
}

impl ReminderSweep {
    pub fn new(center: Arc<NotificationCenter>, config: SweepConfig) -> Self {
        Self {
            center,
            config,
            running: None,
        }
    }

    pub fn config(&self) -> SweepConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Spawn the sweep task on the current Tokio runtime.
    ///
    /// Does nothing if the sweep is already running.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(self.center.clone(), self.config, cancel.clone()));
        self.running = Some(RunningSweep { cancel, handle });
    }

    /// Cancel the sweep task and wait for it to finish.
    ///
    /// Does nothing if the sweep is not running.
    pub async fn stop(&mut self) {
        let Some(RunningSweep { cancel, handle }) = self.running.take() else {
            return;
        };

        cancel.cancel();
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Reminder sweep task failed");
        }
    }
}

impl Drop for ReminderSweep {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

/// The sweep loop. Exits when `cancel` is triggered.
async fn run(center: Arc<NotificationCenter>, config: SweepConfig, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = config.interval.as_secs(),
        horizon_secs = config.horizon.as_secs(),
        "Reminder sweep started"
    );

    let mut interval = tokio::time::interval_at(Instant::now() + config.interval, config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reminder sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let surfaced = center.sweep_due_reminders(now_millis(), config.horizon).await;
                if surfaced > 0 {
                    tracing::info!(surfaced, "Reminder sweep surfaced due reminders");
                } else {
                    tracing::debug!("Reminder sweep: nothing due");
                }
            }
        }
    }
}
