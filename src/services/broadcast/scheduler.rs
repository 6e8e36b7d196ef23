// File: src/services/broadcast/scheduler.rs
use crate::app_state::models::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info};

pub struct BroadcastScheduler {
    app_state: Arc<AppState>,
}

impl BroadcastScheduler {
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    /// Runs the broadcast job once in its own task, so even a panic inside the
    /// job stays contained.
    pub async fn trigger_broadcast(&self) {
        match self.app_state.broadcast_job.run_detached().await {
            Ok(report) => info!(
                "Scheduler: broadcast finished with stage {:?} ({} delivered, {} failed)",
                report.stage, report.delivered, report.failed
            ),
            Err(e) => error!("Scheduler: broadcast task aborted: {}", e),
        }
    }

    /// Starts the periodic broadcast loop. Returns `None` when disabled.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        let updater_config = &self.app_state.settings.app_config.broadcast_scheduler;

        if !updater_config.enabled {
            info!("Broadcast scheduler is disabled in configuration");
            return None;
        }

        if let (Some(start), Some(end)) = (&updater_config.start_time, &updater_config.end_time) {
            info!(
                "Scheduler operation window configured: {} to {} UTC",
                start, end
            );
        }

        info!(
            "Starting broadcast scheduler with {} second interval",
            updater_config.interval_seconds,
        );

        let app_state = self.app_state.clone();
        let period = Duration::from_secs(updater_config.interval_seconds.max(1));

        // First run one full period after startup, not on every restart,
        // or at the next window start when starting outside the window.
        let first_delay = updater_config.first_tick_delay(chrono::Utc::now().time(), period);
        debug!("Scheduler: first broadcast in {} seconds", first_delay.as_secs());
        let mut interval = time::interval_at(Instant::now() + first_delay, period);

        let handle = tokio::spawn(async move {
            let scheduler = BroadcastScheduler::new(app_state.clone());

            loop {
                interval.tick().await;

                // Check the operation window on every tick
                let updater_config = &app_state.settings.app_config.broadcast_scheduler;
                if !updater_config.is_operation_allowed() {
                    debug!(
                        "Scheduler: skipping broadcast - outside operation window (current time: {})",
                        chrono::Utc::now().format("%H:%M:%S")
                    );
                    continue;
                }

                info!("Scheduler: triggering broadcast");
                scheduler.trigger_broadcast().await;
            }
        });

        Some(handle)
    }
}
