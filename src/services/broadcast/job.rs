// File: src/services/broadcast/job.rs
use crate::services::notifications::dispatcher::NotificationDispatcher;
use crate::services::rates::fetcher::RateFetcher;
use crate::services::rates::format::format_quote_message;
use crate::services::rates::snapshot_store::{PersistOutcome, SnapshotStore};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Idle,
    Fetching,
    FetchFailed,
    Fetched,
    Notifying,
    Persisting,
    PersistFailed,
    Persisted,
}

/// What one run of the job did. Serialized as the cron endpoint response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadcastReport {
    /// Terminal stage: `fetch_failed`, `persist_failed` or `persisted`
    pub stage: JobStage,
    pub as_of: Option<String>,
    pub delivered: usize,
    pub failed: usize,
    pub persisted: Option<PersistOutcome>,
    pub error: Option<String>,
}

impl BroadcastReport {
    fn fetch_failed(error: String) -> Self {
        Self {
            stage: JobStage::FetchFailed,
            as_of: None,
            delivered: 0,
            failed: 0,
            persisted: None,
            error: Some(error),
        }
    }
}

/// Fetch, notify the admins, then store the snapshot.
pub struct BroadcastJob {
    fetcher: Arc<RateFetcher>,
    store: Arc<SnapshotStore>,
    dispatcher: Arc<NotificationDispatcher>,
    admins: Vec<String>,
}

impl BroadcastJob {
    pub fn new(
        fetcher: Arc<RateFetcher>,
        store: Arc<SnapshotStore>,
        dispatcher: Arc<NotificationDispatcher>,
        admins: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            store,
            dispatcher,
            admins,
        }
    }

    /// Runs the job once. Never fails: every outcome ends up in the report.
    ///
    /// Notification happens before persistence, so a storage failure can never
    /// suppress the broadcast of a successfully fetched quote.
    pub async fn run(&self) -> BroadcastReport {
        let mut stage = JobStage::Idle;
        transition(&mut stage, JobStage::Fetching);

        // Fetch rates; without a quote there is nothing to send or store
        let quote = match self.fetcher.fetch().await {
            Ok(quote) => quote,
            Err(e) => {
                transition(&mut stage, JobStage::FetchFailed);
                error!("Broadcast aborted, no notification sent: {}", e);
                return BroadcastReport::fetch_failed(e.to_string());
            }
        };
        transition(&mut stage, JobStage::Fetched);

        // Notify every admin, failures are only counted
        transition(&mut stage, JobStage::Notifying);
        let text = format_quote_message(&quote);
        let dispatch = self.dispatcher.send(&self.admins, &text, None).await;

        // Store the snapshot; a duplicate comes back as skipped rows
        transition(&mut stage, JobStage::Persisting);
        let (persisted, persist_error) = match self.store.persist(&quote).await {
            Ok(outcome) => {
                transition(&mut stage, JobStage::Persisted);
                (Some(outcome), None)
            }
            Err(e) => {
                transition(&mut stage, JobStage::PersistFailed);
                error!("Broadcast sent but snapshot not stored: {}", e);
                (None, Some(e.to_string()))
            }
        };

        // Assemble the report from both side effects
        let report = BroadcastReport {
            stage,
            as_of: Some(quote.as_of.to_rfc3339()),
            delivered: dispatch.delivered.len(),
            failed: dispatch.failed.len(),
            persisted,
            error: persist_error,
        };

        info!(
            "Broadcast finished: stage {:?}, {} delivered, {} failed, persisted {:?}",
            report.stage, report.delivered, report.failed, report.persisted
        );
        debug!("Broadcast job back to {:?}", JobStage::Idle);

        report
    }

    /// Runs the job in its own task and waits for it.
    ///
    /// The run completes even when the caller is dropped halfway, so a sent
    /// broadcast is always followed by its persistence step.
    pub async fn run_detached(self: &Arc<Self>) -> Result<BroadcastReport, JoinError> {
        let job = Arc::clone(self);
        tokio::spawn(async move { job.run().await }).await
    }
}

fn transition(stage: &mut JobStage, next: JobStage) {
    debug!("Broadcast job: {:?} -> {:?}", stage, next);
    *stage = next;
}
