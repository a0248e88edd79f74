//! Batch dispatcher
//!
//! Pulls pending events oldest first and routes each to its handler. One
//! failing event never poisons the batch: its error is recorded and the
//! event stays pending for the next run. Only a failure to fetch the
//! backlog aborts the whole batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use core_kernel::BusinessEventId;

use crate::context::{Outcome, PostingContext};
use crate::error::PostingError;
use crate::event::{BusinessEvent, EventPayload, EventType};
use crate::handlers;
use crate::ports::PostingStore;

/// Events taken per run, matching the upstream trigger cadence
pub const DEFAULT_BATCH_SIZE: u32 = 20;

/// One event that could not be posted in this run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub event_id: BusinessEventId,
    pub event_type: EventType,
    pub error: String,
}

/// Result of one dispatcher run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub processed: u32,
    pub failed: u32,
    pub per_kind: BTreeMap<EventType, u32>,
    pub errors: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Routes pending events to their posting handlers
pub struct Dispatcher<S: PostingStore> {
    store: Arc<S>,
    batch_size: u32,
    now: Option<chrono::DateTime<chrono::Utc>>,
}

impl<S: PostingStore> Dispatcher<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
            now: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Pins the posting clock, used by tests for deterministic periods
    pub fn with_now(mut self, now: chrono::DateTime<chrono::Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Processes one batch of pending events
    ///
    /// Events are handled in creation order. Each event either posts, is
    /// skipped (and acknowledged), or fails and remains pending.
    pub async fn run_batch(&self) -> Result<BatchSummary, PostingError> {
        let events = self
            .store
            .fetch_pending_events(EventType::all(), self.batch_size)
            .await?;

        let mut summary = BatchSummary::default();
        for event in events {
            match self.process_event(&event).await {
                Ok(outcome) => {
                    if let Err(e) = self.store.mark_event_processed(event.id).await {
                        warn!(event_id = %event.id, error = %e, "failed to acknowledge event");
                        summary.failed += 1;
                        summary.errors.push(BatchFailure {
                            event_id: event.id,
                            event_type: event.event_type,
                            error: e.to_string(),
                        });
                        continue;
                    }
                    if let Outcome::Skipped { reason } = outcome {
                        info!(
                            event_id = %event.id,
                            event_type = %event.event_type,
                            ?reason,
                            "event skipped"
                        );
                    }
                    summary.processed += 1;
                    *summary.per_kind.entry(event.event_type).or_insert(0) += 1;
                }
                Err(e) => {
                    warn!(
                        event_id = %event.id,
                        event_type = %event.event_type,
                        error = %e,
                        "event failed, left pending for retry"
                    );
                    summary.failed += 1;
                    summary.errors.push(BatchFailure {
                        event_id: event.id,
                        event_type: event.event_type,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            processed = summary.processed,
            failed = summary.failed,
            "dispatch batch complete"
        );
        Ok(summary)
    }

    async fn process_event(&self, event: &BusinessEvent) -> Result<Outcome, PostingError> {
        let payload = EventPayload::parse(event.event_type, &event.payload)?;
        let ctx = PostingContext::new(
            self.store.as_ref(),
            event.company_id,
            event.id,
            self.now.unwrap_or_else(chrono::Utc::now),
        );
        handlers::dispatch(&ctx, payload).await
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
