//! Dispatch trigger handler
//!
//! `POST /api/v1/ledger/dispatch` runs one posting batch and reports what
//! happened. Upstream calls this after committing business operations;
//! calling it with an empty backlog is a successful no-op.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use domain_posting::{BatchFailure, BatchSummary, Dispatcher, EventType, PostingStore};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub success: bool,
    pub processed: u32,
    pub failed: u32,
    pub per_kind: std::collections::BTreeMap<EventType, u32>,
    pub errors: Vec<BatchFailure>,
    pub message: String,
}

impl From<BatchSummary> for DispatchResponse {
    fn from(summary: BatchSummary) -> Self {
        let message = if summary.failed == 0 {
            format!("{} event(s) posted", summary.processed)
        } else {
            format!(
                "{} event(s) posted, {} failed and left pending",
                summary.processed, summary.failed
            )
        };
        Self {
            success: summary.failed == 0,
            processed: summary.processed,
            failed: summary.failed,
            per_kind: summary.per_kind,
            errors: summary.errors,
            message,
        }
    }
}

/// Runs one dispatch batch
pub async fn run_batch<S: PostingStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<DispatchResponse>, ApiError> {
    let dispatcher =
        Dispatcher::new(Arc::clone(&state.store)).with_batch_size(state.config.batch_size);
    let summary = dispatcher.run_batch().await?;

    info!(
        processed = summary.processed,
        failed = summary.failed,
        "dispatch batch triggered via API"
    );
    Ok(Json(summary.into()))
}
