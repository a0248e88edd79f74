//! Posting Domain - Event-to-Ledger Posting Engine
//!
//! This crate turns committed business events into balanced double-entry
//! postings. The [`Dispatcher`] polls the event backlog for a bounded batch
//! of unprocessed events (oldest first), validates each payload into a typed
//! document, and hands it to the matching posting handler. Each handler
//! resolves the company's account mappings and active fiscal period, runs
//! the idempotency guard, builds a balanced journal draft, and commits the
//! draft together with its balance deltas as one atomic unit through the
//! [`PostingStore`] port.
//!
//! # Failure model
//!
//! - **Fatal-for-event**: missing mapping, no active period, invalid
//!   payload, unsupported payment method. The event stays unprocessed and
//!   is retried on the next run.
//! - **Soft-skip**: duplicate posting or missing related record. The event
//!   is marked processed with zero new entries.
//! - **Batch-fatal**: the backlog cannot be read at all; the whole run
//!   returns an error and no summary.
//!
//! One event's failure never aborts the batch.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handlers;
pub mod ports;

pub use context::{Outcome, PostingContext, SideEffects, SkipReason};
pub use dispatcher::{BatchFailure, BatchSummary, Dispatcher, DEFAULT_BATCH_SIZE};
pub use error::PostingError;
pub use event::{BusinessEvent, EventPayload, EventStatus, EventType, PaymentMethod};
pub use ports::{PartyAdjustment, PartyRef, PostingCommit, PostingStore, StoreError};
