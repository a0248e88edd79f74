//! Posting engine errors

use thiserror::Error;

use core_kernel::CompanyId;
use domain_ledger::LedgerError;

use crate::event::{EventType, PaymentMethod};
use crate::ports::StoreError;

/// Errors raised while posting a single event, or while reading the backlog
///
/// Every fatal condition is a typed variant so the dispatcher's per-event
/// boundary is the one place failures are absorbed.
#[derive(Debug, Error)]
pub enum PostingError {
    /// No open fiscal period contains today's date
    #[error("No active fiscal period for company {company_id}")]
    NoActivePeriod { company_id: CompanyId },

    /// The event payload failed validation against its typed contract
    #[error("Invalid '{event_type}' payload: {reason}")]
    InvalidPayload {
        event_type: EventType,
        reason: String,
    },

    /// The event's kind string matches no known handler
    #[error("Unsupported event type '{0}'")]
    UnsupportedEventType(String),

    /// The payment method cannot settle this operation
    #[error("Unsupported payment method '{method}' for {operation}")]
    UnsupportedPaymentMethod {
        method: PaymentMethod,
        operation: &'static str,
    },

    /// A bookkeeping rule was violated (unbalanced draft, missing mapping, ...)
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PostingError {
    pub fn invalid_payload(event_type: EventType, reason: impl Into<String>) -> Self {
        PostingError::InvalidPayload {
            event_type,
            reason: reason.into(),
        }
    }
}
