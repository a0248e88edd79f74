//! Storage port for the posting engine
//!
//! All persistence flows through [`PostingStore`]. Handlers assemble a
//! [`PostingCommit`] describing everything one event changes, and the
//! store applies it in a single transaction. Nothing in this crate talks
//! to a database directly.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{AccountId, BusinessEventId, CompanyId, CustomerId, FiscalPeriodId, SaleId, SupplierId};
use domain_ledger::{
    Account, AccountMapping, BalanceDelta, EntryReference, FiscalPeriod, LedgerLine,
    NewFiscalPeriod,
};

use crate::event::{BusinessEvent, EventType};

/// Errors surfaced by a [`PostingStore`] implementation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("store error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        StoreError::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        StoreError::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// The counterparty side of an outstanding-amount adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyRef {
    Customer(CustomerId),
    Supplier(SupplierId),
}

/// Net change to a customer's or supplier's outstanding amount
///
/// Customer outstanding grows with what they owe us; supplier outstanding
/// grows with what we owe them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartyAdjustment {
    pub party: PartyRef,
    pub delta: Decimal,
}

/// Everything one posted event changes, applied atomically
///
/// The store must commit all of it or none of it: ledger lines, account
/// balance deltas, party outstanding adjustments, the event's processed
/// mark, and any fiscal period transition.
#[derive(Debug, Clone)]
pub struct PostingCommit {
    pub company_id: CompanyId,
    pub event_id: BusinessEventId,
    pub lines: Vec<LedgerLine>,
    pub deltas: Vec<BalanceDelta>,
    pub party_adjustments: Vec<PartyAdjustment>,
    /// A new fiscal period to create (fiscal-year open)
    pub open_period: Option<NewFiscalPeriod>,
    /// A period to mark closed in the same commit (fiscal-year close)
    pub close_period_id: Option<FiscalPeriodId>,
}

impl PostingCommit {
    pub fn new(company_id: CompanyId, event_id: BusinessEventId) -> Self {
        Self {
            company_id,
            event_id,
            lines: Vec::new(),
            deltas: Vec::new(),
            party_adjustments: Vec::new(),
            open_period: None,
            close_period_id: None,
        }
    }
}

/// Persistence operations the posting engine needs
#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Unprocessed events of the given kinds, oldest first, up to `limit`
    async fn fetch_pending_events(
        &self,
        kinds: &[EventType],
        limit: u32,
    ) -> Result<Vec<BusinessEvent>, StoreError>;

    /// Marks an event processed outside of a posting commit
    ///
    /// Used for skip outcomes, where no ledger lines are written but the
    /// event must not be retried.
    async fn mark_event_processed(&self, event_id: BusinessEventId) -> Result<(), StoreError>;

    /// The company's default role-to-account mappings
    async fn default_mappings(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<AccountMapping>, StoreError>;

    /// The open fiscal period containing `on`, if any
    async fn active_fiscal_period(
        &self,
        company_id: CompanyId,
        on: NaiveDate,
    ) -> Result<Option<FiscalPeriod>, StoreError>;

    /// A fiscal period by id
    async fn fiscal_period(
        &self,
        company_id: CompanyId,
        period_id: FiscalPeriodId,
    ) -> Result<Option<FiscalPeriod>, StoreError>;

    /// A fiscal period by its name
    async fn fiscal_period_by_name(
        &self,
        company_id: CompanyId,
        name: &str,
    ) -> Result<Option<FiscalPeriod>, StoreError>;

    /// Accounts by id, with current balances
    async fn accounts(
        &self,
        company_id: CompanyId,
        ids: &[AccountId],
    ) -> Result<Vec<Account>, StoreError>;

    /// All active revenue, expense and cost-of-goods accounts
    async fn income_statement_accounts(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Account>, StoreError>;

    /// Whether any ledger line already carries this reference
    async fn entry_exists(
        &self,
        company_id: CompanyId,
        reference: &EntryReference,
    ) -> Result<bool, StoreError>;

    /// Whether the referenced sale record exists
    async fn sale_exists(&self, company_id: CompanyId, sale_id: SaleId) -> Result<bool, StoreError>;

    /// Atomically allocates the next entry sequence for a company and year
    async fn next_entry_sequence(
        &self,
        company_id: CompanyId,
        year: i32,
    ) -> Result<u32, StoreError>;

    /// Applies a posting commit in one transaction
    async fn commit_posting(&self, commit: PostingCommit) -> Result<(), StoreError>;
}
