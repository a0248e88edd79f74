//! Per-event posting context
//!
//! A [`PostingContext`] wraps the store with the lookups and the commit
//! path every handler needs. Handlers stay pure bookkeeping: they build a
//! draft, pick a period, and hand both back here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use core_kernel::{BusinessEventId, CompanyId, SaleId, UserId};
use domain_ledger::{
    compute_deltas, AccountMappingSet, EntryNumber, EntryReference, FiscalPeriod, JournalDraft,
    LineStamp, NewFiscalPeriod,
};

use crate::error::PostingError;
use crate::ports::{PartyAdjustment, PostingCommit, PostingStore};

/// Why an event was acknowledged without posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A ledger entry with this reference already exists
    AlreadyPosted,
    /// The record the event points at is gone
    RelatedRecordMissing,
    /// A fiscal period with this name already exists
    PeriodAlreadyOpen,
}

/// What happened to one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Posted { entry_count: usize },
    Skipped { reason: SkipReason },
}

/// Non-ledger changes a handler wants committed alongside its lines
#[derive(Debug, Clone, Default)]
pub struct SideEffects {
    pub party_adjustments: Vec<PartyAdjustment>,
    pub close_period_id: Option<core_kernel::FiscalPeriodId>,
}

/// Everything a handler needs to post one event
pub struct PostingContext<'a> {
    store: &'a dyn PostingStore,
    pub company_id: CompanyId,
    pub event_id: BusinessEventId,
    pub now: DateTime<Utc>,
}

impl<'a> PostingContext<'a> {
    pub fn new(
        store: &'a dyn PostingStore,
        company_id: CompanyId,
        event_id: BusinessEventId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            company_id,
            event_id,
            now,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// The company's default account mappings
    pub async fn mappings(&self) -> Result<AccountMappingSet, PostingError> {
        let rows = self.store.default_mappings(self.company_id).await?;
        Ok(AccountMappingSet::from_rows(rows))
    }

    /// The open fiscal period covering today, required for posting
    pub async fn active_period(&self) -> Result<FiscalPeriod, PostingError> {
        self.store
            .active_fiscal_period(self.company_id, self.today())
            .await?
            .ok_or(PostingError::NoActivePeriod {
                company_id: self.company_id,
            })
    }

    /// Whether this reference was already posted
    pub async fn already_posted(&self, reference: &EntryReference) -> Result<bool, PostingError> {
        Ok(self.store.entry_exists(self.company_id, reference).await?)
    }

    /// Whether the sale the event points at still exists
    pub async fn sale_exists(&self, sale_id: SaleId) -> Result<bool, PostingError> {
        Ok(self.store.sale_exists(self.company_id, sale_id).await?)
    }

    /// Allocates the next entry number for the period's year
    pub async fn allocate_entry_number(&self, year: i32) -> Result<EntryNumber, PostingError> {
        let sequence = self.store.next_entry_sequence(self.company_id, year).await?;
        Ok(EntryNumber { year, sequence })
    }

    /// Validates and commits a draft with no extra side effects
    pub async fn commit_journal(
        &self,
        draft: JournalDraft,
        period: &FiscalPeriod,
        created_by: Option<UserId>,
    ) -> Result<Outcome, PostingError> {
        self.commit_journal_with(draft, period, created_by, SideEffects::default())
            .await
    }

    /// Validates a draft, stamps it, derives balance deltas and commits
    /// everything atomically
    pub async fn commit_journal_with(
        &self,
        draft: JournalDraft,
        period: &FiscalPeriod,
        created_by: Option<UserId>,
        side: SideEffects,
    ) -> Result<Outcome, PostingError> {
        draft.validate()?;

        let entry_number = self.allocate_entry_number(period.entry_year()).await?;
        let account_ids = draft.account_ids();
        let accounts = self.store.accounts(self.company_id, &account_ids).await?;
        let account_types = accounts
            .iter()
            .map(|a| (a.id, a.account_type))
            .collect::<std::collections::HashMap<_, _>>();

        let stamp = LineStamp {
            company_id: self.company_id,
            entry_number: entry_number.to_string(),
            entry_date: self.now,
            fiscal_period: Some(period.period_name.clone()),
            created_by,
            is_automated: true,
        };
        let lines = draft.into_lines(stamp);
        let deltas = compute_deltas(&lines, &account_types)?;

        debug!(
            company_id = %self.company_id,
            event_id = %self.event_id,
            entry_number = %entry_number,
            lines = lines.len(),
            "committing journal entry"
        );

        let entry_count = lines.len();
        let commit = PostingCommit {
            company_id: self.company_id,
            event_id: self.event_id,
            lines,
            deltas,
            party_adjustments: side.party_adjustments,
            open_period: None,
            close_period_id: side.close_period_id,
        };
        self.store.commit_posting(commit).await?;

        Ok(Outcome::Posted { entry_count })
    }

    /// Commits a fiscal period creation with no ledger lines
    pub async fn open_period(&self, period: NewFiscalPeriod) -> Result<Outcome, PostingError> {
        period.validate()?;

        let mut commit = PostingCommit::new(self.company_id, self.event_id);
        commit.open_period = Some(period);
        self.store.commit_posting(commit).await?;

        Ok(Outcome::Posted { entry_count: 0 })
    }

    /// Direct store access for lookups the helpers above don't cover
    pub fn store(&self) -> &dyn PostingStore {
        self.store
    }
}
