//! In-memory posting store
//!
//! A full [`PostingStore`] implementation backed by a mutex-guarded map,
//! with the same atomicity contract as the real database store: a commit
//! applies everything under one lock. Tests seed state through the
//! `seed_*` methods and inspect results through the accessor methods.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{AccountId, BusinessEventId, CompanyId, FiscalPeriodId, SaleId};
use domain_ledger::{
    Account, AccountMapping, AccountRole, AccountType, EntryReference, FiscalPeriod, LedgerLine,
};
use domain_posting::ports::{PartyRef, PostingCommit, PostingStore, StoreError};
use domain_posting::{BusinessEvent, EventType};

#[derive(Default)]
struct State {
    events: Vec<BusinessEvent>,
    accounts: HashMap<AccountId, Account>,
    mappings: Vec<AccountMapping>,
    periods: Vec<FiscalPeriod>,
    sales: HashSet<SaleId>,
    lines: Vec<LedgerLine>,
    outstanding: HashMap<PartyRef, Decimal>,
    sequences: HashMap<(CompanyId, i32), u32>,
    fail_fetch: bool,
}

/// An in-memory [`PostingStore`] for tests
#[derive(Default)]
pub struct InMemoryPostingStore {
    state: Mutex<State>,
}

impl InMemoryPostingStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- seeding -----

    pub fn seed_account(&self, account: Account) {
        self.state.lock().unwrap().accounts.insert(account.id, account);
    }

    /// Seeds a default mapping for a role
    pub fn seed_mapping(&self, company_id: CompanyId, role: AccountRole, account_id: AccountId) {
        self.state.lock().unwrap().mappings.push(AccountMapping {
            company_id,
            role,
            account_id,
            is_default: true,
        });
    }

    pub fn seed_period(&self, period: FiscalPeriod) {
        self.state.lock().unwrap().periods.push(period);
    }

    pub fn seed_event(&self, event: BusinessEvent) {
        self.state.lock().unwrap().events.push(event);
    }

    pub fn seed_sale(&self, sale_id: SaleId) {
        self.state.lock().unwrap().sales.insert(sale_id);
    }

    /// Makes the next backlog read fail, for batch-fatal tests
    pub fn poison_fetch(&self) {
        self.state.lock().unwrap().fail_fetch = true;
    }

    // ----- inspection -----

    pub fn lines(&self) -> Vec<LedgerLine> {
        self.state.lock().unwrap().lines.clone()
    }

    pub fn lines_for(&self, reference: &EntryReference) -> Vec<LedgerLine> {
        self.state
            .lock()
            .unwrap()
            .lines
            .iter()
            .filter(|l| l.reference == *reference)
            .cloned()
            .collect()
    }

    pub fn balance_of(&self, account_id: AccountId) -> Decimal {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(&account_id)
            .map(|a| a.balance)
            .unwrap_or_default()
    }

    pub fn outstanding_of(&self, party: PartyRef) -> Decimal {
        self.state
            .lock()
            .unwrap()
            .outstanding
            .get(&party)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_processed(&self, event_id: BusinessEventId) -> bool {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .any(|e| e.id == event_id && e.processed)
    }

    pub fn periods(&self) -> Vec<FiscalPeriod> {
        self.state.lock().unwrap().periods.clone()
    }
}

#[async_trait]
impl PostingStore for InMemoryPostingStore {
    async fn fetch_pending_events(
        &self,
        kinds: &[EventType],
        limit: u32,
    ) -> Result<Vec<BusinessEvent>, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_fetch {
            state.fail_fetch = false;
            return Err(StoreError::internal("backlog unavailable"));
        }
        let mut pending: Vec<BusinessEvent> = state
            .events
            .iter()
            .filter(|e| !e.processed && kinds.contains(&e.event_type))
            .cloned()
            .collect();
        pending.sort_by_key(|e| e.created_at);
        pending.truncate(limit as usize);
        Ok(pending)
    }

    async fn mark_event_processed(&self, event_id: BusinessEventId) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        match state.events.iter_mut().find(|e| e.id == event_id) {
            Some(event) => {
                event.processed = true;
                event.status = domain_posting::EventStatus::Processed;
                Ok(())
            }
            None => Err(StoreError::not_found("business event", event_id)),
        }
    }

    async fn default_mappings(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<AccountMapping>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .mappings
            .iter()
            .filter(|m| m.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn active_fiscal_period(
        &self,
        company_id: CompanyId,
        on: NaiveDate,
    ) -> Result<Option<FiscalPeriod>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .periods
            .iter()
            .find(|p| p.company_id == company_id && p.is_open_at(on))
            .cloned())
    }

    async fn fiscal_period(
        &self,
        company_id: CompanyId,
        period_id: FiscalPeriodId,
    ) -> Result<Option<FiscalPeriod>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .periods
            .iter()
            .find(|p| p.company_id == company_id && p.id == period_id)
            .cloned())
    }

    async fn fiscal_period_by_name(
        &self,
        company_id: CompanyId,
        name: &str,
    ) -> Result<Option<FiscalPeriod>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .periods
            .iter()
            .find(|p| p.company_id == company_id && p.period_name == name)
            .cloned())
    }

    async fn accounts(
        &self,
        company_id: CompanyId,
        ids: &[AccountId],
    ) -> Result<Vec<Account>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match state.accounts.get(id) {
                Some(a) if a.company_id == company_id => out.push(a.clone()),
                _ => return Err(StoreError::not_found("account", id)),
            }
        }
        Ok(out)
    }

    async fn income_statement_accounts(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Account>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut out: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| {
                a.company_id == company_id && a.is_active && a.account_type.is_income_statement()
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(out)
    }

    async fn entry_exists(
        &self,
        company_id: CompanyId,
        reference: &EntryReference,
    ) -> Result<bool, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .lines
            .iter()
            .any(|l| l.company_id == company_id && l.reference == *reference))
    }

    async fn sale_exists(&self, _company_id: CompanyId, sale_id: SaleId) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().sales.contains(&sale_id))
    }

    async fn next_entry_sequence(
        &self,
        company_id: CompanyId,
        year: i32,
    ) -> Result<u32, StoreError> {
        let mut state = self.state.lock().unwrap();
        let counter = state.sequences.entry((company_id, year)).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn commit_posting(&self, commit: PostingCommit) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();

        for delta in &commit.deltas {
            let account = state
                .accounts
                .get_mut(&delta.account_id)
                .ok_or_else(|| StoreError::not_found("account", delta.account_id))?;
            account.balance += delta.delta;
        }
        for adjustment in &commit.party_adjustments {
            *state.outstanding.entry(adjustment.party).or_default() += adjustment.delta;
        }
        state.lines.extend(commit.lines);

        if let Some(new_period) = commit.open_period {
            state.periods.push(FiscalPeriod {
                id: FiscalPeriodId::new_v7(),
                company_id: new_period.company_id,
                period_name: new_period.period_name,
                start_date: new_period.start_date,
                end_date: new_period.end_date,
                is_closed: false,
            });
        }
        if let Some(period_id) = commit.close_period_id {
            if let Some(period) = state.periods.iter_mut().find(|p| p.id == period_id) {
                period.is_closed = true;
            }
        }

        if let Some(event) = state.events.iter_mut().find(|e| e.id == commit.event_id) {
            event.processed = true;
            event.status = domain_posting::EventStatus::Processed;
        }

        Ok(())
    }
}

/// Builds an account with a preset balance in one call
pub fn account_with_balance(
    company_id: CompanyId,
    code: &str,
    name: &str,
    account_type: AccountType,
    balance: Decimal,
) -> Account {
    Account::new(AccountId::new_v7(), company_id, code, name, account_type).with_balance(balance)
}
