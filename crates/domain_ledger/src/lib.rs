//! Ledger Domain - Double-Entry Posting Primitives
//!
//! This crate provides the pure bookkeeping core of the posting engine,
//! with no I/O: the chart-of-accounts types, the journal draft builder
//! that enforces balanced entries, per-company account-role mappings,
//! fiscal periods, entry-number formatting, and the single
//! normal-balance-sign balance updater.
//!
//! # Double-Entry Principles
//!
//! Every business event produces balanced debits and credits:
//! - Debits increase asset/expense/cost-of-goods accounts
//! - Credits increase liability/equity/revenue accounts
//! - The sum of all debits must equal the sum of all credits
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{JournalDraft, EntryReference, ReferenceType};
//!
//! let draft = JournalDraft::new("Cash sale", reference)
//!     .debit(cash_account, total)
//!     .credit(revenue_account, total);
//!
//! draft.validate()?;
//! ```

pub mod account;
pub mod balance;
pub mod entry;
pub mod error;
pub mod fiscal;
pub mod mapping;
pub mod numbering;

pub use account::{Account, AccountType};
pub use balance::{compute_deltas, signed_delta, BalanceDelta};
pub use entry::{
    DraftLine, EntryReference, ForeignAmount, JournalDraft, LedgerLine, LineStamp, ReferenceType,
};
pub use error::LedgerError;
pub use fiscal::{FiscalPeriod, NewFiscalPeriod};
pub use mapping::{AccountMapping, AccountMappingSet, AccountRole};
pub use numbering::EntryNumber;
