//! Core Kernel - Foundational types for the ledger engine
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed identifiers for every domain entity
//! - Currency codes for foreign-currency postings

pub mod currency;
pub mod identifiers;

pub use currency::{Currency, CurrencyError};
pub use identifiers::{
    CompanyId, AccountId, BusinessEventId, LedgerLineId, FiscalPeriodId,
    SaleId, SaleReturnId, PurchaseId, PaymentId, ExpenseId, JournalId,
    CustomerId, SupplierId, BranchId, UserId,
};
