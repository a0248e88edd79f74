//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! ledger posting test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built companies, charts of accounts and periods
//! - `builders`: Builders for event payloads
//! - `memory`: In-memory [`domain_posting::PostingStore`] implementation
//! - `assertions`: Custom assertion helpers for ledger types

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod memory;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use memory::*;
