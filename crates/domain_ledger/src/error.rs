//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::mapping::AccountRole;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Draft debits and credits do not match
    #[error("Unbalanced entry: debits={debits}, credits={credits}")]
    Unbalanced { debits: Decimal, credits: Decimal },

    /// A draft line is malformed (negative amount, both sides set, or empty)
    #[error("Invalid entry line: {0}")]
    InvalidLine(String),

    /// No default account mapping exists for a role the posting needs
    #[error("No default account mapped for role '{role}'")]
    MissingMapping { role: AccountRole },

    /// The balance updater was given a line for an account whose type is unknown
    #[error("Unknown account type for account {account_id}")]
    UnknownAccountType { account_id: core_kernel::AccountId },

    /// A fiscal period definition is invalid
    #[error("Invalid fiscal period: {0}")]
    InvalidPeriod(String),

    /// An entry number string could not be parsed
    #[error("Invalid entry number: {0}")]
    InvalidEntryNumber(String),
}
