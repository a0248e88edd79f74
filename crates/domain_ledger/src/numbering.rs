//! Journal entry number formatting
//!
//! Entry numbers are display identifiers scoped per company and year,
//! issued from an atomic per-company/per-year sequence behind the store.
//! This module owns only the formatting and parsing of the identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// A formatted journal entry number, e.g. `JE-2026-00042`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryNumber {
    pub year: i32,
    pub sequence: u32,
}

impl EntryNumber {
    pub fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }
}

impl fmt::Display for EntryNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JE-{}-{:05}", self.year, self.sequence)
    }
}

impl FromStr for EntryNumber {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidEntryNumber(s.to_string());

        let rest = s.strip_prefix("JE-").ok_or_else(invalid)?;
        let (year, sequence) = rest.split_once('-').ok_or_else(invalid)?;
        Ok(EntryNumber {
            year: year.parse().map_err(|_| invalid())?,
            sequence: sequence.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_sequence() {
        assert_eq!(EntryNumber::new(2026, 42).to_string(), "JE-2026-00042");
        assert_eq!(EntryNumber::new(2026, 123456).to_string(), "JE-2026-123456");
    }

    #[test]
    fn test_parse_roundtrip() {
        let n: EntryNumber = "JE-2026-00042".parse().unwrap();
        assert_eq!(n, EntryNumber::new(2026, 42));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("JE-abc-1".parse::<EntryNumber>().is_err());
        assert!("2026-00042".parse::<EntryNumber>().is_err());
        assert!("JE-2026".parse::<EntryNumber>().is_err());
    }
}
