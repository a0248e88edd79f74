//! Currency codes for foreign-currency postings
//!
//! Ledger amounts themselves are plain decimals in the company's base
//! currency; a [`Currency`] only tags the document currency on lines
//! that were converted from a foreign amount.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CHF,
    INR,
    AED,
    SAR,
    EGP,
    CAD,
}

impl Currency {
    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::INR => "INR",
            Currency::AED => "AED",
            Currency::SAR => "SAR",
            Currency::EGP => "EGP",
            Currency::CAD => "CAD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "CHF" => Ok(Currency::CHF),
            "INR" => Ok(Currency::INR),
            "AED" => Ok(Currency::AED),
            "SAR" => Ok(Currency::SAR),
            "EGP" => Ok(Currency::EGP),
            "CAD" => Ok(Currency::CAD),
            other => Err(CurrencyError::Unknown(other.to_string())),
        }
    }
}

/// Error for unparseable currency codes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Unknown currency code: {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::EUR);
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::USD);
        assert!(matches!(
            "XYZ".parse::<Currency>(),
            Err(CurrencyError::Unknown(_))
        ));
    }

    #[test]
    fn test_display_matches_code() {
        assert_eq!(Currency::GBP.to_string(), "GBP");
        assert_eq!(Currency::GBP.code(), "GBP");
    }
}
