//! Account types for the chart of accounts
//!
//! This module defines the account structure for double-entry bookkeeping,
//! including the materialized running balance the posting engine maintains.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, CompanyId};

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Revenue accounts (credit normal balance)
    Revenue,
    /// Expense accounts (debit normal balance)
    Expense,
    /// Cost-of-goods-sold accounts (debit normal balance)
    CostOfGoods,
}

impl AccountType {
    /// Returns the storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "ASSET",
            AccountType::Liability => "LIABILITY",
            AccountType::Equity => "EQUITY",
            AccountType::Revenue => "REVENUE",
            AccountType::Expense => "EXPENSE",
            AccountType::CostOfGoods => "COST_OF_GOODS",
        }
    }

    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(
            self,
            AccountType::Asset | AccountType::Expense | AccountType::CostOfGoods
        )
    }

    /// Returns true if this account type is closed into retained earnings
    /// at fiscal year end
    pub fn is_income_statement(&self) -> bool {
        matches!(
            self,
            AccountType::Revenue | AccountType::Expense | AccountType::CostOfGoods
        )
    }
}

impl std::str::FromStr for AccountType {
    type Err = crate::error::LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASSET" => Ok(AccountType::Asset),
            "LIABILITY" => Ok(AccountType::Liability),
            "EQUITY" => Ok(AccountType::Equity),
            "REVENUE" => Ok(AccountType::Revenue),
            "EXPENSE" => Ok(AccountType::Expense),
            "COST_OF_GOODS" => Ok(AccountType::CostOfGoods),
            other => Err(crate::error::LedgerError::InvalidLine(format!(
                "unknown account type '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account in the chart of accounts
///
/// `balance` is a derived-but-materialized running total. It is mutated
/// exclusively by the balance updater as part of a posting commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Owning company
    pub company_id: CompanyId,
    /// Account code (e.g., "1000")
    pub code: String,
    /// Account name
    pub name: String,
    /// Account type
    pub account_type: AccountType,
    /// Materialized running balance, signed per the normal-balance side
    pub balance: Decimal,
    /// Whether account is active
    pub is_active: bool,
}

impl Account {
    /// Creates a new account with a zero balance
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier
    /// * `company_id` - Owning company
    /// * `code` - Account code
    /// * `name` - Account name
    /// * `account_type` - Type of account
    pub fn new(
        id: AccountId,
        company_id: CompanyId,
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            id,
            company_id,
            code: code.into(),
            name: name.into(),
            account_type,
            balance: Decimal::ZERO,
            is_active: true,
        }
    }

    /// Sets the opening balance
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normal_balance_sides() {
        assert!(AccountType::Asset.is_debit_normal());
        assert!(AccountType::Expense.is_debit_normal());
        assert!(AccountType::CostOfGoods.is_debit_normal());
        assert!(!AccountType::Liability.is_debit_normal());
        assert!(!AccountType::Equity.is_debit_normal());
        assert!(!AccountType::Revenue.is_debit_normal());
    }

    #[test]
    fn test_income_statement_types() {
        assert!(AccountType::Revenue.is_income_statement());
        assert!(AccountType::Expense.is_income_statement());
        assert!(AccountType::CostOfGoods.is_income_statement());
        assert!(!AccountType::Asset.is_income_statement());
        assert!(!AccountType::Equity.is_income_statement());
    }

    #[test]
    fn test_account_new() {
        let id = AccountId::new();
        let company = CompanyId::new();
        let account = Account::new(id, company, "1000", "Cash", AccountType::Asset);

        assert_eq!(account.id, id);
        assert_eq!(account.code, "1000");
        assert_eq!(account.balance, Decimal::ZERO);
        assert!(account.is_active);
    }

    #[test]
    fn test_with_balance() {
        let account = Account::new(
            AccountId::new(),
            CompanyId::new(),
            "4000",
            "Sales Revenue",
            AccountType::Revenue,
        )
        .with_balance(dec!(1500));

        assert_eq!(account.balance, dec!(1500));
    }

    #[test]
    fn test_account_type_serde_names() {
        let json = serde_json::to_string(&AccountType::CostOfGoods).unwrap();
        assert_eq!(json, "\"COST_OF_GOODS\"");
    }
}
