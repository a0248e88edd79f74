//! Per-company account-role mappings
//!
//! A mapping binds a semantic role (cash, accounts receivable, sales
//! revenue, ...) to a concrete account for one company. The engine only
//! reads mappings; handlers fail fast through [`AccountMappingSet::require`]
//! when a role essential to the posting is unmapped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use core_kernel::{AccountId, CompanyId};

use crate::error::LedgerError;

/// Semantic account roles resolvable per company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Cash,
    Bank,
    AccountsReceivable,
    AccountsPayable,
    SalesRevenue,
    Inventory,
    CostOfGoodsSold,
    RetainedEarnings,
    CustomerOverpayment,
    OpeningBalanceEquity,
}

impl AccountRole {
    /// Returns the wire/storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Cash => "cash",
            AccountRole::Bank => "bank",
            AccountRole::AccountsReceivable => "accounts_receivable",
            AccountRole::AccountsPayable => "accounts_payable",
            AccountRole::SalesRevenue => "sales_revenue",
            AccountRole::Inventory => "inventory",
            AccountRole::CostOfGoodsSold => "cost_of_goods_sold",
            AccountRole::RetainedEarnings => "retained_earnings",
            AccountRole::CustomerOverpayment => "customer_overpayment",
            AccountRole::OpeningBalanceEquity => "opening_balance_equity",
        }
    }

    /// All roles, for seeding and iteration
    pub fn all() -> &'static [AccountRole] {
        &[
            AccountRole::Cash,
            AccountRole::Bank,
            AccountRole::AccountsReceivable,
            AccountRole::AccountsPayable,
            AccountRole::SalesRevenue,
            AccountRole::Inventory,
            AccountRole::CostOfGoodsSold,
            AccountRole::RetainedEarnings,
            AccountRole::CustomerOverpayment,
            AccountRole::OpeningBalanceEquity,
        ]
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountRole::all()
            .iter()
            .find(|role| role.as_str() == s)
            .copied()
            .ok_or_else(|| LedgerError::InvalidLine(format!("unknown account role '{s}'")))
    }
}

/// One mapping row: a role bound to an account for a company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMapping {
    pub company_id: CompanyId,
    pub role: AccountRole,
    pub account_id: AccountId,
    pub is_default: bool,
}

/// The resolved default mappings for one company
#[derive(Debug, Clone, Default)]
pub struct AccountMappingSet {
    roles: HashMap<AccountRole, AccountId>,
}

impl AccountMappingSet {
    /// Builds the set from mapping rows, keeping only default mappings
    pub fn from_rows(rows: impl IntoIterator<Item = AccountMapping>) -> Self {
        let roles = rows
            .into_iter()
            .filter(|row| row.is_default)
            .map(|row| (row.role, row.account_id))
            .collect();
        Self { roles }
    }

    /// Returns the account for a role, if mapped
    pub fn get(&self, role: AccountRole) -> Option<AccountId> {
        self.roles.get(&role).copied()
    }

    /// Returns the account for a role, or a descriptive error
    ///
    /// Handlers call this for every role essential to their posting so a
    /// misconfigured company fails before any entry is built.
    pub fn require(&self, role: AccountRole) -> Result<AccountId, LedgerError> {
        self.get(role).ok_or(LedgerError::MissingMapping { role })
    }

    /// Returns true if both roles in a pair are mapped
    ///
    /// Used for optional pairs such as COGS/inventory on a sale, which are
    /// only posted when both sides exist.
    pub fn has_pair(&self, a: AccountRole, b: AccountRole) -> bool {
        self.get(a).is_some() && self.get(b).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: CompanyId, role: AccountRole, is_default: bool) -> AccountMapping {
        AccountMapping {
            company_id: company,
            role,
            account_id: AccountId::new(),
            is_default,
        }
    }

    #[test]
    fn test_from_rows_keeps_only_defaults() {
        let company = CompanyId::new();
        let set = AccountMappingSet::from_rows(vec![
            row(company, AccountRole::Cash, true),
            row(company, AccountRole::Bank, false),
        ]);

        assert!(set.get(AccountRole::Cash).is_some());
        assert!(set.get(AccountRole::Bank).is_none());
    }

    #[test]
    fn test_require_missing_role() {
        let set = AccountMappingSet::default();
        let err = set.require(AccountRole::SalesRevenue).unwrap_err();
        assert!(err.to_string().contains("sales_revenue"));
    }

    #[test]
    fn test_has_pair() {
        let company = CompanyId::new();
        let set = AccountMappingSet::from_rows(vec![
            row(company, AccountRole::CostOfGoodsSold, true),
            row(company, AccountRole::Inventory, true),
        ]);

        assert!(set.has_pair(AccountRole::CostOfGoodsSold, AccountRole::Inventory));
        assert!(!set.has_pair(AccountRole::Cash, AccountRole::Inventory));
    }

    #[test]
    fn test_role_roundtrip() {
        for role in AccountRole::all() {
            let parsed: AccountRole = role.as_str().parse().unwrap();
            assert_eq!(parsed, *role);
        }
    }
}
