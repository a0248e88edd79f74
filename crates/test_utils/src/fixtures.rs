//! Pre-built Test Fixtures
//!
//! A ready-to-use company with a standard chart of accounts, all default
//! role mappings, and an open fiscal period. Tests seed events on top and
//! run the dispatcher against the scenario's store.

use chrono::NaiveDate;
use core_kernel::{AccountId, CompanyId, FiscalPeriodId};
use domain_ledger::{AccountRole, AccountType, FiscalPeriod};

use crate::memory::{account_with_balance, InMemoryPostingStore};
use rust_decimal::Decimal;

/// A fully wired posting scenario
pub struct PostingScenario {
    pub store: InMemoryPostingStore,
    pub company_id: CompanyId,
    pub period: FiscalPeriod,
    pub cash: AccountId,
    pub bank: AccountId,
    pub receivable: AccountId,
    pub payable: AccountId,
    pub revenue: AccountId,
    pub inventory: AccountId,
    pub cogs: AccountId,
    pub retained_earnings: AccountId,
    pub overpayment: AccountId,
    pub opening_equity: AccountId,
}

impl PostingScenario {
    /// Standard chart of accounts, every role mapped, fiscal year 2026 open
    pub fn standard() -> Self {
        Self::build(true)
    }

    /// Same chart and mappings, but no fiscal period seeded
    pub fn without_period() -> Self {
        Self::build(false)
    }

    fn build(seed_period: bool) -> Self {
        let store = InMemoryPostingStore::new();
        let company_id = CompanyId::new_v7();

        let seed = |code: &str, name: &str, account_type: AccountType| {
            let account = account_with_balance(company_id, code, name, account_type, Decimal::ZERO);
            let id = account.id;
            store.seed_account(account);
            id
        };

        let cash = seed("1000", "Cash on Hand", AccountType::Asset);
        let bank = seed("1010", "Bank", AccountType::Asset);
        let receivable = seed("1100", "Accounts Receivable", AccountType::Asset);
        let inventory = seed("1200", "Inventory", AccountType::Asset);
        let payable = seed("2000", "Accounts Payable", AccountType::Liability);
        let overpayment = seed("2100", "Customer Overpayments", AccountType::Liability);
        let retained_earnings = seed("3000", "Retained Earnings", AccountType::Equity);
        let opening_equity = seed("3100", "Opening Balance Equity", AccountType::Equity);
        let revenue = seed("4000", "Sales Revenue", AccountType::Revenue);
        let cogs = seed("5000", "Cost of Goods Sold", AccountType::CostOfGoods);

        store.seed_mapping(company_id, AccountRole::Cash, cash);
        store.seed_mapping(company_id, AccountRole::Bank, bank);
        store.seed_mapping(company_id, AccountRole::AccountsReceivable, receivable);
        store.seed_mapping(company_id, AccountRole::AccountsPayable, payable);
        store.seed_mapping(company_id, AccountRole::SalesRevenue, revenue);
        store.seed_mapping(company_id, AccountRole::Inventory, inventory);
        store.seed_mapping(company_id, AccountRole::CostOfGoodsSold, cogs);
        store.seed_mapping(company_id, AccountRole::RetainedEarnings, retained_earnings);
        store.seed_mapping(company_id, AccountRole::CustomerOverpayment, overpayment);
        store.seed_mapping(company_id, AccountRole::OpeningBalanceEquity, opening_equity);

        let period = FiscalPeriod {
            id: FiscalPeriodId::new_v7(),
            company_id,
            period_name: "FY2026".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            is_closed: false,
        };
        if seed_period {
            store.seed_period(period.clone());
        }

        Self {
            store,
            company_id,
            period,
            cash,
            bank,
            receivable,
            payable,
            revenue,
            inventory,
            cogs,
            retained_earnings,
            overpayment,
            opening_equity,
        }
    }
}

/// A posting clock inside the standard scenario's fiscal year
pub fn pinned_now() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339("2026-06-15T10:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc)
}
