//! Custom Test Assertions
//!
//! Assertion helpers for ledger lines that give more meaningful error
//! messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::AccountId;
use domain_ledger::LedgerLine;

/// Asserts that a set of lines balances to the expected totals
pub fn assert_balanced(lines: &[LedgerLine], expected_total: Decimal) {
    let debits: Decimal = lines.iter().map(|l| l.debit).sum();
    let credits: Decimal = lines.iter().map(|l| l.credit).sum();
    assert_eq!(
        debits, credits,
        "entry is unbalanced: debits={debits}, credits={credits}"
    );
    assert_eq!(
        debits, expected_total,
        "entry total mismatch: got {debits}, expected {expected_total}"
    );
}

/// Asserts that exactly one line debits the account for the amount
pub fn assert_debit(lines: &[LedgerLine], account_id: AccountId, amount: Decimal) {
    let hits: Vec<&LedgerLine> = lines
        .iter()
        .filter(|l| l.account_id == account_id && l.debit == amount && l.credit == Decimal::ZERO)
        .collect();
    assert_eq!(
        hits.len(),
        1,
        "expected exactly one debit of {amount} on {account_id}, found {}",
        hits.len()
    );
}

/// Asserts that exactly one line credits the account for the amount
pub fn assert_credit(lines: &[LedgerLine], account_id: AccountId, amount: Decimal) {
    let hits: Vec<&LedgerLine> = lines
        .iter()
        .filter(|l| l.account_id == account_id && l.credit == amount && l.debit == Decimal::ZERO)
        .collect();
    assert_eq!(
        hits.len(),
        1,
        "expected exactly one credit of {amount} on {account_id}, found {}",
        hits.len()
    );
}

/// Asserts that every line carries the same entry number
pub fn assert_single_entry(lines: &[LedgerLine]) {
    assert!(!lines.is_empty(), "expected at least one ledger line");
    let number = &lines[0].entry_number;
    assert!(
        lines.iter().all(|l| &l.entry_number == number),
        "lines span multiple entry numbers"
    );
}
