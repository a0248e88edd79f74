//! The balance updater
//!
//! Computes one net delta per account from the lines of a posting, signed by
//! the account's normal balance. This is the only sign rule in the system:
//! every handler's balance movement flows through [`compute_deltas`].

use rust_decimal::Decimal;
use std::collections::HashMap;

use core_kernel::AccountId;

use crate::account::AccountType;
use crate::entry::LedgerLine;
use crate::error::LedgerError;

/// A net balance movement for one account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    pub account_id: AccountId,
    /// Signed movement: positive grows the balance on the account's normal side
    pub delta: Decimal,
}

/// The normal-balance sign rule
///
/// ASSET/EXPENSE/COST_OF_GOODS balances grow on debit;
/// LIABILITY/EQUITY/REVENUE balances grow on credit.
pub fn signed_delta(account_type: AccountType, debit: Decimal, credit: Decimal) -> Decimal {
    if account_type.is_debit_normal() {
        debit - credit
    } else {
        credit - debit
    }
}

/// Aggregates posting lines into one signed delta per account
///
/// # Arguments
///
/// * `lines` - All lines of one posting
/// * `types` - Account type for every account the lines touch
///
/// # Errors
///
/// Returns [`LedgerError::UnknownAccountType`] if a line references an
/// account absent from `types` - the caller must fetch exactly the touched
/// accounts before computing deltas.
pub fn compute_deltas(
    lines: &[LedgerLine],
    types: &HashMap<AccountId, AccountType>,
) -> Result<Vec<BalanceDelta>, LedgerError> {
    let mut net: HashMap<AccountId, Decimal> = HashMap::new();
    let mut order: Vec<AccountId> = Vec::new();

    for line in lines {
        let account_type = types
            .get(&line.account_id)
            .copied()
            .ok_or(LedgerError::UnknownAccountType {
                account_id: line.account_id,
            })?;
        let delta = signed_delta(account_type, line.debit, line.credit);
        if !net.contains_key(&line.account_id) {
            order.push(line.account_id);
        }
        *net.entry(line.account_id).or_insert(Decimal::ZERO) += delta;
    }

    Ok(order
        .into_iter()
        .map(|account_id| BalanceDelta {
            account_id,
            delta: net[&account_id],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use core_kernel::CompanyId;

    use crate::entry::{EntryReference, JournalDraft, LineStamp, ReferenceType};

    fn lines_for(draft: JournalDraft) -> Vec<LedgerLine> {
        draft.into_lines(LineStamp {
            company_id: CompanyId::new(),
            entry_number: "JE-2026-00001".to_string(),
            entry_date: Utc::now(),
            fiscal_period: None,
            created_by: None,
            is_automated: true,
        })
    }

    fn reference() -> EntryReference {
        EntryReference::new(ReferenceType::Sale, Uuid::new_v4())
    }

    #[test]
    fn test_signed_delta_by_type() {
        assert_eq!(signed_delta(AccountType::Asset, dec!(100), dec!(0)), dec!(100));
        assert_eq!(signed_delta(AccountType::Asset, dec!(0), dec!(40)), dec!(-40));
        assert_eq!(signed_delta(AccountType::Revenue, dec!(0), dec!(100)), dec!(100));
        assert_eq!(signed_delta(AccountType::Revenue, dec!(30), dec!(0)), dec!(-30));
        assert_eq!(signed_delta(AccountType::CostOfGoods, dec!(25), dec!(0)), dec!(25));
        assert_eq!(signed_delta(AccountType::Liability, dec!(0), dec!(75)), dec!(75));
    }

    #[test]
    fn test_deltas_netted_per_account() {
        let ar = AccountId::new();
        let revenue = AccountId::new();
        let cash = AccountId::new();
        // Partial sale: AR up by total, revenue up by total, then the paid
        // slice moves from AR to cash.
        let lines = lines_for(
            JournalDraft::new("Partial sale", reference())
                .debit(ar, dec!(1000))
                .credit(revenue, dec!(1000))
                .debit(cash, dec!(400))
                .credit(ar, dec!(400)),
        );

        let types = HashMap::from([
            (ar, AccountType::Asset),
            (revenue, AccountType::Revenue),
            (cash, AccountType::Asset),
        ]);

        let deltas = compute_deltas(&lines, &types).unwrap();
        assert_eq!(deltas.len(), 3);
        assert_eq!(deltas[0], BalanceDelta { account_id: ar, delta: dec!(600) });
        assert_eq!(deltas[1], BalanceDelta { account_id: revenue, delta: dec!(1000) });
        assert_eq!(deltas[2], BalanceDelta { account_id: cash, delta: dec!(400) });
    }

    #[test]
    fn test_missing_account_type_is_error() {
        let cash = AccountId::new();
        let revenue = AccountId::new();
        let lines = lines_for(
            JournalDraft::new("Sale", reference())
                .debit(cash, dec!(10))
                .credit(revenue, dec!(10)),
        );

        let types = HashMap::from([(cash, AccountType::Asset)]);
        assert!(matches!(
            compute_deltas(&lines, &types),
            Err(LedgerError::UnknownAccountType { account_id }) if account_id == revenue
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn debit_and_credit_deltas_cancel(
            amount in 1i64..1_000_000i64,
        ) {
            let amount = Decimal::new(amount, 2);
            // For any account type, debiting then crediting the same amount
            // nets to zero.
            for account_type in [
                AccountType::Asset,
                AccountType::Liability,
                AccountType::Equity,
                AccountType::Revenue,
                AccountType::Expense,
                AccountType::CostOfGoods,
            ] {
                let up = signed_delta(account_type, amount, Decimal::ZERO);
                let down = signed_delta(account_type, Decimal::ZERO, amount);
                prop_assert_eq!(up + down, Decimal::ZERO);
                prop_assert_eq!(up.abs(), amount);
            }
        }
    }
}
