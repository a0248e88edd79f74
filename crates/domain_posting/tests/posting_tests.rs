//! Handler-level posting tests
//!
//! Each test seeds events into the in-memory store, runs one dispatcher
//! batch, and checks the resulting lines, balances and outstanding
//! amounts.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, CustomerId, SaleId, SupplierId};
use domain_ledger::{EntryReference, ReferenceType};
use domain_posting::ports::PartyRef;
use domain_posting::Dispatcher;
use test_utils::{
    assert_balanced, assert_credit, assert_debit, assert_single_entry, customer_opening_event,
    expense_event, foreign_purchase_event, manual_journal_event, outstanding_payment_event,
    payment_event, purchase_event, pinned_now, sale_return_event, supplier_opening_event,
    supplier_payment_event, PostingScenario, SaleEventBuilder,
};

mod sales {
    use super::*;

    #[tokio::test]
    async fn completed_sale_posts_cash_against_revenue() {
        let scenario = PostingScenario::standard();
        let sale_id = SaleId::new_v7();
        let event = SaleEventBuilder::new(dec!(1000))
            .sale_id(sale_id)
            .build(scenario.company_id);
        let event_id = event.id;
        scenario.store.seed_event(event);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(summary.is_clean());

        let store = dispatcher.store();
        let reference = EntryReference::new(ReferenceType::Sale, sale_id);
        let lines = store.lines_for(&reference);
        assert_balanced(&lines, dec!(1000));
        assert_debit(&lines, scenario.cash, dec!(1000));
        assert_credit(&lines, scenario.revenue, dec!(1000));
        assert_single_entry(&lines);
        assert!(store.is_processed(event_id));

        assert_eq!(store.balance_of(scenario.cash), dec!(1000));
        assert_eq!(store.balance_of(scenario.revenue), dec!(1000));
    }

    #[tokio::test]
    async fn partial_sale_leaves_receivable_open() {
        let scenario = PostingScenario::standard();
        let customer = CustomerId::new_v7();
        let event = SaleEventBuilder::new(dec!(1000))
            .paid(dec!(400))
            .status("partial")
            .customer(customer)
            .build(scenario.company_id);
        scenario.store.seed_event(event);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        let store = dispatcher.store();
        // AR: +1000 from the sale, -400 from the payment portion
        assert_eq!(store.balance_of(scenario.receivable), dec!(600));
        assert_eq!(store.balance_of(scenario.cash), dec!(400));
        assert_eq!(store.balance_of(scenario.revenue), dec!(1000));
        assert_eq!(store.outstanding_of(PartyRef::Customer(customer)), dec!(600));
    }

    #[tokio::test]
    async fn partial_sale_with_nothing_paid_posts_receivable_only() {
        let scenario = PostingScenario::standard();
        let customer = CustomerId::new_v7();
        let event = SaleEventBuilder::new(dec!(1000))
            .paid(dec!(0))
            .status("partial")
            .customer(customer)
            .build(scenario.company_id);
        let event_id = event.id;
        scenario.store.seed_event(event);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(summary.is_clean());

        let store = dispatcher.store();
        assert!(store.is_processed(event_id));
        // No settlement pair when nothing was collected
        assert_eq!(store.lines().len(), 2);
        assert_eq!(store.balance_of(scenario.receivable), dec!(1000));
        assert_eq!(store.balance_of(scenario.revenue), dec!(1000));
        assert_eq!(store.balance_of(scenario.cash), Decimal::ZERO);
        assert_eq!(
            store.outstanding_of(PartyRef::Customer(customer)),
            dec!(1000)
        );
    }

    #[tokio::test]
    async fn partial_sale_paid_over_total_is_rejected() {
        let scenario = PostingScenario::standard();
        let event = SaleEventBuilder::new(dec!(1000))
            .paid(dec!(1200))
            .status("partial")
            .customer(CustomerId::new_v7())
            .build(scenario.company_id);
        let event_id = event.id;
        scenario.store.seed_event(event);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.processed, 0);

        let store = dispatcher.store();
        assert!(!store.is_processed(event_id));
        assert!(store.lines().is_empty());
    }

    #[tokio::test]
    async fn unpaid_sale_books_full_receivable() {
        let scenario = PostingScenario::standard();
        let customer = CustomerId::new_v7();
        let event = SaleEventBuilder::new(dec!(750))
            .paid(dec!(0))
            .status("unpaid")
            .customer(customer)
            .build(scenario.company_id);
        scenario.store.seed_event(event);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.receivable), dec!(750));
        assert_eq!(store.balance_of(scenario.cash), dec!(0));
        assert_eq!(store.outstanding_of(PartyRef::Customer(customer)), dec!(750));
    }

    #[tokio::test]
    async fn overpaid_sale_credits_overpayment_liability() {
        let scenario = PostingScenario::standard();
        let event = SaleEventBuilder::new(dec!(1000))
            .paid(dec!(1200))
            .build(scenario.company_id);
        scenario.store.seed_event(event);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert!(summary.is_clean());

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.cash), dec!(1200));
        assert_eq!(store.balance_of(scenario.revenue), dec!(1000));
        assert_eq!(store.balance_of(scenario.overpayment), dec!(200));
    }

    #[tokio::test]
    async fn sale_with_cogs_moves_inventory_at_cost() {
        let scenario = PostingScenario::standard();
        let event = SaleEventBuilder::new(dec!(1000))
            .cogs(dec!(600))
            .build(scenario.company_id);
        scenario.store.seed_event(event);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.cogs), dec!(600));
        assert_eq!(store.balance_of(scenario.inventory), dec!(-600));
    }

    #[tokio::test]
    async fn duplicate_sale_event_is_skipped() {
        let scenario = PostingScenario::standard();
        let sale_id = SaleId::new_v7();
        let first = SaleEventBuilder::new(dec!(100))
            .sale_id(sale_id)
            .build(scenario.company_id);
        let second = SaleEventBuilder::new(dec!(100))
            .sale_id(sale_id)
            .build(scenario.company_id);
        scenario.store.seed_event(first);
        scenario.store.seed_event(second);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        // Both events acknowledge, only one posts
        assert_eq!(summary.processed, 2);

        let store = dispatcher.store();
        let reference = EntryReference::new(ReferenceType::Sale, sale_id);
        assert_eq!(store.lines_for(&reference).len(), 2);
        assert_eq!(store.balance_of(scenario.cash), dec!(100));
    }
}

mod payments {
    use super::*;

    #[tokio::test]
    async fn sale_payment_clears_receivable() {
        let scenario = PostingScenario::standard();
        let sale_id = SaleId::new_v7();
        let customer = CustomerId::new_v7();
        scenario.store.seed_sale(sale_id);
        scenario.store.seed_event(payment_event(
            scenario.company_id,
            sale_id,
            Some(customer),
            dec!(250),
            "bank",
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert!(summary.is_clean());

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.bank), dec!(250));
        assert_eq!(store.balance_of(scenario.receivable), dec!(-250));
        assert_eq!(
            store.outstanding_of(PartyRef::Customer(customer)),
            dec!(-250)
        );
    }

    #[tokio::test]
    async fn payment_for_missing_sale_is_acknowledged_without_posting() {
        let scenario = PostingScenario::standard();
        let event = payment_event(
            scenario.company_id,
            SaleId::new_v7(),
            None,
            dec!(250),
            "cash",
        );
        let event_id = event.id;
        scenario.store.seed_event(event);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed, 0);

        let store = dispatcher.store();
        assert!(store.is_processed(event_id));
        assert!(store.lines().is_empty());
    }

    #[tokio::test]
    async fn outstanding_payment_reduces_customer_debt() {
        let scenario = PostingScenario::standard();
        let customer = CustomerId::new_v7();
        scenario.store.seed_event(outstanding_payment_event(
            scenario.company_id,
            customer,
            dec!(500),
            "cash",
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.cash), dec!(500));
        assert_eq!(store.balance_of(scenario.receivable), dec!(-500));
        assert_eq!(
            store.outstanding_of(PartyRef::Customer(customer)),
            dec!(-500)
        );
    }
}

mod returns {
    use super::*;

    #[tokio::test]
    async fn cash_refund_return_reverses_revenue_and_restocks() {
        let scenario = PostingScenario::standard();
        scenario.store.seed_event(sale_return_event(
            scenario.company_id,
            dec!(300),
            dec!(0),
            dec!(300),
            dec!(180),
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert!(summary.is_clean());

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.revenue), dec!(-300));
        assert_eq!(store.balance_of(scenario.cash), dec!(-300));
        assert_eq!(store.balance_of(scenario.inventory), dec!(180));
        assert_eq!(store.balance_of(scenario.cogs), dec!(-180));
    }

    #[tokio::test]
    async fn split_refund_return_touches_both_sources() {
        let scenario = PostingScenario::standard();
        scenario.store.seed_event(sale_return_event(
            scenario.company_id,
            dec!(500),
            dec!(200),
            dec!(300),
            dec!(0),
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.revenue), dec!(-500));
        assert_eq!(store.balance_of(scenario.receivable), dec!(-200));
        assert_eq!(store.balance_of(scenario.cash), dec!(-300));
    }
}

mod purchases {
    use super::*;

    #[tokio::test]
    async fn credit_purchase_books_payable_and_supplier_debt() {
        let scenario = PostingScenario::standard();
        let supplier = SupplierId::new_v7();
        scenario.store.seed_event(purchase_event(
            scenario.company_id,
            Some(supplier),
            dec!(2000),
            dec!(0),
            None,
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert!(summary.is_clean());

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.inventory), dec!(2000));
        assert_eq!(store.balance_of(scenario.payable), dec!(2000));
        assert_eq!(
            store.outstanding_of(PartyRef::Supplier(supplier)),
            dec!(2000)
        );
    }

    #[tokio::test]
    async fn partially_paid_purchase_splits_settlement() {
        let scenario = PostingScenario::standard();
        let supplier = SupplierId::new_v7();
        scenario.store.seed_event(purchase_event(
            scenario.company_id,
            Some(supplier),
            dec!(2000),
            dec!(800),
            Some("bank"),
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.inventory), dec!(2000));
        assert_eq!(store.balance_of(scenario.bank), dec!(-800));
        assert_eq!(store.balance_of(scenario.payable), dec!(1200));
        assert_eq!(
            store.outstanding_of(PartyRef::Supplier(supplier)),
            dec!(1200)
        );

        // Payable carries the full invoice plus an offsetting debit for
        // the paid portion, mirroring the purchase document.
        let lines = store.lines();
        assert_eq!(lines.len(), 4);
        let payable_lines: Vec<_> = lines
            .iter()
            .filter(|l| l.account_id == scenario.payable)
            .collect();
        assert_eq!(payable_lines.len(), 2);
        assert!(payable_lines
            .iter()
            .any(|l| l.credit == dec!(2000) && l.debit.is_zero()));
        assert!(payable_lines
            .iter()
            .any(|l| l.debit == dec!(800) && l.credit.is_zero()));
    }

    #[tokio::test]
    async fn foreign_purchase_converts_and_stamps_currency() {
        let scenario = PostingScenario::standard();
        let supplier = SupplierId::new_v7();
        scenario.store.seed_event(foreign_purchase_event(
            scenario.company_id,
            Some(supplier),
            dec!(1000),
            dec!(400),
            Some("bank"),
            "EUR",
            dec!(1.1),
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert!(summary.is_clean());

        // Balances move in base amounts converted at the document rate
        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.inventory), dec!(1100.00));
        assert_eq!(store.balance_of(scenario.bank), dec!(-440.00));
        assert_eq!(store.balance_of(scenario.payable), dec!(660.00));
        assert_eq!(
            store.outstanding_of(PartyRef::Supplier(supplier)),
            dec!(660.00)
        );

        // Every line keeps the document currency alongside its base amount
        let lines = store.lines();
        assert_eq!(lines.len(), 4);
        for line in &lines {
            assert_eq!(line.currency_code, Some(Currency::EUR));
            assert_eq!(line.exchange_rate, Some(dec!(1.1)));
        }
        let inventory_line = lines
            .iter()
            .find(|l| l.account_id == scenario.inventory)
            .unwrap();
        assert_eq!(inventory_line.foreign_amount, Some(dec!(1000)));
        assert_eq!(inventory_line.base_amount, Some(dec!(1100.00)));
        let bank_line = lines.iter().find(|l| l.account_id == scenario.bank).unwrap();
        assert_eq!(bank_line.foreign_amount, Some(dec!(400)));
        assert_eq!(bank_line.base_amount, Some(dec!(440.00)));
    }

    #[tokio::test]
    async fn supplier_payment_clears_payable() {
        let scenario = PostingScenario::standard();
        let supplier = SupplierId::new_v7();
        scenario.store.seed_event(supplier_payment_event(
            scenario.company_id,
            supplier,
            dec!(700),
            "cash",
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.payable), dec!(-700));
        assert_eq!(store.balance_of(scenario.cash), dec!(-700));
        assert_eq!(
            store.outstanding_of(PartyRef::Supplier(supplier)),
            dec!(-700)
        );
    }
}

mod expenses {
    use super::*;

    #[tokio::test]
    async fn cash_expense_debits_chosen_account() {
        let scenario = PostingScenario::standard();
        // Expenses debit a concrete account, not a mapped role
        let rent = test_utils::account_with_balance(
            scenario.company_id,
            "6000",
            "Rent Expense",
            domain_ledger::AccountType::Expense,
            Decimal::ZERO,
        );
        let rent_id = rent.id;
        scenario.store.seed_account(rent);
        scenario
            .store
            .seed_event(expense_event(scenario.company_id, rent_id, dec!(900), "cash"));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert!(summary.is_clean());

        let store = dispatcher.store();
        assert_eq!(store.balance_of(rent_id), dec!(900));
        assert_eq!(store.balance_of(scenario.cash), dec!(-900));
    }

    #[tokio::test]
    async fn credit_expense_accrues_into_payable() {
        let scenario = PostingScenario::standard();
        let utilities = test_utils::account_with_balance(
            scenario.company_id,
            "6100",
            "Utilities Expense",
            domain_ledger::AccountType::Expense,
            Decimal::ZERO,
        );
        let utilities_id = utilities.id;
        scenario.store.seed_account(utilities);
        scenario.store.seed_event(expense_event(
            scenario.company_id,
            utilities_id,
            dec!(120),
            "credit",
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        let store = dispatcher.store();
        assert_eq!(store.balance_of(utilities_id), dec!(120));
        assert_eq!(store.balance_of(scenario.payable), dec!(120));
    }
}

mod openings {
    use super::*;

    #[tokio::test]
    async fn customer_opening_debit_balances_against_equity() {
        let scenario = PostingScenario::standard();
        let customer = CustomerId::new_v7();
        scenario.store.seed_event(customer_opening_event(
            scenario.company_id,
            customer,
            dec!(400),
            dec!(0),
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert!(summary.is_clean());

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.receivable), dec!(400));
        assert_eq!(store.balance_of(scenario.opening_equity), dec!(400));
        assert_eq!(store.outstanding_of(PartyRef::Customer(customer)), dec!(400));
    }

    #[tokio::test]
    async fn supplier_opening_nets_payable_and_advance() {
        let scenario = PostingScenario::standard();
        let supplier = SupplierId::new_v7();
        scenario.store.seed_event(supplier_opening_event(
            scenario.company_id,
            supplier,
            dec!(1000),
            dec!(300),
        ));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.payable), dec!(1000));
        assert_eq!(store.balance_of(scenario.receivable), dec!(300));
        assert_eq!(
            store.outstanding_of(PartyRef::Supplier(supplier)),
            dec!(700)
        );
    }
}

mod manual_journals {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn balanced_manual_journal_posts_verbatim() {
        let scenario = PostingScenario::standard();
        let lines = vec![
            json!({ "accountId": scenario.cash, "debit": "150" }),
            json!({ "accountId": scenario.revenue, "credit": "150" }),
        ];
        scenario
            .store
            .seed_event(manual_journal_event(scenario.company_id, lines));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert!(summary.is_clean());

        let store = dispatcher.store();
        assert_eq!(store.balance_of(scenario.cash), dec!(150));
        assert_eq!(store.balance_of(scenario.revenue), dec!(150));
    }

    #[tokio::test]
    async fn unbalanced_manual_journal_fails_and_stays_pending() {
        let scenario = PostingScenario::standard();
        let lines = vec![
            json!({ "accountId": scenario.cash, "debit": "150" }),
            json!({ "accountId": scenario.revenue, "credit": "100" }),
        ];
        let event = manual_journal_event(scenario.company_id, lines);
        let event_id = event.id;
        scenario.store.seed_event(event);

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        let summary = dispatcher.run_batch().await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.processed, 0);

        let store = dispatcher.store();
        assert!(!store.is_processed(event_id));
        assert!(store.lines().is_empty());
    }

    #[tokio::test]
    async fn manual_line_with_party_moves_outstanding() {
        let scenario = PostingScenario::standard();
        let customer = CustomerId::new_v7();
        let lines = vec![
            json!({ "accountId": scenario.receivable, "debit": "80", "customerId": customer }),
            json!({ "accountId": scenario.revenue, "credit": "80" }),
        ];
        scenario
            .store
            .seed_event(manual_journal_event(scenario.company_id, lines));

        let dispatcher = Dispatcher::new(Arc::new(scenario.store)).with_now(pinned_now());
        dispatcher.run_batch().await.unwrap();

        assert_eq!(
            dispatcher.store().outstanding_of(PartyRef::Customer(customer)),
            dec!(80)
        );
    }
}
