//! Opening balance posting for customers and suppliers
//!
//! Opening balances are balanced against opening balance equity, so the
//! ledger equation holds from the party's first day. Debit and credit
//! openings can both be present; they post as separate pairs and net in
//! the party's outstanding amount.

use rust_decimal::Decimal;

use domain_ledger::{AccountRole, DraftLine, EntryReference, JournalDraft, ReferenceType};

use crate::context::{Outcome, PostingContext, SideEffects, SkipReason};
use crate::error::PostingError;
use crate::event::{CustomerOpeningPayload, SupplierOpeningPayload};
use crate::ports::{PartyAdjustment, PartyRef};

pub(super) async fn post_customer(
    ctx: &PostingContext<'_>,
    payload: CustomerOpeningPayload,
) -> Result<Outcome, PostingError> {
    let reference = EntryReference::new(ReferenceType::CustomerOpening, payload.customer_id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    if payload.opening_debit <= Decimal::ZERO && payload.opening_credit <= Decimal::ZERO {
        // Nothing to post, just acknowledge the event
        return Ok(Outcome::Posted { entry_count: 0 });
    }

    let period = ctx.active_period().await?;
    let mappings = ctx.mappings().await?;

    let receivable = mappings.require(AccountRole::AccountsReceivable)?;
    let equity = mappings.require(AccountRole::OpeningBalanceEquity)?;

    let description = format!("Opening balance for customer {}", payload.customer_id);
    let mut draft = JournalDraft::new(description, reference);

    if payload.opening_debit > Decimal::ZERO {
        draft = draft
            .line(
                DraftLine::debit(receivable, payload.opening_debit)
                    .with_description("Customer owes on onboarding"),
            )
            .credit(equity, payload.opening_debit);
    }
    if payload.opening_credit > Decimal::ZERO {
        let overpayment = mappings.require(AccountRole::CustomerOverpayment)?;
        draft = draft
            .debit(equity, payload.opening_credit)
            .line(
                DraftLine::credit(overpayment, payload.opening_credit)
                    .with_description("Customer credit on onboarding"),
            );
    }

    let net = payload.opening_debit - payload.opening_credit;
    let mut side = SideEffects::default();
    if net != Decimal::ZERO {
        side.party_adjustments.push(PartyAdjustment {
            party: PartyRef::Customer(payload.customer_id),
            delta: net,
        });
    }

    ctx.commit_journal_with(draft, &period, payload.user_id, side)
        .await
}

pub(super) async fn post_supplier(
    ctx: &PostingContext<'_>,
    payload: SupplierOpeningPayload,
) -> Result<Outcome, PostingError> {
    let reference = EntryReference::new(ReferenceType::SupplierOpening, payload.supplier_id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    if payload.opening_payable <= Decimal::ZERO && payload.opening_advance <= Decimal::ZERO {
        return Ok(Outcome::Posted { entry_count: 0 });
    }

    let period = ctx.active_period().await?;
    let mappings = ctx.mappings().await?;

    let payable = mappings.require(AccountRole::AccountsPayable)?;
    let equity = mappings.require(AccountRole::OpeningBalanceEquity)?;

    let description = format!("Opening balance for supplier {}", payload.supplier_id);
    let mut draft = JournalDraft::new(description, reference);

    if payload.opening_payable > Decimal::ZERO {
        draft = draft
            .debit(equity, payload.opening_payable)
            .line(
                DraftLine::credit(payable, payload.opening_payable)
                    .with_description("Owed to supplier on onboarding"),
            );
    }
    if payload.opening_advance > Decimal::ZERO {
        let receivable = mappings.require(AccountRole::AccountsReceivable)?;
        draft = draft
            .line(
                DraftLine::debit(receivable, payload.opening_advance)
                    .with_description("Advance already paid to supplier"),
            )
            .credit(equity, payload.opening_advance);
    }

    let net = payload.opening_payable - payload.opening_advance;
    let mut side = SideEffects::default();
    if net != Decimal::ZERO {
        side.party_adjustments.push(PartyAdjustment {
            party: PartyRef::Supplier(payload.supplier_id),
            delta: net,
        });
    }

    ctx.commit_journal_with(draft, &period, payload.user_id, side)
        .await
}
