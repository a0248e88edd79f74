//! Customer payment posting
//!
//! Sale payments settle a specific sale's receivable; outstanding
//! payments settle a customer's debt without a sale reference. Both debit
//! the settlement account and credit accounts receivable.

use domain_ledger::{AccountRole, DraftLine, EntryReference, JournalDraft, ReferenceType};

use crate::context::{Outcome, PostingContext, SideEffects, SkipReason};
use crate::error::PostingError;
use crate::event::{OutstandingPaymentPayload, PaymentPayload};
use crate::ports::{PartyAdjustment, PartyRef};

pub(super) async fn post_sale_payment(
    ctx: &PostingContext<'_>,
    payload: PaymentPayload,
) -> Result<Outcome, PostingError> {
    let payment = &payload.payment;

    let reference = EntryReference::new(ReferenceType::Payment, payment.id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }
    // The sale may have been deleted between event creation and dispatch;
    // acknowledging instead of failing keeps the backlog from wedging.
    if !ctx.sale_exists(payment.sale_id).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::RelatedRecordMissing,
        });
    }

    let period = ctx.active_period().await?;
    let mappings = ctx.mappings().await?;

    let settlement = super::settlement_account(&mappings, payment.payment_method, "sale payment")?;
    let receivable = mappings.require(AccountRole::AccountsReceivable)?;

    let description = match &payment.payment_details {
        Some(details) => format!("Payment for sale {} ({details})", payment.sale_id),
        None => format!("Payment for sale {}", payment.sale_id),
    };
    let draft = JournalDraft::new(description, reference)
        .with_branch(payment.branch_id)
        .line(
            DraftLine::debit(settlement, payment.amount)
                .with_description(format!("Received via {}", payment.payment_method)),
        )
        .credit(receivable, payment.amount);

    let mut side = SideEffects::default();
    if let Some(customer_id) = payment.customer_id {
        side.party_adjustments.push(PartyAdjustment {
            party: PartyRef::Customer(customer_id),
            delta: -payment.amount,
        });
    }

    ctx.commit_journal_with(draft, &period, None, side).await
}

pub(super) async fn post_outstanding(
    ctx: &PostingContext<'_>,
    payload: OutstandingPaymentPayload,
) -> Result<Outcome, PostingError> {
    let payment = &payload.payment;

    let reference = EntryReference::new(ReferenceType::OutstandingPayment, payment.id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    let period = ctx.active_period().await?;
    let mappings = ctx.mappings().await?;

    let settlement =
        super::settlement_account(&mappings, payment.payment_method, "outstanding payment")?;
    let receivable = mappings.require(AccountRole::AccountsReceivable)?;

    let draft = JournalDraft::new("Outstanding debt payment", reference)
        .with_branch(payment.branch_id)
        .line(
            DraftLine::debit(settlement, payment.amount)
                .with_description(format!("Received via {}", payment.payment_method)),
        )
        .credit(receivable, payment.amount);

    let mut side = SideEffects::default();
    if let Some(customer_id) = payment.customer_id {
        side.party_adjustments.push(PartyAdjustment {
            party: PartyRef::Customer(customer_id),
            delta: -payment.amount,
        });
    }

    ctx.commit_journal_with(draft, &period, None, side).await
}
