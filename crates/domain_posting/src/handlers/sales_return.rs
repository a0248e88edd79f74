//! Sale return posting
//!
//! Reverses the revenue recognised on the original sale and pays the
//! refund out of receivable, cash or bank depending on how the original
//! sale was settled. Inventory comes back at cost when the COGS and
//! inventory roles are mapped.

use rust_decimal::Decimal;

use domain_ledger::{AccountRole, DraftLine, EntryReference, JournalDraft, ReferenceType};

use crate::context::{Outcome, PostingContext, SideEffects, SkipReason};
use crate::error::PostingError;
use crate::event::{PaymentMethod, ReturnPayload};
use crate::ports::{PartyAdjustment, PartyRef};

pub(super) async fn post(
    ctx: &PostingContext<'_>,
    payload: ReturnPayload,
) -> Result<Outcome, PostingError> {
    let reference = EntryReference::new(ReferenceType::SaleReturn, payload.return_id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    let period = ctx.active_period().await?;
    let mappings = ctx.mappings().await?;

    let revenue = mappings.require(AccountRole::SalesRevenue)?;
    let description = format!("Sale return {}", payload.return_number);
    let mut draft = JournalDraft::new(description, reference).with_branch(payload.branch_id);

    if payload.return_to_customer > Decimal::ZERO {
        draft = draft.line(
            DraftLine::debit(revenue, payload.return_to_customer)
                .with_description("Revenue reversed on return"),
        );
    }

    if payload.refund_from_ar > Decimal::ZERO {
        let receivable = mappings.require(AccountRole::AccountsReceivable)?;
        draft = draft.line(
            DraftLine::credit(receivable, payload.refund_from_ar)
                .with_description("Receivable reduced by return"),
        );
    }

    if payload.refund_from_cash_bank > Decimal::ZERO {
        let method = payload.payment_method.unwrap_or(PaymentMethod::Cash);
        let settlement = super::settlement_account(&mappings, method, "sale return refund")?;
        draft = draft.line(
            DraftLine::credit(settlement, payload.refund_from_cash_bank)
                .with_description("Refund paid out"),
        );
    }

    if payload.return_total_cogs > Decimal::ZERO
        && mappings.has_pair(AccountRole::CostOfGoodsSold, AccountRole::Inventory)
    {
        let cogs = mappings.require(AccountRole::CostOfGoodsSold)?;
        let inventory = mappings.require(AccountRole::Inventory)?;
        draft = draft
            .line(
                DraftLine::debit(inventory, payload.return_total_cogs)
                    .with_description("Goods returned to inventory"),
            )
            .credit(cogs, payload.return_total_cogs);
    }

    let mut side = SideEffects::default();
    if payload.refund_from_ar > Decimal::ZERO {
        if let Some(customer_id) = payload.customer_id {
            side.party_adjustments.push(PartyAdjustment {
                party: PartyRef::Customer(customer_id),
                delta: -payload.refund_from_ar,
            });
        }
    }

    ctx.commit_journal_with(draft, &period, payload.cashier_id, side)
        .await
}
