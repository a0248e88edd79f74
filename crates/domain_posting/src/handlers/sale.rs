//! Sale posting
//!
//! The settlement split follows the sale's status:
//! - completed: cash against revenue for the full total
//! - partial: receivable against revenue for the total, then cash
//!   against receivable for whatever was collected
//! - unpaid: receivable against revenue for the full total
//!
//! When a completed sale collects more than the total, the full amount
//! paid lands in cash and the excess is carried as a customer
//! overpayment liability. Any other status paying over the total is an
//! invalid payload.
//! A cost-of-goods pair is added only when both the COGS and inventory
//! roles are mapped.

use rust_decimal::Decimal;
use tracing::debug;

use domain_ledger::{AccountRole, DraftLine, EntryReference, JournalDraft, ReferenceType};

use crate::context::{Outcome, PostingContext, SideEffects, SkipReason};
use crate::error::PostingError;
use crate::event::{EventType, SalePayload, SaleStatus};
use crate::ports::{PartyAdjustment, PartyRef};

pub(super) async fn post(
    ctx: &PostingContext<'_>,
    payload: SalePayload,
) -> Result<Outcome, PostingError> {
    let reference = EntryReference::new(ReferenceType::Sale, payload.sale.id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    let period = ctx.active_period().await?;
    let mappings = ctx.mappings().await?;

    let sale = &payload.sale;
    let cash = mappings.require(AccountRole::Cash)?;
    let revenue = mappings.require(AccountRole::SalesRevenue)?;

    let description = if payload.sale_items.is_empty() {
        format!("Sale {}", sale.id)
    } else {
        format!("Sale {} ({} items)", sale.id, payload.sale_items.len())
    };
    let mut draft = JournalDraft::new(description, reference).with_branch(sale.branch_id);
    let mut receivable_delta = Decimal::ZERO;

    if sale.amount_paid > sale.total {
        // Only a completed sale can collect more than it invoices.
        if sale.status != SaleStatus::Completed {
            return Err(PostingError::invalid_payload(
                EventType::Sale,
                format!(
                    "amount paid {} exceeds total {} on a sale with status '{:?}'",
                    sale.amount_paid, sale.total, sale.status
                ),
            ));
        }
        // Overpayment: the whole receipt hits cash, the excess is owed
        // back to the customer.
        let overpayment = mappings.require(AccountRole::CustomerOverpayment)?;
        let excess = sale.amount_paid - sale.total;
        draft = draft
            .line(
                DraftLine::debit(cash, sale.amount_paid)
                    .with_description("Payment received including overpayment"),
            )
            .credit(revenue, sale.total)
            .line(
                DraftLine::credit(overpayment, excess)
                    .with_description("Customer overpayment carried forward"),
            );
    } else {
        match sale.status {
            SaleStatus::Completed => {
                draft = draft.debit(cash, sale.total).credit(revenue, sale.total);
            }
            SaleStatus::Partial => {
                let receivable = mappings.require(AccountRole::AccountsReceivable)?;
                draft = draft
                    .debit(receivable, sale.total)
                    .credit(revenue, sale.total);
                // A partial sale with nothing collected yet carries no
                // settlement pair.
                if sale.amount_paid > Decimal::ZERO {
                    draft = draft
                        .line(
                            DraftLine::debit(cash, sale.amount_paid)
                                .with_description("Partial payment received"),
                        )
                        .credit(receivable, sale.amount_paid);
                }
                receivable_delta = sale.total - sale.amount_paid;
            }
            SaleStatus::Unpaid => {
                let receivable = mappings.require(AccountRole::AccountsReceivable)?;
                draft = draft.debit(receivable, sale.total).credit(revenue, sale.total);
                receivable_delta = sale.total;
            }
        }
    }

    if payload.return_total_cogs > Decimal::ZERO
        && mappings.has_pair(AccountRole::CostOfGoodsSold, AccountRole::Inventory)
    {
        let cogs = mappings.require(AccountRole::CostOfGoodsSold)?;
        let inventory = mappings.require(AccountRole::Inventory)?;
        draft = draft
            .line(
                DraftLine::debit(cogs, payload.return_total_cogs)
                    .with_description("Cost of goods sold"),
            )
            .credit(inventory, payload.return_total_cogs);
    } else if payload.return_total_cogs > Decimal::ZERO {
        debug!(sale_id = %sale.id, "COGS roles not mapped, skipping cost lines");
    }

    let mut side = SideEffects::default();
    if receivable_delta != Decimal::ZERO {
        if let Some(customer_id) = payload.customer_id {
            side.party_adjustments.push(PartyAdjustment {
                party: PartyRef::Customer(customer_id),
                delta: receivable_delta,
            });
        }
    }

    ctx.commit_journal_with(draft, &period, payload.cashier_id, side)
        .await
}
