//! Manual journal posting
//!
//! Lines arrive already shaped by the caller and are inserted verbatim
//! once validated: every line carries exactly one side, and the entry
//! must balance. Lines tagged with a customer or supplier also move that
//! party's outstanding amount.

use rust_decimal::Decimal;

use domain_ledger::{DraftLine, EntryReference, JournalDraft, ReferenceType};

use crate::context::{Outcome, PostingContext, SideEffects, SkipReason};
use crate::error::PostingError;
use crate::event::ManualJournalPayload;
use crate::ports::{PartyAdjustment, PartyRef};

pub(super) async fn post(
    ctx: &PostingContext<'_>,
    payload: ManualJournalPayload,
) -> Result<Outcome, PostingError> {
    let journal = &payload.journal;

    let reference = EntryReference::new(ReferenceType::ManualJournal, journal.id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    let period = ctx.active_period().await?;

    let mut draft = JournalDraft::new(journal.description.clone(), reference);
    let mut side = SideEffects::default();

    for line in &journal.lines {
        if line.debit > Decimal::ZERO && line.credit > Decimal::ZERO {
            return Err(PostingError::invalid_payload(
                crate::event::EventType::ManualJournal,
                format!("line for account {} has both a debit and a credit", line.account_id),
            ));
        }
        let mut draft_line = if line.debit > Decimal::ZERO {
            DraftLine::debit(line.account_id, line.debit)
        } else {
            DraftLine::credit(line.account_id, line.credit)
        };
        if let Some(description) = &line.description {
            draft_line = draft_line.with_description(description.clone());
        }
        draft = draft.line(draft_line);

        // Customer outstanding follows the debit side, supplier the
        // credit side.
        if let Some(customer_id) = line.customer_id {
            let delta = line.debit - line.credit;
            if delta != Decimal::ZERO {
                side.party_adjustments.push(PartyAdjustment {
                    party: PartyRef::Customer(customer_id),
                    delta,
                });
            }
        }
        if let Some(supplier_id) = line.supplier_id {
            let delta = line.credit - line.debit;
            if delta != Decimal::ZERO {
                side.party_adjustments.push(PartyAdjustment {
                    party: PartyRef::Supplier(supplier_id),
                    delta,
                });
            }
        }
    }

    ctx.commit_journal_with(draft, &period, payload.user_id, side)
        .await
}
