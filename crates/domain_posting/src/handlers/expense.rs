//! Expense posting
//!
//! Debits the caller-chosen expense account directly and credits cash,
//! bank or accounts payable depending on the payment method.

use domain_ledger::{AccountRole, DraftLine, EntryReference, JournalDraft, ReferenceType};

use crate::context::{Outcome, PostingContext, SkipReason};
use crate::error::PostingError;
use crate::event::{ExpensePayload, PaymentMethod};

pub(super) async fn post(
    ctx: &PostingContext<'_>,
    payload: ExpensePayload,
) -> Result<Outcome, PostingError> {
    let expense = &payload.expense;

    let reference = EntryReference::new(ReferenceType::Expense, expense.id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    let period = ctx.active_period().await?;
    let mappings = ctx.mappings().await?;

    // Credit-method expenses accrue into payable instead of a settlement
    // account.
    let credit_account = match expense.payment_method {
        PaymentMethod::Credit => mappings.require(AccountRole::AccountsPayable)?,
        method => super::settlement_account(&mappings, method, "expense settlement")?,
    };

    let description = expense
        .description
        .clone()
        .unwrap_or_else(|| format!("Expense {}", expense.id));
    let draft = JournalDraft::new(description, reference)
        .with_branch(expense.branch_id)
        .debit(expense.expense_account_id, expense.amount)
        .line(
            DraftLine::credit(credit_account, expense.amount)
                .with_description(format!("Settled via {}", expense.payment_method)),
        );

    ctx.commit_journal(draft, &period, payload.user_id).await
}
