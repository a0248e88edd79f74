//! Fiscal year close and open
//!
//! Closing zeroes every income statement account into retained earnings
//! and marks the period closed in the same commit, so a crash can never
//! leave a closed period with live revenue balances. Opening creates the
//! next period; an existing period with the same name makes the event a
//! no-op.

use rust_decimal::Decimal;
use tracing::info;

use domain_ledger::{AccountRole, DraftLine, EntryReference, JournalDraft, NewFiscalPeriod, ReferenceType};

use crate::context::{Outcome, PostingContext, SideEffects, SkipReason};
use crate::error::PostingError;
use crate::event::{FiscalYearClosePayload, FiscalYearOpenPayload};
use crate::ports::StoreError;

pub(super) async fn post_close(
    ctx: &PostingContext<'_>,
    payload: FiscalYearClosePayload,
) -> Result<Outcome, PostingError> {
    let reference = EntryReference::new(ReferenceType::FiscalYearClose, payload.fiscal_period_id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    let period = ctx
        .store()
        .fiscal_period(ctx.company_id, payload.fiscal_period_id)
        .await?
        .ok_or_else(|| {
            StoreError::not_found("fiscal period", payload.fiscal_period_id)
        })?;
    if period.is_closed {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    let mappings = ctx.mappings().await?;
    let retained = mappings.require(AccountRole::RetainedEarnings)?;

    let accounts = ctx.store().income_statement_accounts(ctx.company_id).await?;

    let mut draft = JournalDraft::new(
        format!("Fiscal year close {}", period.period_name),
        reference,
    );
    let mut net_income = Decimal::ZERO;

    for account in &accounts {
        if account.balance == Decimal::ZERO {
            continue;
        }
        // Zeroing means posting the opposite of the account's normal
        // side for its current balance.
        let amount = account.balance.abs();
        let closes_with_credit = if account.account_type.is_debit_normal() {
            account.balance > Decimal::ZERO
        } else {
            account.balance < Decimal::ZERO
        };
        let line = if closes_with_credit {
            DraftLine::credit(account.id, amount)
        } else {
            DraftLine::debit(account.id, amount)
        };
        draft = draft.line(line.with_description(format!("Close {}", account.name)));

        if account.account_type.is_debit_normal() {
            net_income -= account.balance;
        } else {
            net_income += account.balance;
        }
    }

    if net_income > Decimal::ZERO {
        draft = draft.line(
            DraftLine::credit(retained, net_income).with_description("Net income for the year"),
        );
    } else if net_income < Decimal::ZERO {
        draft = draft.line(
            DraftLine::debit(retained, net_income.abs()).with_description("Net loss for the year"),
        );
    }

    let side = SideEffects {
        party_adjustments: Vec::new(),
        close_period_id: Some(period.id),
    };

    if draft.account_ids().is_empty() {
        // Nothing to close; still flip the period in one commit
        let mut commit = crate::ports::PostingCommit::new(ctx.company_id, ctx.event_id);
        commit.close_period_id = Some(period.id);
        ctx.store().commit_posting(commit).await?;
        return Ok(Outcome::Posted { entry_count: 0 });
    }

    info!(
        period = %period.period_name,
        net_income = %net_income,
        "closing fiscal year"
    );
    ctx.commit_journal_with(draft, &period, payload.user_id, side)
        .await
}

pub(super) async fn post_open(
    ctx: &PostingContext<'_>,
    payload: FiscalYearOpenPayload,
) -> Result<Outcome, PostingError> {
    let existing = ctx
        .store()
        .fiscal_period_by_name(ctx.company_id, &payload.period_name)
        .await?;
    if existing.is_some() {
        return Ok(Outcome::Skipped {
            reason: SkipReason::PeriodAlreadyOpen,
        });
    }

    let period = NewFiscalPeriod {
        company_id: ctx.company_id,
        period_name: payload.period_name,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };

    info!(period = %period.period_name, "opening fiscal period");
    ctx.open_period(period).await
}
