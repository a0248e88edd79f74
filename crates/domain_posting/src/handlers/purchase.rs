//! Purchase and supplier payment posting
//!
//! Purchases debit inventory and settle against cash, bank or accounts
//! payable depending on how much was paid. Purchase returns reverse the
//! inventory and recover the refund. Supplier payments clear payable.
//!
//! Foreign-currency documents are converted into base amounts with the
//! event's exchange rate; the original currency and amount are kept on
//! every line.

use rust_decimal::{Decimal, RoundingStrategy};

use domain_ledger::{
    AccountRole, DraftLine, EntryReference, ForeignAmount, JournalDraft, ReferenceType,
};

use crate::context::{Outcome, PostingContext, SideEffects, SkipReason};
use crate::error::PostingError;
use crate::event::{PaymentMethod, PurchaseKind, PurchasePayload, SupplierPaymentPayload};
use crate::ports::{PartyAdjustment, PartyRef};

/// Document-to-base conversion for one purchase event
struct Conversion {
    foreign: Option<ForeignAmount>,
    rate: Decimal,
}

impl Conversion {
    fn from_payload(payload: &PurchasePayload) -> Self {
        match (payload.currency_code, payload.purchase.exchange_rate) {
            (Some(currency), Some(rate)) if rate != Decimal::ONE => Self {
                foreign: Some(ForeignAmount {
                    currency,
                    exchange_rate: rate,
                    amount: Decimal::ZERO,
                }),
                rate,
            },
            _ => Self {
                foreign: None,
                rate: Decimal::ONE,
            },
        }
    }

    fn to_base(&self, amount: Decimal) -> Decimal {
        (amount * self.rate).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }

    fn stamp(&self, line: DraftLine, document_amount: Decimal) -> DraftLine {
        match &self.foreign {
            Some(f) => line.with_foreign(ForeignAmount {
                currency: f.currency,
                exchange_rate: f.exchange_rate,
                amount: document_amount,
            }),
            None => line,
        }
    }
}

pub(super) async fn post(
    ctx: &PostingContext<'_>,
    payload: PurchasePayload,
) -> Result<Outcome, PostingError> {
    let reference_type = match payload.kind {
        PurchaseKind::Purchase => ReferenceType::Purchase,
        PurchaseKind::Return => ReferenceType::PurchaseReturn,
    };
    let reference = EntryReference::new(reference_type, payload.purchase.id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    let period = ctx.active_period().await?;
    let mappings = ctx.mappings().await?;
    let conversion = Conversion::from_payload(&payload);

    match payload.kind {
        PurchaseKind::Purchase => post_purchase(ctx, payload, reference, &period, &mappings, &conversion).await,
        PurchaseKind::Return => post_return(ctx, payload, reference, &period, &mappings, &conversion).await,
    }
}

async fn post_purchase(
    ctx: &PostingContext<'_>,
    payload: PurchasePayload,
    reference: EntryReference,
    period: &domain_ledger::FiscalPeriod,
    mappings: &domain_ledger::AccountMappingSet,
    conversion: &Conversion,
) -> Result<Outcome, PostingError> {
    let purchase = &payload.purchase;
    let inventory = mappings.require(AccountRole::Inventory)?;

    let number = purchase
        .purchase_number
        .clone()
        .unwrap_or_else(|| purchase.id.to_string());
    let description = format!("Purchase {number}");

    let total = conversion.to_base(purchase.total_amount);
    let paid = conversion.to_base(purchase.amount_paid.min(purchase.total_amount));
    let credit_portion = total - paid;

    let mut draft = JournalDraft::new(description, reference)
        .with_branch(payload.branch_id)
        .line(conversion.stamp(
            DraftLine::debit(inventory, total).with_description("Inventory received"),
            purchase.total_amount,
        ));

    if paid > Decimal::ZERO {
        let method = purchase.payment_method.unwrap_or(PaymentMethod::Cash);
        let settlement = super::settlement_account(mappings, method, "purchase settlement")?;
        draft = draft.line(conversion.stamp(
            DraftLine::credit(settlement, paid)
                .with_description(format!("Paid via {method}")),
            purchase.amount_paid.min(purchase.total_amount),
        ));
    }

    let mut side = SideEffects::default();
    if credit_portion > Decimal::ZERO {
        // The payable is recognized for the full invoice; a paid portion
        // is an offsetting debit rather than a netted credit, so the row
        // shape mirrors the purchase document.
        let payable = mappings.require(AccountRole::AccountsPayable)?;
        draft = draft.line(conversion.stamp(
            DraftLine::credit(payable, total).with_description("Owed to supplier"),
            purchase.total_amount,
        ));
        if paid > Decimal::ZERO {
            draft = draft.line(conversion.stamp(
                DraftLine::debit(payable, paid).with_description("Payable settled at purchase"),
                purchase.amount_paid.min(purchase.total_amount),
            ));
        }
        if let Some(supplier_id) = purchase.supplier_id {
            side.party_adjustments.push(PartyAdjustment {
                party: PartyRef::Supplier(supplier_id),
                delta: credit_portion,
            });
        }
    }

    ctx.commit_journal_with(draft, period, payload.user_id, side)
        .await
}

async fn post_return(
    ctx: &PostingContext<'_>,
    payload: PurchasePayload,
    reference: EntryReference,
    period: &domain_ledger::FiscalPeriod,
    mappings: &domain_ledger::AccountMappingSet,
    conversion: &Conversion,
) -> Result<Outcome, PostingError> {
    let purchase = &payload.purchase;
    let inventory = mappings.require(AccountRole::Inventory)?;

    let document_refund = if purchase.refund_amount > Decimal::ZERO {
        purchase.refund_amount
    } else {
        purchase.total_amount
    };
    let refund = conversion.to_base(document_refund);

    let number = purchase
        .purchase_number
        .clone()
        .unwrap_or_else(|| purchase.id.to_string());
    let mut draft = JournalDraft::new(format!("Purchase return {number}"), reference)
        .with_branch(payload.branch_id)
        .line(conversion.stamp(
            DraftLine::credit(inventory, refund).with_description("Inventory returned"),
            document_refund,
        ));

    let mut side = SideEffects::default();
    match purchase.payment_method {
        // Refund received back into cash or bank
        Some(method @ (PaymentMethod::Cash | PaymentMethod::Bank)) => {
            let settlement = super::settlement_account(mappings, method, "purchase refund")?;
            draft = draft.line(conversion.stamp(
                DraftLine::debit(settlement, refund)
                    .with_description(format!("Refund received via {method}")),
                document_refund,
            ));
        }
        // Credit purchase: the return reduces what we owe the supplier
        _ => {
            let payable = mappings.require(AccountRole::AccountsPayable)?;
            draft = draft.line(conversion.stamp(
                DraftLine::debit(payable, refund).with_description("Payable reduced by return"),
                document_refund,
            ));
            if let Some(supplier_id) = purchase.supplier_id {
                side.party_adjustments.push(PartyAdjustment {
                    party: PartyRef::Supplier(supplier_id),
                    delta: -refund,
                });
            }
        }
    }

    ctx.commit_journal_with(draft, period, payload.user_id, side)
        .await
}

pub(super) async fn post_supplier_payment(
    ctx: &PostingContext<'_>,
    payload: SupplierPaymentPayload,
) -> Result<Outcome, PostingError> {
    let payment = &payload.payment;

    let reference = EntryReference::new(ReferenceType::SupplierPayment, payment.id);
    if ctx.already_posted(&reference).await? {
        return Ok(Outcome::Skipped {
            reason: SkipReason::AlreadyPosted,
        });
    }

    let period = ctx.active_period().await?;
    let mappings = ctx.mappings().await?;

    let settlement =
        super::settlement_account(&mappings, payment.payment_method, "supplier payment")?;
    let payable = mappings.require(AccountRole::AccountsPayable)?;

    let description = match payment.purchase_id {
        Some(purchase_id) => format!("Supplier payment for purchase {purchase_id}"),
        None => "Supplier payment".to_string(),
    };
    let draft = JournalDraft::new(description, reference)
        .with_branch(payment.branch_id)
        .debit(payable, payment.amount)
        .line(
            DraftLine::credit(settlement, payment.amount)
                .with_description(format!("Paid via {}", payment.payment_method)),
        );

    let mut side = SideEffects::default();
    if let Some(supplier_id) = payment.supplier_id {
        side.party_adjustments.push(PartyAdjustment {
            party: PartyRef::Supplier(supplier_id),
            delta: -payment.amount,
        });
    }

    ctx.commit_journal_with(draft, &period, payload.user_id, side)
        .await
}
