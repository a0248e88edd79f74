//! Posting handlers, one module per business area
//!
//! Each handler turns one typed payload into a balanced journal draft and
//! commits it through the context. Handlers never touch account balances
//! directly; balance deltas are derived from the committed lines.

use domain_ledger::{AccountMappingSet, AccountRole};

use core_kernel::AccountId;

use crate::context::{Outcome, PostingContext};
use crate::error::PostingError;
use crate::event::{EventPayload, PaymentMethod};

mod expense;
mod fiscal_year;
mod manual;
mod opening;
mod payment;
mod purchase;
mod sale;
mod sales_return;

/// Routes a typed payload to its handler
pub async fn dispatch(
    ctx: &PostingContext<'_>,
    payload: EventPayload,
) -> Result<Outcome, PostingError> {
    match payload {
        EventPayload::Sale(p) => sale::post(ctx, p).await,
        EventPayload::Return(p) => sales_return::post(ctx, p).await,
        EventPayload::Payment(p) => payment::post_sale_payment(ctx, p).await,
        EventPayload::OutstandingPayment(p) => payment::post_outstanding(ctx, p).await,
        EventPayload::Purchase(p) => purchase::post(ctx, p).await,
        EventPayload::SupplierPayment(p) => purchase::post_supplier_payment(ctx, p).await,
        EventPayload::Expense(p) => expense::post(ctx, p).await,
        EventPayload::CustomerOpening(p) => opening::post_customer(ctx, p).await,
        EventPayload::SupplierOpening(p) => opening::post_supplier(ctx, p).await,
        EventPayload::ManualJournal(p) => manual::post(ctx, p).await,
        EventPayload::FiscalYearClose(p) => fiscal_year::post_close(ctx, p).await,
        EventPayload::FiscalYearOpen(p) => fiscal_year::post_open(ctx, p).await,
    }
}

/// Resolves the account money actually moved through
///
/// Credit settlements have no settlement account; operations that need
/// one report the method as unsupported.
fn settlement_account(
    mappings: &AccountMappingSet,
    method: PaymentMethod,
    operation: &'static str,
) -> Result<AccountId, PostingError> {
    match method {
        PaymentMethod::Cash => Ok(mappings.require(AccountRole::Cash)?),
        PaymentMethod::Bank => Ok(mappings.require(AccountRole::Bank)?),
        PaymentMethod::Credit => Err(PostingError::UnsupportedPaymentMethod { method, operation }),
    }
}
