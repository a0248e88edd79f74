//! Business events and their typed payload contracts
//!
//! Upstream business operations (sale completion, payment capture, ...)
//! append immutable events to the backlog; the dispatcher is the only
//! component that reads and mutates them. Payloads arrive as structured
//! JSON documents and are validated into the [`EventPayload`] union at the
//! dispatch boundary, so handlers never see untyped data.
//!
//! Wire names are the upstream contract and are kept verbatim, including
//! the historical `createCutomer`/`createsupplier` spellings.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use core_kernel::{
    AccountId, BranchId, BusinessEventId, CompanyId, Currency, CustomerId, ExpenseId, FiscalPeriodId,
    JournalId, PaymentId, PurchaseId, SaleId, SaleReturnId, SupplierId, UserId,
};

use crate::error::PostingError;

/// The supported event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "sale")]
    Sale,
    #[serde(rename = "return")]
    Return,
    #[serde(rename = "payment")]
    Payment,
    #[serde(rename = "purchase")]
    Purchase,
    #[serde(rename = "purchase-payment")]
    SupplierPayment,
    #[serde(rename = "createCutomer")]
    CustomerOpening,
    #[serde(rename = "createsupplier")]
    SupplierOpening,
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "payment-outstanding")]
    OutstandingPayment,
    #[serde(rename = "manual-journal")]
    ManualJournal,
    #[serde(rename = "fiscal-year-close")]
    FiscalYearClose,
    #[serde(rename = "fiscal-year-open")]
    FiscalYearOpen,
}

impl EventType {
    /// Returns the wire/storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Sale => "sale",
            EventType::Return => "return",
            EventType::Payment => "payment",
            EventType::Purchase => "purchase",
            EventType::SupplierPayment => "purchase-payment",
            EventType::CustomerOpening => "createCutomer",
            EventType::SupplierOpening => "createsupplier",
            EventType::Expense => "expense",
            EventType::OutstandingPayment => "payment-outstanding",
            EventType::ManualJournal => "manual-journal",
            EventType::FiscalYearClose => "fiscal-year-close",
            EventType::FiscalYearOpen => "fiscal-year-open",
        }
    }

    /// The full supported set, in dispatch order
    pub fn all() -> &'static [EventType] {
        &[
            EventType::Sale,
            EventType::Return,
            EventType::Payment,
            EventType::Purchase,
            EventType::SupplierPayment,
            EventType::CustomerOpening,
            EventType::SupplierOpening,
            EventType::Expense,
            EventType::OutstandingPayment,
            EventType::ManualJournal,
            EventType::FiscalYearClose,
            EventType::FiscalYearOpen,
        ]
    }

    /// Parses a wire name, failing hard on unknown kinds
    pub fn parse(s: &str) -> Result<Self, PostingError> {
        EventType::all()
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| PostingError::UnsupportedEventType(s.to_string()))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a backlog event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Processed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Processed => "processed",
        }
    }
}

/// A pending or processed business event from the backlog
///
/// Immutable once `processed` is true, except for the `processed`/`status`
/// fields themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessEvent {
    pub id: BusinessEventId,
    pub company_id: CompanyId,
    pub event_type: EventType,
    pub payload: Value,
    pub processed: bool,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

impl BusinessEvent {
    /// Creates an unprocessed event
    pub fn new(company_id: CompanyId, event_type: EventType, payload: Value) -> Self {
        Self {
            id: BusinessEventId::new_v7(),
            company_id,
            event_type,
            payload,
            processed: false,
            status: EventStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// How a settlement was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[serde(alias = "bank_transfer", alias = "transfer", alias = "card")]
    Bank,
    #[serde(alias = "on_credit")]
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Credit => "credit",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement status of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Partial,
    Unpaid,
}

/// The sale document embedded in a `sale` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDoc {
    pub id: SaleId,
    pub total: Decimal,
    #[serde(default)]
    pub amount_paid: Decimal,
    pub status: SaleStatus,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

/// One sold item, carried for entry descriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Payload of a `sale` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePayload {
    pub sale: SaleDoc,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub sale_items: Vec<SaleItem>,
    #[serde(default)]
    pub cashier_id: Option<UserId>,
    /// Cost of the goods sold, posted COGS/inventory when both roles are mapped
    #[serde(default, rename = "returnTotalCOGS")]
    pub return_total_cogs: Decimal,
}

/// Payload of a `return` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnPayload {
    pub return_id: SaleReturnId,
    pub return_number: String,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub cashier_id: Option<UserId>,
    /// Total value returned to the customer (revenue reversal)
    pub return_to_customer: Decimal,
    #[serde(default, rename = "returnTotalCOGS")]
    pub return_total_cogs: Decimal,
    /// Portion of the refund that reduces accounts receivable
    #[serde(default, rename = "refundFromAR")]
    pub refund_from_ar: Decimal,
    /// Portion of the refund paid out in cash or from the bank
    #[serde(default)]
    pub refund_from_cash_bank: Decimal,
    #[serde(default)]
    pub return_sale_id: Option<SaleId>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

/// The payment document embedded in a `payment` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDoc {
    pub id: PaymentId,
    pub sale_id: SaleId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_details: Option<String>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

/// Payload of a `payment` event (sale debt collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub payment: PaymentDoc,
}

/// The payment document embedded in a `payment-outstanding` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutstandingPaymentDoc {
    pub id: PaymentId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

/// Payload of a `payment-outstanding` event (debt settlement not tied to one sale)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutstandingPaymentPayload {
    pub payment: OutstandingPaymentDoc,
}

/// Whether a `purchase` event records a purchase or a purchase return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseKind {
    Purchase,
    Return,
}

/// The purchase document embedded in a `purchase` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDoc {
    pub id: PurchaseId,
    #[serde(default)]
    pub purchase_number: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub amount_paid: Decimal,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Base units per one unit of the document currency
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    /// Refund received for a purchase return, zero when none
    #[serde(default)]
    pub refund_amount: Decimal,
}

/// Payload of a `purchase` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePayload {
    pub purchase: PurchaseDoc,
    #[serde(rename = "type")]
    pub kind: PurchaseKind,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub currency_code: Option<Currency>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub payment_details: Option<String>,
}

/// The payment document embedded in a `purchase-payment` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPaymentDoc {
    pub id: PaymentId,
    #[serde(default)]
    pub purchase_id: Option<PurchaseId>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

/// Payload of a `purchase-payment` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPaymentPayload {
    pub payment: SupplierPaymentDoc,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// The expense document embedded in an `expense` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDoc {
    pub id: ExpenseId,
    pub amount: Decimal,
    /// The concrete expense account to debit; not role-resolved
    pub expense_account_id: AccountId,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

/// Payload of an `expense` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    pub expense: ExpenseDoc,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Payload of a `createCutomer` event (customer opening balance)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOpeningPayload {
    pub customer_id: CustomerId,
    /// What the customer owes on onboarding
    #[serde(default)]
    pub opening_debit: Decimal,
    /// Credit the customer carries with us (prepayments)
    #[serde(default)]
    pub opening_credit: Decimal,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Payload of a `createsupplier` event (supplier opening balance)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOpeningPayload {
    pub supplier_id: SupplierId,
    /// What we owe the supplier on onboarding
    #[serde(default)]
    pub opening_payable: Decimal,
    /// Advances already paid to the supplier
    #[serde(default)]
    pub opening_advance: Decimal,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// One caller-supplied line of a manual journal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualLine {
    pub account_id: AccountId,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
}

/// The journal document embedded in a `manual-journal` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualJournalDoc {
    pub id: JournalId,
    #[serde(default)]
    pub reference: Option<String>,
    pub description: String,
    pub lines: Vec<ManualLine>,
}

/// Payload of a `manual-journal` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualJournalPayload {
    pub journal: ManualJournalDoc,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Payload of a `fiscal-year-close` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalYearClosePayload {
    pub fiscal_period_id: FiscalPeriodId,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Payload of a `fiscal-year-open` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalYearOpenPayload {
    pub period_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// The typed payload union, one variant per event kind
#[derive(Debug, Clone)]
pub enum EventPayload {
    Sale(SalePayload),
    Return(ReturnPayload),
    Payment(PaymentPayload),
    Purchase(PurchasePayload),
    SupplierPayment(SupplierPaymentPayload),
    CustomerOpening(CustomerOpeningPayload),
    SupplierOpening(SupplierOpeningPayload),
    Expense(ExpensePayload),
    OutstandingPayment(OutstandingPaymentPayload),
    ManualJournal(ManualJournalPayload),
    FiscalYearClose(FiscalYearClosePayload),
    FiscalYearOpen(FiscalYearOpenPayload),
}

impl EventPayload {
    /// Validates a raw payload document against the contract for its kind
    ///
    /// This runs once at the dispatcher boundary; handlers only ever see
    /// typed documents.
    pub fn parse(event_type: EventType, payload: &Value) -> Result<Self, PostingError> {
        fn typed<T: serde::de::DeserializeOwned>(
            event_type: EventType,
            payload: &Value,
        ) -> Result<T, PostingError> {
            serde_json::from_value(payload.clone())
                .map_err(|e| PostingError::invalid_payload(event_type, e.to_string()))
        }

        Ok(match event_type {
            EventType::Sale => EventPayload::Sale(typed(event_type, payload)?),
            EventType::Return => EventPayload::Return(typed(event_type, payload)?),
            EventType::Payment => EventPayload::Payment(typed(event_type, payload)?),
            EventType::Purchase => EventPayload::Purchase(typed(event_type, payload)?),
            EventType::SupplierPayment => {
                EventPayload::SupplierPayment(typed(event_type, payload)?)
            }
            EventType::CustomerOpening => {
                EventPayload::CustomerOpening(typed(event_type, payload)?)
            }
            EventType::SupplierOpening => {
                EventPayload::SupplierOpening(typed(event_type, payload)?)
            }
            EventType::Expense => EventPayload::Expense(typed(event_type, payload)?),
            EventType::OutstandingPayment => {
                EventPayload::OutstandingPayment(typed(event_type, payload)?)
            }
            EventType::ManualJournal => EventPayload::ManualJournal(typed(event_type, payload)?),
            EventType::FiscalYearClose => {
                EventPayload::FiscalYearClose(typed(event_type, payload)?)
            }
            EventType::FiscalYearOpen => EventPayload::FiscalYearOpen(typed(event_type, payload)?),
        })
    }
}
