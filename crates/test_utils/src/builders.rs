//! Builders for test events
//!
//! Event payloads are JSON documents on the wire; these builders assemble
//! them the way the upstream system writes them, camelCase keys included.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use core_kernel::{
    AccountId, CompanyId, CustomerId, ExpenseId, PaymentId, PurchaseId, SaleId, SaleReturnId,
    SupplierId,
};
use domain_posting::{BusinessEvent, EventType};

/// Sequencing helper so seeded events keep a deterministic order
static EVENT_COUNTER: std::sync::atomic::AtomicI64 = std::sync::atomic::AtomicI64::new(0);

/// Wraps a payload into a pending event with a strictly increasing
/// creation time
pub fn pending_event(company_id: CompanyId, event_type: EventType, payload: Value) -> BusinessEvent {
    let offset = EVENT_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let mut event = BusinessEvent::new(company_id, event_type, payload);
    event.created_at = Utc::now() - Duration::hours(1) + Duration::milliseconds(offset);
    event
}

/// Builder for `sale` events
pub struct SaleEventBuilder {
    sale_id: SaleId,
    total: Decimal,
    amount_paid: Decimal,
    status: &'static str,
    customer_id: Option<CustomerId>,
    cogs: Decimal,
}

impl SaleEventBuilder {
    pub fn new(total: Decimal) -> Self {
        Self {
            sale_id: SaleId::new_v7(),
            total,
            amount_paid: total,
            status: "completed",
            customer_id: None,
            cogs: Decimal::ZERO,
        }
    }

    pub fn sale_id(mut self, sale_id: SaleId) -> Self {
        self.sale_id = sale_id;
        self
    }

    pub fn paid(mut self, amount_paid: Decimal) -> Self {
        self.amount_paid = amount_paid;
        self
    }

    pub fn status(mut self, status: &'static str) -> Self {
        self.status = status;
        self
    }

    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn cogs(mut self, cogs: Decimal) -> Self {
        self.cogs = cogs;
        self
    }

    pub fn build(self, company_id: CompanyId) -> BusinessEvent {
        let payload = json!({
            "sale": {
                "id": self.sale_id,
                "total": self.total,
                "amountPaid": self.amount_paid,
                "status": self.status
            },
            "customerId": self.customer_id,
            "saleItems": [],
            "returnTotalCOGS": self.cogs
        });
        pending_event(company_id, EventType::Sale, payload)
    }
}

pub fn payment_event(
    company_id: CompanyId,
    sale_id: SaleId,
    customer_id: Option<CustomerId>,
    amount: Decimal,
    method: &str,
) -> BusinessEvent {
    let payload = json!({
        "payment": {
            "id": PaymentId::new_v7(),
            "saleId": sale_id,
            "customerId": customer_id,
            "amount": amount,
            "paymentMethod": method
        }
    });
    pending_event(company_id, EventType::Payment, payload)
}

pub fn outstanding_payment_event(
    company_id: CompanyId,
    customer_id: CustomerId,
    amount: Decimal,
    method: &str,
) -> BusinessEvent {
    let payload = json!({
        "payment": {
            "id": PaymentId::new_v7(),
            "customerId": customer_id,
            "amount": amount,
            "paymentMethod": method
        }
    });
    pending_event(company_id, EventType::OutstandingPayment, payload)
}

pub fn sale_return_event(
    company_id: CompanyId,
    return_total: Decimal,
    refund_from_ar: Decimal,
    refund_from_cash: Decimal,
    cogs: Decimal,
) -> BusinessEvent {
    let payload = json!({
        "returnId": SaleReturnId::new_v7(),
        "returnNumber": "RET-0001",
        "returnToCustomer": return_total,
        "refundFromAR": refund_from_ar,
        "refundFromCashBank": refund_from_cash,
        "returnTotalCOGS": cogs,
        "paymentMethod": "cash"
    });
    pending_event(company_id, EventType::Return, payload)
}

pub fn purchase_event(
    company_id: CompanyId,
    supplier_id: Option<SupplierId>,
    total: Decimal,
    paid: Decimal,
    method: Option<&str>,
) -> BusinessEvent {
    let payload = json!({
        "purchase": {
            "id": PurchaseId::new_v7(),
            "supplierId": supplier_id,
            "totalAmount": total,
            "amountPaid": paid,
            "paymentMethod": method
        },
        "type": "purchase"
    });
    pending_event(company_id, EventType::Purchase, payload)
}

/// Purchase documented in a foreign currency, converted at `rate`
pub fn foreign_purchase_event(
    company_id: CompanyId,
    supplier_id: Option<SupplierId>,
    total: Decimal,
    paid: Decimal,
    method: Option<&str>,
    currency: &str,
    rate: Decimal,
) -> BusinessEvent {
    let payload = json!({
        "purchase": {
            "id": PurchaseId::new_v7(),
            "supplierId": supplier_id,
            "totalAmount": total,
            "amountPaid": paid,
            "paymentMethod": method,
            "exchangeRate": rate
        },
        "currencyCode": currency,
        "type": "purchase"
    });
    pending_event(company_id, EventType::Purchase, payload)
}

pub fn supplier_payment_event(
    company_id: CompanyId,
    supplier_id: SupplierId,
    amount: Decimal,
    method: &str,
) -> BusinessEvent {
    let payload = json!({
        "payment": {
            "id": PaymentId::new_v7(),
            "supplierId": supplier_id,
            "amount": amount,
            "paymentMethod": method
        }
    });
    pending_event(company_id, EventType::SupplierPayment, payload)
}

pub fn expense_event(
    company_id: CompanyId,
    expense_account_id: AccountId,
    amount: Decimal,
    method: &str,
) -> BusinessEvent {
    let payload = json!({
        "expense": {
            "id": ExpenseId::new_v7(),
            "amount": amount,
            "expenseAccountId": expense_account_id,
            "paymentMethod": method,
            "description": "Office supplies"
        }
    });
    pending_event(company_id, EventType::Expense, payload)
}

pub fn customer_opening_event(
    company_id: CompanyId,
    customer_id: CustomerId,
    opening_debit: Decimal,
    opening_credit: Decimal,
) -> BusinessEvent {
    let payload = json!({
        "customerId": customer_id,
        "openingDebit": opening_debit,
        "openingCredit": opening_credit
    });
    pending_event(company_id, EventType::CustomerOpening, payload)
}

pub fn supplier_opening_event(
    company_id: CompanyId,
    supplier_id: SupplierId,
    opening_payable: Decimal,
    opening_advance: Decimal,
) -> BusinessEvent {
    let payload = json!({
        "supplierId": supplier_id,
        "openingPayable": opening_payable,
        "openingAdvance": opening_advance
    });
    pending_event(company_id, EventType::SupplierOpening, payload)
}

pub fn manual_journal_event(company_id: CompanyId, lines: Vec<Value>) -> BusinessEvent {
    let payload = json!({
        "journal": {
            "id": uuid::Uuid::now_v7(),
            "description": "Manual adjustment",
            "lines": lines
        }
    });
    pending_event(company_id, EventType::ManualJournal, payload)
}

pub fn fiscal_year_close_event(company_id: CompanyId, period_id: impl Into<uuid::Uuid>) -> BusinessEvent {
    let payload = json!({ "fiscalPeriodId": period_id.into() });
    pending_event(company_id, EventType::FiscalYearClose, payload)
}

pub fn fiscal_year_open_event(
    company_id: CompanyId,
    name: &str,
    start: &str,
    end: &str,
) -> BusinessEvent {
    let payload = json!({
        "periodName": name,
        "startDate": start,
        "endDate": end
    });
    pending_event(company_id, EventType::FiscalYearOpen, payload)
}
