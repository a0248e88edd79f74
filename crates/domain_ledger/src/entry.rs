//! Journal drafts and persisted ledger lines
//!
//! A posting handler builds a [`JournalDraft`] with the fluent debit/credit
//! builder; the draft is validated (one side per line, debits equal credits)
//! and then stamped into append-only [`LedgerLine`] rows at commit time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{AccountId, BranchId, CompanyId, Currency, LedgerLineId, UserId};

use crate::error::LedgerError;

/// The kind of source document a posting references
///
/// Together with the reference id this forms the idempotency key: at most
/// one posting may exist per `(reference_id, reference_type)` per company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Sale,
    SaleReturn,
    Payment,
    OutstandingPayment,
    Purchase,
    PurchaseReturn,
    SupplierPayment,
    Expense,
    CustomerOpening,
    SupplierOpening,
    ManualJournal,
    FiscalYearClose,
    FiscalYearOpen,
}

impl ReferenceType {
    /// Returns the wire/storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Sale => "sale",
            ReferenceType::SaleReturn => "sale_return",
            ReferenceType::Payment => "payment",
            ReferenceType::OutstandingPayment => "outstanding_payment",
            ReferenceType::Purchase => "purchase",
            ReferenceType::PurchaseReturn => "purchase_return",
            ReferenceType::SupplierPayment => "supplier_payment",
            ReferenceType::Expense => "expense",
            ReferenceType::CustomerOpening => "customer_opening",
            ReferenceType::SupplierOpening => "supplier_opening",
            ReferenceType::ManualJournal => "manual_journal",
            ReferenceType::FiscalYearClose => "fiscal_year_close",
            ReferenceType::FiscalYearOpen => "fiscal_year_open",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReferenceType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(ReferenceType::Sale),
            "sale_return" => Ok(ReferenceType::SaleReturn),
            "payment" => Ok(ReferenceType::Payment),
            "outstanding_payment" => Ok(ReferenceType::OutstandingPayment),
            "purchase" => Ok(ReferenceType::Purchase),
            "purchase_return" => Ok(ReferenceType::PurchaseReturn),
            "supplier_payment" => Ok(ReferenceType::SupplierPayment),
            "expense" => Ok(ReferenceType::Expense),
            "customer_opening" => Ok(ReferenceType::CustomerOpening),
            "supplier_opening" => Ok(ReferenceType::SupplierOpening),
            "manual_journal" => Ok(ReferenceType::ManualJournal),
            "fiscal_year_close" => Ok(ReferenceType::FiscalYearClose),
            "fiscal_year_open" => Ok(ReferenceType::FiscalYearOpen),
            other => Err(LedgerError::InvalidLine(format!(
                "unknown reference type '{other}'"
            ))),
        }
    }
}

/// Source-document reference carried by every line of a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryReference {
    pub reference_type: ReferenceType,
    pub reference_id: Uuid,
}

impl EntryReference {
    pub fn new(reference_type: ReferenceType, reference_id: impl Into<Uuid>) -> Self {
        Self {
            reference_type,
            reference_id: reference_id.into(),
        }
    }
}

/// Foreign-currency detail stamped on a line for multi-currency postings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignAmount {
    /// Original document currency
    pub currency: Currency,
    /// Rate used to convert into the base currency
    pub exchange_rate: Decimal,
    /// Amount in the document currency
    pub amount: Decimal,
}

/// A single line of a journal draft, before stamping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    /// Account to post to
    pub account_id: AccountId,
    /// Debit amount (zero when this is a credit line)
    pub debit: Decimal,
    /// Credit amount (zero when this is a debit line)
    pub credit: Decimal,
    /// Optional per-line description overriding the draft description
    pub description: Option<String>,
    /// Foreign-currency detail, if the source document was not in base currency
    pub foreign: Option<ForeignAmount>,
}

impl DraftLine {
    /// Creates a new debit line
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
            foreign: None,
        }
    }

    /// Creates a new credit line
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
            foreign: None,
        }
    }

    /// Adds a per-line description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches foreign-currency detail
    pub fn with_foreign(mut self, foreign: ForeignAmount) -> Self {
        self.foreign = Some(foreign);
        self
    }

    fn check(&self) -> Result<(), LedgerError> {
        if self.debit.is_sign_negative() || self.credit.is_sign_negative() {
            return Err(LedgerError::InvalidLine(format!(
                "negative amount on account {}: debit={}, credit={}",
                self.account_id, self.debit, self.credit
            )));
        }
        let has_debit = !self.debit.is_zero();
        let has_credit = !self.credit.is_zero();
        if has_debit && has_credit {
            return Err(LedgerError::InvalidLine(format!(
                "line on account {} sets both debit and credit",
                self.account_id
            )));
        }
        if !has_debit && !has_credit {
            return Err(LedgerError::InvalidLine(format!(
                "line on account {} has neither debit nor credit",
                self.account_id
            )));
        }
        Ok(())
    }
}

/// A balanced journal entry under construction
///
/// # Invariants (checked by [`JournalDraft::validate`])
///
/// - every line carries exactly one non-zero side, and it is non-negative
/// - total debits equal total credits
#[derive(Debug, Clone)]
pub struct JournalDraft {
    /// Entry description
    pub description: String,
    /// Source-document reference (idempotency key)
    pub reference: EntryReference,
    /// Branch the source document belongs to, if any
    pub branch_id: Option<BranchId>,
    /// Lines in posting order
    pub lines: Vec<DraftLine>,
}

impl JournalDraft {
    /// Creates a new empty draft
    pub fn new(description: impl Into<String>, reference: EntryReference) -> Self {
        Self {
            description: description.into(),
            reference,
            branch_id: None,
            lines: Vec::new(),
        }
    }

    /// Sets the branch
    pub fn with_branch(mut self, branch_id: Option<BranchId>) -> Self {
        self.branch_id = branch_id;
        self
    }

    /// Adds a debit line
    pub fn debit(mut self, account_id: AccountId, amount: Decimal) -> Self {
        self.lines.push(DraftLine::debit(account_id, amount));
        self
    }

    /// Adds a credit line
    pub fn credit(mut self, account_id: AccountId, amount: Decimal) -> Self {
        self.lines.push(DraftLine::credit(account_id, amount));
        self
    }

    /// Adds a pre-built line
    pub fn line(mut self, line: DraftLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Returns (total debits, total credits)
    pub fn totals(&self) -> (Decimal, Decimal) {
        let debits = self.lines.iter().map(|l| l.debit).sum();
        let credits = self.lines.iter().map(|l| l.credit).sum();
        (debits, credits)
    }

    /// Returns true if total debits equal total credits
    pub fn is_balanced(&self) -> bool {
        let (debits, credits) = self.totals();
        debits == credits
    }

    /// The distinct accounts this draft touches, in first-seen order
    pub fn account_ids(&self) -> Vec<AccountId> {
        let mut ids = Vec::new();
        for line in &self.lines {
            if !ids.contains(&line.account_id) {
                ids.push(line.account_id);
            }
        }
        ids
    }

    /// Validates every line and the balance invariant
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.lines.is_empty() {
            return Err(LedgerError::InvalidLine("draft has no lines".to_string()));
        }
        for line in &self.lines {
            line.check()?;
        }
        let (debits, credits) = self.totals();
        if debits != credits {
            return Err(LedgerError::Unbalanced { debits, credits });
        }
        Ok(())
    }

    /// Stamps the draft into persisted ledger lines
    ///
    /// The caller supplies everything the handler does not know: the owning
    /// company, the allocated entry number, the posting date, and the fiscal
    /// period name.
    pub fn into_lines(self, stamp: LineStamp) -> Vec<LedgerLine> {
        let branch_id = self.branch_id;
        let reference = self.reference;
        let description = self.description;
        self.lines
            .into_iter()
            .map(|line| LedgerLine {
                id: LedgerLineId::new_v7(),
                company_id: stamp.company_id,
                account_id: line.account_id,
                entry_number: stamp.entry_number.clone(),
                description: line.description.unwrap_or_else(|| description.clone()),
                debit: line.debit,
                credit: line.credit,
                entry_date: stamp.entry_date,
                fiscal_period: stamp.fiscal_period.clone(),
                reference,
                branch_id,
                created_by: stamp.created_by,
                is_automated: stamp.is_automated,
                currency_code: line.foreign.map(|f| f.currency),
                exchange_rate: line.foreign.map(|f| f.exchange_rate),
                foreign_amount: line.foreign.map(|f| f.amount),
                base_amount: line.foreign.map(|_| {
                    if line.debit.is_zero() {
                        line.credit
                    } else {
                        line.debit
                    }
                }),
            })
            .collect()
    }
}

/// Metadata stamped onto every line of a committed draft
#[derive(Debug, Clone)]
pub struct LineStamp {
    pub company_id: CompanyId,
    pub entry_number: String,
    pub entry_date: DateTime<Utc>,
    pub fiscal_period: Option<String>,
    pub created_by: Option<UserId>,
    pub is_automated: bool,
}

/// A persisted, append-only ledger line
///
/// Exactly one of `debit`/`credit` is non-zero; the draft builder enforces
/// this before any line is created. Rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLine {
    pub id: LedgerLineId,
    pub company_id: CompanyId,
    pub account_id: AccountId,
    pub entry_number: String,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub entry_date: DateTime<Utc>,
    pub fiscal_period: Option<String>,
    pub reference: EntryReference,
    pub branch_id: Option<BranchId>,
    pub created_by: Option<UserId>,
    pub is_automated: bool,
    pub currency_code: Option<Currency>,
    pub exchange_rate: Option<Decimal>,
    pub foreign_amount: Option<Decimal>,
    pub base_amount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reference() -> EntryReference {
        EntryReference::new(ReferenceType::Sale, Uuid::new_v4())
    }

    #[test]
    fn test_balanced_draft_validates() {
        let a = AccountId::new();
        let b = AccountId::new();
        let draft = JournalDraft::new("Cash sale", reference())
            .debit(a, dec!(1000))
            .credit(b, dec!(1000));

        assert!(draft.validate().is_ok());
        assert!(draft.is_balanced());
    }

    #[test]
    fn test_unbalanced_draft_rejected() {
        let draft = JournalDraft::new("Broken", reference())
            .debit(AccountId::new(), dec!(1000))
            .credit(AccountId::new(), dec!(900));

        assert!(matches!(
            draft.validate(),
            Err(LedgerError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_line_with_both_sides_rejected() {
        let mut line = DraftLine::debit(AccountId::new(), dec!(10));
        line.credit = dec!(10);
        let draft = JournalDraft::new("Broken", reference()).line(line);

        assert!(matches!(draft.validate(), Err(LedgerError::InvalidLine(_))));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let draft = JournalDraft::new("Broken", reference())
            .debit(AccountId::new(), dec!(-5))
            .credit(AccountId::new(), dec!(-5));

        assert!(matches!(draft.validate(), Err(LedgerError::InvalidLine(_))));
    }

    #[test]
    fn test_empty_draft_rejected() {
        let draft = JournalDraft::new("Empty", reference());
        assert!(matches!(draft.validate(), Err(LedgerError::InvalidLine(_))));
    }

    #[test]
    fn test_account_ids_deduplicated() {
        let a = AccountId::new();
        let b = AccountId::new();
        let draft = JournalDraft::new("Partial", reference())
            .debit(a, dec!(100))
            .credit(b, dec!(100))
            .debit(a, dec!(50))
            .credit(b, dec!(50));

        assert_eq!(draft.account_ids(), vec![a, b]);
    }

    #[test]
    fn test_into_lines_stamps_metadata() {
        let a = AccountId::new();
        let b = AccountId::new();
        let company = CompanyId::new();
        let draft = JournalDraft::new("Cash sale", reference())
            .debit(a, dec!(250))
            .credit(b, dec!(250));

        let lines = draft.into_lines(LineStamp {
            company_id: company,
            entry_number: "JE-2026-00001".to_string(),
            entry_date: Utc::now(),
            fiscal_period: Some("FY2026".to_string()),
            created_by: None,
            is_automated: true,
        });

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.company_id == company));
        assert!(lines.iter().all(|l| l.entry_number == "JE-2026-00001"));
        assert!(lines.iter().all(|l| l.fiscal_period.as_deref() == Some("FY2026")));
        assert!(lines.iter().all(|l| l.is_automated));
    }

    #[test]
    fn test_per_line_description_overrides() {
        let lines = JournalDraft::new("Sale", reference())
            .line(DraftLine::debit(AccountId::new(), dec!(10)).with_description("Cash received"))
            .credit(AccountId::new(), dec!(10))
            .into_lines(LineStamp {
                company_id: CompanyId::new(),
                entry_number: "JE-2026-00002".to_string(),
                entry_date: Utc::now(),
                fiscal_period: None,
                created_by: None,
                is_automated: true,
            });

        assert_eq!(lines[0].description, "Cash received");
        assert_eq!(lines[1].description, "Sale");
    }
}
