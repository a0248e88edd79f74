//! PostgreSQL posting store
//!
//! Production implementation of the [`PostingStore`] port. All reads use
//! runtime-bound queries; the posting commit runs inside one transaction
//! so a crash can never leave lines without their balance updates.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{AccountId, BusinessEventId, CompanyId, FiscalPeriodId, SaleId};
use domain_ledger::{
    Account, AccountMapping, AccountRole, AccountType, EntryReference, FiscalPeriod, LedgerLine,
};
use domain_posting::ports::{PartyRef, PostingCommit, PostingStore, StoreError};
use domain_posting::{BusinessEvent, EventStatus, EventType};

use crate::error::DatabaseError;

/// PostgreSQL-backed [`PostingStore`]
#[derive(Debug, Clone)]
pub struct PgPostingStore {
    pool: PgPool,
}

impl PgPostingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode_event(row: PgRow) -> Result<BusinessEvent, StoreError> {
    let event_type_raw: String = row.try_get("event_type").map_err(db)?;
    let event_type = EventType::parse(&event_type_raw)
        .map_err(|e| StoreError::internal(e.to_string()))?;
    let processed: bool = row.try_get("processed").map_err(db)?;

    Ok(BusinessEvent {
        id: BusinessEventId::from(row.try_get::<Uuid, _>("id").map_err(db)?),
        company_id: CompanyId::from(row.try_get::<Uuid, _>("company_id").map_err(db)?),
        event_type,
        payload: row.try_get("payload").map_err(db)?,
        processed,
        status: if processed {
            EventStatus::Processed
        } else {
            EventStatus::Pending
        },
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(db)?,
    })
}

fn decode_account(row: PgRow) -> Result<Account, StoreError> {
    let account_type_raw: String = row.try_get("account_type").map_err(db)?;
    let account_type = AccountType::from_str(&account_type_raw)
        .map_err(|e| StoreError::internal(e.to_string()))?;

    Ok(Account {
        id: AccountId::from(row.try_get::<Uuid, _>("id").map_err(db)?),
        company_id: CompanyId::from(row.try_get::<Uuid, _>("company_id").map_err(db)?),
        code: row.try_get("code").map_err(db)?,
        name: row.try_get("name").map_err(db)?,
        account_type,
        balance: row.try_get::<Decimal, _>("balance").map_err(db)?,
        is_active: row.try_get("is_active").map_err(db)?,
    })
}

fn decode_period(row: PgRow) -> Result<FiscalPeriod, StoreError> {
    Ok(FiscalPeriod {
        id: FiscalPeriodId::from(row.try_get::<Uuid, _>("id").map_err(db)?),
        company_id: CompanyId::from(row.try_get::<Uuid, _>("company_id").map_err(db)?),
        period_name: row.try_get("period_name").map_err(db)?,
        start_date: row.try_get::<NaiveDate, _>("start_date").map_err(db)?,
        end_date: row.try_get::<NaiveDate, _>("end_date").map_err(db)?,
        is_closed: row.try_get("is_closed").map_err(db)?,
    })
}

fn db(error: sqlx::Error) -> StoreError {
    DatabaseError::from_sqlx(error).into()
}

async fn insert_line(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    line: &LedgerLine,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, company_id, account_id, entry_number, description,
            debit, credit, entry_date, fiscal_period,
            reference_type, reference_id, branch_id, created_by,
            is_automated, currency_code, exchange_rate, foreign_amount, base_amount
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18
        )
        "#,
    )
    .bind(Uuid::from(line.id))
    .bind(Uuid::from(line.company_id))
    .bind(Uuid::from(line.account_id))
    .bind(&line.entry_number)
    .bind(&line.description)
    .bind(line.debit)
    .bind(line.credit)
    .bind(line.entry_date)
    .bind(&line.fiscal_period)
    .bind(line.reference.reference_type.as_str())
    .bind(line.reference.reference_id)
    .bind(line.branch_id.map(Uuid::from))
    .bind(line.created_by.map(Uuid::from))
    .bind(line.is_automated)
    .bind(line.currency_code.map(|c| c.code()))
    .bind(line.exchange_rate)
    .bind(line.foreign_amount)
    .bind(line.base_amount)
    .execute(&mut **tx)
    .await
    .map_err(db)?;
    Ok(())
}

#[async_trait]
impl PostingStore for PgPostingStore {
    #[instrument(skip(self, kinds))]
    async fn fetch_pending_events(
        &self,
        kinds: &[EventType],
        limit: u32,
    ) -> Result<Vec<BusinessEvent>, StoreError> {
        let kind_names: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, event_type, payload, processed, created_at
            FROM business_events
            WHERE processed = false AND event_type = ANY($1)
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(&kind_names)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.into_iter().map(decode_event).collect()
    }

    async fn mark_event_processed(&self, event_id: BusinessEventId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE business_events SET processed = true, status = 'processed' WHERE id = $1",
        )
        .bind(Uuid::from(event_id))
        .execute(&self.pool)
        .await
        .map_err(db)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("business event", event_id));
        }
        Ok(())
    }

    async fn default_mappings(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<AccountMapping>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT company_id, role, account_id, is_default
            FROM account_mappings
            WHERE company_id = $1 AND is_default = true
            "#,
        )
        .bind(Uuid::from(company_id))
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.into_iter()
            .map(|row| {
                let role_raw: String = row.try_get("role").map_err(db)?;
                let role = AccountRole::from_str(&role_raw)
                    .map_err(|e| StoreError::internal(e.to_string()))?;
                Ok(AccountMapping {
                    company_id: CompanyId::from(row.try_get::<Uuid, _>("company_id").map_err(db)?),
                    role,
                    account_id: AccountId::from(
                        row.try_get::<Uuid, _>("account_id").map_err(db)?,
                    ),
                    is_default: row.try_get("is_default").map_err(db)?,
                })
            })
            .collect()
    }

    async fn active_fiscal_period(
        &self,
        company_id: CompanyId,
        on: NaiveDate,
    ) -> Result<Option<FiscalPeriod>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, company_id, period_name, start_date, end_date, is_closed
            FROM fiscal_periods
            WHERE company_id = $1 AND is_closed = false
              AND start_date <= $2 AND end_date >= $2
            ORDER BY start_date DESC
            LIMIT 1
            "#,
        )
        .bind(Uuid::from(company_id))
        .bind(on)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.map(decode_period).transpose()
    }

    async fn fiscal_period(
        &self,
        company_id: CompanyId,
        period_id: FiscalPeriodId,
    ) -> Result<Option<FiscalPeriod>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, company_id, period_name, start_date, end_date, is_closed
            FROM fiscal_periods
            WHERE company_id = $1 AND id = $2
            "#,
        )
        .bind(Uuid::from(company_id))
        .bind(Uuid::from(period_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.map(decode_period).transpose()
    }

    async fn fiscal_period_by_name(
        &self,
        company_id: CompanyId,
        name: &str,
    ) -> Result<Option<FiscalPeriod>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, company_id, period_name, start_date, end_date, is_closed
            FROM fiscal_periods
            WHERE company_id = $1 AND period_name = $2
            "#,
        )
        .bind(Uuid::from(company_id))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        row.map(decode_period).transpose()
    }

    async fn accounts(
        &self,
        company_id: CompanyId,
        ids: &[AccountId],
    ) -> Result<Vec<Account>, StoreError> {
        let id_values: Vec<Uuid> = ids.iter().copied().map(Uuid::from).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, code, name, account_type, balance, is_active
            FROM accounts
            WHERE company_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(Uuid::from(company_id))
        .bind(&id_values)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        let accounts: Vec<Account> = rows
            .into_iter()
            .map(decode_account)
            .collect::<Result<_, _>>()?;
        if accounts.len() != ids.len() {
            let found: std::collections::HashSet<AccountId> =
                accounts.iter().map(|a| a.id).collect();
            if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
                return Err(StoreError::not_found("account", missing));
            }
        }
        Ok(accounts)
    }

    async fn income_statement_accounts(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, code, name, account_type, balance, is_active
            FROM accounts
            WHERE company_id = $1 AND is_active = true
              AND account_type IN ('REVENUE', 'EXPENSE', 'COST_OF_GOODS')
            ORDER BY code ASC
            "#,
        )
        .bind(Uuid::from(company_id))
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.into_iter().map(decode_account).collect()
    }

    async fn entry_exists(
        &self,
        company_id: CompanyId,
        reference: &EntryReference,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM ledger_entries
                WHERE company_id = $1 AND reference_type = $2 AND reference_id = $3
            )
            "#,
        )
        .bind(Uuid::from(company_id))
        .bind(reference.reference_type.as_str())
        .bind(reference.reference_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db)?;
        Ok(exists)
    }

    async fn sale_exists(&self, company_id: CompanyId, sale_id: SaleId) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sales WHERE company_id = $1 AND id = $2)",
        )
        .bind(Uuid::from(company_id))
        .bind(Uuid::from(sale_id))
        .fetch_one(&self.pool)
        .await
        .map_err(db)?;
        Ok(exists)
    }

    async fn next_entry_sequence(
        &self,
        company_id: CompanyId,
        year: i32,
    ) -> Result<u32, StoreError> {
        // Atomic upsert keeps concurrent allocators from handing out the
        // same number.
        let value: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO entry_sequences (company_id, year, last_value)
            VALUES ($1, $2, 1)
            ON CONFLICT (company_id, year)
            DO UPDATE SET last_value = entry_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(Uuid::from(company_id))
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(db)?;
        Ok(value as u32)
    }

    #[instrument(skip(self, commit), fields(event_id = %commit.event_id))]
    async fn commit_posting(&self, commit: PostingCommit) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db)?;

        for line in &commit.lines {
            insert_line(&mut tx, line).await?;
        }

        for delta in &commit.deltas {
            let result = sqlx::query(
                r#"
                UPDATE accounts
                SET balance = balance + $1, updated_at = now()
                WHERE id = $2 AND company_id = $3
                "#,
            )
            .bind(delta.delta)
            .bind(Uuid::from(delta.account_id))
            .bind(Uuid::from(commit.company_id))
            .execute(&mut *tx)
            .await
            .map_err(db)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("account", delta.account_id));
            }
        }

        for adjustment in &commit.party_adjustments {
            let (table, id) = match adjustment.party {
                PartyRef::Customer(customer_id) => ("customers", Uuid::from(customer_id)),
                PartyRef::Supplier(supplier_id) => ("suppliers", Uuid::from(supplier_id)),
            };
            let statement = format!(
                "UPDATE {table} SET outstanding = outstanding + $1 WHERE id = $2 AND company_id = $3"
            );
            sqlx::query(&statement)
                .bind(adjustment.delta)
                .bind(id)
                .bind(Uuid::from(commit.company_id))
                .execute(&mut *tx)
                .await
                .map_err(db)?;
        }

        if let Some(new_period) = &commit.open_period {
            sqlx::query(
                r#"
                INSERT INTO fiscal_periods (id, company_id, period_name, start_date, end_date, is_closed)
                VALUES ($1, $2, $3, $4, $5, false)
                "#,
            )
            .bind(Uuid::from(FiscalPeriodId::new_v7()))
            .bind(Uuid::from(new_period.company_id))
            .bind(&new_period.period_name)
            .bind(new_period.start_date)
            .bind(new_period.end_date)
            .execute(&mut *tx)
            .await
            .map_err(db)?;
        }

        if let Some(period_id) = commit.close_period_id {
            let result = sqlx::query(
                "UPDATE fiscal_periods SET is_closed = true WHERE id = $1 AND company_id = $2",
            )
            .bind(Uuid::from(period_id))
            .bind(Uuid::from(commit.company_id))
            .execute(&mut *tx)
            .await
            .map_err(db)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("fiscal period", period_id));
            }
        }

        sqlx::query("UPDATE business_events SET processed = true, status = 'processed' WHERE id = $1")
            .bind(Uuid::from(commit.event_id))
            .execute(&mut *tx)
            .await
            .map_err(db)?;

        tx.commit().await.map_err(db)?;

        debug!(
            lines = commit.lines.len(),
            deltas = commit.deltas.len(),
            "posting commit applied"
        );
        Ok(())
    }
}
