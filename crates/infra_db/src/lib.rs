//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the posting engine, built on SQLx. The crate
//! exposes the connection pool, embedded migrations, and
//! [`PgPostingStore`], the production implementation of the
//! [`domain_posting::PostingStore`] port.
//!
//! # Atomicity
//!
//! A posting commit is one database transaction: ledger lines, account
//! balance updates, party outstanding updates, fiscal period transitions
//! and the event's processed mark all land together or not at all.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PgPostingStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/ledger")).await?;
//! infra_db::MIGRATOR.run(&pool).await?;
//! let store = PgPostingStore::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod store;

pub use error::DatabaseError;
pub use pool::{create_pool, DatabaseConfig, DatabasePool};
pub use store::PgPostingStore;

/// Embedded migrations, applied at startup
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
