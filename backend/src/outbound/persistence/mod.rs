//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Connections come from a `bb8` pool via `diesel-async`. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) stay private; the
//! repository converts them to domain types and maps every database failure
//! to [`LedgerRepositoryError`](crate::domain::ports::LedgerRepositoryError).
//!
//! # Example
//!
//! ```rust,no_run
//! use kabadiyo::outbound::persistence::{DbPool, DieselLedgerRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/kabadiyo")).await?;
//! let repository = DieselLedgerRepository::new(pool);
//! # let _ = repository;
//! # Ok(())
//! # }
//! ```

mod diesel_ledger_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_ledger_repository::DieselLedgerRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
