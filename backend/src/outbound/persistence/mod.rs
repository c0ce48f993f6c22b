//! PostgreSQL adapters built on Diesel with `diesel-async` and `bb8`.
//!
//! Row structs and table definitions stay private to this module; the
//! adapters translate them to domain types and map driver errors onto each
//! port's error enum.
//!
//! ```no_run
//! use spinwin::outbound::persistence::{DbPool, DieselRewardRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/spinwin")).await?;
//! let rewards = DieselRewardRepository::new(pool);
//! # let _ = rewards;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_review_repository;
mod diesel_reward_repository;
mod diesel_spin_ledger;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_reward_repository::DieselRewardRepository;
pub use diesel_spin_ledger::DieselSpinLedger;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
