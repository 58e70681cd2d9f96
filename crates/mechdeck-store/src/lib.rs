//! mechdeck: persistence adapters.
//!
//! PostgreSQL implementations of the progress store and reward ledger, plus
//! in-memory equivalents for local runs without a database. Either store can
//! be wrapped in a fallback that keeps play going while the store is down.

pub mod fallback;
pub mod memory;
pub mod pg_progress_repository;
pub mod pg_reward_ledger;

/// Embedded migrations from the workspace `migrations/` directory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

fn persistence_error(context: &str, err: &sqlx::Error) -> mechdeck_core::error::DomainError {
    mechdeck_core::error::DomainError::Persistence(format!("{context}: {err}"))
}
