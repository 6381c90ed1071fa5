//! Repository contracts and SQLite persistence for cycle data.
//!
//! # Responsibility
//! - Define storage contracts consumed by the cycle service.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Reads reject malformed persisted values instead of masking them.
//! - Log and run lists are ordered by date ascending, then id.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   transport errors.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod cycle_log_repo;
pub mod period_run_repo;
pub mod profile_repo;
mod sqlite;

pub use sqlite::SqliteCycleRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for cycle persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No active record with this id exists for the subject.
    NotFound(Uuid),
    InvalidData(String),
    /// The connection was not migrated to the schema this build expects.
    SchemaNotReady { current: u32, expected: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted cycle data: {message}"),
            Self::SchemaNotReady { current, expected } => write!(
                f,
                "connection schema version {current} does not match expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Everything the cycle service needs from storage.
pub trait CycleStore:
    cycle_log_repo::CycleLogRepository
    + period_run_repo::PeriodRunRepository
    + profile_repo::ProfileRepository
{
}

impl<T> CycleStore for T where
    T: cycle_log_repo::CycleLogRepository
        + period_run_repo::PeriodRunRepository
        + profile_repo::ProfileRepository
{
}
