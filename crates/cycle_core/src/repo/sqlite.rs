//! Shared SQLite handle and column codecs.

use crate::db::migrations::{current_version, latest_version};
use crate::model::subject::SubjectId;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed store for logs, period runs and profiles.
///
/// Borrows a caller-owned connection; implements every repository trait in
/// this module.
pub struct SqliteCycleRepository<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteCycleRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `RepoError::SchemaNotReady` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let current = current_version(conn)?;
        let expected = latest_version();
        if current != expected {
            return Err(RepoError::SchemaNotReady { current, expected });
        }
        Ok(Self { conn })
    }
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_subject(value: &str, column: &str) -> RepoResult<SubjectId> {
    SubjectId::parse(value)
        .map_err(|_| RepoError::InvalidData(format!("empty subject id in {column}")))
}

pub(crate) fn parse_deleted_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid is_deleted value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
