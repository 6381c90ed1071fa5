//! Daily flow log persistence.
//!
//! # Invariants
//! - `upsert_entry` keeps one active row per `(subject_id, log_date)`;
//!   re-submitting a date updates the flow in place and keeps the id.
//! - Deletion only flips the tombstone flag.
//! - `sequence` is the SQLite rowid; an upsert on an existing date keeps it.

use crate::model::cycle_log::{CycleLogEntry, EntryId, FlowIntensity};
use crate::model::subject::SubjectId;
use crate::repo::sqlite::{
    bool_to_int, date_to_db, parse_date, parse_deleted_flag, parse_subject, parse_uuid,
};
use crate::repo::{RepoError, RepoResult, SqliteCycleRepository};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use uuid::Uuid;

const LOG_SELECT_SQL: &str = "SELECT
    uuid,
    subject_id,
    log_date,
    flow_intensity,
    is_deleted,
    rowid AS sequence
FROM cycle_logs";

/// Query options for listing a subject's log entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleLogQuery {
    pub subject_id: SubjectId,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
    pub include_deleted: bool,
}

impl CycleLogQuery {
    /// All active entries of one subject.
    pub fn for_subject(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            from: None,
            to: None,
            include_deleted: false,
        }
    }
}

/// Storage contract for daily flow logs.
pub trait CycleLogRepository {
    /// Inserts or updates the active entry for `(subject_id, date)`.
    fn upsert_entry(
        &self,
        subject_id: &SubjectId,
        date: NaiveDate,
        flow_intensity: FlowIntensity,
    ) -> RepoResult<CycleLogEntry>;
    fn get_entry(&self, id: EntryId, include_deleted: bool) -> RepoResult<Option<CycleLogEntry>>;
    /// Lists entries ordered by date ascending.
    fn list_entries(&self, query: &CycleLogQuery) -> RepoResult<Vec<CycleLogEntry>>;
    /// Tombstones an entry owned by `subject_id`. Repeated calls succeed.
    fn soft_delete_entry(&self, subject_id: &SubjectId, id: EntryId) -> RepoResult<()>;
}

impl CycleLogRepository for SqliteCycleRepository<'_> {
    fn upsert_entry(
        &self,
        subject_id: &SubjectId,
        date: NaiveDate,
        flow_intensity: FlowIntensity,
    ) -> RepoResult<CycleLogEntry> {
        let log_date = date_to_db(date);

        self.conn.execute(
            "INSERT INTO cycle_logs (uuid, subject_id, log_date, flow_intensity)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (subject_id, log_date) WHERE is_deleted = 0
             DO UPDATE SET
                flow_intensity = excluded.flow_intensity,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                Uuid::new_v4().to_string(),
                subject_id.as_str(),
                log_date.as_str(),
                flow_intensity.as_str(),
            ],
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "{LOG_SELECT_SQL}
             WHERE subject_id = ?1
               AND log_date = ?2
               AND is_deleted = 0;"
        ))?;
        let mut rows = stmt.query(params![subject_id.as_str(), log_date.as_str()])?;
        if let Some(row) = rows.next()? {
            return parse_log_row(row);
        }
        Err(RepoError::InvalidData(format!(
            "upserted log entry for {log_date} not found in read-back"
        )))
    }

    fn get_entry(&self, id: EntryId, include_deleted: bool) -> RepoResult<Option<CycleLogEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LOG_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_log_row(row)?));
        }
        Ok(None)
    }

    fn list_entries(&self, query: &CycleLogQuery) -> RepoResult<Vec<CycleLogEntry>> {
        let mut sql = format!("{LOG_SELECT_SQL} WHERE subject_id = ?");
        let mut bind_values = vec![Value::Text(query.subject_id.as_str().to_string())];

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }
        if let Some(from) = query.from {
            sql.push_str(" AND log_date >= ?");
            bind_values.push(Value::Text(date_to_db(from)));
        }
        if let Some(to) = query.to {
            sql.push_str(" AND log_date <= ?");
            bind_values.push(Value::Text(date_to_db(to)));
        }
        sql.push_str(" ORDER BY log_date ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_log_row(row)?);
        }
        Ok(entries)
    }

    fn soft_delete_entry(&self, subject_id: &SubjectId, id: EntryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE cycle_logs
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND subject_id = ?2;",
            params![id.to_string(), subject_id.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_log_row(row: &Row<'_>) -> RepoResult<CycleLogEntry> {
    let uuid_text: String = row.get("uuid")?;
    let subject_text: String = row.get("subject_id")?;
    let date_text: String = row.get("log_date")?;
    let flow_text: String = row.get("flow_intensity")?;

    let flow_intensity = FlowIntensity::parse(&flow_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid flow intensity `{flow_text}` in cycle_logs.flow_intensity"
        ))
    })?;

    Ok(CycleLogEntry {
        id: parse_uuid(&uuid_text, "cycle_logs.uuid")?,
        subject_id: parse_subject(&subject_text, "cycle_logs.subject_id")?,
        date: parse_date(&date_text, "cycle_logs.log_date")?,
        flow_intensity,
        is_deleted: parse_deleted_flag(row.get("is_deleted")?, "cycle_logs.is_deleted")?,
        sequence: row.get("sequence")?,
    })
}
