//! Period run ("tracker") persistence.

use crate::model::period_run::{CyclePeriodRun, RunId};
use crate::model::subject::SubjectId;
use crate::repo::sqlite::{
    bool_to_int, date_to_db, parse_date, parse_deleted_flag, parse_subject, parse_uuid,
};
use crate::repo::{RepoError, RepoResult, SqliteCycleRepository};
use chrono::NaiveDate;
use rusqlite::{params, Row};

const RUN_SELECT_SQL: &str = "SELECT
    uuid,
    subject_id,
    start_date,
    end_date,
    is_deleted
FROM period_runs";

/// Storage contract for declared period intervals.
pub trait PeriodRunRepository {
    fn create_run(&self, run: &CyclePeriodRun) -> RepoResult<RunId>;
    /// Sets (or clears) the end date of an active run owned by `subject_id`.
    fn set_run_end(
        &self,
        subject_id: &SubjectId,
        id: RunId,
        end: Option<NaiveDate>,
    ) -> RepoResult<()>;
    fn get_run(&self, id: RunId, include_deleted: bool) -> RepoResult<Option<CyclePeriodRun>>;
    /// Lists runs ordered by start date ascending.
    fn list_runs(
        &self,
        subject_id: &SubjectId,
        include_deleted: bool,
    ) -> RepoResult<Vec<CyclePeriodRun>>;
    /// Latest active run without an end date, if any.
    fn find_open_run(&self, subject_id: &SubjectId) -> RepoResult<Option<CyclePeriodRun>>;
    fn soft_delete_run(&self, subject_id: &SubjectId, id: RunId) -> RepoResult<()>;
}

impl PeriodRunRepository for SqliteCycleRepository<'_> {
    fn create_run(&self, run: &CyclePeriodRun) -> RepoResult<RunId> {
        self.conn.execute(
            "INSERT INTO period_runs (uuid, subject_id, start_date, end_date, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                run.id.to_string(),
                run.subject_id.as_str(),
                date_to_db(run.start),
                run.end.map(date_to_db),
                bool_to_int(run.is_deleted),
            ],
        )?;
        Ok(run.id)
    }

    fn set_run_end(
        &self,
        subject_id: &SubjectId,
        id: RunId,
        end: Option<NaiveDate>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE period_runs
             SET
                end_date = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND subject_id = ?2
               AND is_deleted = 0;",
            params![id.to_string(), subject_id.as_str(), end.map(date_to_db)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_run(&self, id: RunId, include_deleted: bool) -> RepoResult<Option<CyclePeriodRun>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RUN_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_run_row(row)?));
        }
        Ok(None)
    }

    fn list_runs(
        &self,
        subject_id: &SubjectId,
        include_deleted: bool,
    ) -> RepoResult<Vec<CyclePeriodRun>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RUN_SELECT_SQL}
             WHERE subject_id = ?1
               AND (?2 = 1 OR is_deleted = 0)
             ORDER BY start_date ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![subject_id.as_str(), bool_to_int(include_deleted)])?;
        let mut runs = Vec::new();
        while let Some(row) = rows.next()? {
            runs.push(parse_run_row(row)?);
        }
        Ok(runs)
    }

    fn find_open_run(&self, subject_id: &SubjectId) -> RepoResult<Option<CyclePeriodRun>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RUN_SELECT_SQL}
             WHERE subject_id = ?1
               AND end_date IS NULL
               AND is_deleted = 0
             ORDER BY start_date DESC, uuid ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([subject_id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_run_row(row)?));
        }
        Ok(None)
    }

    fn soft_delete_run(&self, subject_id: &SubjectId, id: RunId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE period_runs
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

fn parse_run_row(row: &Row<'_>) -> RepoResult<CyclePeriodRun> {
    let uuid_text: String = row.get("uuid")?;
    let subject_text: String = row.get("subject_id")?;
    let start_text: String = row.get("start_date")?;
    let end = match row.get::<_, Option<String>>("end_date")? {
        Some(value) => Some(parse_date(&value, "period_runs.end_date")?),
        None => None,
    };

    Ok(CyclePeriodRun {
        id: parse_uuid(&uuid_text, "period_runs.uuid")?,
        subject_id: parse_subject(&subject_text, "period_runs.subject_id")?,
        start: parse_date(&start_text, "period_runs.start_date")?,
        end,
        is_deleted: parse_deleted_flag(row.get("is_deleted")?, "period_runs.is_deleted")?,
    })
}
