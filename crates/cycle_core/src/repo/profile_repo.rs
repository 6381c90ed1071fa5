//! Cycle profile persistence.
//!
//! # Invariants
//! - One row per subject; `save_profile` inserts or replaces every column.

use crate::config::CycleSettings;
use crate::model::profile::CycleProfile;
use crate::model::subject::SubjectId;
use crate::repo::sqlite::{date_to_db, parse_date, parse_subject};
use crate::repo::{RepoError, RepoResult, SqliteCycleRepository};
use rusqlite::{params, Row};

/// Storage contract for per-subject profiles.
pub trait ProfileRepository {
    fn get_profile(&self, subject_id: &SubjectId) -> RepoResult<Option<CycleProfile>>;
    fn save_profile(&self, profile: &CycleProfile) -> RepoResult<()>;
}

impl ProfileRepository for SqliteCycleRepository<'_> {
    fn get_profile(&self, subject_id: &SubjectId) -> RepoResult<Option<CycleProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                subject_id,
                cycle_length_days,
                period_length_days,
                last_period_start,
                next_period_predicted,
                avg_cycle_length,
                avg_period_length,
                recorded_cycles
             FROM cycle_profiles
             WHERE subject_id = ?1;",
        )?;
        let mut rows = stmt.query([subject_id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_profile_row(row)?));
        }
        Ok(None)
    }

    fn save_profile(&self, profile: &CycleProfile) -> RepoResult<()> {
        if profile.settings.cycle_length_days == 0
            || profile.settings.period_length_days == 0
            || profile.avg_cycle_length == 0
            || profile.avg_period_length == 0
        {
            return Err(RepoError::InvalidData(
                "profile lengths must be positive".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO cycle_profiles (
                subject_id,
                cycle_length_days,
                period_length_days,
                last_period_start,
                next_period_predicted,
                avg_cycle_length,
                avg_period_length,
                recorded_cycles
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (subject_id) DO UPDATE SET
                cycle_length_days = excluded.cycle_length_days,
                period_length_days = excluded.period_length_days,
                last_period_start = excluded.last_period_start,
                next_period_predicted = excluded.next_period_predicted,
                avg_cycle_length = excluded.avg_cycle_length,
                avg_period_length = excluded.avg_period_length,
                recorded_cycles = excluded.recorded_cycles,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                profile.subject_id.as_str(),
                profile.settings.cycle_length_days,
                profile.settings.period_length_days,
                profile.last_period_start.map(date_to_db),
                profile.next_period_predicted.map(date_to_db),
                profile.avg_cycle_length,
                profile.avg_period_length,
                profile.recorded_cycles,
            ],
        )?;
        Ok(())
    }
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<CycleProfile> {
    let subject_text: String = row.get("subject_id")?;
    let last_period_start = match row.get::<_, Option<String>>("last_period_start")? {
        Some(value) => Some(parse_date(&value, "cycle_profiles.last_period_start")?),
        None => None,
    };
    let next_period_predicted = match row.get::<_, Option<String>>("next_period_predicted")? {
        Some(value) => Some(parse_date(&value, "cycle_profiles.next_period_predicted")?),
        None => None,
    };

    Ok(CycleProfile {
        subject_id: parse_subject(&subject_text, "cycle_profiles.subject_id")?,
        settings: CycleSettings {
            cycle_length_days: row.get("cycle_length_days")?,
            period_length_days: row.get("period_length_days")?,
        },
        last_period_start,
        next_period_predicted,
        avg_cycle_length: row.get("avg_cycle_length")?,
        avg_period_length: row.get("avg_period_length")?,
        recorded_cycles: row.get("recorded_cycles")?,
    })
}
