//! Manually declared period interval ("tracker" record).
//!
//! # Invariants
//! - `start` is always known; `end` is `None` while the run is open.
//! - A run whose `end` precedes `start` is kept as recorded; averaging
//!   skips it and reports a data inconsistency.

use crate::model::subject::SubjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a period run.
pub type RunId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclePeriodRun {
    pub id: RunId,
    pub subject_id: SubjectId,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub is_deleted: bool,
}

impl CyclePeriodRun {
    /// Opens a new run starting on `start`.
    pub fn open(subject_id: SubjectId, start: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            start,
            end: None,
            is_deleted: false,
        }
    }

    /// Creates a run with both bounds recorded.
    pub fn closed(subject_id: SubjectId, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            end: Some(end),
            ..Self::open(subject_id, start)
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Inclusive length in days.
    ///
    /// Returns `None` for open runs and for runs ending before they start.
    pub fn length_days(&self) -> Option<u32> {
        let end = self.end?;
        let span = (end - self.start).num_days();
        if span < 0 {
            return None;
        }
        u32::try_from(span + 1).ok()
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::CyclePeriodRun;
    use crate::model::subject::SubjectId;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn subject() -> SubjectId {
        SubjectId::parse("subject").expect("valid subject")
    }

    #[test]
    fn length_is_inclusive_of_both_ends() {
        let run = CyclePeriodRun::closed(subject(), date(2024, 3, 1), date(2024, 3, 5));
        assert_eq!(run.length_days(), Some(5));
    }

    #[test]
    fn open_and_reversed_runs_have_no_length() {
        let open = CyclePeriodRun::open(subject(), date(2024, 3, 1));
        assert!(open.is_open());
        assert_eq!(open.length_days(), None);

        let reversed = CyclePeriodRun::closed(subject(), date(2024, 3, 5), date(2024, 3, 1));
        assert_eq!(reversed.length_days(), None);
    }
}
