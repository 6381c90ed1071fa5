//! Per-subject cycle profile.
//!
//! # Responsibility
//! - Hold user-configured baselines and the cached prediction state.
//!
//! # Invariants
//! - One profile per subject, created lazily on first write.
//! - Derived fields (`last_period_start`, `next_period_predicted`, averages)
//!   are always recomputed from stored history, never edited directly.
//! - `avg_cycle_length` and `avg_period_length` are positive; before any
//!   history exists they mirror the configured settings.

use crate::config::CycleSettings;
use crate::model::subject::SubjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleProfile {
    pub subject_id: SubjectId,
    /// Configured `cycleLengthDays` / `periodLengthDays`.
    #[serde(flatten)]
    pub settings: CycleSettings,
    /// Date of the most recent onset entry.
    pub last_period_start: Option<NaiveDate>,
    pub next_period_predicted: Option<NaiveDate>,
    pub avg_cycle_length: u32,
    pub avg_period_length: u32,
    /// Number of measured cycle lengths that fed `avg_cycle_length`.
    pub recorded_cycles: u32,
}

impl CycleProfile {
    /// Creates an empty profile carrying only configuration.
    pub fn new(subject_id: SubjectId, settings: CycleSettings) -> Self {
        Self {
            subject_id,
            settings,
            last_period_start: None,
            next_period_predicted: None,
            avg_cycle_length: settings.cycle_length_days,
            avg_period_length: settings.period_length_days,
            recorded_cycles: 0,
        }
    }

    /// Whether at least one onset has been logged.
    pub fn has_data(&self) -> bool {
        self.last_period_start.is_some()
    }
}
