//! Daily flow log model.
//!
//! # Responsibility
//! - Define one observation of menstrual flow on a calendar date.
//! - Classify which intensities count as a period onset.
//!
//! # Invariants
//! - At most one active entry exists per `(subject_id, date)`; storage
//!   enforces this with a partial unique index.
//! - `id` is stable; re-submitting the same date keeps the original id.
//! - `is_deleted` is the tombstone flag; entries are never hard-deleted.
//! - `sequence` reflects the order in which dates were first recorded.

use crate::model::subject::SubjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a log entry.
pub type EntryId = Uuid;

/// Observed menstrual flow on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowIntensity {
    None,
    Spotting,
    Light,
    Medium,
    Heavy,
}

impl FlowIntensity {
    pub const ALL: [FlowIntensity; 5] = [
        FlowIntensity::None,
        FlowIntensity::Spotting,
        FlowIntensity::Light,
        FlowIntensity::Medium,
        FlowIntensity::Heavy,
    ];

    /// Whether this intensity is strong enough to mark a period onset.
    pub fn marks_onset(self) -> bool {
        matches!(self, FlowIntensity::Medium | FlowIntensity::Heavy)
    }

    /// Stable lowercase storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            FlowIntensity::None => "none",
            FlowIntensity::Spotting => "spotting",
            FlowIntensity::Light => "light",
            FlowIntensity::Medium => "medium",
            FlowIntensity::Heavy => "heavy",
        }
    }

    /// Parses a stored name. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flow| flow.as_str() == value)
    }
}

impl Display for FlowIntensity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flow observation for a subject on a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleLogEntry {
    pub id: EntryId,
    pub subject_id: SubjectId,
    /// Serialized as ISO-8601 `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub flow_intensity: FlowIntensity,
    pub is_deleted: bool,
    /// Storage insertion order; entries not yet stored carry 0.
    #[serde(default)]
    pub sequence: i64,
}

impl CycleLogEntry {
    /// Creates an active entry with a generated id.
    pub fn new(subject_id: SubjectId, date: NaiveDate, flow_intensity: FlowIntensity) -> Self {
        Self::with_id(Uuid::new_v4(), subject_id, date, flow_intensity)
    }

    /// Creates an active entry with a caller-provided id.
    pub fn with_id(
        id: EntryId,
        subject_id: SubjectId,
        date: NaiveDate,
        flow_intensity: FlowIntensity,
    ) -> Self {
        Self {
            id,
            subject_id,
            date,
            flow_intensity,
            is_deleted: false,
            sequence: 0,
        }
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}
