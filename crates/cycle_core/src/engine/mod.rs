//! Cycle phase and prediction calculator.
//!
//! # Responsibility
//! - Classify the current menstrual phase from a cycle day.
//! - Resolve the current cycle day from the last period start.
//! - Recompute a subject profile from full log and run history.
//! - Assemble the read-only phase summary consumed by display layers.
//!
//! # Invariants
//! - Every function here is pure and synchronous; `today` is always an input.
//! - Nothing here aborts a request: degraded inputs produce fallback values
//!   plus `CycleNotice` entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cycle_day;
pub mod phase;
pub mod prediction;
pub mod summary;

/// Hard failure of a calculator primitive.
///
/// Callers inside the crate always recover from it by substituting defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    /// A length parameter is not positive.
    InvalidConfiguration { field: &'static str, value: i64 },
}

impl Display for CalcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfiguration { field, value } => {
                write!(f, "invalid configuration: `{field}` must be positive, got {value}")
            }
        }
    }
}

impl Error for CalcError {}

/// Why a stored record was left out of a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyReason {
    /// The last period start lies after `today`.
    FutureDatedPeriodStart,
    /// A period run ends before it starts.
    RunEndsBeforeStart,
}

/// Non-fatal condition observed while computing a profile or summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CycleNotice {
    /// A length setting was not positive and a default was used.
    InvalidConfiguration {
        field: String,
        value: i64,
        fallback: u32,
    },
    /// A record was excluded or clamped because it contradicts the calendar.
    DataInconsistency {
        reason: InconsistencyReason,
        date: NaiveDate,
    },
    /// Too few measured cycles; configured lengths were used.
    #[serde(rename_all = "camelCase")]
    InsufficientHistory { recorded_cycles: u32 },
}

impl CycleNotice {
    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "invalid_configuration",
            Self::DataInconsistency { .. } => "data_inconsistency",
            Self::InsufficientHistory { .. } => "insufficient_history",
        }
    }
}
