//! Phase summary read model.
//!
//! # Responsibility
//! - Compose cycle-day resolution, phase classification and the cached
//!   prediction into the single record handed to display layers.
//!
//! # Invariants
//! - `has_data == false` implies every other field is absent.
//! - Assembly never fails; degraded inputs add `notices` instead.

use crate::config::{DEFAULT_CYCLE_LENGTH_DAYS, DEFAULT_PERIOD_LENGTH_DAYS};
use crate::engine::cycle_day::{resolve_cycle_day, CycleDay};
use crate::engine::phase::{CyclePhase, PhaseBoundaries};
use crate::engine::prediction::MIN_RECORDED_CYCLES;
use crate::engine::{CalcError, CycleNotice};
use crate::model::profile::CycleProfile;
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

/// Serialized as `{hasData, currentCycleDay, currentPhase, nextPeriodDate,
/// avgCycleLength, avgPeriodLength}`; absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSummary {
    pub has_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_cycle_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<CyclePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_period_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_cycle_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_period_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<CycleNotice>,
}

impl PhaseSummary {
    /// The distinct "nothing logged yet" state.
    pub fn empty() -> Self {
        Self {
            has_data: false,
            current_cycle_day: None,
            current_phase: None,
            next_period_date: None,
            avg_cycle_length: None,
            avg_period_length: None,
            notices: Vec::new(),
        }
    }
}

/// Builds the summary for `today` from a cached profile.
pub fn assemble_summary(profile: Option<&CycleProfile>, today: NaiveDate) -> PhaseSummary {
    let Some(profile) = profile else {
        return PhaseSummary::empty();
    };

    let (current_cycle_day, mut notices) = match resolve_cycle_day(profile.last_period_start, today)
    {
        CycleDay::NoData => return PhaseSummary::empty(),
        CycleDay::Day { day, notice } => (day, notice.into_iter().collect::<Vec<_>>()),
    };

    let (period_length, cycle_length, bounds) =
        match PhaseBoundaries::new(profile.avg_period_length, profile.avg_cycle_length) {
            Ok(bounds) => (profile.avg_period_length, profile.avg_cycle_length, bounds),
            Err(err) => {
                warn!(
                    "event=phase_classify module=engine status=fallback error_code=invalid_configuration error={}",
                    err
                );
                notices.push(fallback_notice(err));
                (
                    DEFAULT_PERIOD_LENGTH_DAYS,
                    DEFAULT_CYCLE_LENGTH_DAYS,
                    PhaseBoundaries::default(),
                )
            }
        };

    if profile.recorded_cycles < MIN_RECORDED_CYCLES {
        notices.push(CycleNotice::InsufficientHistory {
            recorded_cycles: profile.recorded_cycles,
        });
    }

    PhaseSummary {
        has_data: true,
        current_cycle_day: Some(current_cycle_day),
        current_phase: Some(bounds.classify(current_cycle_day)),
        next_period_date: profile.next_period_predicted,
        avg_cycle_length: Some(cycle_length),
        avg_period_length: Some(period_length),
        notices,
    }
}

fn fallback_notice(err: CalcError) -> CycleNotice {
    match err {
        CalcError::InvalidConfiguration { field, value } => CycleNotice::InvalidConfiguration {
            field: field.to_string(),
            value,
            fallback: if field == "periodLengthDays" {
                DEFAULT_PERIOD_LENGTH_DAYS
            } else {
                DEFAULT_CYCLE_LENGTH_DAYS
            },
        },
    }
}
