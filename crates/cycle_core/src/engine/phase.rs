//! Fixed-proportion phase classifier.
//!
//! Window ends are `period`, `floor(cycle * 45%)` and `floor(cycle * 55%)`.
//! Each end is inclusive on the lower phase, so a day exactly on a mark
//! belongs to the earlier phase. For whole days the floor comparison is
//! identical to comparing against the fractional mark.

use crate::config::{DEFAULT_CYCLE_LENGTH_DAYS, DEFAULT_PERIOD_LENGTH_DAYS};
use crate::engine::CalcError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

/// Upper bound of the follicular window, in percent of the cycle.
pub const FOLLICULAR_END_PERCENT: u64 = 45;
/// Upper bound of the ovulatory window, in percent of the cycle.
pub const OVULATORY_END_PERCENT: u64 = 55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

impl CyclePhase {
    pub const ALL: [CyclePhase; 4] = [
        CyclePhase::Menstrual,
        CyclePhase::Follicular,
        CyclePhase::Ovulatory,
        CyclePhase::Luteal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "Menstrual",
            CyclePhase::Follicular => "Follicular",
            CyclePhase::Ovulatory => "Ovulatory",
            CyclePhase::Luteal => "Luteal",
        }
    }
}

impl Display for CyclePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive last day of each phase window for one cycle configuration.
///
/// Windows may be empty when the period length reaches past a mark; the
/// remaining windows still cover `1..=cycle_length` without overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseBoundaries {
    pub menstrual_end: u32,
    pub follicular_end: u32,
    pub ovulatory_end: u32,
    pub cycle_length: u32,
}

impl PhaseBoundaries {
    /// Computes window ends.
    ///
    /// # Errors
    /// - `CalcError::InvalidConfiguration` when either length is zero.
    pub fn new(period_length_days: u32, cycle_length_days: u32) -> Result<Self, CalcError> {
        if cycle_length_days == 0 {
            return Err(CalcError::InvalidConfiguration {
                field: "cycleLengthDays",
                value: 0,
            });
        }
        if period_length_days == 0 {
            return Err(CalcError::InvalidConfiguration {
                field: "periodLengthDays",
                value: 0,
            });
        }
        Ok(Self::from_positive(period_length_days, cycle_length_days))
    }

    fn from_positive(period_length_days: u32, cycle_length_days: u32) -> Self {
        let menstrual_end = period_length_days.min(cycle_length_days);
        let follicular_end =
            percent_of(cycle_length_days, FOLLICULAR_END_PERCENT).max(menstrual_end);
        let ovulatory_end =
            percent_of(cycle_length_days, OVULATORY_END_PERCENT).max(follicular_end);

        Self {
            menstrual_end,
            follicular_end,
            ovulatory_end,
            cycle_length: cycle_length_days,
        }
    }

    /// Phase of a 1-indexed cycle day. Days past the cycle length stay luteal.
    pub fn classify(&self, day: u32) -> CyclePhase {
        if day <= self.menstrual_end {
            CyclePhase::Menstrual
        } else if day <= self.follicular_end {
            CyclePhase::Follicular
        } else if day <= self.ovulatory_end {
            CyclePhase::Ovulatory
        } else {
            CyclePhase::Luteal
        }
    }

    /// Days of `phase` within `1..=cycle_length`. Possibly empty.
    pub fn window(&self, phase: CyclePhase) -> RangeInclusive<u32> {
        match phase {
            CyclePhase::Menstrual => 1..=self.menstrual_end,
            CyclePhase::Follicular => (self.menstrual_end + 1)..=self.follicular_end,
            CyclePhase::Ovulatory => (self.follicular_end + 1)..=self.ovulatory_end,
            CyclePhase::Luteal => (self.ovulatory_end + 1)..=self.cycle_length,
        }
    }
}

impl Default for PhaseBoundaries {
    /// Windows for the default 5-day period in a 28-day cycle.
    fn default() -> Self {
        Self::from_positive(DEFAULT_PERIOD_LENGTH_DAYS, DEFAULT_CYCLE_LENGTH_DAYS)
    }
}

/// Classifies `current_cycle_day` under the fixed-proportion model.
///
/// # Errors
/// - `CalcError::InvalidConfiguration` when either length is zero.
pub fn classify_phase(
    current_cycle_day: u32,
    period_length_days: u32,
    cycle_length_days: u32,
) -> Result<CyclePhase, CalcError> {
    Ok(PhaseBoundaries::new(period_length_days, cycle_length_days)?.classify(current_cycle_day))
}

fn percent_of(days: u32, percent: u64) -> u32 {
    // u32 * 55 / 100 always fits back into u32.
    (u64::from(days) * percent / 100) as u32
}
