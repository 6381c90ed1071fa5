//! Cycle configuration records.
//!
//! # Responsibility
//! - Define per-subject baselines (`CycleSettings`) and engine-wide
//!   prediction parameters (`PredictionConfig`).
//! - Validate caller payloads into these records instead of merging
//!   arbitrary JSON into stored state.
//!
//! # Invariants
//! - Unknown payload keys are rejected.
//! - Non-positive per-subject lengths are replaced by defaults and reported
//!   as `CycleNotice::InvalidConfiguration`.
//! - `PredictionConfig` values are strictly positive.

use crate::engine::CycleNotice;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_CYCLE_LENGTH_DAYS: u32 = 28;
pub const DEFAULT_PERIOD_LENGTH_DAYS: u32 = 5;
/// Number of most recent measurements kept in rolling averages.
pub const DEFAULT_AVERAGE_WINDOW: usize = 6;
/// Strong-flow entries within this many days of a previous strong-flow
/// entry continue the same period.
pub const DEFAULT_ONSET_GAP_DAYS: u32 = 10;

/// Configuration parse/validation error.
#[derive(Debug)]
pub enum ConfigError {
    /// Payload is not valid JSON, has wrong types, or carries unknown keys.
    Malformed(serde_json::Error),
    /// A field holds a value outside its accepted range.
    InvalidValue { field: &'static str, value: i64 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed configuration payload: {err}"),
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value {value} for `{field}`; expected a positive number")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

/// User-configurable baselines used until observed averages exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSettings {
    pub cycle_length_days: u32,
    pub period_length_days: u32,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            cycle_length_days: DEFAULT_CYCLE_LENGTH_DAYS,
            period_length_days: DEFAULT_PERIOD_LENGTH_DAYS,
        }
    }
}

impl CycleSettings {
    /// Returns settings with any zero length replaced by its default.
    ///
    /// Used on values read back from storage or supplied by older callers.
    pub fn sanitized(self) -> (Self, Vec<CycleNotice>) {
        let mut notices = Vec::new();
        let cycle_length_days = positive_or_default(
            "cycleLengthDays",
            i64::from(self.cycle_length_days),
            DEFAULT_CYCLE_LENGTH_DAYS,
            &mut notices,
        );
        let period_length_days = positive_or_default(
            "periodLengthDays",
            i64::from(self.period_length_days),
            DEFAULT_PERIOD_LENGTH_DAYS,
            &mut notices,
        );
        (
            Self {
                cycle_length_days,
                period_length_days,
            },
            notices,
        )
    }

    /// Applies a partial update on top of the current settings.
    ///
    /// Fields absent from `patch` keep their current value. Non-positive
    /// values fall back to the default and are reported.
    pub fn apply(self, patch: &SettingsPatch) -> (Self, Vec<CycleNotice>) {
        let mut notices = Vec::new();
        let cycle_length_days = match patch.cycle_length_days {
            Some(value) => positive_or_default(
                "cycleLengthDays",
                value,
                DEFAULT_CYCLE_LENGTH_DAYS,
                &mut notices,
            ),
            None => self.cycle_length_days,
        };
        let period_length_days = match patch.period_length_days {
            Some(value) => positive_or_default(
                "periodLengthDays",
                value,
                DEFAULT_PERIOD_LENGTH_DAYS,
                &mut notices,
            ),
            None => self.period_length_days,
        };
        (
            Self {
                cycle_length_days,
                period_length_days,
            },
            notices,
        )
    }
}

/// Recognized fields of a settings update payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub cycle_length_days: Option<i64>,
    pub period_length_days: Option<i64>,
}

impl SettingsPatch {
    /// Parses a JSON settings payload, rejecting unknown keys.
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn is_empty(&self) -> bool {
        self.cycle_length_days.is_none() && self.period_length_days.is_none()
    }
}

/// Engine-wide prediction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PredictionConfig {
    /// How many recent cycle/period lengths enter the rolling averages.
    pub average_window: usize,
    /// Minimum distance in days between two strong-flow entries for the
    /// later one to count as a new onset.
    pub onset_gap_days: u32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            average_window: DEFAULT_AVERAGE_WINDOW,
            onset_gap_days: DEFAULT_ONSET_GAP_DAYS,
        }
    }
}

impl PredictionConfig {
    /// Parses and validates a JSON payload; missing keys take defaults.
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.average_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "averageWindow",
                value: 0,
            });
        }
        if self.onset_gap_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "onsetGapDays",
                value: 0,
            });
        }
        Ok(())
    }
}

fn positive_or_default(
    field: &'static str,
    value: i64,
    default: u32,
    notices: &mut Vec<CycleNotice>,
) -> u32 {
    match u32::try_from(value) {
        Ok(days) if days > 0 => days,
        _ => {
            warn!(
                "event=config_fallback module=config status=warn field={} fallback={}",
                field, default
            );
            notices.push(CycleNotice::InvalidConfiguration {
                field: field.to_string(),
                value,
                fallback: default,
            });
            default
        }
    }
}
