//! Prediction and rolling-average recomputation.
//!
//! # Responsibility
//! - Detect period onsets in a subject's daily log history.
//! - Derive cycle/period length averages and the next period date.
//!
//! # Invariants
//! - Output depends only on the inputs: recomputing with the same history
//!   always yields the same profile, so reprocessing a write is harmless.
//! - Deleted entries and runs never contribute.
//! - A strong-flow day recorded after a later onset never replaces it, so
//!   `last_period_start` only moves to later dates.
//! - Below `MIN_RECORDED_CYCLES` measured cycles the prediction uses the
//!   configured cycle length (cold start).

use crate::config::PredictionConfig;
use crate::engine::{CycleNotice, InconsistencyReason};
use crate::model::cycle_log::CycleLogEntry;
use crate::model::period_run::CyclePeriodRun;
use crate::model::profile::CycleProfile;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

/// Measured cycles needed before observed averages drive the prediction.
pub const MIN_RECORDED_CYCLES: u32 = 2;

/// Recomputed profile plus the conditions met along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileComputation {
    pub profile: CycleProfile,
    pub notices: Vec<CycleNotice>,
}

/// Whether persisting `entry` started a new period.
///
/// `previous_start` is the stored start before the write and
/// `recomputed_start` the start after recomputation. Only a later strong-flow
/// date that became the new start qualifies.
pub fn is_new_onset(
    previous_start: Option<NaiveDate>,
    recomputed_start: Option<NaiveDate>,
    entry: &CycleLogEntry,
) -> bool {
    if !entry.is_active() || !entry.flow_intensity.marks_onset() {
        return false;
    }
    recomputed_start == Some(entry.date)
        && previous_start.map_or(true, |current| entry.date > current)
}

/// Returns onset dates in ascending order.
///
/// Strong-flow days are replayed in recording order. A day is an onset when
/// no strong day already seen lies within `onset_gap_days` on either side of
/// it; otherwise it belongs to a period that is already recorded. Replaying
/// in date order this reduces to "no strong day in the preceding gap".
pub fn detect_onsets(entries: &[CycleLogEntry], onset_gap_days: u32) -> Vec<NaiveDate> {
    let mut strong: Vec<&CycleLogEntry> = entries
        .iter()
        .filter(|entry| entry.is_active() && entry.flow_intensity.marks_onset())
        .collect();
    strong.sort_by_key(|entry| (entry.sequence, entry.date));

    let gap = Duration::days(i64::from(onset_gap_days));
    let mut seen: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut onsets: BTreeSet<NaiveDate> = BTreeSet::new();
    for entry in strong {
        let day = entry.date;
        if seen.contains(&day) {
            continue;
        }
        let lower = day.checked_sub_signed(gap).unwrap_or(NaiveDate::MIN);
        let upper = day.checked_add_signed(gap).unwrap_or(NaiveDate::MAX);
        let has_neighbor = seen.range(lower..=upper).next().is_some();
        if !has_neighbor {
            onsets.insert(day);
        }
        seen.insert(day);
    }
    onsets.into_iter().collect()
}

/// Recomputes every derived field of `base` from the full history.
///
/// `base` contributes only its subject and configured settings.
pub fn recompute_profile(
    base: &CycleProfile,
    entries: &[CycleLogEntry],
    runs: &[CyclePeriodRun],
    config: &PredictionConfig,
    today: NaiveDate,
) -> ProfileComputation {
    let (settings, mut notices) = base.settings.sanitized();
    let window = config.average_window.max(1);

    let onsets = detect_onsets(entries, config.onset_gap_days);
    let last_period_start = onsets.last().copied();

    for onset in onsets.iter().filter(|onset| **onset > today) {
        notices.push(CycleNotice::DataInconsistency {
            reason: InconsistencyReason::FutureDatedPeriodStart,
            date: *onset,
        });
    }

    let cycle_lengths: Vec<u32> = onsets
        .windows(2)
        .filter(|pair| pair[1] <= today)
        .filter_map(|pair| u32::try_from((pair[1] - pair[0]).num_days()).ok())
        .collect();
    let recorded_cycles = u32::try_from(cycle_lengths.len()).unwrap_or(u32::MAX);

    let avg_cycle_length =
        rounded_mean(tail(&cycle_lengths, window)).unwrap_or(settings.cycle_length_days);
    let predicted_cycle_length = if recorded_cycles < MIN_RECORDED_CYCLES {
        notices.push(CycleNotice::InsufficientHistory { recorded_cycles });
        settings.cycle_length_days
    } else {
        avg_cycle_length
    };

    let mut closed_runs: Vec<&CyclePeriodRun> = runs
        .iter()
        .filter(|run| run.is_active() && run.end.is_some())
        .collect();
    closed_runs.sort_by_key(|run| run.start);

    let mut period_lengths = Vec::with_capacity(closed_runs.len());
    for run in closed_runs {
        match run.length_days() {
            Some(length) => period_lengths.push(length),
            None => notices.push(CycleNotice::DataInconsistency {
                reason: InconsistencyReason::RunEndsBeforeStart,
                date: run.start,
            }),
        }
    }
    let avg_period_length =
        rounded_mean(tail(&period_lengths, window)).unwrap_or(settings.period_length_days);

    let next_period_predicted = last_period_start
        .map(|start| start + Duration::days(i64::from(predicted_cycle_length)));

    ProfileComputation {
        profile: CycleProfile {
            subject_id: base.subject_id.clone(),
            settings,
            last_period_start,
            next_period_predicted,
            avg_cycle_length,
            avg_period_length,
            recorded_cycles,
        },
        notices,
    }
}

fn tail(values: &[u32], window: usize) -> &[u32] {
    &values[values.len().saturating_sub(window)..]
}

/// Mean rounded half-up to whole days.
fn rounded_mean(values: &[u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    let count = values.len() as u64;
    let sum: u64 = values.iter().map(|value| u64::from(*value)).sum();
    u32::try_from((sum + count / 2) / count).ok()
}
