//! Cycle-day resolution.

use crate::engine::{CycleNotice, InconsistencyReason};
use chrono::NaiveDate;

/// Outcome of resolving the current cycle day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleDay {
    /// No onset has been logged yet.
    NoData,
    /// 1-indexed day counted from the last period start.
    Day {
        day: u32,
        /// Set when the last period start lies after `today` and the day was
        /// clamped to 1.
        notice: Option<CycleNotice>,
    },
}

impl CycleDay {
    pub fn day(&self) -> Option<u32> {
        match self {
            Self::NoData => None,
            Self::Day { day, .. } => Some(*day),
        }
    }
}

/// Returns `(today - last_period_start) + 1`, never less than 1.
pub fn resolve_cycle_day(last_period_start: Option<NaiveDate>, today: NaiveDate) -> CycleDay {
    let Some(start) = last_period_start else {
        return CycleDay::NoData;
    };

    let elapsed = (today - start).num_days();
    if elapsed < 0 {
        return CycleDay::Day {
            day: 1,
            notice: Some(CycleNotice::DataInconsistency {
                reason: InconsistencyReason::FutureDatedPeriodStart,
                date: start,
            }),
        };
    }

    CycleDay::Day {
        day: u32::try_from(elapsed + 1).unwrap_or(u32::MAX),
        notice: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_cycle_day, CycleDay};
    use crate::engine::{CycleNotice, InconsistencyReason};
    use chrono::{Duration, NaiveDate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn start_day_is_day_one() {
        let start = date(2024, 1, 1);
        assert_eq!(resolve_cycle_day(Some(start), start).day(), Some(1));
        assert_eq!(resolve_cycle_day(Some(start), date(2024, 1, 15)).day(), Some(15));
    }

    #[test]
    fn missing_start_reports_no_data() {
        assert_eq!(resolve_cycle_day(None, date(2024, 1, 15)), CycleDay::NoData);
    }

    #[test]
    fn future_start_clamps_to_one_with_notice() {
        let start = date(2024, 2, 10);
        let resolved = resolve_cycle_day(Some(start), date(2024, 2, 1));
        assert_eq!(
            resolved,
            CycleDay::Day {
                day: 1,
                notice: Some(CycleNotice::DataInconsistency {
                    reason: InconsistencyReason::FutureDatedPeriodStart,
                    date: start,
                }),
            }
        );
    }

    #[test]
    fn day_is_monotonic_and_at_least_one() {
        let start = date(2024, 3, 15);
        let mut previous = 0;
        for offset in -40..120 {
            let today = start + Duration::days(offset);
            let day = resolve_cycle_day(Some(start), today)
                .day()
                .expect("start is present");
            assert!(day >= 1);
            assert!(day >= previous, "offset={offset}");
            previous = day;
        }
    }
}
