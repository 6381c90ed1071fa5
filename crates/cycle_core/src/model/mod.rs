//! Domain model for cycle tracking.
//!
//! # Responsibility
//! - Define canonical records for daily flow logs, declared period runs and
//!   the per-subject derived profile.
//!
//! # Invariants
//! - Every record is keyed by a validated `SubjectId`.
//! - Log entries and period runs are soft-deleted, never physically removed.
//! - Dates carry no time of day.

pub mod cycle_log;
pub mod period_run;
pub mod profile;
pub mod subject;
