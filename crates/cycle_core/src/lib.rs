//! Core domain logic for cycle tracking.
//!
//! Computes the current cycle day, menstrual phase, next period prediction
//! and rolling length averages from a subject's stored flow history.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CycleSettings, PredictionConfig, SettingsPatch};
pub use engine::cycle_day::{resolve_cycle_day, CycleDay};
pub use engine::phase::{classify_phase, CyclePhase, PhaseBoundaries};
pub use engine::prediction::{
    detect_onsets, is_new_onset, recompute_profile, ProfileComputation, MIN_RECORDED_CYCLES,
};
pub use engine::summary::{assemble_summary, PhaseSummary};
pub use engine::{CalcError, CycleNotice, InconsistencyReason};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::cycle_log::{CycleLogEntry, EntryId, FlowIntensity};
pub use model::period_run::{CyclePeriodRun, RunId};
pub use model::profile::CycleProfile;
pub use model::subject::{EmptySubjectId, SubjectId};
pub use repo::cycle_log_repo::{CycleLogQuery, CycleLogRepository};
pub use repo::period_run_repo::PeriodRunRepository;
pub use repo::profile_repo::ProfileRepository;
pub use repo::{CycleStore, RepoError, RepoResult, SqliteCycleRepository};
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::cycle_service::{
    CycleService, CycleServiceError, FlowLogged, ProfileUpdate, ServiceResult,
};

/// Minimal health-check API for integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
