//! Cycle tracking use-case service.
//!
//! # Responsibility
//! - Accept log, tracker and settings writes for a subject.
//! - Recompute and persist the subject profile after every write.
//! - Serve the phase summary read model.
//!
//! # Invariants
//! - The profile is always rebuilt from the full stored history, so
//!   replaying a write (or retrying after a partial failure) converges to
//!   the same state.
//! - A profile row is created lazily on the first write for a subject.
//! - Log lines carry metadata only; subject ids and dates stay out of logs.

use crate::config::{CycleSettings, PredictionConfig, SettingsPatch};
use crate::engine::prediction::{is_new_onset, recompute_profile};
use crate::engine::summary::{assemble_summary, PhaseSummary};
use crate::engine::CycleNotice;
use crate::model::cycle_log::{CycleLogEntry, EntryId, FlowIntensity};
use crate::model::period_run::{CyclePeriodRun, RunId};
use crate::model::profile::CycleProfile;
use crate::model::subject::SubjectId;
use crate::repo::cycle_log_repo::CycleLogQuery;
use crate::repo::{CycleStore, RepoError};
use crate::service::clock::{Clock, SystemClock};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, CycleServiceError>;

/// Service error for cycle use-cases.
#[derive(Debug)]
pub enum CycleServiceError {
    EntryNotFound(EntryId),
    RunNotFound(RunId),
    /// A new run was requested while this one is still open.
    RunAlreadyOpen(RunId),
    Repo(RepoError),
}

impl Display for CycleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryNotFound(id) => write!(f, "log entry not found: {id}"),
            Self::RunNotFound(id) => write!(f, "period run not found: {id}"),
            Self::RunAlreadyOpen(id) => write!(f, "period run {id} is still open"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CycleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CycleServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a profile-changing write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub profile: CycleProfile,
    /// Conditions met while validating input or recomputing.
    pub notices: Vec<CycleNotice>,
}

/// Result of logging one day of flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLogged {
    pub entry: CycleLogEntry,
    /// Whether the entry became the new `last_period_start`.
    pub new_onset: bool,
    pub update: ProfileUpdate,
}

/// Cycle tracking facade over a `CycleStore`.
pub struct CycleService<R: CycleStore, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    config: PredictionConfig,
}

impl<R: CycleStore> CycleService<R, SystemClock> {
    /// Creates a service reading the system date with default prediction
    /// parameters.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock, PredictionConfig::default())
    }
}

impl<R: CycleStore, C: Clock> CycleService<R, C> {
    pub fn with_clock(repo: R, clock: C, config: PredictionConfig) -> Self {
        Self {
            repo,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Records the flow for one day and refreshes the profile.
    ///
    /// Re-submitting a date replaces its flow and keeps the entry id.
    pub fn log_flow(
        &self,
        subject_id: &SubjectId,
        date: NaiveDate,
        flow_intensity: FlowIntensity,
    ) -> ServiceResult<FlowLogged> {
        let previous_start = self
            .repo
            .get_profile(subject_id)?
            .and_then(|profile| profile.last_period_start);

        let entry = self.repo.upsert_entry(subject_id, date, flow_intensity)?;
        let update = self.refresh_profile(subject_id)?;
        let new_onset = is_new_onset(previous_start, update.profile.last_period_start, &entry);

        info!("event=flow_logged module=service status=ok");
        Ok(FlowLogged {
            entry,
            new_onset,
            update,
        })
    }

    /// Tombstones a log entry and refreshes the profile.
    pub fn delete_log(&self, subject_id: &SubjectId, id: EntryId) -> ServiceResult<ProfileUpdate> {
        self.repo
            .soft_delete_entry(subject_id, id)
            .map_err(|err| match err {
                RepoError::NotFound(id) => CycleServiceError::EntryNotFound(id),
                other => other.into(),
            })?;
        info!("event=log_deleted module=service status=ok");
        self.refresh_profile(subject_id)
    }

    /// Lists log entries ordered by date.
    pub fn list_logs(&self, query: &CycleLogQuery) -> ServiceResult<Vec<CycleLogEntry>> {
        Ok(self.repo.list_entries(query)?)
    }

    /// Opens a tracker run starting on `start`.
    ///
    /// # Errors
    /// - `RunAlreadyOpen` when the subject still has an open run.
    pub fn start_period_run(
        &self,
        subject_id: &SubjectId,
        start: NaiveDate,
    ) -> ServiceResult<CyclePeriodRun> {
        if let Some(open) = self.repo.find_open_run(subject_id)? {
            return Err(CycleServiceError::RunAlreadyOpen(open.id));
        }

        let run = CyclePeriodRun::open(subject_id.clone(), start);
        self.repo.create_run(&run)?;
        self.refresh_profile(subject_id)?;
        info!("event=period_run_started module=service status=ok");
        Ok(run)
    }

    /// Closes a run. An end before the start is stored but left out of the
    /// period-length average.
    pub fn end_period_run(
        &self,
        subject_id: &SubjectId,
        run_id: RunId,
        end: NaiveDate,
    ) -> ServiceResult<CyclePeriodRun> {
        self.repo
            .set_run_end(subject_id, run_id, Some(end))
            .map_err(run_error)?;
        let update = self.refresh_profile(subject_id)?;
        info!(
            "event=period_run_ended module=service status=ok notices={}",
            update.notices.len()
        );

        self.repo
            .get_run(run_id, false)?
            .ok_or(CycleServiceError::RunNotFound(run_id))
    }

    /// Records a past run with both bounds known.
    pub fn record_period_run(
        &self,
        subject_id: &SubjectId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<CyclePeriodRun> {
        let run = CyclePeriodRun::closed(subject_id.clone(), start, end);
        self.repo.create_run(&run)?;
        self.refresh_profile(subject_id)?;
        info!("event=period_run_recorded module=service status=ok");
        Ok(run)
    }

    pub fn delete_period_run(
        &self,
        subject_id: &SubjectId,
        run_id: RunId,
    ) -> ServiceResult<ProfileUpdate> {
        self.repo
            .soft_delete_run(subject_id, run_id)
            .map_err(run_error)?;
        info!("event=period_run_deleted module=service status=ok");
        self.refresh_profile(subject_id)
    }

    pub fn list_period_runs(&self, subject_id: &SubjectId) -> ServiceResult<Vec<CyclePeriodRun>> {
        Ok(self.repo.list_runs(subject_id, false)?)
    }

    /// Applies a validated settings patch and refreshes the profile.
    ///
    /// Non-positive values are replaced by defaults and reported in the
    /// returned notices.
    pub fn update_settings(
        &self,
        subject_id: &SubjectId,
        patch: &SettingsPatch,
    ) -> ServiceResult<ProfileUpdate> {
        let mut base = self.load_or_new(subject_id)?;
        let (settings, mut notices) = base.settings.apply(patch);
        base.settings = settings;

        let mut update = self.recompute_and_save(&base)?;
        notices.append(&mut update.notices);
        update.notices = notices;

        info!(
            "event=settings_updated module=service status=ok notices={}",
            update.notices.len()
        );
        Ok(update)
    }

    /// Rebuilds the profile from all stored logs and runs.
    pub fn refresh_profile(&self, subject_id: &SubjectId) -> ServiceResult<ProfileUpdate> {
        let base = self.load_or_new(subject_id)?;
        self.recompute_and_save(&base)
    }

    /// Cached profile, if the subject has ever written anything.
    pub fn profile(&self, subject_id: &SubjectId) -> ServiceResult<Option<CycleProfile>> {
        Ok(self.repo.get_profile(subject_id)?)
    }

    /// Phase summary for the clock's current date.
    pub fn summary(&self, subject_id: &SubjectId) -> ServiceResult<PhaseSummary> {
        let profile = self.repo.get_profile(subject_id)?;
        let summary = assemble_summary(profile.as_ref(), self.clock.today());
        debug!(
            "event=summary_built module=service status=ok has_data={} notices={}",
            summary.has_data,
            summary.notices.len()
        );
        Ok(summary)
    }

    fn load_or_new(&self, subject_id: &SubjectId) -> ServiceResult<CycleProfile> {
        Ok(self
            .repo
            .get_profile(subject_id)?
            .unwrap_or_else(|| CycleProfile::new(subject_id.clone(), CycleSettings::default())))
    }

    fn recompute_and_save(&self, base: &CycleProfile) -> ServiceResult<ProfileUpdate> {
        let subject_id = &base.subject_id;
        let entries = self
            .repo
            .list_entries(&CycleLogQuery::for_subject(subject_id.clone()))?;
        let runs = self.repo.list_runs(subject_id, false)?;

        let computation =
            recompute_profile(base, &entries, &runs, &self.config, self.clock.today());
        self.repo.save_profile(&computation.profile)?;

        for notice in &computation.notices {
            match notice {
                CycleNotice::InsufficientHistory { .. } => {
                    debug!("event=profile_recomputed module=engine status=cold_start");
                }
                other => warn!(
                    "event=profile_recomputed module=engine status=degraded error_code={}",
                    other.code()
                ),
            }
        }
        debug!(
            "event=profile_recomputed module=engine status=ok entries={} runs={} recorded_cycles={}",
            entries.len(),
            runs.len(),
            computation.profile.recorded_cycles
        );

        Ok(ProfileUpdate {
            profile: computation.profile,
            notices: computation.notices,
        })
    }
}

fn run_error(err: RepoError) -> CycleServiceError {
    match err {
        RepoError::NotFound(id) => CycleServiceError::RunNotFound(id),
        other => other.into(),
    }
}
