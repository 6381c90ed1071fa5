use chrono::NaiveDate;
use cycle_core::db::open_db_in_memory;
use cycle_core::{
    CycleLogQuery, CycleNotice, CyclePhase, CycleService, CycleServiceError, FixedClock,
    FlowIntensity, InconsistencyReason, PredictionConfig, SettingsPatch, SqliteCycleRepository,
    SubjectId,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn subject() -> SubjectId {
    SubjectId::parse("subject-1").unwrap()
}

fn service_at(
    conn: &Connection,
    today: NaiveDate,
) -> CycleService<SqliteCycleRepository<'_>, FixedClock> {
    let repo = SqliteCycleRepository::try_new(conn).unwrap();
    CycleService::with_clock(repo, FixedClock(today), PredictionConfig::default())
}

#[test]
fn two_medium_logs_predict_next_period() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 2, 1));
    let subject = subject();

    service
        .log_flow(&subject, date(2024, 1, 1), FlowIntensity::Medium)
        .unwrap();
    let logged = service
        .log_flow(&subject, date(2024, 1, 29), FlowIntensity::Medium)
        .unwrap();

    assert!(logged.new_onset);
    let profile = logged.update.profile;
    assert_eq!(profile.avg_cycle_length, 28);
    assert_eq!(profile.last_period_start, Some(date(2024, 1, 29)));
    assert_eq!(profile.next_period_predicted, Some(date(2024, 2, 26)));
    assert_eq!(
        logged.update.notices,
        vec![CycleNotice::InsufficientHistory { recorded_cycles: 1 }]
    );
}

#[test]
fn one_measured_cycle_predicts_from_configured_length() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 2, 1));
    let subject = subject();

    let patch = SettingsPatch::from_json(r#"{"cycleLengthDays": 30}"#).unwrap();
    service.update_settings(&subject, &patch).unwrap();
    service
        .log_flow(&subject, date(2024, 1, 1), FlowIntensity::Medium)
        .unwrap();
    let logged = service
        .log_flow(&subject, date(2024, 1, 29), FlowIntensity::Medium)
        .unwrap();

    assert_eq!(logged.update.profile.recorded_cycles, 1);
    assert_eq!(
        logged.update.profile.next_period_predicted,
        Some(date(2024, 2, 28))
    );
    assert!(logged
        .update
        .notices
        .contains(&CycleNotice::InsufficientHistory { recorded_cycles: 1 }));
}

#[test]
fn back_dated_strong_flow_keeps_last_period_start() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 2, 1));
    let subject = subject();

    service
        .log_flow(&subject, date(2024, 1, 1), FlowIntensity::Heavy)
        .unwrap();
    let before = service
        .log_flow(&subject, date(2024, 1, 29), FlowIntensity::Heavy)
        .unwrap()
        .update
        .profile;

    let logged = service
        .log_flow(&subject, date(2024, 1, 22), FlowIntensity::Medium)
        .unwrap();

    assert!(!logged.new_onset);
    assert_eq!(logged.update.profile.last_period_start, Some(date(2024, 1, 29)));
    assert_eq!(logged.update.profile.avg_cycle_length, 28);
    assert_eq!(
        logged.update.profile.next_period_predicted,
        before.next_period_predicted
    );

    let refreshed = service.refresh_profile(&subject).unwrap();
    assert_eq!(refreshed.profile, logged.update.profile);
}

#[test]
fn first_onset_uses_configured_cycle_length() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 1, 2));
    let subject = subject();

    let logged = service
        .log_flow(&subject, date(2024, 1, 1), FlowIntensity::Heavy)
        .unwrap();

    assert!(logged.new_onset);
    assert_eq!(
        logged.update.profile.next_period_predicted,
        Some(date(2024, 1, 29))
    );
    assert!(logged
        .update
        .notices
        .contains(&CycleNotice::InsufficientHistory { recorded_cycles: 0 }));
}

#[test]
fn light_entry_does_not_move_last_period_start() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 1, 20));
    let subject = subject();

    service
        .log_flow(&subject, date(2024, 1, 1), FlowIntensity::Heavy)
        .unwrap();
    let logged = service
        .log_flow(&subject, date(2024, 1, 18), FlowIntensity::Light)
        .unwrap();

    assert!(!logged.new_onset);
    assert_eq!(
        logged.update.profile.last_period_start,
        Some(date(2024, 1, 1))
    );
}

#[test]
fn replaying_the_same_log_leaves_profile_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 2, 1));
    let subject = subject();

    service
        .log_flow(&subject, date(2024, 1, 1), FlowIntensity::Heavy)
        .unwrap();
    let first = service
        .log_flow(&subject, date(2024, 1, 30), FlowIntensity::Medium)
        .unwrap();
    let replay = service
        .log_flow(&subject, date(2024, 1, 30), FlowIntensity::Medium)
        .unwrap();

    assert_eq!(first.entry.id, replay.entry.id);
    assert_eq!(first.update.profile, replay.update.profile);
    assert!(!replay.new_onset);
    assert_eq!(
        service.profile(&subject).unwrap().unwrap(),
        first.update.profile
    );
}

#[test]
fn deleting_an_onset_recomputes_from_remaining_history() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 2, 1));
    let subject = subject();

    service
        .log_flow(&subject, date(2024, 1, 1), FlowIntensity::Heavy)
        .unwrap();
    let second = service
        .log_flow(&subject, date(2024, 1, 29), FlowIntensity::Heavy)
        .unwrap();

    let update = service.delete_log(&subject, second.entry.id).unwrap();
    assert_eq!(update.profile.last_period_start, Some(date(2024, 1, 1)));
    assert_eq!(update.profile.recorded_cycles, 0);
    assert_eq!(update.profile.next_period_predicted, Some(date(2024, 1, 29)));

    let remaining = service
        .list_logs(&CycleLogQuery::for_subject(subject.clone()))
        .unwrap();
    assert_eq!(remaining.len(), 1);
}

#[test]
fn deleting_unknown_entry_is_entry_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 2, 1));
    let missing = Uuid::new_v4();

    let err = service.delete_log(&subject(), missing).unwrap_err();
    assert!(matches!(err, CycleServiceError::EntryNotFound(id) if id == missing));
}

#[test]
fn period_runs_drive_average_period_length() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 3, 1));
    let subject = subject();

    service
        .record_period_run(&subject, date(2024, 1, 1), date(2024, 1, 6))
        .unwrap();
    let open = service.start_period_run(&subject, date(2024, 1, 29)).unwrap();
    let err = service
        .start_period_run(&subject, date(2024, 1, 30))
        .unwrap_err();
    assert!(matches!(err, CycleServiceError::RunAlreadyOpen(id) if id == open.id));

    let closed = service
        .end_period_run(&subject, open.id, date(2024, 2, 1))
        .unwrap();
    assert_eq!(closed.length_days(), Some(4));

    let profile = service.profile(&subject).unwrap().unwrap();
    assert_eq!(profile.avg_period_length, 5);
    assert_eq!(service.list_period_runs(&subject).unwrap().len(), 2);
}

#[test]
fn reversed_run_is_kept_but_excluded() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 3, 1));
    let subject = subject();

    let open = service.start_period_run(&subject, date(2024, 2, 10)).unwrap();
    service
        .end_period_run(&subject, open.id, date(2024, 2, 8))
        .unwrap();

    let update = service.refresh_profile(&subject).unwrap();
    assert_eq!(update.profile.avg_period_length, 5);
    assert!(update.notices.contains(&CycleNotice::DataInconsistency {
        reason: InconsistencyReason::RunEndsBeforeStart,
        date: date(2024, 2, 10),
    }));

    let after_delete = service.delete_period_run(&subject, open.id).unwrap();
    assert!(!after_delete
        .notices
        .iter()
        .any(|notice| matches!(notice, CycleNotice::DataInconsistency { .. })));
}

#[test]
fn ending_unknown_run_is_run_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 3, 1));
    let missing = Uuid::new_v4();

    let err = service
        .end_period_run(&subject(), missing, date(2024, 3, 1))
        .unwrap_err();
    assert!(matches!(err, CycleServiceError::RunNotFound(id) if id == missing));
}

#[test]
fn settings_update_validates_and_reprojects() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 1, 2));
    let subject = subject();

    service
        .log_flow(&subject, date(2024, 1, 1), FlowIntensity::Heavy)
        .unwrap();

    let patch = SettingsPatch::from_json(r#"{"cycleLengthDays": 32}"#).unwrap();
    let update = service.update_settings(&subject, &patch).unwrap();
    assert_eq!(update.profile.settings.cycle_length_days, 32);
    assert_eq!(update.profile.next_period_predicted, Some(date(2024, 2, 2)));

    let bad = SettingsPatch {
        cycle_length_days: None,
        period_length_days: Some(-1),
    };
    let update = service.update_settings(&subject, &bad).unwrap();
    assert_eq!(update.profile.settings.cycle_length_days, 32);
    assert_eq!(update.profile.settings.period_length_days, 5);
    assert!(matches!(
        update.notices.first(),
        Some(CycleNotice::InvalidConfiguration { fallback: 5, .. })
    ));
}

#[test]
fn settings_before_any_log_create_profile_without_data() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 1, 2));
    let subject = subject();

    let patch = SettingsPatch {
        cycle_length_days: Some(30),
        period_length_days: Some(4),
    };
    let update = service.update_settings(&subject, &patch).unwrap();
    assert!(!update.profile.has_data());
    assert_eq!(update.profile.avg_cycle_length, 30);
    assert!(!service.summary(&subject).unwrap().has_data);
}

#[test]
fn summary_reports_day_and_phase() {
    let conn = open_db_in_memory().unwrap();
    let subject = subject();
    {
        let writer = service_at(&conn, date(2024, 1, 1));
        writer
            .log_flow(&subject, date(2024, 1, 1), FlowIntensity::Medium)
            .unwrap();
    }

    let reader = service_at(&conn, date(2024, 1, 15));
    let summary = reader.summary(&subject).unwrap();
    assert!(summary.has_data);
    assert_eq!(summary.current_cycle_day, Some(15));
    assert_eq!(summary.current_phase, Some(CyclePhase::Ovulatory));
    assert_eq!(summary.next_period_date, Some(date(2024, 1, 29)));
    assert_eq!(summary.avg_cycle_length, Some(28));
    assert_eq!(summary.avg_period_length, Some(5));
}

#[test]
fn summary_without_logs_has_no_data() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 1, 15));

    let summary = service.summary(&subject()).unwrap();
    assert_eq!(
        serde_json::to_value(&summary).unwrap(),
        serde_json::json!({ "hasData": false })
    );
}

#[test]
fn subjects_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let service = service_at(&conn, date(2024, 2, 1));
    let alice = SubjectId::parse("alice").unwrap();
    let bob = SubjectId::parse("bob").unwrap();

    service
        .log_flow(&alice, date(2024, 1, 1), FlowIntensity::Heavy)
        .unwrap();

    assert!(service.summary(&alice).unwrap().has_data);
    assert!(!service.summary(&bob).unwrap().has_data);
    assert!(service.profile(&bob).unwrap().is_none());
}
