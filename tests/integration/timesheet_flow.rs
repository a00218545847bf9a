// End-to-end punch, report and printable timesheet flows

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tempfile::{tempdir, TempDir};
use uuid::Uuid;
use ward_timeclock_lib::commands::AppState;
use ward_timeclock_lib::db::repositories::user_repository::UserRepository;
use ward_timeclock_lib::db::DbPool;
use ward_timeclock_lib::error::AppError;
use ward_timeclock_lib::models::punch::{GeoLocation, PunchOutcome, ShiftState, ShiftType};
use ward_timeclock_lib::models::timesheet::MonthWindow;
use ward_timeclock_lib::models::user::{Session, UserAccount, UserRole};
use ward_timeclock_lib::services::clock::FixedClock;
use ward_timeclock_lib::services::geolocation::FixedLocation;
use ward_timeclock_lib::services::settings_service::SettingsUpdateInput;

const WARD: (f64, f64) = (-23.5558, -46.6690);

struct Harness {
    _dir: TempDir,
    pool: DbPool,
    clock: Arc<FixedClock>,
    state: AppState,
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup(start: DateTime<Utc>) -> Harness {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("timeclock.sqlite")).expect("db pool");
    let clock = Arc::new(FixedClock::new(start));
    let locator = Arc::new(FixedLocation::new(WARD.0, WARD.1).expect("location"));
    let state = AppState::new(
        pool.clone(),
        dir.path().join("session.json"),
        clock.clone(),
        locator,
    );
    Harness {
        _dir: dir,
        pool,
        clock,
        state,
    }
}

fn session(employee_id: &str, employee_name: &str, role: UserRole) -> Session {
    Session {
        session_id: Uuid::new_v4(),
        employee_id: employee_id.to_string(),
        employee_name: employee_name.to_string(),
        role,
        first_time_login: false,
        started_at: utc(2024, 3, 1, 9, 0),
    }
}

fn ward() -> GeoLocation {
    GeoLocation::new(WARD.0, WARD.1)
}

/// Ana: 12.5h on Mar 4, 6h on Mar 6, 6h on Apr 1. Bruno: 24h from Mar 5.
fn seed_march(harness: &Harness) {
    let clock = harness.state.shift_clock();
    let shifts = [
        ("1001", "Ana Souza", ShiftType::TwelveHour, utc(2024, 3, 4, 10, 0), utc(2024, 3, 4, 22, 30)),
        ("1001", "Ana Souza", ShiftType::SixHour, utc(2024, 3, 6, 10, 0), utc(2024, 3, 6, 16, 0)),
        ("1001", "Ana Souza", ShiftType::SixHour, utc(2024, 4, 1, 12, 0), utc(2024, 4, 1, 18, 0)),
        ("1002", "Bruno Lima", ShiftType::TwentyFourHour, utc(2024, 3, 5, 11, 0), utc(2024, 3, 6, 11, 0)),
    ];

    for (employee_id, name, shift_type, entry, exit) in shifts {
        let opened = clock
            .punch_in(employee_id, name, shift_type, entry, ward())
            .expect("punch in");
        clock
            .punch_out(employee_id, opened.date, exit, ward())
            .expect("punch out");
    }
}

#[test]
fn punch_in_then_out_records_twelve_and_a_half_hours() {
    let harness = setup(utc(2024, 3, 4, 10, 0));
    let nurse = session("1001", "Ana Souza", UserRole::User);
    let clock = harness.state.shift_clock();

    assert_eq!(clock.current_state("1001").unwrap(), ShiftState::NoShift);

    let opened = clock.punch(&nurse, ShiftType::TwelveHour).unwrap();
    let record = match opened {
        PunchOutcome::PunchedIn(record) => record,
        other => panic!("expected punch-in, got {other:?}"),
    };
    // 10:00 UTC is 07:00 in Sao Paulo
    assert_eq!(record.date, date(2024, 3, 4));
    assert!(record.is_open());
    assert_eq!(record.location, ward());
    assert_eq!(record.created_at, "2024-03-04T10:00:00.000Z");
    assert_eq!(record.updated_at, record.created_at);
    assert!(matches!(
        clock.current_state("1001").unwrap(),
        ShiftState::OpenShift { shift_type: ShiftType::TwelveHour, .. }
    ));

    harness.clock.advance(Duration::minutes(12 * 60 + 30));
    let closed = clock.punch(&nurse, ShiftType::TwelveHour).unwrap();
    let record = match closed {
        PunchOutcome::PunchedOut(record) => record,
        other => panic!("expected punch-out, got {other:?}"),
    };
    assert_eq!(record.total_hours, Some(12.5));
    assert_eq!(record.exit_time, Some(utc(2024, 3, 4, 22, 30)));
    assert_eq!(record.created_at, "2024-03-04T10:00:00.000Z");
    assert_eq!(record.updated_at, "2024-03-04T22:30:00.000Z");
    assert_eq!(clock.current_state("1001").unwrap(), ShiftState::ClosedShift);

    harness.clock.advance(Duration::minutes(5));
    let err = clock.punch(&nurse, ShiftType::TwelveHour).unwrap_err();
    assert!(matches!(err, AppError::DuplicatePunchIn { .. }));
}

#[test]
fn overnight_shift_closes_on_the_next_day_under_its_entry_date() {
    let harness = setup(utc(2024, 3, 4, 10, 0));
    let nurse = session("1001", "Ana Souza", UserRole::User);
    let clock = harness.state.shift_clock();

    clock.punch(&nurse, ShiftType::TwentyFourHour).unwrap();
    harness.clock.advance(Duration::hours(24));

    match clock.current_state("1001").unwrap() {
        ShiftState::OpenShift { date: opened_on, .. } => assert_eq!(opened_on, date(2024, 3, 4)),
        other => panic!("expected carried-over shift, got {other:?}"),
    }

    let outcome = clock.punch(&nurse, ShiftType::TwentyFourHour).unwrap();
    let record = match outcome {
        PunchOutcome::PunchedOut(record) => record,
        other => panic!("expected punch-out, got {other:?}"),
    };
    assert_eq!(record.date, date(2024, 3, 4));
    assert_eq!(record.total_hours, Some(24.0));

    // Mar 5 itself is still free.
    assert_eq!(
        clock.resolve_state("1001", date(2024, 3, 5)).unwrap(),
        ShiftState::NoShift
    );
}

#[test]
fn stale_open_shift_is_not_carried_past_its_grace_period() {
    let harness = setup(utc(2024, 3, 4, 12, 0));
    let nurse = session("1001", "Ana Souza", UserRole::User);
    let clock = harness.state.shift_clock();

    clock.punch(&nurse, ShiftType::SixHour).unwrap();
    // 05:00 local on Mar 5, twenty hours after a six-hour entry.
    harness.clock.advance(Duration::hours(20));
    assert_eq!(clock.current_state("1001").unwrap(), ShiftState::NoShift);

    let outcome = clock.punch(&nurse, ShiftType::TwelveHour).unwrap();
    assert!(matches!(outcome, PunchOutcome::PunchedIn(_)));
    assert_eq!(outcome.record().date, date(2024, 3, 5));

    let stale = clock.resolve_state("1001", date(2024, 3, 4)).unwrap();
    assert!(matches!(stale, ShiftState::OpenShift { .. }));
}

#[test]
fn monthly_report_lists_every_employee_with_totals() {
    let harness = setup(utc(2024, 3, 31, 12, 0));
    seed_march(&harness);
    let admin = session("0001", "Coordenação", UserRole::Admin);

    let report = harness
        .state
        .reports()
        .monthly_report(&admin, MonthWindow::new(2024, 3).unwrap())
        .unwrap();

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[0].date, date(2024, 3, 6));
    assert_eq!(report.totals.len(), 2);
    assert_eq!(report.totals[0].employee_id, "1001");
    assert_eq!(report.totals[0].total_hours, 18.5);
    assert_eq!(report.totals[1].employee_id, "1002");
    assert_eq!(report.totals[1].employee_name, "Bruno Lima");
    assert_eq!(report.totals[1].total_hours, 24.0);
}

#[test]
fn monthly_report_is_forbidden_for_staff() {
    let harness = setup(utc(2024, 3, 31, 12, 0));
    let nurse = session("1001", "Ana Souza", UserRole::User);

    let err = harness
        .state
        .reports()
        .monthly_report(&nurse, MonthWindow::new(2024, 3).unwrap())
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));
}

#[test]
fn personal_report_is_newest_first_and_scoped_to_the_month() {
    let harness = setup(utc(2024, 3, 31, 12, 0));
    seed_march(&harness);
    let nurse = session("1001", "Ana Souza", UserRole::User);

    let report = harness
        .state
        .reports()
        .personal_report(&nurse, MonthWindow::new(2024, 3).unwrap())
        .unwrap();

    let dates: Vec<NaiveDate> = report.records.iter().map(|record| record.date).collect();
    assert_eq!(dates, vec![date(2024, 3, 6), date(2024, 3, 4)]);
    assert_eq!(report.total_hours, 18.5);
}

#[test]
fn printable_timesheet_expands_the_whole_month() {
    let harness = setup(utc(2024, 3, 31, 12, 0));
    seed_march(&harness);
    harness
        .pool
        .with_connection(|conn| {
            UserRepository::insert(
                conn,
                &UserAccount {
                    employee_id: "1001".to_string(),
                    employee_name: "Ana Souza".to_string(),
                    role: UserRole::User,
                    sector: Some("UTI Adulto".to_string()),
                    job_title: Some("Enfermeira".to_string()),
                    first_time_login: false,
                    password_hash: "v1:unused:unused".to_string(),
                    created_at: "2024-01-01T00:00:00Z".to_string(),
                    updated_at: "2024-01-01T00:00:00Z".to_string(),
                },
            )
        })
        .unwrap();
    let nurse = session("1001", "Ana Souza", UserRole::User);

    let sheet = harness
        .state
        .reports()
        .printable_timesheet(&nurse, "1001", MonthWindow::new(2024, 3).unwrap())
        .unwrap();

    assert_eq!(sheet.header.employee_name, "Ana Souza");
    assert_eq!(sheet.header.sector, "UTI Adulto");
    assert_eq!(sheet.header.job_title, "Enfermeira");
    assert_eq!(sheet.header.month_name, "MARÇO");
    assert_eq!(sheet.header.year, 2024);
    assert_eq!(sheet.total_hours, 18.5);

    assert_eq!(sheet.rows.len(), 31);
    let first = &sheet.rows[0];
    assert_eq!((first.day, first.weekday.as_str()), (1, "SEXTA-FEIRA"));
    assert!(first.entry.is_empty() && first.exit.is_empty());

    let worked = &sheet.rows[3];
    assert_eq!(worked.date, date(2024, 3, 4));
    assert_eq!(worked.weekday, "SEGUNDA-FEIRA");
    assert_eq!(worked.entry, "07:00");
    assert_eq!(worked.exit, "19:30");
}

#[test]
fn printable_timesheet_follows_the_report_locale() {
    let harness = setup(utc(2024, 3, 31, 12, 0));
    seed_march(&harness);
    harness
        .state
        .settings()
        .update(SettingsUpdateInput {
            timezone: None,
            locale: Some("en-US".to_string()),
        })
        .unwrap();
    let admin = session("0001", "Coordenação", UserRole::Admin);

    // No account row for 1002: the name comes from the records.
    let sheet = harness
        .state
        .reports()
        .printable_timesheet(&admin, "1002", MonthWindow::new(2024, 3).unwrap())
        .unwrap();

    assert_eq!(sheet.header.employee_name, "Bruno Lima");
    assert_eq!(sheet.header.month_name, "MARCH");
    assert!(sheet.header.sector.is_empty());
    assert_eq!(sheet.rows[4].weekday, "TUESDAY");
    assert_eq!(sheet.rows[4].entry, "08:00");
    assert_eq!(sheet.rows[4].exit, "08:00");
    assert_eq!(sheet.total_hours, 24.0);
}

#[test]
fn staff_cannot_print_someone_elses_timesheet() {
    let harness = setup(utc(2024, 3, 31, 12, 0));
    seed_march(&harness);
    let nurse = session("1001", "Ana Souza", UserRole::User);

    let err = harness
        .state
        .reports()
        .printable_timesheet(&nurse, "1002", MonthWindow::new(2024, 3).unwrap())
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));
}

#[test]
fn printable_timesheet_for_an_unknown_employee_is_not_found() {
    let harness = setup(utc(2024, 3, 31, 12, 0));
    let admin = session("0001", "Coordenação", UserRole::Admin);

    let err = harness
        .state
        .reports()
        .printable_timesheet(&admin, "9999", MonthWindow::new(2024, 2).unwrap())
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[test]
fn changing_the_time_zone_moves_the_day_boundary() {
    // 01:30 UTC on Mar 5 is still Mar 4 in Sao Paulo, but Mar 5 in Lisbon.
    let harness = setup(utc(2024, 3, 5, 1, 30));
    let nurse = session("1001", "Ana Souza", UserRole::User);
    let clock = harness.state.shift_clock();

    let first = clock.punch(&nurse, ShiftType::SixHour).unwrap();
    assert_eq!(first.record().date, date(2024, 3, 4));

    harness
        .state
        .settings()
        .update(SettingsUpdateInput {
            timezone: Some("Europe/Lisbon".to_string()),
            locale: None,
        })
        .unwrap();
    let other = session("1003", "Carla Dias", UserRole::User);
    let second = clock.punch(&other, ShiftType::SixHour).unwrap();
    assert_eq!(second.record().date, date(2024, 3, 5));
}
