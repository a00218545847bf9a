// Racing punches against the same employee-day

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::tempdir;
use ward_timeclock_lib::commands::AppState;
use ward_timeclock_lib::db::repositories::punch_repository::PunchRepository;
use ward_timeclock_lib::db::DbPool;
use ward_timeclock_lib::error::AppError;
use ward_timeclock_lib::models::punch::{GeoLocation, ShiftType};
use ward_timeclock_lib::services::clock::FixedClock;
use ward_timeclock_lib::services::geolocation::FixedLocation;

const WORKERS: usize = 8;

fn state_for(pool: &DbPool, dir: &std::path::Path) -> AppState {
    AppState::new(
        pool.clone(),
        dir.join("session.json"),
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap())),
        Arc::new(FixedLocation::new(-23.5558, -46.6690).expect("location")),
    )
}

#[test]
fn concurrent_punch_ins_leave_exactly_one_record() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("timeclock.sqlite")).expect("db pool");
    let barrier = Arc::new(Barrier::new(WORKERS));
    let now = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let state = state_for(&pool, dir.path());
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                state.shift_clock().punch_in(
                    "1001",
                    "Ana Souza",
                    ShiftType::TwelveHour,
                    now + chrono::Duration::milliseconds(worker as i64),
                    GeoLocation::new(-23.5558, -46.6690),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker panicked"))
        .collect();

    let accepted = results.iter().filter(|result| result.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|result| matches!(result, Err(AppError::DuplicatePunchIn { .. })))
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(duplicates, WORKERS - 1);

    let total = pool.with_connection(PunchRepository::count).unwrap();
    assert_eq!(total, 1);
}

#[test]
fn concurrent_punch_outs_close_the_shift_once() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("timeclock.sqlite")).expect("db pool");
    let opened = state_for(&pool, dir.path())
        .shift_clock()
        .punch_in(
            "1001",
            "Ana Souza",
            ShiftType::TwelveHour,
            Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
            GeoLocation::new(-23.5558, -46.6690),
        )
        .unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    assert_eq!(opened.date, day);

    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let state = state_for(&pool, dir.path());
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                state.shift_clock().punch_out(
                    "1001",
                    day,
                    Utc.with_ymd_and_hms(2024, 3, 4, 22, 0, worker as u32).unwrap(),
                    GeoLocation::new(-23.5558, -46.6690),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker panicked"))
        .collect();

    let closed: Vec<_> = results.iter().filter_map(|result| result.as_ref().ok()).collect();
    assert_eq!(closed.len(), 1);
    assert!(results
        .iter()
        .filter(|result| result.is_err())
        .all(|result| matches!(result, Err(AppError::NoOpenShift { .. }))));

    let stored = pool
        .with_connection(|conn| PunchRepository::find_by_id(conn, opened.id))
        .unwrap();
    assert_eq!(stored.exit_time, closed[0].exit_time);
    assert_eq!(stored.total_hours, Some(12.0));
}
