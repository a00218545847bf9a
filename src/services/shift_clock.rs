use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::repositories::punch_repository::PunchRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::punch::{
    GeoLocation, PunchInInsert, PunchOutUpdate, PunchOutcome, PunchRecord, ShiftState, ShiftType,
};
use crate::models::user::Session;
use crate::services::clock::{local_date, Clock};
use crate::services::geolocation::{capture_checked, ensure_valid, LocationProvider};
use crate::services::settings_service::SettingsService;

/// Slack past the nominal shift length during which an open shift from the
/// previous day is still closed by the next punch.
const OVERNIGHT_GRACE_HOURS: i64 = 6;

/// Punch-in / punch-out state machine for one employee-day.
pub struct ShiftClock {
    db: DbPool,
    settings: Arc<SettingsService>,
    clock: Arc<dyn Clock>,
    locator: Arc<dyn LocationProvider>,
}

impl ShiftClock {
    pub fn new(
        db: DbPool,
        settings: Arc<SettingsService>,
        clock: Arc<dyn Clock>,
        locator: Arc<dyn LocationProvider>,
    ) -> Self {
        Self {
            db,
            settings,
            clock,
            locator,
        }
    }

    pub fn resolve_state(&self, employee_id: &str, today: NaiveDate) -> AppResult<ShiftState> {
        let record = self.db.with_connection(|conn| {
            PunchRepository::find_by_employee_and_date(conn, employee_id, today)
        })?;
        Ok(ShiftState::from_record(record.as_ref()))
    }

    /// Opens a shift keyed on the local calendar day of `now`.
    pub fn punch_in(
        &self,
        employee_id: &str,
        employee_name: &str,
        shift_type: ShiftType,
        now: DateTime<Utc>,
        location: GeoLocation,
    ) -> AppResult<PunchRecord> {
        let location = ensure_valid(location)?;
        let employee_id = employee_id.trim();
        if employee_id.is_empty() {
            return Err(AppError::validation("employee id must not be empty"));
        }
        let today = local_date(now, self.settings.timezone()?);

        if self.resolve_state(employee_id, today)? != ShiftState::NoShift {
            return Err(AppError::duplicate_punch_in(employee_id, today));
        }

        let insert = PunchInInsert {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.trim().to_string(),
            date: today,
            entry_time: now,
            shift_type,
            location,
            recorded_at: self.clock.now(),
        };

        let record = self.db.with_write_transaction(|conn| {
            let id = PunchRepository::insert(conn, &insert)?;
            PunchRepository::find_by_id(conn, id)
        })?;

        info!(
            target: "app::clock",
            employee_id = %record.employee_id,
            date = %record.date,
            shift_type = %record.shift_type,
            "punch-in recorded"
        );
        Ok(record)
    }

    /// Closes the open shift keyed on `today`.
    pub fn punch_out(
        &self,
        employee_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
        location: GeoLocation,
    ) -> AppResult<PunchRecord> {
        let location = ensure_valid(location)?;
        let record = self
            .db
            .with_connection(|conn| {
                PunchRepository::find_by_employee_and_date(conn, employee_id, today)
            })?
            .filter(PunchRecord::is_open)
            .ok_or_else(|| AppError::no_open_shift(employee_id, today))?;

        if now < record.entry_time {
            return Err(AppError::validation(format!(
                "exit time {now} precedes entry time {}",
                record.entry_time
            )));
        }

        let update = PunchOutUpdate {
            exit_time: now,
            total_hours: elapsed_hours(record.entry_time, now),
            location,
            recorded_at: self.clock.now(),
        };

        let closed = self.db.with_write_transaction(|conn| {
            if !PunchRepository::close_shift(conn, record.id, &update)? {
                return Err(AppError::no_open_shift(employee_id, today));
            }
            PunchRepository::find_by_id(conn, record.id)
        })?;

        info!(
            target: "app::clock",
            employee_id = %closed.employee_id,
            date = %closed.date,
            total_hours = update.total_hours,
            "punch-out recorded"
        );
        Ok(closed)
    }

    /// State for the local "today", carrying over an overnight shift that
    /// started yesterday and is still within its expected length.
    pub fn current_state(&self, employee_id: &str) -> AppResult<ShiftState> {
        let now = self.clock.now();
        let today = local_date(now, self.settings.timezone()?);
        self.pending_state(employee_id, today, now)
    }

    /// Single punch action: opens a shift when none is pending, otherwise
    /// closes the pending one. Position is captured before any write.
    pub fn punch(&self, session: &Session, shift_type: ShiftType) -> AppResult<PunchOutcome> {
        let now = self.clock.now();
        let today = local_date(now, self.settings.timezone()?);

        match self.pending_state(&session.employee_id, today, now)? {
            ShiftState::NoShift => {
                let location = capture_checked(self.locator.as_ref())?;
                self.punch_in(
                    &session.employee_id,
                    &session.employee_name,
                    shift_type,
                    now,
                    location,
                )
                .map(PunchOutcome::PunchedIn)
            }
            ShiftState::OpenShift { date, .. } => {
                let location = capture_checked(self.locator.as_ref())?;
                self.punch_out(&session.employee_id, date, now, location)
                    .map(PunchOutcome::PunchedOut)
            }
            ShiftState::ClosedShift => Err(AppError::duplicate_punch_in(
                session.employee_id.clone(),
                today,
            )),
        }
    }

    fn pending_state(
        &self,
        employee_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<ShiftState> {
        let state = self.resolve_state(employee_id, today)?;
        if state != ShiftState::NoShift {
            return Ok(state);
        }

        let Some(yesterday) = today.pred_opt() else {
            return Ok(state);
        };

        match self.resolve_state(employee_id, yesterday)? {
            ShiftState::OpenShift {
                date,
                entry_time,
                shift_type,
            } if now - entry_time
                <= Duration::hours(i64::from(shift_type.nominal_hours()) + OVERNIGHT_GRACE_HOURS) =>
            {
                debug!(
                    target: "app::clock",
                    employee_id,
                    %date,
                    "carrying over overnight shift"
                );
                Ok(ShiftState::OpenShift {
                    date,
                    entry_time,
                    shift_type,
                })
            }
            _ => Ok(state),
        }
    }
}

/// Wall-clock hours between two instants, rounded to two decimals.
pub fn elapsed_hours(entry: DateTime<Utc>, exit: DateTime<Utc>) -> f64 {
    let millis = (exit - entry).num_milliseconds().max(0) as f64;
    (millis / 36_000.0).round() / 100.0
}
