use std::sync::Arc;

use tracing::debug;

use crate::db::repositories::punch_repository::PunchRepository;
use crate::db::repositories::user_repository::UserRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::timesheet::{
    MonthWindow, MonthlyReport, PersonalReport, PrintableTimesheet, TimesheetHeader,
};
use crate::models::user::Session;
use crate::services::monthly_aggregator::{per_employee_totals, total_hours_for};
use crate::services::settings_service::SettingsService;
use crate::services::timesheet_calendar::{month_name, TimesheetCalendar};

/// Month-window reads behind the dashboards and the printable sheet.
pub struct ReportService {
    db: DbPool,
    settings: Arc<SettingsService>,
}

impl ReportService {
    pub fn new(db: DbPool, settings: Arc<SettingsService>) -> Self {
        Self { db, settings }
    }

    /// Every employee's records for the month plus their totals. Admins only.
    pub fn monthly_report(&self, session: &Session, window: MonthWindow) -> AppResult<MonthlyReport> {
        if !session.is_admin() {
            return Err(AppError::forbidden(
                "the monthly dashboard is restricted to administrators",
            ));
        }

        let (start, end) = (window.start_date()?, window.end_date()?);
        let records = self
            .db
            .with_connection(|conn| PunchRepository::list_in_range(conn, start, end))?;
        let totals = per_employee_totals(&records).into_values().collect();

        debug!(
            target: "app::report",
            year = window.year,
            month = window.month,
            records = records.len(),
            "monthly report built"
        );
        Ok(MonthlyReport {
            window,
            records,
            totals,
        })
    }

    /// The logged-in employee's own records, newest first.
    pub fn personal_report(&self, session: &Session, window: MonthWindow) -> AppResult<PersonalReport> {
        let (start, end) = (window.start_date()?, window.end_date()?);
        let mut records = self.db.with_connection(|conn| {
            PunchRepository::list_for_employee_in_range(conn, &session.employee_id, start, end)
        })?;
        records.reverse();
        let total_hours = total_hours_for(&session.employee_id, &records);

        Ok(PersonalReport {
            window,
            employee_id: session.employee_id.clone(),
            records,
            total_hours,
        })
    }

    /// Printable timesheet for `employee_id`. Staff may print only their own.
    pub fn printable_timesheet(
        &self,
        session: &Session,
        employee_id: &str,
        window: MonthWindow,
    ) -> AppResult<PrintableTimesheet> {
        if !session.is_admin() && session.employee_id != employee_id {
            return Err(AppError::forbidden(
                "staff can only print their own timesheet",
            ));
        }

        let settings = self.settings.get()?;
        let tz = self.settings.timezone()?;
        let (start, end) = (window.start_date()?, window.end_date()?);

        let (account, records) = self.db.with_connection(|conn| {
            let account = UserRepository::find(conn, employee_id)?;
            let records =
                PunchRepository::list_for_employee_in_range(conn, employee_id, start, end)?;
            Ok((account, records))
        })?;

        // No account row: use the name stamped on the records.
        let employee_name = account
            .as_ref()
            .map(|account| account.employee_name.clone())
            .or_else(|| records.first().map(|record| record.employee_name.clone()))
            .ok_or_else(AppError::not_found)?;

        let calendar = TimesheetCalendar::new(tz, settings.locale);
        let rows = calendar.expand(employee_id, window.month, window.year, &records)?;

        Ok(PrintableTimesheet {
            header: TimesheetHeader {
                employee_id: employee_id.to_string(),
                employee_name,
                sector: account
                    .as_ref()
                    .and_then(|account| account.sector.clone())
                    .unwrap_or_default(),
                job_title: account
                    .as_ref()
                    .and_then(|account| account.job_title.clone())
                    .unwrap_or_default(),
                month_name: month_name(window.month, settings.locale)?.to_uppercase(),
                year: window.year,
            },
            rows,
            total_hours: total_hours_for(employee_id, &records),
        })
    }
}
