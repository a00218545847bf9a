use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{AppError, AppResult};
use crate::models::punch::PunchRecord;
use crate::models::settings::ReportLocale;
use crate::models::timesheet::{DayRow, MonthWindow};
use crate::services::monthly_aggregator::records_by_day;

const PT_BR_WEEKDAYS: [&str; 7] = [
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
    "domingo",
];

const EN_US_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const PT_BR_MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const EN_US_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn weekday_name(weekday: Weekday, locale: ReportLocale) -> &'static str {
    let index = weekday.num_days_from_monday() as usize;
    match locale {
        ReportLocale::PtBr => PT_BR_WEEKDAYS[index],
        ReportLocale::EnUs => EN_US_WEEKDAYS[index],
    }
}

pub fn month_name(month: u32, locale: ReportLocale) -> AppResult<&'static str> {
    if !(1..=12).contains(&month) {
        return Err(AppError::validation(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    let index = (month - 1) as usize;
    Ok(match locale {
        ReportLocale::PtBr => PT_BR_MONTHS[index],
        ReportLocale::EnUs => EN_US_MONTHS[index],
    })
}

/// Number of days in `month` of `year`, leap years included.
pub fn days_in_month(month: u32, year: i32) -> AppResult<u32> {
    MonthWindow::new(year, month)?.days()
}

/// Lays a sparse set of punch records onto a dense month grid.
#[derive(Debug, Clone, Copy)]
pub struct TimesheetCalendar {
    tz: Tz,
    locale: ReportLocale,
}

impl TimesheetCalendar {
    pub fn new(tz: Tz, locale: ReportLocale) -> Self {
        Self { tz, locale }
    }

    /// One row per day of the month in ascending order, whatever the number
    /// of records. Days without a record keep blank times.
    pub fn expand(
        &self,
        employee_id: &str,
        month: u32,
        year: i32,
        records: &[PunchRecord],
    ) -> AppResult<Vec<DayRow>> {
        let window = MonthWindow::new(year, month)?;
        let first = window.start_date()?;
        let by_day = records_by_day(employee_id, records);

        let rows = first
            .iter_days()
            .take(window.days()? as usize)
            .map(|date| {
                let record = by_day.get(&date);
                DayRow {
                    day: date.day(),
                    date,
                    weekday: self.weekday_label(date),
                    entry: record
                        .map(|record| self.clock_time(record.entry_time))
                        .unwrap_or_default(),
                    exit: record
                        .and_then(|record| record.exit_time)
                        .map(|exit| self.clock_time(exit))
                        .unwrap_or_default(),
                }
            })
            .collect();

        Ok(rows)
    }

    fn weekday_label(&self, date: NaiveDate) -> String {
        weekday_name(date.weekday(), self.locale).to_uppercase()
    }

    fn clock_time(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.tz).format("%H:%M").to_string()
    }
}
