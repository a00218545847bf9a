use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::punch::PunchRecord;

/// A calendar month selected on a dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(AppError::validation(format!("year out of range: {year}")));
        }
        Ok(Self { year, month })
    }

    pub fn start_date(&self) -> AppResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            AppError::validation(format!("invalid month {}/{}", self.month, self.year))
        })
    }

    /// Last day of the month: the day before the first of the next month.
    pub fn end_date(&self) -> AppResult<NaiveDate> {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .map(|first| first - Duration::days(1))
            .ok_or_else(|| {
                AppError::validation(format!("invalid month {}/{}", self.month, self.year))
            })
    }

    pub fn days(&self) -> AppResult<u32> {
        Ok(self.end_date()?.day())
    }
}

/// One line of the printable timesheet.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayRow {
    pub day: u32,
    pub date: NaiveDate,
    pub weekday: String,
    /// `HH:MM` in local time, empty when nothing was punched.
    pub entry: String,
    pub exit: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeTotal {
    pub employee_id: String,
    pub employee_name: String,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub window: MonthWindow,
    pub records: Vec<PunchRecord>,
    pub totals: Vec<EmployeeTotal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalReport {
    pub window: MonthWindow,
    pub employee_id: String,
    pub records: Vec<PunchRecord>,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetHeader {
    pub employee_id: String,
    pub employee_name: String,
    pub sector: String,
    pub job_title: String,
    pub month_name: String,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintableTimesheet {
    pub header: TimesheetHeader,
    pub rows: Vec<DayRow>,
    pub total_hours: f64,
}
