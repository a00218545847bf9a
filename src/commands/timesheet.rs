use serde::Deserialize;

use crate::error::AppError;
use crate::models::punch::{PunchOutcome, ShiftState, ShiftType};
use crate::models::timesheet::{MonthWindow, MonthlyReport, PersonalReport, PrintableTimesheet};

use super::{AppState, CommandResult};

pub fn timesheet_current_state(state: &AppState) -> CommandResult<ShiftState> {
    let session = state.require_session()?;
    Ok(state.shift_clock().current_state(&session.employee_id)?)
}

pub fn timesheet_punch(state: &AppState, payload: PunchPayload) -> CommandResult<PunchOutcome> {
    let session = state.require_session()?;
    let shift_type = payload.shift_type()?;
    Ok(state.shift_clock().punch(&session, shift_type)?)
}

pub fn timesheet_monthly_report(
    state: &AppState,
    payload: MonthPayload,
) -> CommandResult<MonthlyReport> {
    let session = state.require_session()?;
    let window = payload.window()?;
    Ok(state.reports().monthly_report(&session, window)?)
}

pub fn timesheet_personal_report(
    state: &AppState,
    payload: MonthPayload,
) -> CommandResult<PersonalReport> {
    let session = state.require_session()?;
    let window = payload.window()?;
    Ok(state.reports().personal_report(&session, window)?)
}

pub fn timesheet_print(
    state: &AppState,
    payload: PrintPayload,
) -> CommandResult<PrintableTimesheet> {
    let session = state.require_session()?;
    let window = MonthWindow::new(payload.year, payload.month)?;
    let employee_id = payload
        .employee_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(&session.employee_id)
        .to_string();
    Ok(state
        .reports()
        .printable_timesheet(&session, &employee_id, window)?)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchPayload {
    #[serde(default)]
    pub shift_type: Option<String>,
}

impl PunchPayload {
    fn shift_type(&self) -> Result<ShiftType, AppError> {
        match self.shift_type.as_deref().map(str::trim) {
            None | Some("") => Ok(ShiftType::default()),
            Some(value) => ShiftType::try_from(value).map_err(AppError::validation),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPayload {
    pub year: i32,
    pub month: u32,
}

impl MonthPayload {
    fn window(&self) -> Result<MonthWindow, AppError> {
        MonthWindow::new(self.year, self.month)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintPayload {
    #[serde(default)]
    pub employee_id: Option<String>,
    pub year: i32,
    pub month: u32,
}
