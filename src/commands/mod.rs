pub mod auth;
pub mod settings;
pub mod timesheet;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{error, warn};

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::user::Session;
use crate::services::auth_service::AuthService;
use crate::services::clock::Clock;
use crate::services::geolocation::LocationProvider;
use crate::services::report_service::ReportService;
use crate::services::session_store::SessionStore;
use crate::services::settings_service::SettingsService;
use crate::services::shift_clock::ShiftClock;

#[derive(Clone)]
pub struct AppState {
    settings_service: Arc<SettingsService>,
    shift_clock: Arc<ShiftClock>,
    report_service: Arc<ReportService>,
    auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        db_pool: DbPool,
        session_path: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
        locator: Arc<dyn LocationProvider>,
    ) -> Self {
        let settings_service = Arc::new(SettingsService::new(db_pool.clone()));
        let shift_clock = Arc::new(ShiftClock::new(
            db_pool.clone(),
            Arc::clone(&settings_service),
            Arc::clone(&clock),
            locator,
        ));
        let report_service = Arc::new(ReportService::new(
            db_pool.clone(),
            Arc::clone(&settings_service),
        ));
        let auth_service = Arc::new(AuthService::new(
            db_pool,
            SessionStore::new(session_path),
            clock,
        ));

        Self {
            settings_service,
            shift_clock,
            report_service,
            auth_service,
        }
    }

    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings_service)
    }

    pub fn shift_clock(&self) -> Arc<ShiftClock> {
        Arc::clone(&self.shift_clock)
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.report_service)
    }

    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth_service)
    }

    /// The persisted session, or `UNAUTHENTICATED` when nobody is logged in.
    pub(crate) fn require_session(&self) -> CommandResult<Session> {
        self.auth_service
            .restore()?
            .ok_or_else(|| CommandError::new("UNAUTHENTICATED", "login required", None))
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
    /// True when the same action may succeed if the user simply tries again.
    pub retryable: bool,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
            retryable: false,
        }
    }

    fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        let retryable = error.is_retryable();
        let mapped = match error {
            AppError::DuplicatePunchIn { employee_id, date } => CommandError::new(
                "DUPLICATE_PUNCH_IN",
                "an entry is already registered for today",
                Some(json!({ "employeeId": employee_id, "date": date })),
            ),
            AppError::NoOpenShift { employee_id, date } => CommandError::new(
                "NO_OPEN_SHIFT",
                "there is no open shift to close",
                Some(json!({ "employeeId": employee_id, "date": date })),
            ),
            AppError::GeolocationUnavailable { reason } => CommandError::new(
                "GEOLOCATION_UNAVAILABLE",
                "could not capture the current position",
                Some(json!({ "reason": reason })),
            ),
            AppError::StoreUnavailable { message } => {
                error!(target: "app::command", %message, "store unavailable in command");
                CommandError::new(
                    "STORE_UNAVAILABLE",
                    "the record store is temporarily unavailable",
                    None,
                )
            }
            AppError::Validation { message, details } => {
                CommandError::new("VALIDATION_ERROR", message, details)
            }
            AppError::NotFound => CommandError::new("NOT_FOUND", "record not found", None),
            AppError::Conflict { message } => CommandError::new("CONFLICT", message, None),
            AppError::InvalidCredentials => CommandError::new(
                "INVALID_CREDENTIALS",
                "invalid employee id or password",
                None,
            ),
            AppError::Forbidden { message } => {
                warn!(target: "app::command", %message, "forbidden command");
                CommandError::new("FORBIDDEN", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "file system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        };

        if retryable {
            mapped.retryable()
        } else {
            mapped
        }
    }
}

