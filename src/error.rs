use chrono::NaiveDate;
use rusqlite;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("entry already registered for {employee_id} on {date}")]
    DuplicatePunchIn { employee_id: String, date: NaiveDate },

    #[error("no open shift for {employee_id} on {date}")]
    NoOpenShift { employee_id: String, date: NaiveDate },

    #[error("geolocation unavailable: {reason}")]
    GeolocationUnavailable { reason: String },

    #[error("record store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("record not found")]
    NotFound,

    #[error("record conflict: {message}")]
    Conflict { message: String },

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("invalid employee id or password")]
    InvalidCredentials,

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn duplicate_punch_in(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        let employee_id = employee_id.into();
        warn!(target: "app::clock", %employee_id, %date, "duplicate punch-in rejected");
        AppError::DuplicatePunchIn { employee_id, date }
    }

    pub fn no_open_shift(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        let employee_id = employee_id.into();
        warn!(target: "app::clock", %employee_id, %date, "punch-out without open shift");
        AppError::NoOpenShift { employee_id, date }
    }

    pub fn geolocation_unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(target: "app::geo", %reason, "geolocation capture failed");
        AppError::GeolocationUnavailable { reason }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::db", %message, "store error");
        AppError::StoreUnavailable { message }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            details: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::conflict", %message, "conflict error");
        AppError::Conflict { message }
    }

    pub fn not_found() -> Self {
        warn!(target: "app::db", "resource not found");
        AppError::NotFound
    }

    pub fn invalid_credentials() -> Self {
        warn!(target: "app::auth", "login rejected");
        AppError::InvalidCredentials
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::auth", %message, "forbidden");
        AppError::Forbidden { message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    /// Conditions a caller may retry after re-resolving the shift state.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::GeolocationUnavailable { .. } | AppError::StoreUnavailable { .. }
        )
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        use rusqlite::Error::{QueryReturnedNoRows, SqliteFailure};
        use rusqlite::ErrorCode;

        match &error {
            QueryReturnedNoRows => AppError::not_found(),
            SqliteFailure(err, message) if err.code == ErrorCode::ConstraintViolation => {
                AppError::conflict(
                    message
                        .clone()
                        .unwrap_or_else(|| "unique or check constraint violated".to_string()),
                )
            }
            _ => {
                error!(target: "app::db", error = ?error, "sqlite error");
                AppError::store_unavailable(error.to_string())
            }
        }
    }
}
