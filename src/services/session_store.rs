use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::AppResult;
use crate::models::user::Session;

/// Keeps the logged-in session on disk between application starts.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// A missing file means nobody is logged in; an unreadable one is
    /// dropped so the user simply logs in again.
    pub fn load(&self) -> AppResult<Option<Session>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                debug!(target: "app::auth", employee_id = %session.employee_id, "session restored");
                Ok(Some(session))
            }
            Err(err) => {
                warn!(
                    target: "app::auth",
                    error = %err,
                    path = %self.path.display(),
                    "discarding unreadable session file"
                );
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let payload = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    pub fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
