use std::sync::Arc;

use tracing::{info, warn};

use crate::db::repositories::user_repository::UserRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::user::{Session, UserAccount, UserCreateInput, UserRole};
use crate::services::clock::Clock;
use crate::services::session_store::SessionStore;
use crate::utils::crypto::{hash_password, verify_password};

const MIN_PASSWORD_LEN: usize = 6;

/// Login, logout and password lifecycle for staff accounts.
pub struct AuthService {
    db: DbPool,
    sessions: SessionStore,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(db: DbPool, sessions: SessionStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            sessions,
            clock,
        }
    }

    /// Session persisted by a previous run, if any. Role, name and
    /// first-login state always come from the account row, never the file;
    /// a session whose account is gone is discarded.
    pub fn restore(&self) -> AppResult<Option<Session>> {
        let Some(stored) = self.sessions.load()? else {
            return Ok(None);
        };

        let account = self
            .db
            .with_connection(|conn| UserRepository::find(conn, &stored.employee_id))?;
        let Some(account) = account else {
            warn!(
                target: "app::auth",
                employee_id = %stored.employee_id,
                "session refers to an unknown account; discarding"
            );
            self.sessions.clear()?;
            return Ok(None);
        };

        let session = stored.resynced_with(&account);
        if session != stored {
            self.sessions.save(&session)?;
        }
        Ok(Some(session))
    }

    pub fn login(&self, employee_id: &str, password: &str) -> AppResult<Session> {
        let employee_id = employee_id.trim();
        let account = self
            .db
            .with_connection(|conn| UserRepository::find(conn, employee_id))?
            .ok_or_else(AppError::invalid_credentials)?;

        if !verify_password(password, &account.password_hash)? {
            return Err(AppError::invalid_credentials());
        }

        let session = Session::for_account(&account, self.clock.now());
        self.sessions.save(&session)?;
        info!(
            target: "app::auth",
            employee_id = %session.employee_id,
            role = %session.role,
            "login succeeded"
        );
        Ok(session)
    }

    pub fn logout(&self) -> AppResult<()> {
        self.sessions.clear()?;
        info!(target: "app::auth", "logged out");
        Ok(())
    }

    /// Verifies the current password, stores the new one and ends the
    /// first-login state. Returns the refreshed session.
    pub fn change_password(
        &self,
        session: &Session,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<Session> {
        ensure_password_strength(new_password)?;
        if current_password == new_password {
            return Err(AppError::validation(
                "new password must differ from the current one",
            ));
        }

        let account = self.account(&session.employee_id)?;
        if !verify_password(current_password, &account.password_hash)? {
            return Err(AppError::invalid_credentials());
        }

        let hash = hash_password(new_password);
        self.db.with_connection(|conn| {
            UserRepository::update_password(conn, &session.employee_id, &hash)
        })?;

        let mut refreshed = session.clone();
        refreshed.first_time_login = false;
        self.sessions.save(&refreshed)?;
        info!(target: "app::auth", employee_id = %session.employee_id, "password changed");
        Ok(refreshed)
    }

    /// Admin-only account creation. New accounts must change their password
    /// on first login.
    pub fn create_user(&self, session: &Session, input: UserCreateInput) -> AppResult<UserAccount> {
        if !session.is_admin() {
            return Err(AppError::forbidden("only administrators can create accounts"));
        }
        self.insert_account(input)
    }

    /// Seeds the first administrator when the users table is empty.
    pub fn bootstrap_admin(&self, input: UserCreateInput) -> AppResult<Option<UserAccount>> {
        let existing = self.db.with_connection(UserRepository::count)?;
        if existing > 0 {
            return Ok(None);
        }
        let mut input = input;
        input.role = UserRole::Admin;
        self.insert_account(input).map(Some)
    }

    pub fn account(&self, employee_id: &str) -> AppResult<UserAccount> {
        self.db
            .with_connection(|conn| UserRepository::find(conn, employee_id))?
            .ok_or_else(AppError::not_found)
    }

    fn insert_account(&self, input: UserCreateInput) -> AppResult<UserAccount> {
        let employee_id = input.employee_id.trim().to_string();
        let employee_name = input.employee_name.trim().to_string();
        if employee_id.is_empty() || employee_name.is_empty() {
            return Err(AppError::validation(
                "employee id and name must not be empty",
            ));
        }
        ensure_password_strength(&input.password)?;

        let now = self.clock.now().to_rfc3339();
        let draft = UserAccount {
            employee_id,
            employee_name,
            role: input.role,
            sector: normalize_optional(input.sector),
            job_title: normalize_optional(input.job_title),
            first_time_login: true,
            password_hash: hash_password(&input.password),
            created_at: now.clone(),
            updated_at: now,
        };

        let account = self.db.with_connection(|conn| {
            match UserRepository::insert(conn, &draft) {
                Err(AppError::Conflict { .. }) => {
                    return Err(AppError::conflict(format!(
                        "employee id already registered: {}",
                        draft.employee_id
                    )))
                }
                other => other?,
            }
            UserRepository::find(conn, &draft.employee_id)?.ok_or_else(AppError::not_found)
        })?;

        info!(
            target: "app::auth",
            employee_id = %account.employee_id,
            role = %account.role,
            "account created"
        );
        Ok(account)
    }
}

fn ensure_password_strength(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must have at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
