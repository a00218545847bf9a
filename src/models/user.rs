use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UserRole {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            other => Err(format!("unsupported user role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub employee_id: String,
    pub employee_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub first_time_login: bool,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateInput {
    pub employee_id: String,
    pub employee_name: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
}

fn default_role() -> UserRole {
    UserRole::User
}

/// Logged-in staff member. Passed explicitly to whatever needs the
/// employee id or role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: Uuid,
    pub employee_id: String,
    pub employee_name: String,
    pub role: UserRole,
    pub first_time_login: bool,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn for_account(account: &UserAccount, started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            employee_id: account.employee_id.clone(),
            employee_name: account.employee_name.clone(),
            role: account.role,
            first_time_login: account.first_time_login,
            started_at,
        }
    }

    /// Same session, with account-owned fields taken from `account`.
    pub fn resynced_with(&self, account: &UserAccount) -> Self {
        Self {
            employee_name: account.employee_name.clone(),
            role: account.role,
            first_time_login: account.first_time_login,
            ..self.clone()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
