use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::user::{UserAccount, UserRole};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub employee_id: String,
    pub employee_name: String,
    pub password_hash: String,
    pub role: String,
    pub sector: Option<String>,
    pub job_title: Option<String>,
    pub first_time_login: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    pub fn into_account(self) -> AppResult<UserAccount> {
        let role = UserRole::try_from(self.role.as_str()).map_err(AppError::validation)?;
        Ok(UserAccount {
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            role,
            sector: self.sector,
            job_title: self.job_title,
            first_time_login: self.first_time_login,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for UserRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            employee_id: row.get("employee_id")?,
            employee_name: row.get("employee_name")?,
            password_hash: row.get("password_hash")?,
            role: row.get("role")?,
            sector: row.get("sector")?,
            job_title: row.get("job_title")?,
            first_time_login: row.get("first_time_login")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct UserRepository;

impl UserRepository {
    pub fn insert(conn: &Connection, account: &UserAccount) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO users (
                    employee_id,
                    employee_name,
                    password_hash,
                    role,
                    sector,
                    job_title,
                    first_time_login,
                    created_at,
                    updated_at
                ) VALUES (
                    :employee_id,
                    :employee_name,
                    :password_hash,
                    :role,
                    :sector,
                    :job_title,
                    :first_time_login,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":employee_id": &account.employee_id,
                ":employee_name": &account.employee_name,
                ":password_hash": &account.password_hash,
                ":role": account.role.as_str(),
                ":sector": &account.sector,
                ":job_title": &account.job_title,
                ":first_time_login": account.first_time_login,
                ":created_at": &account.created_at,
                ":updated_at": &account.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn find(conn: &Connection, employee_id: &str) -> AppResult<Option<UserAccount>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    employee_id,
                    employee_name,
                    password_hash,
                    role,
                    sector,
                    job_title,
                    first_time_login,
                    created_at,
                    updated_at
                FROM users
                WHERE employee_id = :employee_id
            "#,
        )?;

        let row = stmt
            .query_row(named_params! {":employee_id": employee_id}, |row| {
                UserRow::try_from(row)
            })
            .optional()?;

        row.map(UserRow::into_account).transpose()
    }

    pub fn update_password(
        conn: &Connection,
        employee_id: &str,
        password_hash: &str,
    ) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE users SET
                    password_hash = :password_hash,
                    first_time_login = 0,
                    updated_at = CURRENT_TIMESTAMP
                WHERE employee_id = :employee_id
            "#,
            named_params! {
                ":employee_id": employee_id,
                ":password_hash": password_hash,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    pub fn count(conn: &Connection) -> AppResult<i64> {
        let total = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(total)
    }
}
