use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::error::AppResult;

const USER_VERSION: i32 = 2;

#[derive(Debug)]
pub struct MigrationInfo {
    pub version: i32,
    pub description: String,
    pub applied_at: DateTime<Utc>,
}

/// Version recorded in `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> AppResult<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

pub fn run(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migration_history (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL,
            rollback_sql TEXT
        );
        "#,
    )?;

    let mut current_version = schema_version(conn)?;

    if current_version < 1 {
        info!(target: "app::db", version = current_version, "running migration v1");
        migrate_to_v1(conn)?;
        current_version = 1;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(
            conn,
            1,
            "One punch record per employee per day",
            Some("DROP INDEX IF EXISTS idx_punch_records_employee_date;"),
        )?;
    }

    if current_version < 2 {
        info!(target: "app::db", version = current_version, "running migration v2");
        migrate_to_v2(conn)?;
        current_version = 2;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(
            conn,
            2,
            "Closed punch records are immutable",
            Some("DROP TRIGGER IF EXISTS trg_punch_records_closed_immutable;"),
        )?;
    }

    if current_version != USER_VERSION {
        conn.execute(&format!("PRAGMA user_version = {}", USER_VERSION), [])?;
    }

    Ok(())
}

fn record_migration(
    conn: &Connection,
    version: i32,
    description: &str,
    rollback_sql: Option<&str>,
) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO migration_history (version, description, applied_at, rollback_sql) VALUES (?, ?, ?, ?)",
        (version, description, now, rollback_sql),
    )?;
    Ok(())
}

pub fn rollback_to_version(conn: &Connection, target_version: i32) -> AppResult<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if target_version >= current_version {
        warn!(
            target: "app::db",
            "Target version {} is not less than current version {}", target_version, current_version
        );
        return Ok(());
    }

    let mut stmt = conn.prepare(
        "SELECT version, rollback_sql FROM migration_history WHERE version > ? ORDER BY version DESC",
    )?;

    let rollback_iter = stmt.query_map([target_version], |row| {
        Ok((row.get::<_, i32>(0)?, row.get::<_, Option<String>>(1)?))
    })?;

    for rollback_result in rollback_iter {
        let (version, rollback_sql) = rollback_result?;
        if let Some(sql) = rollback_sql {
            info!(target: "app::db", "Rolling back migration v{}", version);
            conn.execute_batch(&sql)?;
        } else {
            warn!(target: "app::db", "No rollback script available for migration v{}", version);
        }
    }

    conn.execute(&format!("PRAGMA user_version = {}", target_version), [])?;
    conn.execute("DELETE FROM migration_history WHERE version > ?", [target_version])?;

    Ok(())
}

pub fn get_migration_history(conn: &Connection) -> AppResult<Vec<MigrationInfo>> {
    let mut stmt = conn.prepare(
        "SELECT version, description, applied_at FROM migration_history ORDER BY version",
    )?;

    let migration_iter = stmt.query_map([], |row| {
        let applied_at_str: String = row.get(2)?;
        let applied_at = DateTime::parse_from_rfc3339(&applied_at_str)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    2,
                    "applied_at".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?
            .with_timezone(&Utc);

        Ok(MigrationInfo {
            version: row.get(0)?,
            description: row.get(1)?,
            applied_at,
        })
    })?;

    let mut migrations = Vec::new();
    for migration in migration_iter {
        migrations.push(migration?);
    }
    Ok(migrations)
}

fn migrate_to_v1(conn: &Connection) -> AppResult<()> {
    // A day holds one record, so a second punch-in for the same day loses
    // at the index no matter how the two requests interleave.
    conn.execute_batch(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_punch_records_employee_date
            ON punch_records(employee_id, date);
        "#,
    )?;
    Ok(())
}

fn migrate_to_v2(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TRIGGER IF NOT EXISTS trg_punch_records_closed_immutable
        BEFORE UPDATE ON punch_records
        FOR EACH ROW
        WHEN OLD.exit_time IS NOT NULL
        BEGIN
            SELECT RAISE(ABORT, 'closed punch record is immutable');
        END;
        "#,
    )?;
    Ok(())
}
