use std::convert::TryFrom;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{ffi, named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::punch::{GeoLocation, PunchInInsert, PunchOutUpdate, PunchRecord, ShiftType};

const DATE_FORMAT: &str = "%Y-%m-%d";

const BASE_SELECT: &str = r#"
    SELECT
        id,
        employee_id,
        employee_name,
        date,
        entry_time,
        exit_time,
        shift_type,
        total_hours,
        latitude,
        longitude,
        created_at,
        updated_at
    FROM punch_records
"#;

#[derive(Debug, Clone)]
pub struct PunchRecordRow {
    pub id: i64,
    pub employee_id: String,
    pub employee_name: String,
    pub date: String,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub shift_type: String,
    pub total_hours: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl PunchRecordRow {
    pub fn into_record(self) -> AppResult<PunchRecord> {
        let shift_type =
            ShiftType::try_from(self.shift_type.as_str()).map_err(AppError::validation)?;
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|err| AppError::validation(format!("invalid stored date {}: {err}", self.date)))?;
        let entry_time = parse_timestamp(&self.entry_time)?;
        let exit_time = match self.exit_time.as_deref() {
            Some(raw) => Some(parse_timestamp(raw)?),
            None => None,
        };
        Ok(PunchRecord {
            id: self.id,
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            date,
            entry_time,
            exit_time,
            shift_type,
            total_hours: self.total_hours,
            location: GeoLocation::new(self.latitude, self.longitude),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for PunchRecordRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            employee_id: row.get("employee_id")?,
            employee_name: row.get("employee_name")?,
            date: row.get("date")?,
            entry_time: row.get("entry_time")?,
            exit_time: row.get("exit_time")?,
            shift_type: row.get("shift_type")?,
            total_hours: row.get("total_hours")?,
            latitude: row.get("latitude")?,
            longitude: row.get("longitude")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Fixed-width UTC form, so stored timestamps order correctly as text.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| AppError::validation(format!("invalid stored timestamp {value}: {err}")))
}

pub struct PunchRepository;

impl PunchRepository {
    /// Inserts a fresh open record. Losing the race against another punch-in
    /// for the same day surfaces as `DuplicatePunchIn`; other constraint
    /// failures stay `Conflict`.
    pub fn insert(conn: &Connection, insert: &PunchInInsert) -> AppResult<i64> {
        let now = format_timestamp(insert.recorded_at);
        let result = conn.execute(
            r#"
                INSERT INTO punch_records (
                    employee_id,
                    employee_name,
                    date,
                    entry_time,
                    shift_type,
                    latitude,
                    longitude,
                    created_at,
                    updated_at
                ) VALUES (
                    :employee_id,
                    :employee_name,
                    :date,
                    :entry_time,
                    :shift_type,
                    :latitude,
                    :longitude,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":employee_id": &insert.employee_id,
                ":employee_name": &insert.employee_name,
                ":date": format_date(insert.date),
                ":entry_time": format_timestamp(insert.entry_time),
                ":shift_type": insert.shift_type.as_str(),
                ":latitude": insert.location.latitude,
                ":longitude": insert.location.longitude,
                ":created_at": &now,
                ":updated_at": &now,
            },
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(AppError::duplicate_punch_in(
                    insert.employee_id.clone(),
                    insert.date,
                ))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<PunchRecord> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = :id"))?;

        let row = stmt
            .query_row(named_params! {":id": id}, |row| PunchRecordRow::try_from(row))
            .optional()?;

        match row {
            Some(row) => row.into_record(),
            None => Err(AppError::not_found()),
        }
    }

    pub fn find_by_employee_and_date(
        conn: &Connection,
        employee_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<PunchRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{BASE_SELECT} WHERE employee_id = :employee_id AND date = :date"
        ))?;

        let row = stmt
            .query_row(
                named_params! {
                    ":employee_id": employee_id,
                    ":date": format_date(date),
                },
                |row| PunchRecordRow::try_from(row),
            )
            .optional()?;

        row.map(PunchRecordRow::into_record).transpose()
    }

    /// All employees, `start..=end`, newest day first.
    pub fn list_in_range(
        conn: &Connection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<PunchRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{BASE_SELECT} WHERE date >= :start AND date <= :end ORDER BY date DESC, employee_id ASC"
        ))?;

        let records = stmt
            .query_map(
                named_params! {
                    ":start": format_date(start),
                    ":end": format_date(end),
                },
                |row| PunchRecordRow::try_from(row),
            )?
            .map(|row| row.map_err(AppError::from).and_then(|row| row.into_record()))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }

    /// One employee, `start..=end`, oldest day first.
    pub fn list_for_employee_in_range(
        conn: &Connection,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<PunchRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{BASE_SELECT} WHERE employee_id = :employee_id AND date >= :start AND date <= :end ORDER BY date ASC"
        ))?;

        let records = stmt
            .query_map(
                named_params! {
                    ":employee_id": employee_id,
                    ":start": format_date(start),
                    ":end": format_date(end),
                },
                |row| PunchRecordRow::try_from(row),
            )?
            .map(|row| row.map_err(AppError::from).and_then(|row| row.into_record()))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }

    /// Conditional close: only touches the row while it is still open.
    /// Returns `false` when nothing was updated.
    pub fn close_shift(conn: &Connection, id: i64, update: &PunchOutUpdate) -> AppResult<bool> {
        let affected = conn.execute(
            r#"
                UPDATE punch_records SET
                    exit_time = :exit_time,
                    total_hours = :total_hours,
                    latitude = :latitude,
                    longitude = :longitude,
                    updated_at = :updated_at
                WHERE id = :id AND exit_time IS NULL
            "#,
            named_params! {
                ":id": id,
                ":exit_time": format_timestamp(update.exit_time),
                ":total_hours": update.total_hours,
                ":latitude": update.location.latitude,
                ":longitude": update.location.longitude,
                ":updated_at": format_timestamp(update.recorded_at),
            },
        )?;

        Ok(affected > 0)
    }

    pub fn count(conn: &Connection) -> AppResult<i64> {
        let total = conn.query_row("SELECT COUNT(*) FROM punch_records", [], |row| row.get(0))?;
        Ok(total)
    }
}
