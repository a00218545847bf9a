use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Declared duration class of a shift, fixed at punch-in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ShiftType {
    #[serde(rename = "6h")]
    SixHour,
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl ShiftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::SixHour => "6h",
            ShiftType::TwelveHour => "12h",
            ShiftType::TwentyFourHour => "24h",
        }
    }

    pub fn nominal_hours(&self) -> u32 {
        match self {
            ShiftType::SixHour => 6,
            ShiftType::TwelveHour => 12,
            ShiftType::TwentyFourHour => 24,
        }
    }
}

impl Default for ShiftType {
    fn default() -> Self {
        ShiftType::TwelveHour
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ShiftType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "6h" => Ok(ShiftType::SixHour),
            "12h" => Ok(ShiftType::TwelveHour),
            "24h" => Ok(ShiftType::TwentyFourHour),
            other => Err(format!("unsupported shift type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PunchRecord {
    pub id: i64,
    pub employee_id: String,
    pub employee_name: String,
    pub date: NaiveDate,
    pub entry_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    pub shift_type: ShiftType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
    pub location: GeoLocation,
    pub created_at: String,
    pub updated_at: String,
}

impl PunchRecord {
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }
}

/// Fields written at punch-in.
#[derive(Debug, Clone)]
pub struct PunchInInsert {
    pub employee_id: String,
    pub employee_name: String,
    pub date: NaiveDate,
    pub entry_time: DateTime<Utc>,
    pub shift_type: ShiftType,
    pub location: GeoLocation,
    /// Stamped into `created_at` / `updated_at`.
    pub recorded_at: DateTime<Utc>,
}

/// The only fields a punch-out may set.
#[derive(Debug, Clone)]
pub struct PunchOutUpdate {
    pub exit_time: DateTime<Utc>,
    pub total_hours: f64,
    pub location: GeoLocation,
    pub recorded_at: DateTime<Utc>,
}

/// Where an employee stands for a given calendar day.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ShiftState {
    NoShift,
    #[serde(rename_all = "camelCase")]
    OpenShift {
        date: NaiveDate,
        entry_time: DateTime<Utc>,
        shift_type: ShiftType,
    },
    ClosedShift,
}

impl ShiftState {
    pub fn from_record(record: Option<&PunchRecord>) -> Self {
        match record {
            None => ShiftState::NoShift,
            Some(record) if record.is_open() => ShiftState::OpenShift {
                date: record.date,
                entry_time: record.entry_time,
                shift_type: record.shift_type,
            },
            Some(_) => ShiftState::ClosedShift,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "action", content = "record", rename_all = "camelCase")]
pub enum PunchOutcome {
    PunchedIn(PunchRecord),
    PunchedOut(PunchRecord),
}

impl PunchOutcome {
    pub fn record(&self) -> &PunchRecord {
        match self {
            PunchOutcome::PunchedIn(record) | PunchOutcome::PunchedOut(record) => record,
        }
    }
}
