//! Read-side totals over a window of punch records.
//!
//! Dashboards, the personal report and the printable sheet all total hours
//! through these functions.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::punch::PunchRecord;
use crate::models::timesheet::EmployeeTotal;

// Stored hours carry two decimals; summing whole hundredths keeps the
// result independent of record order.
fn to_hundredths(hours: f64) -> i64 {
    (hours * 100.0).round() as i64
}

fn from_hundredths(hundredths: i64) -> f64 {
    hundredths as f64 / 100.0
}

fn sum_hours<'a>(records: impl Iterator<Item = &'a PunchRecord>) -> f64 {
    let hundredths = records
        .filter_map(|record| record.total_hours)
        .map(to_hundredths)
        .sum();
    from_hundredths(hundredths)
}

/// Closed-shift hours for one employee; open shifts add nothing.
pub fn total_hours_for(employee_id: &str, records: &[PunchRecord]) -> f64 {
    sum_hours(
        records
            .iter()
            .filter(|record| record.employee_id == employee_id),
    )
}

/// Totals keyed by employee id, covering only employees present in `records`.
pub fn per_employee_totals(records: &[PunchRecord]) -> BTreeMap<String, EmployeeTotal> {
    let mut grouped: BTreeMap<&str, Vec<&PunchRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.employee_id.as_str())
            .or_default()
            .push(record);
    }

    grouped
        .into_iter()
        .map(|(employee_id, members)| {
            let employee_name = members
                .first()
                .map(|record| record.employee_name.clone())
                .unwrap_or_default();
            let total = EmployeeTotal {
                employee_id: employee_id.to_string(),
                employee_name,
                total_hours: sum_hours(members.into_iter()),
            };
            (employee_id.to_string(), total)
        })
        .collect()
}

/// Day lookup used when laying records onto a calendar.
pub fn records_by_day<'a>(
    employee_id: &str,
    records: &'a [PunchRecord],
) -> BTreeMap<NaiveDate, &'a PunchRecord> {
    records
        .iter()
        .filter(|record| record.employee_id == employee_id)
        .map(|record| (record.date, record))
        .collect()
}
