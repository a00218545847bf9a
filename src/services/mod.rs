pub mod auth_service;
pub mod clock;
pub mod geolocation;
pub mod monthly_aggregator;
pub mod report_service;
pub mod session_store;
pub mod settings_service;
pub mod shift_clock;
pub mod timesheet_calendar;
