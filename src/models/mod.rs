pub mod punch;
pub mod settings;
pub mod timesheet;
pub mod user;
