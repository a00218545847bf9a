pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::commands::AppState;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::services::clock::SystemClock;
use crate::services::geolocation::LocationProvider;

const DATABASE_FILE: &str = "ward-timeclock.sqlite";
const SESSION_FILE: &str = "session.json";

/// Wires logging, the record store and the services under `data_dir`.
pub fn bootstrap(data_dir: &Path, locator: Arc<dyn LocationProvider>) -> AppResult<AppState> {
    std::fs::create_dir_all(data_dir)?;
    crate::utils::logger::init_logging(&data_dir.join("logs"))?;

    let pool = DbPool::new(data_dir.join(DATABASE_FILE))?;
    let state = AppState::new(
        pool,
        data_dir.join(SESSION_FILE),
        Arc::new(SystemClock),
        locator,
    );

    info!(target: "app::bootstrap", data_dir = %data_dir.display(), "time clock ready");
    Ok(state)
}
