//! School attendance: recording per class, subject and day, and exporting daily sheets, semester
//! rollups and teacher matrices as CSV.

pub mod cli;
pub mod daily;
pub mod display;
pub mod error;
pub mod gateway;
pub mod manager;
pub mod matrix;
pub mod models;
pub mod period;
pub mod render;
pub mod rollup;
pub mod schema;
pub mod settings;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};

use crate::manager::AttendanceManager;
use crate::settings::Settings;

/// Loads the configuration, installs logging and opens the configured database.
pub fn create_default_manager() -> anyhow::Result<(Settings, AttendanceManager)> {
    let settings = Settings::load()?;
    settings::init_tracing(&settings);

    let manager = AttendanceManager::open(&settings.database_url)?;

    Ok((settings, manager))
}
