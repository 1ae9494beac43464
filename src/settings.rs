//! Runtime configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional `config.toml` in the
//! working directory, `ABSENSI_*` environment variables and finally `DATABASE_URL` (also read from
//! `.env`), which is what the diesel CLI uses too.

use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Path of the SQLite database file.
    pub database_url: String,
    /// Where exported CSV files are written.
    pub output_dir: PathBuf,
    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .set_default("database_url", "absensi.sqlite3")?
            .set_default("output_dir", ".")?
            .set_default("log_level", "info")?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("ABSENSI"));

        if let Ok(url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database_url", url)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}

/// Installs the global `tracing` subscriber, logging to stderr so that CSV written to stdout stays
/// clean.
pub fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
