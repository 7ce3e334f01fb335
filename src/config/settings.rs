//! Runtime settings read from the environment.
//!
//! Values are usually provided through a `.env` file loaded at startup. Every
//! setting has a default so the tracker runs without any configuration.

use std::path::PathBuf;

/// Default `SQLite` database location, created on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/portfolio_tracker.sqlite?mode=rwc";
/// Default location of the portfolio seed file.
pub const DEFAULT_PORTFOLIO_CONFIG: &str = "config.toml";

/// Settings needed to boot the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `SeaORM` connection string (`DATABASE_URL`)
    pub database_url: String,
    /// Path of the TOML portfolio seed file (`PORTFOLIO_CONFIG`)
    pub portfolio_config: PathBuf,
}

impl Settings {
    /// Reads settings from the process environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            database_url: non_empty("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            portfolio_config: non_empty("PORTFOLIO_CONFIG")
                .map_or_else(|| PathBuf::from(DEFAULT_PORTFOLIO_CONFIG), PathBuf::from),
        }
    }
}
