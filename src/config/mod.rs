/// Database connection and schema creation
pub mod database;

/// Portfolio seed loading from config.toml
pub mod portfolios;

/// Environment-driven runtime settings
pub mod settings;
