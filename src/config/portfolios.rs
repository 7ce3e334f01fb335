//! Portfolio seed configuration loaded from a TOML file.
//!
//! Portfolios listed in the file are created on startup when the owning user
//! does not have a portfolio of that name yet. Existing portfolios are never
//! modified by seeding.

use crate::{
    core::portfolio::{NewPortfolio, create_portfolio, get_portfolio_by_name_and_user},
    entities::InvestmentType,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire seed file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// List of portfolios to seed
    #[serde(default)]
    pub portfolios: Vec<PortfolioConfig>,
}

/// Configuration for a single portfolio
#[derive(Debug, Deserialize, Clone)]
pub struct PortfolioConfig {
    /// Owning user
    pub user_id: String,
    /// Name of the portfolio
    pub name: String,
    /// Investment category (`cooperative`, `pvd`, `mutual_fund`, `stock`, `savings`)
    pub investment_type: InvestmentType,
    /// Optional savings goal
    pub target_amount: Option<f64>,
    /// Optional description
    pub description: Option<String>,
    /// Optional display color
    pub color: Option<String>,
}

impl From<PortfolioConfig> for NewPortfolio {
    fn from(config: PortfolioConfig) -> Self {
        Self {
            user_id: config.user_id,
            name: config.name,
            investment_type: config.investment_type,
            target_amount: config.target_amount,
            description: config.description,
            color: config.color,
        }
    }
}

/// Loads portfolio configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing or an investment type is unknown
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    debug!("Loading portfolio configuration from {:?}", path_ref);

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses portfolio configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse portfolio config: {e}"),
    })
}

/// Creates every configured portfolio that does not exist yet.
///
/// Returns the number of portfolios created.
pub async fn seed_portfolios(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let mut created = 0;

    for entry in &config.portfolios {
        if get_portfolio_by_name_and_user(db, &entry.name, &entry.user_id)
            .await?
            .is_some()
        {
            debug!(name = %entry.name, user_id = %entry.user_id, "Portfolio already exists");
            continue;
        }

        create_portfolio(db, entry.clone().into()).await?;
        created += 1;
    }

    info!(created, "Seeded portfolios from configuration");
    Ok(created)
}
