use portfolio_tracker::{
    config::{database, portfolios, settings::Settings},
    core::{recalculate, report},
    errors::Result,
};
use dotenvy::dotenv;
use std::collections::BTreeSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let settings = Settings::from_env();
    info!(?settings, "Loaded settings");

    // 3. Make sure the default data directory exists for file-backed SQLite
    if settings.database_url.starts_with("sqlite://data/") {
        std::fs::create_dir_all("data")?;
    }

    // 4. Connect and create tables
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed portfolios from the config file, if there is one
    let seed = if settings.portfolio_config.exists() {
        portfolios::load_config(&settings.portfolio_config)?
    } else {
        warn!(
            path = %settings.portfolio_config.display(),
            "No portfolio config found, skipping seeding"
        );
        portfolios::Config::default()
    };
    portfolios::seed_portfolios(&db, &seed).await?;

    // 6. Rebuild every snapshot from its ledger
    recalculate::recalculate_all_portfolios(&db).await?;

    // 7. Log a summary per configured user
    let users: BTreeSet<&str> = seed.portfolios.iter().map(|p| p.user_id.as_str()).collect();
    for user_id in users {
        let summary = report::summarize_user_portfolios(&db, user_id).await?;
        info!(
            user_id,
            portfolios = summary.portfolio_count,
            current_value = summary.total_current_value,
            invested = summary.total_invested,
            return_pct = summary.return_percentage,
            "Portfolio summary"
        );
    }

    Ok(())
}
