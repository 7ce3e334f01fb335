//! Shared test utilities for the portfolio tracker.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        portfolio::{self, NewPortfolio},
        transaction::{self, NewTransaction},
    },
    entities::{self, InvestmentType, TransactionDetail, TransactionKind},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// User that owns every portfolio created by the helpers below.
pub const TEST_USER: &str = "test_user";

/// Date used for helper-created transactions.
#[must_use]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default()
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Portfolio input with sensible defaults.
///
/// # Defaults
/// * `user_id`: [`TEST_USER`]
/// * `target_amount`, `description`, `color`: None
#[must_use]
pub fn new_test_portfolio(name: &str, investment_type: InvestmentType) -> NewPortfolio {
    NewPortfolio {
        user_id: TEST_USER.to_string(),
        name: name.to_string(),
        investment_type,
        target_amount: None,
        description: None,
        color: None,
    }
}

/// Creates a test portfolio with sensible defaults.
pub async fn create_test_portfolio(
    db: &DatabaseConnection,
    name: &str,
    investment_type: InvestmentType,
) -> Result<entities::portfolio::Model> {
    portfolio::create_portfolio(db, new_test_portfolio(name, investment_type)).await
}

/// Sets up a complete test environment with one portfolio.
/// Returns (db, portfolio) for common test scenarios.
pub async fn setup_with_portfolio(
    investment_type: InvestmentType,
) -> Result<(DatabaseConnection, entities::portfolio::Model)> {
    let db = setup_test_db().await?;
    let portfolio = create_test_portfolio(&db, "Test Portfolio", investment_type).await?;
    Ok((db, portfolio))
}

/// Deposit input without a detail payload, dated [`test_date`].
#[must_use]
pub fn deposit(amount: f64) -> NewTransaction {
    NewTransaction {
        kind: TransactionKind::Deposit,
        amount,
        date: test_date(),
        note: None,
        detail: None,
    }
}

/// Records a plain deposit.
pub async fn create_test_deposit(
    db: &DatabaseConnection,
    portfolio_id: i64,
    amount: f64,
) -> Result<entities::transaction::Model> {
    transaction::create_transaction(db, portfolio_id, deposit(amount)).await
}

/// Records a deposit whose amount is derived from a mutual fund or stock payload.
pub async fn create_priced_deposit(
    db: &DatabaseConnection,
    portfolio_id: i64,
    detail: TransactionDetail,
) -> Result<entities::transaction::Model> {
    let entry = NewTransaction::priced(TransactionKind::Deposit, test_date(), detail)?;
    transaction::create_transaction(db, portfolio_id, entry).await
}

/// In-memory transaction model for pure computations; never persisted.
#[must_use]
pub fn transaction_model(
    kind: TransactionKind,
    amount: f64,
    detail: Option<TransactionDetail>,
) -> entities::transaction::Model {
    let now = chrono::Utc::now();
    entities::transaction::Model {
        id: 0,
        portfolio_id: 0,
        kind,
        amount,
        date: test_date(),
        note: None,
        detail,
        created_at: now,
        updated_at: now,
    }
}
