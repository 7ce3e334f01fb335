//! Portfolio business logic - creation, lookup, editing, and removal of portfolios.
//!
//! Only identity and display fields are editable here. The valuation snapshot is
//! owned by `core::recalculate` and the investment type is fixed at creation.

use crate::{
    core::valuation::ValuationSnapshot,
    entities::{InvestmentType, Portfolio, Transaction, portfolio, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Input for [`create_portfolio`].
#[derive(Debug, Clone)]
pub struct NewPortfolio {
    /// Owning user
    pub user_id: String,
    /// Display name, trimmed before storing
    pub name: String,
    /// Investment category
    pub investment_type: InvestmentType,
    /// Optional savings goal, must be positive
    pub target_amount: Option<f64>,
    /// Free-text description
    pub description: Option<String>,
    /// Display color
    pub color: Option<String>,
}

/// Partial update for [`update_portfolio`]. `None` leaves a field unchanged;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct PortfolioPatch {
    /// New display name
    pub name: Option<String>,
    /// New or cleared savings goal
    pub target_amount: Option<Option<f64>>,
    /// New or cleared description
    pub description: Option<Option<String>>,
    /// New or cleared display color
    pub color: Option<Option<String>>,
}

/// Creates a portfolio with an empty valuation snapshot.
#[instrument(skip(db))]
pub async fn create_portfolio(
    db: &DatabaseConnection,
    new_portfolio: NewPortfolio,
) -> Result<portfolio::Model> {
    let name = validated_name(&new_portfolio.name)?;
    validate_target(new_portfolio.target_amount)?;

    let now = chrono::Utc::now();
    let empty = ValuationSnapshot::EMPTY;
    let model = portfolio::ActiveModel {
        user_id: Set(new_portfolio.user_id),
        investment_type: Set(new_portfolio.investment_type),
        name: Set(name),
        target_amount: Set(new_portfolio.target_amount),
        description: Set(new_portfolio.description),
        color: Set(new_portfolio.color),
        current_value: Set(empty.current_value),
        total_invested: Set(empty.total_invested),
        total_return: Set(empty.total_return),
        return_percentage: Set(empty.return_percentage),
        transaction_count: Set(empty.transaction_count),
        total_units: Set(empty.total_units),
        current_nav_per_unit: Set(None),
        current_stock_price_usd: Set(None),
        current_exchange_rate: Set(None),
        snapshot_version: Set(0),
        recalculated_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(portfolio_id = created.id, "Portfolio created");
    Ok(created)
}

/// Finds a portfolio by its unique ID.
pub async fn get_portfolio_by_id(
    db: &DatabaseConnection,
    portfolio_id: i64,
) -> Result<Option<portfolio::Model>> {
    Portfolio::find_by_id(portfolio_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all portfolios of a user, ordered alphabetically by name.
pub async fn get_portfolios_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<portfolio::Model>> {
    Portfolio::find()
        .filter(portfolio::Column::UserId.eq(user_id))
        .order_by_asc(portfolio::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a user's portfolio by name.
pub async fn get_portfolio_by_name_and_user(
    db: &DatabaseConnection,
    name: &str,
    user_id: &str,
) -> Result<Option<portfolio::Model>> {
    Portfolio::find()
        .filter(portfolio::Column::Name.eq(name.trim()))
        .filter(portfolio::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a portfolio's identity and display fields.
#[instrument(skip(db))]
pub async fn update_portfolio(
    db: &DatabaseConnection,
    portfolio_id: i64,
    patch: PortfolioPatch,
) -> Result<portfolio::Model> {
    let mut portfolio: portfolio::ActiveModel = Portfolio::find_by_id(portfolio_id)
        .one(db)
        .await?
        .ok_or(Error::PortfolioNotFound { id: portfolio_id })?
        .into();

    if let Some(name) = patch.name {
        portfolio.name = Set(validated_name(&name)?);
    }
    if let Some(target_amount) = patch.target_amount {
        validate_target(target_amount)?;
        portfolio.target_amount = Set(target_amount);
    }
    if let Some(description) = patch.description {
        portfolio.description = Set(description);
    }
    if let Some(color) = patch.color {
        portfolio.color = Set(color);
    }
    portfolio.updated_at = Set(chrono::Utc::now());

    portfolio.update(db).await.map_err(Into::into)
}

/// Deletes a portfolio together with its whole ledger.
#[instrument(skip(db))]
pub async fn delete_portfolio(db: &DatabaseConnection, portfolio_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let portfolio = Portfolio::find_by_id(portfolio_id)
        .one(&txn)
        .await?
        .ok_or(Error::PortfolioNotFound { id: portfolio_id })?;

    let removed = Transaction::delete_many()
        .filter(transaction::Column::PortfolioId.eq(portfolio_id))
        .exec(&txn)
        .await?;
    portfolio.delete(&txn).await?;

    txn.commit().await?;

    info!(
        portfolio_id,
        transactions_removed = removed.rows_affected,
        "Portfolio deleted"
    );
    Ok(())
}

fn validated_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidName);
    }
    Ok(trimmed.to_string())
}

fn validate_target(target_amount: Option<f64>) -> Result<()> {
    match target_amount {
        Some(amount) if !amount.is_finite() || amount <= 0.0 => {
            Err(Error::InvalidTarget { amount })
        }
        _ => Ok(()),
    }
}
