//! Market quotes entered by the user.
//!
//! A portfolio keeps only its latest quote: NAV per unit for mutual funds, price
//! per share in USD plus the THB/USD rate for stocks. Updating a quote overwrites
//! the stored value and recalculates the portfolio before the change is committed.

use crate::{
    core::recalculate::recalculate_within,
    entities::{InvestmentType, Portfolio, portfolio},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Latest market price for a unit-denominated portfolio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Quote {
    /// Mutual fund net asset value per unit
    Nav {
        /// THB per unit
        nav_per_unit: f64,
    },
    /// Stock price and conversion rate
    Stock {
        /// USD per share
        price_usd: f64,
        /// THB per USD
        exchange_rate: f64,
    },
}

/// Returns the quote stored on `portfolio`, if its type has one and it was ever set.
#[must_use]
pub const fn current_quote(portfolio: &portfolio::Model) -> Option<Quote> {
    match portfolio.investment_type {
        InvestmentType::MutualFund => match portfolio.current_nav_per_unit {
            Some(nav_per_unit) => Some(Quote::Nav { nav_per_unit }),
            None => None,
        },
        InvestmentType::Stock => {
            match (
                portfolio.current_stock_price_usd,
                portfolio.current_exchange_rate,
            ) {
                (Some(price_usd), Some(exchange_rate)) => Some(Quote::Stock {
                    price_usd,
                    exchange_rate,
                }),
                _ => None,
            }
        }
        InvestmentType::Cooperative | InvestmentType::Pvd | InvestmentType::Savings => None,
    }
}

/// Sets the NAV per unit of a mutual fund portfolio and revalues it.
#[instrument(skip(db))]
pub async fn update_nav(
    db: &DatabaseConnection,
    portfolio_id: i64,
    nav_per_unit: f64,
) -> Result<portfolio::Model> {
    check_price("nav_per_unit", nav_per_unit)?;

    let txn = db.begin().await?;

    let mut portfolio: portfolio::ActiveModel =
        load_quoted_portfolio(&txn, portfolio_id, InvestmentType::MutualFund)
            .await?
            .into();
    portfolio.current_nav_per_unit = Set(Some(nav_per_unit));
    portfolio.updated_at = Set(chrono::Utc::now());
    portfolio.update(&txn).await?;

    let updated = recalculate_within(&txn, portfolio_id).await?;
    txn.commit().await?;

    info!(portfolio_id, nav_per_unit, "NAV updated");
    Ok(updated)
}

/// Sets the USD share price and THB/USD rate of a stock portfolio and revalues it.
#[instrument(skip(db))]
pub async fn update_stock_price(
    db: &DatabaseConnection,
    portfolio_id: i64,
    price_usd: f64,
    exchange_rate: f64,
) -> Result<portfolio::Model> {
    check_price("price_usd", price_usd)?;
    check_price("exchange_rate", exchange_rate)?;

    let txn = db.begin().await?;

    let mut portfolio: portfolio::ActiveModel =
        load_quoted_portfolio(&txn, portfolio_id, InvestmentType::Stock)
            .await?
            .into();
    portfolio.current_stock_price_usd = Set(Some(price_usd));
    portfolio.current_exchange_rate = Set(Some(exchange_rate));
    portfolio.updated_at = Set(chrono::Utc::now());
    portfolio.update(&txn).await?;

    let updated = recalculate_within(&txn, portfolio_id).await?;
    txn.commit().await?;

    info!(portfolio_id, price_usd, exchange_rate, "Stock price updated");
    Ok(updated)
}

async fn load_quoted_portfolio<C>(
    conn: &C,
    portfolio_id: i64,
    expected: InvestmentType,
) -> Result<portfolio::Model>
where
    C: ConnectionTrait,
{
    let portfolio = Portfolio::find_by_id(portfolio_id)
        .one(conn)
        .await?
        .ok_or(Error::PortfolioNotFound { id: portfolio_id })?;

    if portfolio.investment_type != expected {
        return Err(Error::QuoteNotSupported {
            investment_type: portfolio.investment_type,
        });
    }

    Ok(portfolio)
}

fn check_price(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidQuote { field, value })
    }
}
