//! Report generation business logic.
//!
//! This module provides return and goal calculations plus per-portfolio and
//! per-user summaries. All functions return structured data; formatting is left to
//! whatever front end consumes them.

use crate::{
    entities::{InvestmentType, portfolio, transaction},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// A single portfolio with its recent ledger activity.
#[derive(Debug, Clone)]
pub struct PortfolioReport {
    /// The portfolio being reported on, including its current snapshot
    pub portfolio: portfolio::Model,
    /// Progress towards `target_amount` in percent, if a target is set
    pub target_progress: Option<f64>,
    /// Amount still missing to reach the target, if a target is set
    pub amount_to_target: Option<f64>,
    /// Most recent transactions, newest first
    pub recent_transactions: Vec<transaction::Model>,
}

/// Value held in one investment type across a user's portfolios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAllocation {
    /// Investment category
    pub investment_type: InvestmentType,
    /// Sum of `current_value` over portfolios of this type
    pub current_value: f64,
    /// Share of the user's total current value, in percent
    pub share_percentage: f64,
}

/// Totals across all portfolios of one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    /// Number of portfolios included
    pub portfolio_count: usize,
    /// Sum of current values
    pub total_current_value: f64,
    /// Sum of net invested amounts
    pub total_invested: f64,
    /// `total_current_value - total_invested`
    pub total_return: f64,
    /// Overall return in percent, 0 when nothing is invested
    pub return_percentage: f64,
    /// Breakdown by investment type, only types the user holds, largest first
    pub allocations: Vec<TypeAllocation>,
}

/// Return relative to the invested amount, in percent.
///
/// Returns 0 when `total_invested` is zero or negative, so the result is never
/// NaN or infinite for finite inputs.
#[must_use]
pub fn calculate_return_percentage(total_return: f64, total_invested: f64) -> f64 {
    if total_invested > 0.0 {
        (total_return / total_invested) * 100.0
    } else {
        0.0
    }
}

/// Progress towards a savings goal in percent.
///
/// Returns `None` when no positive target is set. Values above 100 mean the
/// target has been exceeded.
#[must_use]
pub fn calculate_target_progress(current_value: f64, target_amount: Option<f64>) -> Option<f64> {
    target_amount
        .filter(|target| *target > 0.0)
        .map(|target| (current_value / target) * 100.0)
}

/// Generates a report for a specific portfolio.
///
/// # Arguments
/// * `db` - Database connection
/// * `portfolio_id` - ID of the portfolio to report on
/// * `transaction_limit` - Maximum number of recent transactions to include (default 10)
pub async fn generate_portfolio_report(
    db: &DatabaseConnection,
    portfolio_id: i64,
    transaction_limit: Option<usize>,
) -> Result<PortfolioReport> {
    let portfolio = crate::core::portfolio::get_portfolio_by_id(db, portfolio_id)
        .await?
        .ok_or(Error::PortfolioNotFound { id: portfolio_id })?;

    let limit = transaction_limit.unwrap_or(10);
    let recent_transactions: Vec<transaction::Model> =
        crate::core::transaction::get_transactions_for_portfolio(db, portfolio_id)
            .await?
            .into_iter()
            .take(limit)
            .collect();

    let target_progress = calculate_target_progress(portfolio.current_value, portfolio.target_amount);
    let amount_to_target = portfolio
        .target_amount
        .map(|target| (target - portfolio.current_value).max(0.0));

    Ok(PortfolioReport {
        portfolio,
        target_progress,
        amount_to_target,
        recent_transactions,
    })
}

/// Aggregates the stored snapshots of every portfolio owned by `user_id`.
pub async fn summarize_user_portfolios(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<PortfolioSummary> {
    let portfolios = crate::core::portfolio::get_portfolios_for_user(db, user_id).await?;
    Ok(summarize(&portfolios))
}

/// Aggregates already loaded portfolios.
#[must_use]
pub fn summarize(portfolios: &[portfolio::Model]) -> PortfolioSummary {
    let total_current_value: f64 = portfolios.iter().map(|p| p.current_value).sum();
    let total_invested: f64 = portfolios.iter().map(|p| p.total_invested).sum();
    let total_return = total_current_value - total_invested;

    let mut allocations: Vec<TypeAllocation> = Vec::new();
    for portfolio in portfolios {
        match allocations
            .iter_mut()
            .find(|a| a.investment_type == portfolio.investment_type)
        {
            Some(allocation) => allocation.current_value += portfolio.current_value,
            None => allocations.push(TypeAllocation {
                investment_type: portfolio.investment_type,
                current_value: portfolio.current_value,
                share_percentage: 0.0,
            }),
        }
    }
    for allocation in &mut allocations {
        allocation.share_percentage = if total_current_value > 0.0 {
            (allocation.current_value / total_current_value) * 100.0
        } else {
            0.0
        };
    }
    allocations.sort_by(|a, b| b.current_value.total_cmp(&a.current_value));

    PortfolioSummary {
        portfolio_count: portfolios.len(),
        total_current_value,
        total_invested,
        total_return,
        return_percentage: calculate_return_percentage(total_return, total_invested),
        allocations,
    }
}
