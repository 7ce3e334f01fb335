//! Valuation engine - turns a ledger and a quote into a portfolio snapshot.
//!
//! Everything in this module is pure computation over data already loaded from the
//! database. The snapshot is always computed from the complete transaction set;
//! nothing is carried over between calls. Money and units are plain `f64` and no
//! rounding happens here.

use crate::{
    core::{quote::Quote, report::calculate_return_percentage, units::total_units},
    entities::{InvestmentType, transaction},
};
use serde::Serialize;

/// Derived valuation fields stored on a portfolio.
///
/// All fields are replaced together on every recompute.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ValuationSnapshot {
    /// Marked-to-market value, or net invested when no quote applies
    pub current_value: f64,
    /// Deposits minus withdrawals
    pub total_invested: f64,
    /// `current_value - total_invested`
    pub total_return: f64,
    /// `total_return / total_invested * 100`, or 0 when nothing is invested
    pub return_percentage: f64,
    /// Number of transactions in the ledger
    pub transaction_count: i64,
    /// Net units for mutual fund and stock portfolios, 0 otherwise
    pub total_units: f64,
}

impl ValuationSnapshot {
    /// Snapshot of a portfolio with an empty ledger.
    pub const EMPTY: Self = Self {
        current_value: 0.0,
        total_invested: 0.0,
        total_return: 0.0,
        return_percentage: 0.0,
        transaction_count: 0,
        total_units: 0.0,
    };
}

/// Sum of deposit amounts minus sum of withdrawal amounts.
#[must_use]
pub fn net_invested(transactions: &[transaction::Model]) -> f64 {
    transactions
        .iter()
        .map(transaction::Model::signed_amount)
        .sum()
}

/// Computes the valuation snapshot for one portfolio.
///
/// `quote` is the latest market quote stored for the portfolio, if any. Quotes are
/// only read for mutual fund (NAV) and stock (price and FX rate) portfolios, and
/// only when every price component is positive. Otherwise the holdings are valued
/// at cost.
#[must_use]
pub fn compute_snapshot(
    investment_type: InvestmentType,
    transactions: &[transaction::Model],
    quote: Option<Quote>,
) -> ValuationSnapshot {
    let total_invested = net_invested(transactions);

    let (current_value, units) = match investment_type {
        InvestmentType::MutualFund => {
            let units = total_units(transactions);
            let value = match quote {
                Some(Quote::Nav { nav_per_unit }) if nav_per_unit > 0.0 => units * nav_per_unit,
                _ => total_invested,
            };
            (value, units)
        }
        InvestmentType::Stock => {
            let units = total_units(transactions);
            let value = match quote {
                Some(Quote::Stock {
                    price_usd,
                    exchange_rate,
                }) if price_usd > 0.0 && exchange_rate > 0.0 => units * price_usd * exchange_rate,
                _ => total_invested,
            };
            (value, units)
        }
        InvestmentType::Cooperative | InvestmentType::Pvd | InvestmentType::Savings => {
            (total_invested, 0.0)
        }
    };

    let total_return = current_value - total_invested;

    ValuationSnapshot {
        current_value,
        total_invested,
        total_return,
        return_percentage: calculate_return_percentage(total_return, total_invested),
        transaction_count: i64::try_from(transactions.len()).unwrap_or(i64::MAX),
        total_units: units,
    }
}
