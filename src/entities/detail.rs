//! Investment-type specific transaction payloads.
//!
//! Each variant carries only the fields that make sense for one investment type.
//! The payload is persisted as a JSON column on the `transactions` table, tagged
//! with the investment type it belongs to.

use super::portfolio::InvestmentType;
use crate::errors::Error;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Largest difference in THB tolerated between a stated amount and the amount
/// implied by units and prices.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Whether two THB amounts agree within [`AMOUNT_TOLERANCE`].
#[must_use]
pub fn amounts_match(stated: f64, implied: f64) -> bool {
    (stated - implied).abs() <= AMOUNT_TOLERANCE
}

/// Detail payload attached to a transaction, one variant per [`InvestmentType`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(tag = "investment_type", rename_all = "snake_case")]
pub enum TransactionDetail {
    /// Monthly cooperative contribution
    Cooperative {
        /// Contribution year
        year: i32,
        /// Month of year, 1-12
        period: u32,
        /// Month label as shown to the user
        month: String,
        /// Running total invested up to and including this entry
        total_invested: f64,
    },
    /// Monthly provident fund contribution
    Pvd {
        /// Contribution year
        year: i32,
        /// Month of year, 1-12
        period: u32,
        /// Month label as shown to the user
        month: String,
        /// Employee share of the contribution
        employee_contribution: f64,
        /// Employer share of the contribution
        employer_contribution: f64,
        /// Contribution rate in percent of salary
        contribution_percentage: f64,
        /// Fund value reported after this contribution
        total_fund_value: f64,
    },
    /// Mutual fund purchase or redemption
    MutualFund {
        /// Fund name
        fund_name: String,
        /// Installment number within the plan
        installment: u32,
        /// Units bought (or sold, for withdrawals)
        units_purchased: f64,
        /// NAV per unit at the time of the trade
        price_per_unit: f64,
    },
    /// Foreign stock purchase or sale
    Stock {
        /// Ticker or company name
        stock_name: String,
        /// Installment number within the plan
        installment: u32,
        /// Shares bought (or sold, for withdrawals)
        units_purchased: f64,
        /// Price per share in USD
        price_per_unit_usd: f64,
        /// THB per USD at the time of the trade
        exchange_rate: f64,
        /// `units_purchased * price_per_unit_usd * exchange_rate`
        purchase_value_thb: f64,
    },
    /// Plain savings entry
    Savings {
        /// Entry year
        year: i32,
        /// Month label as shown to the user
        month: String,
        /// Account balance after this entry
        balance: f64,
    },
}

impl TransactionDetail {
    /// Builds a mutual fund payload.
    #[must_use]
    pub fn mutual_fund(
        fund_name: impl Into<String>,
        installment: u32,
        units_purchased: f64,
        price_per_unit: f64,
    ) -> Self {
        Self::MutualFund {
            fund_name: fund_name.into(),
            installment,
            units_purchased,
            price_per_unit,
        }
    }

    /// Builds a stock payload, deriving the THB purchase value.
    #[must_use]
    pub fn stock(
        stock_name: impl Into<String>,
        installment: u32,
        units_purchased: f64,
        price_per_unit_usd: f64,
        exchange_rate: f64,
    ) -> Self {
        Self::Stock {
            stock_name: stock_name.into(),
            installment,
            units_purchased,
            price_per_unit_usd,
            exchange_rate,
            purchase_value_thb: units_purchased * price_per_unit_usd * exchange_rate,
        }
    }

    /// The investment type this payload belongs to.
    #[must_use]
    pub const fn investment_type(&self) -> InvestmentType {
        match self {
            Self::Cooperative { .. } => InvestmentType::Cooperative,
            Self::Pvd { .. } => InvestmentType::Pvd,
            Self::MutualFund { .. } => InvestmentType::MutualFund,
            Self::Stock { .. } => InvestmentType::Stock,
            Self::Savings { .. } => InvestmentType::Savings,
        }
    }

    /// Units carried by the payload, for unit-denominated types.
    #[must_use]
    pub const fn units_purchased(&self) -> Option<f64> {
        match self {
            Self::MutualFund {
                units_purchased, ..
            }
            | Self::Stock {
                units_purchased, ..
            } => Some(*units_purchased),
            Self::Cooperative { .. } | Self::Pvd { .. } | Self::Savings { .. } => None,
        }
    }

    /// THB amount implied by the payload's units and prices.
    ///
    /// Mutual funds: `units * price`. Stocks: the THB purchase value. Other
    /// types carry no price and return `None`.
    #[must_use]
    pub fn implied_amount(&self) -> Option<f64> {
        match self {
            Self::MutualFund {
                units_purchased,
                price_per_unit,
                ..
            } => Some(units_purchased * price_per_unit),
            Self::Stock {
                purchase_value_thb, ..
            } => Some(*purchase_value_thb),
            Self::Cooperative { .. } | Self::Pvd { .. } | Self::Savings { .. } => None,
        }
    }

    /// Checks the numeric fields of the payload.
    ///
    /// Units, prices, and FX rates must be positive. Running totals and
    /// contributions must be non-negative. Every value must be finite. A stock's
    /// `purchase_value_thb` must equal `units * price_usd * exchange_rate`.
    pub fn validate(&self) -> crate::errors::Result<()> {
        match self {
            Self::Cooperative {
                period,
                total_invested,
                ..
            } => {
                check_period(*period)?;
                non_negative("total_invested", *total_invested)
            }
            Self::Pvd {
                period,
                employee_contribution,
                employer_contribution,
                contribution_percentage,
                total_fund_value,
                ..
            } => {
                check_period(*period)?;
                non_negative("employee_contribution", *employee_contribution)?;
                non_negative("employer_contribution", *employer_contribution)?;
                non_negative("contribution_percentage", *contribution_percentage)?;
                non_negative("total_fund_value", *total_fund_value)
            }
            Self::MutualFund {
                units_purchased,
                price_per_unit,
                ..
            } => {
                positive("units_purchased", *units_purchased)?;
                positive("price_per_unit", *price_per_unit)
            }
            Self::Stock {
                units_purchased,
                price_per_unit_usd,
                exchange_rate,
                purchase_value_thb,
                ..
            } => {
                positive("units_purchased", *units_purchased)?;
                positive("price_per_unit_usd", *price_per_unit_usd)?;
                positive("exchange_rate", *exchange_rate)?;
                positive("purchase_value_thb", *purchase_value_thb)?;
                let implied = units_purchased * price_per_unit_usd * exchange_rate;
                if amounts_match(*purchase_value_thb, implied) {
                    Ok(())
                } else {
                    Err(Error::InvalidDetail {
                        field: "purchase_value_thb",
                        value: *purchase_value_thb,
                    })
                }
            }
            Self::Savings { balance, .. } => non_negative("balance", *balance),
        }
    }
}

fn positive(field: &'static str, value: f64) -> crate::errors::Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDetail { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> crate::errors::Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDetail { field, value })
    }
}

fn check_period(period: u32) -> crate::errors::Result<()> {
    if (1..=12).contains(&period) {
        Ok(())
    } else {
        Err(Error::InvalidDetail {
            field: "period",
            value: f64::from(period),
        })
    }
}
