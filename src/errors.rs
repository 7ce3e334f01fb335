//! Unified error type for the portfolio tracker.
//!
//! Every fallible operation in the crate returns [`Result`]. Database failures are
//! wrapped from `SeaORM`, everything else is a domain error raised at the ledger,
//! quote, or portfolio boundary.

use crate::entities::InvestmentType;
use thiserror::Error;

/// Errors raised by portfolio, ledger, quote, and recalculation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Filesystem failure while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Referenced portfolio does not exist
    #[error("Portfolio not found: {id}")]
    PortfolioNotFound {
        /// Requested portfolio id
        id: i64,
    },

    /// Referenced transaction does not exist
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Requested transaction id
        id: i64,
    },

    /// Transaction amount is zero, negative, or not finite
    #[error("Invalid amount: {amount}. Amount must be a positive, finite number")]
    InvalidAmount {
        /// Rejected amount
        amount: f64,
    },

    /// A numeric field of a transaction detail payload is out of range
    #[error("Invalid detail field `{field}`: {value}")]
    InvalidDetail {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Amount of a mutual fund or stock entry disagrees with its units and prices
    #[error("Amount {amount} does not match the {implied} implied by units and prices")]
    AmountMismatch {
        /// Stated amount
        amount: f64,
        /// `units * price` (fund) or the THB purchase value (stock)
        implied: f64,
    },

    /// An amount was requested from a detail payload that carries no price
    #[error("{} details carry no price to derive an amount from", investment_type.as_str())]
    UnpricedDetail {
        /// The payload's investment type
        investment_type: InvestmentType,
    },

    /// Portfolio savings goal is zero, negative, or not finite
    #[error("Invalid target amount: {amount}. Target must be a positive, finite number")]
    InvalidTarget {
        /// Rejected target
        amount: f64,
    },

    /// A quote value is zero, negative, or not finite
    #[error("Invalid quote field `{field}`: {value}")]
    InvalidQuote {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// A date string could not be coerced to a calendar date
    #[error("Invalid date: {value}")]
    InvalidDate {
        /// Rejected input
        value: String,
    },

    /// Portfolio name is empty after trimming
    #[error("Portfolio name cannot be empty")]
    InvalidName,

    /// Transaction detail payload does not belong to the portfolio's investment type
    #[error(
        "Detail for {} cannot be recorded on a {} portfolio",
        found.as_str(),
        expected.as_str()
    )]
    DetailMismatch {
        /// The portfolio's investment type
        expected: InvestmentType,
        /// The detail payload's investment type
        found: InvestmentType,
    },

    /// Quote update on an investment type that has no market price
    #[error("{} portfolios do not accept this quote", investment_type.as_str())]
    QuoteNotSupported {
        /// The portfolio's investment type
        investment_type: InvestmentType,
    },

    /// The snapshot changed between read and write-back
    #[error("Portfolio {portfolio_id} was modified concurrently, retry the operation")]
    ConcurrentModification {
        /// Portfolio whose snapshot write was rejected
        portfolio_id: i64,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
