//! Core business logic - framework-agnostic portfolio, ledger, quote, and valuation operations.

/// Portfolio creation, lookup, editing, and cascade deletion
pub mod portfolio;
/// Latest market quote per portfolio and the quote update entry points
pub mod quote;
/// Recalculation trigger and snapshot write-back
pub mod recalculate;
/// Return, goal, and cross-portfolio summaries
pub mod report;
/// Ledger operations with validation
pub mod transaction;
/// Unit accumulation for mutual fund and stock portfolios
pub mod units;
/// Pure valuation of a ledger against a quote
pub mod valuation;
