//! Unit accumulation for unit-denominated portfolios.
//!
//! Mutual fund and stock holdings are counted in units. The balance is the sum of
//! deposited units minus the sum of withdrawn units. Entries without a units
//! figure contribute nothing. No validation happens here: a ledger with more
//! withdrawals than deposits yields a negative balance.

use crate::entities::{TransactionDetail, transaction};

/// Returns the net number of units held across `transactions`.
///
/// The result does not depend on the order of the slice.
#[must_use]
pub fn total_units(transactions: &[transaction::Model]) -> f64 {
    transactions.iter().map(units_delta).sum()
}

/// Signed unit change contributed by a single ledger entry.
#[must_use]
pub fn units_delta(transaction: &transaction::Model) -> f64 {
    transaction
        .detail
        .as_ref()
        .and_then(TransactionDetail::units_purchased)
        .map_or(0.0, |units| transaction.kind.sign() * units)
}
