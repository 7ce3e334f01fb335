//! Recalculation trigger - keeps each portfolio's snapshot in step with its ledger.
//!
//! Every ledger mutation and quote update ends with a call to [`recalculate_within`]
//! on the same database transaction, so the mutation and the new snapshot commit
//! together or not at all. The snapshot is always rebuilt from the full ledger.
//!
//! The write-back is a compare-and-swap on `snapshot_version`: if another writer
//! replaced the snapshot between our read and our write, nothing is written and
//! [`Error::ConcurrentModification`] is returned.

use crate::{
    core::{
        quote::current_quote,
        valuation::{ValuationSnapshot, compute_snapshot},
    },
    entities::{Portfolio, Transaction, portfolio, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument, warn};

/// Recomputes and stores the valuation snapshot of one portfolio.
///
/// This is the single entry point for revaluing a portfolio outside of a ledger or
/// quote mutation, e.g. after a repair or data import.
pub async fn recalculate_portfolio(
    db: &DatabaseConnection,
    portfolio_id: i64,
) -> Result<portfolio::Model> {
    let txn = db.begin().await?;
    let updated = recalculate_within(&txn, portfolio_id).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Recomputes every portfolio in the database, returning how many were updated.
pub async fn recalculate_all_portfolios(db: &DatabaseConnection) -> Result<usize> {
    let ids: Vec<i64> = Portfolio::find()
        .select_only()
        .column(portfolio::Column::Id)
        .order_by_asc(portfolio::Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    for portfolio_id in &ids {
        recalculate_portfolio(db, *portfolio_id).await?;
    }

    info!(count = ids.len(), "Recalculated all portfolios");
    Ok(ids.len())
}

/// Reads the full ledger and current quote of a portfolio, recomputes the snapshot,
/// and writes it back on `conn`.
#[instrument(skip(conn))]
pub(crate) async fn recalculate_within<C>(conn: &C, portfolio_id: i64) -> Result<portfolio::Model>
where
    C: ConnectionTrait,
{
    let portfolio = Portfolio::find_by_id(portfolio_id)
        .one(conn)
        .await?
        .ok_or(Error::PortfolioNotFound { id: portfolio_id })?;

    let transactions = Transaction::find()
        .filter(transaction::Column::PortfolioId.eq(portfolio_id))
        .all(conn)
        .await?;

    let snapshot = compute_snapshot(
        portfolio.investment_type,
        &transactions,
        current_quote(&portfolio),
    );
    debug!(?snapshot, "Computed valuation snapshot");

    write_snapshot(conn, &portfolio, &snapshot).await
}

/// Replaces every snapshot column of `portfolio` in one statement.
///
/// The update only matches while `snapshot_version` still equals the version that
/// was read, and bumps it on success.
async fn write_snapshot<C>(
    conn: &C,
    portfolio: &portfolio::Model,
    snapshot: &ValuationSnapshot,
) -> Result<portfolio::Model>
where
    C: ConnectionTrait,
{
    let result = Portfolio::update_many()
        .col_expr(
            portfolio::Column::CurrentValue,
            Expr::value(snapshot.current_value),
        )
        .col_expr(
            portfolio::Column::TotalInvested,
            Expr::value(snapshot.total_invested),
        )
        .col_expr(
            portfolio::Column::TotalReturn,
            Expr::value(snapshot.total_return),
        )
        .col_expr(
            portfolio::Column::ReturnPercentage,
            Expr::value(snapshot.return_percentage),
        )
        .col_expr(
            portfolio::Column::TransactionCount,
            Expr::value(snapshot.transaction_count),
        )
        .col_expr(
            portfolio::Column::TotalUnits,
            Expr::value(snapshot.total_units),
        )
        .col_expr(
            portfolio::Column::SnapshotVersion,
            Expr::value(portfolio.snapshot_version + 1),
        )
        .col_expr(
            portfolio::Column::RecalculatedAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(portfolio::Column::Id.eq(portfolio.id))
        .filter(portfolio::Column::SnapshotVersion.eq(portfolio.snapshot_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        warn!(
            portfolio_id = portfolio.id,
            version = portfolio.snapshot_version,
            "Snapshot write lost a race"
        );
        return Err(Error::ConcurrentModification {
            portfolio_id: portfolio.id,
        });
    }

    Portfolio::find_by_id(portfolio.id)
        .one(conn)
        .await?
        .ok_or(Error::PortfolioNotFound { id: portfolio.id })
}
