//! Transaction business logic - Handles all ledger operations.
//!
//! This module provides functions for creating, retrieving, updating, and deleting
//! transactions within a portfolio. Every mutation revalues the owning portfolio in
//! the same database transaction, so the stored snapshot always reflects the full
//! ledger. Inputs are validated here: amounts must be positive and finite, detail
//! payloads must be well-formed and belong to the portfolio's investment type, and
//! mutual fund and stock entries must have an amount equal to their units times
//! price.

use crate::{
    core::recalculate::recalculate_within,
    entities::{
        InvestmentType, Portfolio, TransactionDetail, TransactionKind, detail::amounts_match,
        transaction,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Input for [`create_transaction`].
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Deposit or withdrawal
    pub kind: TransactionKind,
    /// Positive amount in THB
    pub amount: f64,
    /// Trade or contribution date
    pub date: NaiveDate,
    /// Optional free-text note
    pub note: Option<String>,
    /// Investment-type specific payload
    pub detail: Option<TransactionDetail>,
}

impl NewTransaction {
    /// Builds an entry whose amount is derived from the detail's units and prices.
    ///
    /// # Errors
    /// Returns [`Error::UnpricedDetail`] for payloads that carry no price
    /// (cooperative, PVD, savings).
    pub fn priced(kind: TransactionKind, date: NaiveDate, detail: TransactionDetail) -> Result<Self> {
        let amount = detail.implied_amount().ok_or(Error::UnpricedDetail {
            investment_type: detail.investment_type(),
        })?;
        Ok(Self {
            kind,
            amount,
            date,
            note: None,
            detail: Some(detail),
        })
    }
}

/// Partial update for [`update_transaction`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    /// New direction
    pub kind: Option<TransactionKind>,
    /// New amount
    pub amount: Option<f64>,
    /// New date, coerced with [`parse_transaction_date`]
    pub date: Option<String>,
    /// New or cleared note
    pub note: Option<Option<String>>,
    /// New or cleared detail payload
    pub detail: Option<Option<TransactionDetail>>,
}

/// Coerces user input to a ledger date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the date in the given offset is
/// kept), and `YYYY-MM-DDTHH:MM:SS[.fff]` without an offset.
pub fn parse_transaction_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }

    Err(Error::InvalidDate {
        value: input.to_string(),
    })
}

/// Records a new transaction and revalues its portfolio.
///
/// # Arguments
/// * `portfolio_id` - The portfolio to record against
/// * `new_transaction` - Direction, amount, date, note, and optional detail payload
#[instrument(skip(db, new_transaction), fields(kind = ?new_transaction.kind, amount = new_transaction.amount))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    portfolio_id: i64,
    new_transaction: NewTransaction,
) -> Result<transaction::Model> {
    validate_amount(new_transaction.amount)?;

    // Use a transaction so the entry and the new snapshot commit together
    let txn = db.begin().await?;

    let portfolio = Portfolio::find_by_id(portfolio_id)
        .one(&txn)
        .await?
        .ok_or(Error::PortfolioNotFound { id: portfolio_id })?;
    validate_detail(
        portfolio.investment_type,
        new_transaction.amount,
        new_transaction.detail.as_ref(),
    )?;

    let now = chrono::Utc::now();
    let transaction_model = transaction::ActiveModel {
        portfolio_id: Set(portfolio_id),
        kind: Set(new_transaction.kind),
        amount: Set(new_transaction.amount),
        date: Set(new_transaction.date),
        note: Set(new_transaction.note),
        detail: Set(new_transaction.detail),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = transaction_model.insert(&txn).await?;

    recalculate_within(&txn, portfolio_id).await?;

    txn.commit().await?;

    info!(portfolio_id, transaction_id = result.id, "Transaction recorded");
    Ok(result)
}

/// Retrieves all transactions of a portfolio, newest date first.
pub async fn get_transactions_for_portfolio(
    db: &DatabaseConnection,
    portfolio_id: i64,
) -> Result<Vec<transaction::Model>> {
    crate::entities::Transaction::find()
        .filter(transaction::Column::PortfolioId.eq(portfolio_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific transaction by its unique ID.
///
/// Returns `None` if the transaction doesn't exist.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    crate::entities::Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Merges `patch` into an existing transaction and revalues its portfolio.
///
/// The merged record is validated as a whole before anything is written. When the
/// patch replaces a mutual fund or stock payload without giving an amount, the
/// amount is re-derived from the new units and prices.
#[instrument(skip(db, patch))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    patch: TransactionPatch,
) -> Result<transaction::Model> {
    let date = patch.date.as_deref().map(parse_transaction_date).transpose()?;

    let txn = db.begin().await?;

    let existing = crate::entities::Transaction::find_by_id(transaction_id)
        .one(&txn)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;
    let portfolio_id = existing.portfolio_id;

    let portfolio = Portfolio::find_by_id(portfolio_id)
        .one(&txn)
        .await?
        .ok_or(Error::PortfolioNotFound { id: portfolio_id })?;

    let detail_patched = patch.detail.is_some();
    let detail = patch.detail.unwrap_or_else(|| existing.detail.clone());
    let amount = match patch.amount {
        Some(amount) => amount,
        None if detail_patched => detail
            .as_ref()
            .and_then(TransactionDetail::implied_amount)
            .unwrap_or(existing.amount),
        None => existing.amount,
    };
    validate_amount(amount)?;
    validate_detail(portfolio.investment_type, amount, detail.as_ref())?;

    let mut active: transaction::ActiveModel = existing.into();
    if let Some(kind) = patch.kind {
        active.kind = Set(kind);
    }
    if let Some(date) = date {
        active.date = Set(date);
    }
    if let Some(note) = patch.note {
        active.note = Set(note);
    }
    active.amount = Set(amount);
    active.detail = Set(detail);
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&txn).await?;
    debug!(?updated, "Transaction merged");

    recalculate_within(&txn, portfolio_id).await?;

    txn.commit().await?;

    info!(portfolio_id, transaction_id, "Transaction updated");
    Ok(updated)
}

/// Deletes a transaction and revalues its portfolio without it.
#[instrument(skip(db))]
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let transaction = crate::entities::Transaction::find_by_id(transaction_id)
        .one(&txn)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;
    let portfolio_id = transaction.portfolio_id;

    transaction.delete(&txn).await?;

    recalculate_within(&txn, portfolio_id).await?;

    txn.commit().await?;

    info!(portfolio_id, transaction_id, "Transaction deleted");
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn validate_detail(
    investment_type: InvestmentType,
    amount: f64,
    detail: Option<&TransactionDetail>,
) -> Result<()> {
    let Some(detail) = detail else {
        return Ok(());
    };

    let found = detail.investment_type();
    if found != investment_type {
        return Err(Error::DetailMismatch {
            expected: investment_type,
            found,
        });
    }

    detail.validate()?;

    match detail.implied_amount() {
        Some(implied) if !amounts_match(amount, implied) => {
            Err(Error::AmountMismatch { amount, implied })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::portfolio::get_portfolio_by_id;
    use crate::test_utils::*;

    async fn snapshot_of(db: &DatabaseConnection, portfolio_id: i64) -> Result<crate::entities::PortfolioModel> {
        Ok(get_portfolio_by_id(db, portfolio_id).await?.unwrap())
    }

    #[test]
    fn test_parse_transaction_date_formats() -> Result<()> {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_transaction_date("2024-03-15")?, expected);
        assert_eq!(parse_transaction_date(" 2024-03-15 ")?, expected);
        assert_eq!(parse_transaction_date("2024-03-15T10:30:00+07:00")?, expected);
        assert_eq!(parse_transaction_date("2024-03-15T23:59:59Z")?, expected);
        assert_eq!(parse_transaction_date("2024-03-15T08:00:00.250")?, expected);

        assert!(matches!(
            parse_transaction_date("15/03/2024").unwrap_err(),
            Error::InvalidDate { .. }
        ));
        assert!(matches!(
            parse_transaction_date("2024-02-30").unwrap_err(),
            Error::InvalidDate { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_priced_entry_only_for_priced_details() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let fund = NewTransaction::priced(
            TransactionKind::Deposit,
            date,
            TransactionDetail::mutual_fund("K-GLOBAL", 1, 100.0, 10.0),
        )
        .unwrap();
        assert_eq!(fund.amount, 1000.0);
        assert_eq!(fund.detail.as_ref().and_then(TransactionDetail::units_purchased), Some(100.0));

        let savings = NewTransaction::priced(
            TransactionKind::Deposit,
            date,
            TransactionDetail::Savings {
                year: 2024,
                month: "January".to_string(),
                balance: 10.0,
            },
        );
        assert!(matches!(
            savings.unwrap_err(),
            Error::UnpricedDetail {
                investment_type: InvestmentType::Savings
            }
        ));
    }

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::Savings).await?;

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = create_transaction(&db, portfolio.id, deposit(amount)).await;
            assert!(matches!(
                result.unwrap_err(),
                Error::InvalidAmount { amount: _ }
            ));
        }

        let unchanged = snapshot_of(&db, portfolio.id).await?;
        assert_eq!(unchanged.transaction_count, 0);
        assert_eq!(unchanged.snapshot_version, portfolio.snapshot_version);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_portfolio_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_transaction(&db, 999, deposit(50.0)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::PortfolioNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_rejects_mismatched_detail() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::Savings).await?;

        let mut entry = deposit(1000.0);
        entry.detail = Some(TransactionDetail::mutual_fund("K-GLOBAL", 1, 100.0, 10.0));
        let result = create_transaction(&db, portfolio.id, entry).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::DetailMismatch {
                expected: InvestmentType::Savings,
                found: InvestmentType::MutualFund
            }
        ));

        assert!(get_transactions_for_portfolio(&db, portfolio.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_rejects_invalid_units() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::MutualFund).await?;

        let mut entry = deposit(1000.0);
        entry.detail = Some(TransactionDetail::mutual_fund("K-GLOBAL", 1, -100.0, 10.0));
        let result = create_transaction(&db, portfolio.id, entry).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidDetail {
                field: "units_purchased",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_rejects_amount_not_matching_units() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::MutualFund).await?;

        let mut entry = deposit(5000.0);
        entry.detail = Some(TransactionDetail::mutual_fund("K-GLOBAL", 1, 100.0, 10.0));
        let result = create_transaction(&db, portfolio.id, entry).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AmountMismatch { amount, implied } if amount == 5000.0 && implied == 1000.0
        ));

        // Rounding to the satang is accepted
        let mut entry = deposit(492.84);
        entry.detail = Some(TransactionDetail::mutual_fund("K-GLOBAL", 2, 42.1234, 11.7));
        create_transaction(&db, portfolio.id, entry).await?;

        let (db, stock) = setup_with_portfolio(InvestmentType::Stock).await?;
        let mut entry = deposit(61_776.0);
        entry.detail = Some(TransactionDetail::Stock {
            stock_name: "AAPL".to_string(),
            installment: 1,
            units_purchased: 10.0,
            price_per_unit_usd: 175.50,
            exchange_rate: 35.20,
            purchase_value_thb: 1.0,
        });
        let result = create_transaction(&db, stock.id, entry).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidDetail {
                field: "purchase_value_thb",
                ..
            }
        ));

        let mut entry = deposit(1.0);
        entry.detail = Some(TransactionDetail::stock("AAPL", 1, 10.0, 175.50, 35.20));
        let result = create_transaction(&db, stock.id, entry).await;
        assert!(matches!(result.unwrap_err(), Error::AmountMismatch { .. }));

        assert!(get_transactions_for_portfolio(&db, stock.id).await?.is_empty());
        assert_eq!(snapshot_of(&db, stock.id).await?.transaction_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_updates_snapshot() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::MutualFund).await?;

        let transaction = create_priced_deposit(
            &db,
            portfolio.id,
            TransactionDetail::mutual_fund("K-GLOBAL", 1, 100.0, 10.0),
        )
        .await?;
        assert_eq!(transaction.portfolio_id, portfolio.id);
        assert_eq!(transaction.kind, TransactionKind::Deposit);
        assert_eq!(transaction.amount, 1000.0);

        let updated = snapshot_of(&db, portfolio.id).await?;
        assert_eq!(updated.total_invested, 1000.0);
        assert_eq!(updated.current_value, 1000.0);
        assert_eq!(updated.total_return, 0.0);
        assert_eq!(updated.return_percentage, 0.0);
        assert_eq!(updated.total_units, 100.0);
        assert_eq!(updated.transaction_count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_detail_survives_round_trip() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::Pvd).await?;
        let detail = TransactionDetail::Pvd {
            year: 2024,
            period: 6,
            month: "June".to_string(),
            employee_contribution: 1500.0,
            employer_contribution: 1500.0,
            contribution_percentage: 5.0,
            total_fund_value: 182_000.0,
        };

        let mut entry = deposit(3000.0);
        entry.detail = Some(detail.clone());
        entry.note = Some("mid-year".to_string());
        let created = create_transaction(&db, portfolio.id, entry).await?;

        let found = get_transaction_by_id(&db, created.id).await?.unwrap();
        assert_eq!(found.detail, Some(detail));
        assert_eq!(found.note.as_deref(), Some("mid-year"));
        assert_eq!(found, created);

        Ok(())
    }

    #[tokio::test]
    async fn test_withdrawal_reduces_net_invested() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::Cooperative).await?;
        create_test_deposit(&db, portfolio.id, 5000.0).await?;

        let mut withdrawal = deposit(2000.0);
        withdrawal.kind = TransactionKind::Withdrawal;
        create_transaction(&db, portfolio.id, withdrawal).await?;

        let updated = snapshot_of(&db, portfolio.id).await?;
        assert_eq!(updated.total_invested, 3000.0);
        assert_eq!(updated.current_value, 3000.0);
        assert_eq!(updated.transaction_count, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_transactions_for_portfolio_scoped_and_ordered() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_portfolio(&db, "First", InvestmentType::Savings).await?;
        let second = create_test_portfolio(&db, "Second", InvestmentType::Savings).await?;

        let mut older = deposit(10.0);
        older.date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        let older = create_transaction(&db, first.id, older).await?;
        let newer = create_test_deposit(&db, first.id, 20.0).await?;
        create_test_deposit(&db, second.id, 30.0).await?;

        let ledger = get_transactions_for_portfolio(&db, first.id).await?;
        assert_eq!(ledger, vec![newer, older]);

        assert!(get_transaction_by_id(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_merges_fields() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::Savings).await?;
        let mut entry = deposit(1000.0);
        entry.note = Some("bonus".to_string());
        let created = create_transaction(&db, portfolio.id, entry).await?;

        let updated = update_transaction(
            &db,
            created.id,
            TransactionPatch {
                amount: Some(1250.0),
                date: Some("2024-07-01T09:00:00+07:00".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.amount, 1250.0);
        assert_eq!(updated.date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(updated.note.as_deref(), Some("bonus"));
        assert_eq!(updated.kind, TransactionKind::Deposit);

        let snapshot = snapshot_of(&db, portfolio.id).await?;
        assert_eq!(snapshot.total_invested, 1250.0);
        assert_eq!(snapshot.current_value, 1250.0);

        let flipped = update_transaction(
            &db,
            created.id,
            TransactionPatch {
                kind: Some(TransactionKind::Withdrawal),
                note: Some(None),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(flipped.note, None);

        let snapshot = snapshot_of(&db, portfolio.id).await?;
        assert_eq!(snapshot.total_invested, -1250.0);
        assert_eq!(snapshot.return_percentage, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_units_revalue_fund() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::MutualFund).await?;
        let created = create_priced_deposit(
            &db,
            portfolio.id,
            TransactionDetail::mutual_fund("K-GLOBAL", 1, 100.0, 10.0),
        )
        .await?;
        crate::core::quote::update_nav(&db, portfolio.id, 12.0).await?;

        update_transaction(
            &db,
            created.id,
            TransactionPatch {
                detail: Some(Some(TransactionDetail::mutual_fund("K-GLOBAL", 1, 50.0, 10.0))),
                amount: Some(500.0),
                ..Default::default()
            },
        )
        .await?;

        let snapshot = snapshot_of(&db, portfolio.id).await?;
        assert_eq!(snapshot.total_units, 50.0);
        assert_eq!(snapshot.total_invested, 500.0);
        assert_eq!(snapshot.current_value, 600.0);
        assert_eq!(snapshot.total_return, 100.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_detail_only_rederives_amount() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::MutualFund).await?;
        let created = create_priced_deposit(
            &db,
            portfolio.id,
            TransactionDetail::mutual_fund("K-GLOBAL", 1, 100.0, 10.0),
        )
        .await?;

        let updated = update_transaction(
            &db,
            created.id,
            TransactionPatch {
                detail: Some(Some(TransactionDetail::mutual_fund("K-GLOBAL", 1, 50.0, 10.0))),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.amount, 500.0);

        let snapshot = snapshot_of(&db, portfolio.id).await?;
        assert_eq!(snapshot.total_units, 50.0);
        assert_eq!(snapshot.total_invested, 500.0);

        // An explicit amount that contradicts the new units is rejected
        let result = update_transaction(
            &db,
            created.id,
            TransactionPatch {
                detail: Some(Some(TransactionDetail::mutual_fund("K-GLOBAL", 1, 80.0, 10.0))),
                amount: Some(500.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::AmountMismatch { .. }));

        // So is an amount-only patch on a priced entry
        let result = update_transaction(
            &db,
            created.id,
            TransactionPatch {
                amount: Some(1000.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::AmountMismatch { .. }));

        let stored = get_transaction_by_id(&db, created.id).await?.unwrap();
        assert_eq!(stored, updated);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_rejects_bad_input() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::Savings).await?;
        let created = create_test_deposit(&db, portfolio.id, 100.0).await?;

        let result = update_transaction(
            &db,
            created.id,
            TransactionPatch {
                date: Some("yesterday".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidDate { .. }));

        let result = update_transaction(
            &db,
            created.id,
            TransactionPatch {
                amount: Some(0.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let result = update_transaction(&db, 4242, TransactionPatch::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::TransactionNotFound { id: 4242 }
        ));

        let stored = get_transaction_by_id(&db, created.id).await?.unwrap();
        assert_eq!(stored, created);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction_revalues_portfolio() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::Savings).await?;
        let first = create_test_deposit(&db, portfolio.id, 1000.0).await?;
        create_test_deposit(&db, portfolio.id, 500.0).await?;

        delete_transaction(&db, first.id).await?;

        assert!(get_transaction_by_id(&db, first.id).await?.is_none());
        let snapshot = snapshot_of(&db, portfolio.id).await?;
        assert_eq!(snapshot.total_invested, 500.0);
        assert_eq!(snapshot.current_value, 500.0);
        assert_eq!(snapshot.transaction_count, 1);

        let result = delete_transaction(&db, first.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::TransactionNotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_consistent_after_every_mutation() -> Result<()> {
        let (db, portfolio) = setup_with_portfolio(InvestmentType::Stock).await?;
        crate::core::quote::update_stock_price(&db, portfolio.id, 180.0, 35.5).await?;

        let first = create_priced_deposit(
            &db,
            portfolio.id,
            TransactionDetail::stock("AAPL", 1, 3.5, 170.0, 36.0),
        )
        .await?;
        let check = |p: &crate::entities::PortfolioModel| {
            assert!((p.total_return - (p.current_value - p.total_invested)).abs() < 1e-9);
            assert!(p.return_percentage.is_finite());
        };
        check(&snapshot_of(&db, portfolio.id).await?);

        create_priced_deposit(
            &db,
            portfolio.id,
            TransactionDetail::stock("AAPL", 2, 1.25, 175.0, 35.8),
        )
        .await?;
        check(&snapshot_of(&db, portfolio.id).await?);

        delete_transaction(&db, first.id).await?;
        let last = snapshot_of(&db, portfolio.id).await?;
        check(&last);
        assert_eq!(last.total_units, 1.25);
        assert!((last.current_value - 1.25 * 180.0 * 35.5).abs() < 1e-9);

        Ok(())
    }
}
