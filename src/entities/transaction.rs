//! Transaction entity - A deposit or withdrawal recorded against a portfolio.
//!
//! The `amount` is always positive, the direction lives in `kind`. The optional
//! `detail` column holds the investment-type specific payload as JSON.
use super::detail::TransactionDetail;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money (and units) moved into the portfolio
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Money (and units) moved out of the portfolio
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
}

impl TransactionKind {
    /// `1.0` for deposits, `-1.0` for withdrawals.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Deposit => 1.0,
            Self::Withdrawal => -1.0,
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the portfolio this transaction belongs to
    pub portfolio_id: i64,
    /// Deposit or withdrawal
    pub kind: TransactionKind,
    /// Positive amount in THB
    pub amount: f64,
    /// Trade or contribution date
    pub date: Date,
    /// Optional free-text note
    pub note: Option<String>,
    /// Investment-type specific payload
    #[sea_orm(column_type = "Json", nullable)]
    pub detail: Option<TransactionDetail>,
    /// When the transaction was created
    pub created_at: DateTimeUtc,
    /// When the transaction was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Amount with the direction applied: positive for deposits, negative for withdrawals.
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one portfolio
    #[sea_orm(
        belongs_to = "super::portfolio::Entity",
        from = "Column::PortfolioId",
        to = "super::portfolio::Column::Id",
        on_delete = "Cascade"
    )]
    Portfolio,
}

impl Related<super::portfolio::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Portfolio.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
