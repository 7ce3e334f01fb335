//! Portfolio entity - A named investment holding owned by one user.
//!
//! Besides identity and display fields, each portfolio carries the last computed
//! valuation snapshot and the latest market quote entered for it. The snapshot
//! columns are written only by `core::recalculate`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The five supported investment categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum InvestmentType {
    /// Cooperative savings account
    #[sea_orm(string_value = "cooperative")]
    Cooperative,
    /// Provident fund
    #[sea_orm(string_value = "pvd")]
    Pvd,
    /// Mutual fund priced by NAV per unit
    #[sea_orm(string_value = "mutual_fund")]
    MutualFund,
    /// Foreign stock priced in USD and converted at an FX rate
    #[sea_orm(string_value = "stock")]
    Stock,
    /// Plain savings account
    #[sea_orm(string_value = "savings")]
    Savings,
}

impl InvestmentType {
    /// Stable identifier used in storage and configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cooperative => "cooperative",
            Self::Pvd => "pvd",
            Self::MutualFund => "mutual_fund",
            Self::Stock => "stock",
            Self::Savings => "savings",
        }
    }
}

/// Portfolio database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolios")]
pub struct Model {
    /// Unique identifier for the portfolio
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// Investment category, fixed at creation
    pub investment_type: InvestmentType,
    /// Display name
    pub name: String,
    /// Optional savings goal in THB
    pub target_amount: Option<f64>,
    /// Free-text description
    pub description: Option<String>,
    /// Display color
    pub color: Option<String>,
    /// Marked-to-market value in THB
    pub current_value: f64,
    /// Deposits minus withdrawals
    pub total_invested: f64,
    /// `current_value - total_invested`
    pub total_return: f64,
    /// Return relative to `total_invested`, in percent
    pub return_percentage: f64,
    /// Number of ledger entries the snapshot was computed from
    pub transaction_count: i64,
    /// Owned units for mutual fund and stock portfolios, 0 otherwise
    pub total_units: f64,
    /// Latest NAV per unit (mutual fund only)
    pub current_nav_per_unit: Option<f64>,
    /// Latest price per share in USD (stock only)
    pub current_stock_price_usd: Option<f64>,
    /// Latest THB per USD rate (stock only)
    pub current_exchange_rate: Option<f64>,
    /// Incremented on every snapshot write
    pub snapshot_version: i64,
    /// When the snapshot was last recomputed
    pub recalculated_at: Option<DateTimeUtc>,
    /// When the portfolio was created
    pub created_at: DateTimeUtc,
    /// When the portfolio was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Portfolio and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One portfolio has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
