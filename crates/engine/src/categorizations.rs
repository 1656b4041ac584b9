//! Assignment of a transaction to a wallet.
//!
//! Storage enforces one row per `(transaction_id, wallet_id)` and one row per
//! `transaction_id`: a transaction sits in at most one wallet at a time.

use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Shared,
    Individual,
}

impl CategoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Individual => "individual",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CategoryType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "shared" => Ok(Self::Shared),
            "individual" => Ok(Self::Individual),
            other => Err(EngineError::InvalidCategoryType(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categorizations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub transaction_id: i32,
    pub wallet_id: i32,
    pub category_type: String,
    pub categorized_by_user_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transaction,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallet,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_type_parses_known_values() {
        assert_eq!(CategoryType::try_from("shared"), Ok(CategoryType::Shared));
        assert_eq!(
            CategoryType::try_from("individual"),
            Ok(CategoryType::Individual)
        );
    }

    #[test]
    fn category_type_is_case_sensitive() {
        assert_eq!(
            CategoryType::try_from("Shared"),
            Err(EngineError::InvalidCategoryType("Shared".to_string()))
        );
        assert!(CategoryType::try_from("").is_err());
    }

    #[test]
    fn category_type_round_trips_through_str() {
        for ty in [CategoryType::Shared, CategoryType::Individual] {
            assert_eq!(CategoryType::try_from(ty.as_str()), Ok(ty));
        }
    }
}
