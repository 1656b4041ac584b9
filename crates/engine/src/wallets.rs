//! Wallets and their members.
//!
//! Wallets are provisioned outside the engine; the engine only checks that a
//! wallet exists and that the acting user belongs to it.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wallet_members::Entity")]
    Members,
    #[sea_orm(has_many = "super::categorizations::Entity")]
    Categorizations,
}

impl Related<super::wallet_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::categorizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categorizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
