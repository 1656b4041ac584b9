//! One authorized provider connection.
//!
//! `transactions_cursor` is only ever written by the synchronizer; `None`
//! means the next sync starts from the beginning of the item's history.

use sea_orm::entity::prelude::*;
use secrecy::SecretString;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "linked_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    #[sea_orm(unique)]
    pub item_id: String,
    pub access_token: String,
    pub institution_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub transactions_cursor: Option<String>,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// The access credential, wrapped so it cannot end up in logs.
    pub(crate) fn access_token(&self) -> SecretString {
        SecretString::new(self.access_token.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
