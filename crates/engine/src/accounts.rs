use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub linked_item_id: i32,
    /// Provider account identifier, unique within the linked item.
    pub account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub subtype: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::linked_items::Entity",
        from = "Column::LinkedItemId",
        to = "super::linked_items::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    LinkedItem,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::linked_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkedItem.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
