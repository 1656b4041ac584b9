//! Provider account id → local account id lookup for one linked item.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{ResultEngine, accounts};

/// Account map of a single linked item.
///
/// Built once per item sync; lookups never touch storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountMap {
    by_external_id: HashMap<String, i32>,
}

impl AccountMap {
    /// Load every account of `linked_item_id`.
    pub(crate) async fn load<C>(db: &C, linked_item_id: i32) -> ResultEngine<Self>
    where
        C: ConnectionTrait,
    {
        let rows = accounts::Entity::find()
            .filter(accounts::Column::LinkedItemId.eq(linked_item_id))
            .all(db)
            .await?;
        Ok(rows.into_iter().collect())
    }

    /// Internal account id for a provider account id, if the account was
    /// materialized for this item.
    pub fn resolve(&self, external_account_id: &str) -> Option<i32> {
        self.by_external_id.get(external_account_id).copied()
    }
}

impl FromIterator<accounts::Model> for AccountMap {
    fn from_iter<I: IntoIterator<Item = accounts::Model>>(iter: I) -> Self {
        Self {
            by_external_id: iter
                .into_iter()
                .map(|account| (account.account_id, account.id))
                .collect(),
        }
    }
}
