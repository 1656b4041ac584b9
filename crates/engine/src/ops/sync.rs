use ledger_client::{ProviderTransaction, SyncPage};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, error, info, warn};

use crate::{EngineError, ResultEngine, linked_items, reconcile::AccountMap, transactions};

use super::{Engine, with_tx};

/// Counts aggregated over one or more item syncs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncTotals {
    pub items_synced: u64,
    pub added: u64,
    pub modified: u64,
    pub removed: u64,
}

impl SyncTotals {
    fn absorb(&mut self, other: SyncTotals) {
        self.items_synced += other.items_synced;
        self.added += other.added;
        self.modified += other.modified;
        self.removed += other.removed;
    }
}

#[derive(Debug, Default)]
struct PageOutcome {
    added: u64,
    modified: u64,
    removed: u64,
}

impl Engine {
    /// Syncs every linked item of `user_id`, one after the other.
    ///
    /// The first failing item aborts the run and its error is returned as-is;
    /// pages already applied for that item (and items already completed)
    /// stay persisted.
    pub async fn sync_all(&self, user_id: i32) -> ResultEngine<SyncTotals> {
        let items = linked_items::Entity::find()
            .filter(linked_items::Column::UserId.eq(user_id))
            .order_by_asc(linked_items::Column::Id)
            .all(&self.database)
            .await?;
        info!(user_id, items = items.len(), "starting sync");

        let mut totals = SyncTotals::default();
        for item in &items {
            let item_totals = self.sync_item(item).await.inspect_err(|err| {
                error!(user_id, item_id = %item.item_id, "item sync failed: {err}");
            })?;
            totals.absorb(item_totals);
        }

        info!(
            user_id,
            items_synced = totals.items_synced,
            added = totals.added,
            modified = totals.modified,
            removed = totals.removed,
            "sync finished"
        );
        Ok(totals)
    }

    /// Pages through the provider feed of one item until it reports no more
    /// data, committing each page together with the cursor that follows it.
    async fn sync_item(&self, item: &linked_items::Model) -> ResultEngine<SyncTotals> {
        let _permit = self.in_flight.acquire(item.id, &item.item_id)?;

        // Another run may have advanced the cursor since the item was listed.
        let item = linked_items::Entity::find_by_id(item.id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(item.item_id.clone()))?;
        let accounts = AccountMap::load(&self.database, item.id).await?;
        let access_token = item.access_token();

        let mut totals = SyncTotals {
            items_synced: 1,
            ..SyncTotals::default()
        };
        let mut cursor = item.transactions_cursor.clone();
        loop {
            let page = self
                .provider
                .sync_transactions(&access_token, cursor.as_deref())
                .await?;
            debug!(
                item_id = %item.item_id,
                added = page.added.len(),
                modified = page.modified.len(),
                removed = page.removed.len(),
                has_more = page.has_more,
                "fetched sync page"
            );

            let has_more = page.has_more;
            let next_cursor = page.next_cursor.clone();
            let outcome = self.apply_page(&item, &accounts, page).await?;
            totals.added += outcome.added;
            totals.modified += outcome.modified;
            totals.removed += outcome.removed;
            cursor = Some(next_cursor);

            if !has_more {
                break;
            }
        }

        Ok(totals)
    }

    /// Applies one page in a single DB transaction: added, then modified,
    /// then removed, then the cursor write. Nothing of the page is visible
    /// unless all of it is.
    async fn apply_page(
        &self,
        item: &linked_items::Model,
        accounts: &AccountMap,
        page: SyncPage,
    ) -> ResultEngine<PageOutcome> {
        with_tx!(self, |db_tx| {
            let mut outcome = PageOutcome::default();

            for tx in &page.added {
                if insert_added(&db_tx, item, accounts, tx).await? {
                    outcome.added += 1;
                }
            }

            for tx in &page.modified {
                let updated = transactions::Entity::update_many()
                    .col_expr(transactions::Column::Pending, Expr::value(tx.pending))
                    .filter(transactions::Column::TransactionId.eq(tx.transaction_id.as_str()))
                    .filter(transactions::Column::UserId.eq(item.user_id))
                    .exec(&db_tx)
                    .await?;
                if updated.rows_affected == 0 {
                    warn!(
                        item_id = %item.item_id,
                        transaction_id = %tx.transaction_id,
                        "modified transaction not stored locally"
                    );
                } else {
                    outcome.modified += 1;
                }
            }

            outcome.removed = page.removed.len() as u64;
            if !page.removed.is_empty() {
                warn!(
                    item_id = %item.item_id,
                    removed = page.removed.len(),
                    "provider removed transactions; local rows kept"
                );
            }

            let mut active: linked_items::ActiveModel = item.clone().into();
            active.transactions_cursor = ActiveValue::Set(Some(page.next_cursor));
            active.update(&db_tx).await?;

            Ok::<_, EngineError>(outcome)
        })
    }
}

/// Inserts one added delta. Returns `false` when the delta was skipped: its
/// account is unknown to this item, or the transaction is already stored.
async fn insert_added<C>(
    db: &C,
    item: &linked_items::Model,
    accounts: &AccountMap,
    tx: &ProviderTransaction,
) -> ResultEngine<bool>
where
    C: ConnectionTrait,
{
    let Some(account_id) = accounts.resolve(&tx.account_id) else {
        warn!(
            item_id = %item.item_id,
            account_id = %tx.account_id,
            transaction_id = %tx.transaction_id,
            "skipping transaction for unknown account"
        );
        return Ok(false);
    };

    let row = transactions::ActiveModel::from_provider(item.user_id, account_id, tx)?;
    let inserted = transactions::Entity::insert(row)
        .on_conflict(
            OnConflict::column(transactions::Column::TransactionId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted == 0 {
        debug!(transaction_id = %tx.transaction_id, "duplicate transaction ignored");
    }
    Ok(inserted > 0)
}
