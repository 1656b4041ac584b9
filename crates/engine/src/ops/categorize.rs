use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use tracing::{debug, info};

use crate::{
    CategoryType, EngineError, ResultEngine, categorizations, error::is_unique_violation,
    transactions, wallet_members, wallets,
};

use super::{Engine, with_tx};

impl Engine {
    /// Assigns a transaction to a wallet as shared or individual.
    ///
    /// Checks run in this order: category type, transaction existence,
    /// ownership, wallet existence, wallet membership. A transaction that is
    /// already categorized (into this or any other wallet) is rejected with
    /// `AlreadyCategorized`; uncategorize it first.
    pub async fn categorize(
        &self,
        user_id: i32,
        transaction_id: i32,
        wallet_id: i32,
        category_type: &str,
    ) -> ResultEngine<()> {
        let category_type = CategoryType::try_from(category_type)?;

        with_tx!(self, |db_tx| {
            require_owned_transaction(&db_tx, transaction_id, user_id).await?;
            require_wallet_member(&db_tx, wallet_id, user_id).await?;

            let row = categorizations::ActiveModel {
                id: ActiveValue::NotSet,
                transaction_id: ActiveValue::Set(transaction_id),
                wallet_id: ActiveValue::Set(wallet_id),
                category_type: ActiveValue::Set(category_type.as_str().to_string()),
                categorized_by_user_id: ActiveValue::Set(user_id),
                created_at: ActiveValue::Set(Utc::now()),
            };
            categorizations::Entity::insert(row)
                .exec(&db_tx)
                .await
                .map_err(|err| {
                    if is_unique_violation(&err) {
                        EngineError::AlreadyCategorized(transaction_id.to_string())
                    } else {
                        EngineError::Database(err)
                    }
                })?;

            info!(
                user_id,
                transaction_id,
                wallet_id,
                category_type = %category_type,
                "transaction categorized"
            );
            Ok::<_, EngineError>(())
        })
    }

    /// Removes the `(transaction, wallet)` categorization if there is one.
    ///
    /// Succeeds when nothing was categorized, including for unknown
    /// transactions; fails only when the transaction belongs to someone else.
    pub async fn uncategorize(
        &self,
        user_id: i32,
        transaction_id: i32,
        wallet_id: i32,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let owner = transactions::Entity::find_by_id(transaction_id)
                .one(&db_tx)
                .await?
                .map(|tx| tx.user_id);
            if owner.is_some_and(|owner| owner != user_id) {
                return Err(EngineError::UnauthorizedAccess(format!(
                    "transaction {transaction_id}"
                )));
            }

            let deleted = categorizations::Entity::delete_many()
                .filter(categorizations::Column::TransactionId.eq(transaction_id))
                .filter(categorizations::Column::WalletId.eq(wallet_id))
                .exec(&db_tx)
                .await?;
            debug!(
                user_id,
                transaction_id,
                wallet_id,
                rows = deleted.rows_affected,
                "transaction uncategorized"
            );
            Ok::<_, EngineError>(())
        })
    }
}

async fn require_owned_transaction<C>(
    db: &C,
    transaction_id: i32,
    user_id: i32,
) -> ResultEngine<transactions::Model>
where
    C: ConnectionTrait,
{
    let tx = transactions::Entity::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::TransactionNotFound(transaction_id.to_string()))?;
    if tx.user_id != user_id {
        return Err(EngineError::UnauthorizedAccess(format!(
            "transaction {transaction_id}"
        )));
    }
    Ok(tx)
}

/// Fails with `WalletNotFound` for an unknown wallet and with
/// `UnauthorizedAccess` when `user_id` is not one of its members.
pub(super) async fn require_wallet_member<C>(
    db: &C,
    wallet_id: i32,
    user_id: i32,
) -> ResultEngine<wallets::Model>
where
    C: ConnectionTrait,
{
    let wallet = wallets::Entity::find_by_id(wallet_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::WalletNotFound(wallet_id.to_string()))?;
    let member = wallet_members::Entity::find_by_id((wallet_id, user_id))
        .one(db)
        .await?;
    if member.is_none() {
        return Err(EngineError::UnauthorizedAccess(format!("wallet {wallet_id}")));
    }
    Ok(wallet)
}
