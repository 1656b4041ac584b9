use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, prelude::*, sea_query::Query};

use crate::{CategoryType, ResultEngine, Transaction, categorizations, transactions};

use super::{Engine, categorize::require_wallet_member};

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Requested page of a user's transaction list.
///
/// Out-of-range values fall back to the defaults instead of failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransactionPageRequest {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl TransactionPageRequest {
    /// `(page, limit)` with `page >= 1` and `limit` in `1..=100`.
    pub fn normalized(self) -> (u64, u64) {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let limit = self
            .limit
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);
        (page, limit)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

fn into_domain(rows: Vec<transactions::Model>) -> ResultEngine<Vec<Transaction>> {
    rows.into_iter().map(Transaction::try_from).collect()
}

impl Engine {
    /// A page of the user's transactions, newest first.
    ///
    /// A page past the end is empty but still carries the totals.
    pub async fn transactions_page(
        &self,
        user_id: i32,
        request: TransactionPageRequest,
    ) -> ResultEngine<TransactionPage> {
        let (page, limit) = request.normalized();

        let paginator = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .paginate(&self.database, limit);
        let totals = paginator.num_items_and_pages().await?;
        // Past the last page there is nothing to fetch, and the offset of a
        // huge page number would overflow.
        let rows = if page > totals.number_of_pages {
            Vec::new()
        } else {
            paginator.fetch_page(page - 1).await?
        };

        Ok(TransactionPage {
            transactions: into_domain(rows)?,
            page,
            limit,
            total_count: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    /// The user's transactions that are not categorized into any wallet yet.
    pub async fn uncategorized_transactions(
        &self,
        user_id: i32,
        wallet_id: i32,
    ) -> ResultEngine<Vec<Transaction>> {
        require_wallet_member(&self.database, wallet_id, user_id).await?;

        let categorized = Query::select()
            .column(categorizations::Column::TransactionId)
            .from(categorizations::Entity)
            .to_owned();
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Id.not_in_subquery(categorized))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        into_domain(rows)
    }

    /// Transactions any member categorized as shared into `wallet_id`.
    pub async fn shared_transactions(
        &self,
        user_id: i32,
        wallet_id: i32,
    ) -> ResultEngine<Vec<Transaction>> {
        require_wallet_member(&self.database, wallet_id, user_id).await?;

        let rows = transactions::Entity::find()
            .inner_join(categorizations::Entity)
            .filter(categorizations::Column::WalletId.eq(wallet_id))
            .filter(categorizations::Column::CategoryType.eq(CategoryType::Shared.as_str()))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        into_domain(rows)
    }
}
