//! Transactions synced from the provider.
//!
//! Rows are created on first sight of a provider transaction id; afterwards
//! only `pending` changes. Metadata records are stored as JSON text columns.

use chrono::{NaiveDate, Utc};
use ledger_client::{
    Counterparty, Location, PaymentMeta, PersonalFinanceCategory, ProviderTransaction,
};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Serialize, de::DeserializeOwned};

use crate::{EngineError, MoneyCents, ResultEngine};

/// Optional structured details the provider attaches to a transaction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionMetadata {
    pub location: Option<Location>,
    pub payment_meta: Option<PaymentMeta>,
    pub personal_finance_category: Option<PersonalFinanceCategory>,
    pub counterparties: Vec<Counterparty>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: i32,
    pub user_id: i32,
    pub account_id: i32,
    /// Provider transaction id, the dedup key.
    pub transaction_id: String,
    pub external_account_id: String,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub authorized_date: Option<NaiveDate>,
    pub name: String,
    pub merchant_name: Option<String>,
    pub pending: bool,
    pub payment_channel: String,
    pub transaction_code: Option<String>,
    pub iso_currency_code: Option<String>,
    pub unofficial_currency_code: Option<String>,
    pub metadata: TransactionMetadata,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub account_id: i32,
    #[sea_orm(unique)]
    pub transaction_id: String,
    pub external_account_id: String,
    pub amount_minor: i64,
    pub date: Date,
    pub authorized_date: Option<Date>,
    pub name: String,
    pub merchant_name: Option<String>,
    pub pending: bool,
    pub payment_channel: String,
    pub transaction_code: Option<String>,
    pub iso_currency_code: Option<String>,
    pub unofficial_currency_code: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub location: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_meta: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub personal_finance_category: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub counterparties: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Account,
    #[sea_orm(has_many = "super::categorizations::Entity")]
    Categorizations,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::categorizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categorizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn encode<T: Serialize>(value: &T) -> ResultEngine<String> {
    serde_json::to_string(value)
        .map_err(|err| EngineError::InvalidInput(format!("unencodable metadata: {err}")))
}

fn decode<T: DeserializeOwned>(raw: Option<&str>) -> ResultEngine<Option<T>> {
    raw.map(|raw| {
        serde_json::from_str(raw)
            .map_err(|err| EngineError::InvalidInput(format!("corrupt metadata: {err}")))
    })
    .transpose()
}

impl ActiveModel {
    /// Build the row for a newly seen provider transaction.
    pub(crate) fn from_provider(
        user_id: i32,
        account_id: i32,
        tx: &ProviderTransaction,
    ) -> ResultEngine<Self> {
        let amount = MoneyCents::from_provider_amount(tx.amount)?;
        let counterparties = if tx.counterparties.is_empty() {
            None
        } else {
            Some(encode(&tx.counterparties)?)
        };

        Ok(Self {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            account_id: ActiveValue::Set(account_id),
            transaction_id: ActiveValue::Set(tx.transaction_id.clone()),
            external_account_id: ActiveValue::Set(tx.account_id.clone()),
            amount_minor: ActiveValue::Set(amount.cents()),
            date: ActiveValue::Set(tx.date),
            authorized_date: ActiveValue::Set(tx.authorized_date),
            name: ActiveValue::Set(tx.name.clone()),
            merchant_name: ActiveValue::Set(tx.merchant_name.clone()),
            pending: ActiveValue::Set(tx.pending),
            payment_channel: ActiveValue::Set(tx.payment_channel.clone()),
            transaction_code: ActiveValue::Set(tx.transaction_code.clone()),
            iso_currency_code: ActiveValue::Set(tx.iso_currency_code.clone()),
            unofficial_currency_code: ActiveValue::Set(tx.unofficial_currency_code.clone()),
            location: ActiveValue::Set(tx.location.as_ref().map(encode).transpose()?),
            payment_meta: ActiveValue::Set(tx.payment_meta.as_ref().map(encode).transpose()?),
            personal_finance_category: ActiveValue::Set(
                tx.personal_finance_category
                    .as_ref()
                    .map(encode)
                    .transpose()?,
            ),
            counterparties: ActiveValue::Set(counterparties),
            created_at: ActiveValue::Set(Utc::now()),
        })
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let metadata = TransactionMetadata {
            location: decode(model.location.as_deref())?,
            payment_meta: decode(model.payment_meta.as_deref())?,
            personal_finance_category: decode(model.personal_finance_category.as_deref())?,
            counterparties: decode(model.counterparties.as_deref())?.unwrap_or_default(),
        };

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            account_id: model.account_id,
            transaction_id: model.transaction_id,
            external_account_id: model.external_account_id,
            amount: MoneyCents::new(model.amount_minor),
            date: model.date,
            authorized_date: model.authorized_date,
            name: model.name,
            merchant_name: model.merchant_name,
            pending: model.pending,
            payment_channel: model.payment_channel,
            transaction_code: model.transaction_code,
            iso_currency_code: model.iso_currency_code,
            unofficial_currency_code: model.unofficial_currency_code,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::ActiveValue;

    use super::*;

    fn provider_tx() -> ProviderTransaction {
        ProviderTransaction {
            transaction_id: "tx-1".to_string(),
            account_id: "acc-1".to_string(),
            amount: 12.345,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            authorized_date: None,
            name: "Coffee".to_string(),
            merchant_name: Some("Cafe".to_string()),
            pending: true,
            payment_channel: "in store".to_string(),
            transaction_code: None,
            iso_currency_code: Some("USD".to_string()),
            unofficial_currency_code: None,
            location: Some(Location {
                city: Some("Springfield".to_string()),
                ..Location::default()
            }),
            payment_meta: None,
            personal_finance_category: None,
            counterparties: Vec::new(),
        }
    }

    #[test]
    fn provider_row_stores_cents_and_skips_absent_metadata() {
        let row = ActiveModel::from_provider(1, 7, &provider_tx()).unwrap();

        assert_eq!(row.amount_minor, ActiveValue::Set(1234));
        assert_eq!(row.account_id, ActiveValue::Set(7));
        assert_eq!(row.payment_meta, ActiveValue::Set(None));
        assert_eq!(row.counterparties, ActiveValue::Set(None));
        assert!(matches!(row.location, ActiveValue::Set(Some(_))));
    }

    #[test]
    fn stored_metadata_is_decoded_back() {
        let location = Location {
            city: Some("Springfield".to_string()),
            ..Location::default()
        };
        let model = Model {
            id: 3,
            user_id: 1,
            account_id: 7,
            transaction_id: "tx-1".to_string(),
            external_account_id: "acc-1".to_string(),
            amount_minor: -422,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            authorized_date: None,
            name: "Refund".to_string(),
            merchant_name: None,
            pending: false,
            payment_channel: "online".to_string(),
            transaction_code: None,
            iso_currency_code: None,
            unofficial_currency_code: None,
            location: Some(serde_json::to_string(&location).unwrap()),
            payment_meta: None,
            personal_finance_category: None,
            counterparties: None,
            created_at: Utc::now(),
        };

        let tx = Transaction::try_from(model).unwrap();
        assert_eq!(tx.amount, MoneyCents::new(-422));
        assert_eq!(tx.metadata.location, Some(location));
        assert!(tx.metadata.counterparties.is_empty());
    }

    #[test]
    fn corrupt_metadata_is_reported() {
        let decoded = decode::<Location>(Some("{not json"));
        assert!(matches!(decoded, Err(EngineError::InvalidInput(_))));
    }
}
