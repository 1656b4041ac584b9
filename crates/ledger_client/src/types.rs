//! Typed views of the provider payloads the core depends on.
//!
//! The provider sends empty strings and all-null objects for absent data;
//! deserialization folds both into `None` so callers only ever see
//! meaningful values.

use chrono::NaiveDate;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// Provider deployment the client talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.plaid.com",
            Self::Production => "https://production.plaid.com",
        }
    }
}

impl TryFrom<&str> for Environment {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "invalid provider environment: {other} (must be sandbox or production)"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkToken {
    pub link_token: String,
    pub expiration: String,
}

/// Result of exchanging a public token.
///
/// The access token is the long-lived credential for the item and stays
/// wrapped so it cannot leak through `Debug` output or logs.
#[derive(Debug, Deserialize)]
pub struct TokenExchange {
    pub access_token: SecretString,
    pub item_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderAccount {
    pub account_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub official_name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub subtype: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Location {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl Location {
    /// A location without street address or city carries nothing worth
    /// keeping.
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.city.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaymentMeta {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub reference_number: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ppd_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub payee: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub by_order_of: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub payer: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub payment_processor: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub reason: Option<String>,
}

impl PaymentMeta {
    pub fn is_empty(&self) -> bool {
        self.reference_number.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PersonalFinanceCategory {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub primary: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub detailed: Option<String>,
}

impl PersonalFinanceCategory {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Counterparty {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "empty_as_none")]
    pub counterparty_type: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub confidence_level: Option<String>,
}

/// One transaction delta as reported by the provider.
///
/// `amount` is the provider's floating-point value; it must be converted to
/// fixed-point before it is stored anywhere.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ProviderTransaction {
    pub transaction_id: String,
    pub account_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub authorized_date: Option<NaiveDate>,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub merchant_name: Option<String>,
    pub pending: bool,
    #[serde(default)]
    pub payment_channel: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub transaction_code: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub iso_currency_code: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub unofficial_currency_code: Option<String>,
    #[serde(default, deserialize_with = "non_empty_location")]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "non_empty_payment_meta")]
    pub payment_meta: Option<PaymentMeta>,
    #[serde(default, deserialize_with = "non_empty_category")]
    pub personal_finance_category: Option<PersonalFinanceCategory>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub counterparties: Vec<Counterparty>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemovedTransaction {
    pub transaction_id: String,
}

/// One page of the incremental sync feed.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SyncPage {
    #[serde(default)]
    pub added: Vec<ProviderTransaction>,
    #[serde(default)]
    pub modified: Vec<ProviderTransaction>,
    #[serde(default)]
    pub removed: Vec<RemovedTransaction>,
    pub next_cursor: String,
    pub has_more: bool,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

macro_rules! non_empty_record {
    ($fn_name:ident, $ty:ty) => {
        fn $fn_name<'de, D>(deserializer: D) -> Result<Option<$ty>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Option::<$ty>::deserialize(deserializer)?;
            Ok(value.filter(|record| !record.is_empty()))
        }
    };
}

non_empty_record!(non_empty_location, Location);
non_empty_record!(non_empty_payment_meta, PaymentMeta);
non_empty_record!(non_empty_category, PersonalFinanceCategory);

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "added": [{
            "transaction_id": "tx-1",
            "account_id": "acc-1",
            "amount": 12.345,
            "date": "2024-03-01",
            "authorized_date": null,
            "name": "Coffee",
            "merchant_name": "",
            "pending": true,
            "payment_channel": "in store",
            "transaction_code": null,
            "iso_currency_code": "USD",
            "unofficial_currency_code": null,
            "location": {"address": null, "city": "", "region": null, "postal_code": null, "country": null, "lat": null, "lon": null},
            "payment_meta": {"reference_number": null, "payee": "Cafe"},
            "personal_finance_category": {"primary": "FOOD_AND_DRINK", "detailed": "FOOD_AND_DRINK_COFFEE"},
            "counterparties": null
        }],
        "modified": [],
        "removed": [{"transaction_id": "tx-0"}],
        "next_cursor": "c1",
        "has_more": true,
        "request_id": "abc"
    }"#;

    #[test]
    fn sync_page_folds_blank_provider_fields() {
        let page: SyncPage = serde_json::from_str(PAGE).unwrap();
        let tx = &page.added[0];

        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(tx.merchant_name, None);
        assert_eq!(tx.iso_currency_code.as_deref(), Some("USD"));
        assert_eq!(tx.location, None);
        assert_eq!(tx.payment_meta, None);
        assert_eq!(
            tx.personal_finance_category
                .as_ref()
                .and_then(|c| c.primary.as_deref()),
            Some("FOOD_AND_DRINK")
        );
        assert!(tx.counterparties.is_empty());
        assert_eq!(page.removed[0].transaction_id, "tx-0");
        assert_eq!(page.next_cursor, "c1");
        assert!(page.has_more);
    }

    #[test]
    fn malformed_date_is_rejected() {
        let raw = PAGE.replace("2024-03-01", "03/01/2024");
        assert!(serde_json::from_str::<SyncPage>(&raw).is_err());
    }

    #[test]
    fn environment_only_accepts_known_names() {
        assert_eq!(Environment::try_from("sandbox"), Ok(Environment::Sandbox));
        assert_eq!(
            Environment::try_from("production"),
            Ok(Environment::Production)
        );
        assert!(Environment::try_from("development").is_err());
    }
}
