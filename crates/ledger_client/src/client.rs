use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    Environment, LedgerProvider, LinkToken, ProviderAccount, ProviderError, SyncPage,
    TokenExchange,
};

const CLIENT_ID_HEADER: &str = "PLAID-CLIENT-ID";
const SECRET_HEADER: &str = "PLAID-SECRET";

/// Static configuration of the provider client.
#[derive(Clone, Debug)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: SecretString,
    pub environment: Environment,
    /// Overrides the environment's base URL (mock servers, proxies).
    pub base_url: Option<String>,
    /// Display name shown to the user inside the link flow.
    pub client_name: String,
    pub language: String,
    pub country_codes: Vec<String>,
}

impl PlaidConfig {
    pub fn new(
        client_id: impl Into<String>,
        secret: SecretString,
        environment: Environment,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            secret,
            environment,
            base_url: None,
            client_name: "Spendr".to_string(),
            language: "en".to_string(),
            country_codes: vec!["US".to_string()],
        }
    }
}

/// HTTP client for the aggregation provider.
#[derive(Clone, Debug)]
pub struct PlaidClient {
    client: Client,
    config: PlaidConfig,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    error_message: String,
}

#[derive(Debug, Serialize)]
struct LinkTokenUser<'a> {
    client_user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct LinkTokenRequest<'a> {
    client_name: &'a str,
    language: &'a str,
    country_codes: &'a [String],
    user: LinkTokenUser<'a>,
    products: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PublicTokenRequest<'a> {
    public_token: &'a str,
}

#[derive(Debug, Serialize)]
struct AccessTokenRequest<'a> {
    access_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    accounts: Vec<ProviderAccount>,
}

#[derive(Debug, Serialize)]
struct InstitutionRequest<'a> {
    institution_id: &'a str,
    country_codes: &'a [String],
}

#[derive(Debug, Deserialize)]
struct Institution {
    name: String,
}

#[derive(Debug, Deserialize)]
struct InstitutionResponse {
    institution: Institution,
}

#[derive(Debug, Serialize)]
struct SyncRequest<'a> {
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
}

impl<'a> SyncRequest<'a> {
    /// An empty cursor means "from the beginning" and is left out entirely.
    fn new(access_token: &'a str, cursor: Option<&'a str>) -> Self {
        Self {
            access_token,
            cursor: cursor.filter(|c| !c.is_empty()),
        }
    }
}

impl PlaidClient {
    pub fn new(client: Client, config: PlaidConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.config.environment.base_url());
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn post_json<TReq: Serialize + ?Sized, TResp: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, ProviderError> {
        let resp = self
            .client
            .post(self.url(path))
            .header(CLIENT_ID_HEADER, &self.config.client_id)
            .header(SECRET_HEADER, self.config.secret.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let bytes = resp.bytes().await?;
            return serde_json::from_slice(&bytes)
                .map_err(|err| ProviderError::Decode(format!("{path}: {err}")));
        }

        let (error_code, message) = match resp.json::<ErrorBody>().await {
            Ok(body) => (body.error_code, body.error_message),
            Err(_) => (String::new(), "provider error".to_string()),
        };
        tracing::warn!(
            path,
            status = status.as_u16(),
            error_code = %error_code,
            "provider request failed"
        );
        Err(ProviderError::Api {
            status: status.as_u16(),
            error_code,
            message,
        })
    }
}

#[async_trait]
impl LedgerProvider for PlaidClient {
    async fn create_link_token(
        &self,
        client_user_id: &str,
        redirect_uri: Option<&str>,
    ) -> Result<LinkToken, ProviderError> {
        let request = LinkTokenRequest {
            client_name: &self.config.client_name,
            language: &self.config.language,
            country_codes: &self.config.country_codes,
            user: LinkTokenUser { client_user_id },
            products: ["transactions"],
            redirect_uri: redirect_uri.filter(|uri| !uri.is_empty()),
        };
        self.post_json("/link/token/create", &request).await
    }

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<TokenExchange, ProviderError> {
        self.post_json(
            "/item/public_token/exchange",
            &PublicTokenRequest { public_token },
        )
        .await
    }

    async fn accounts(
        &self,
        access_token: &SecretString,
    ) -> Result<Vec<ProviderAccount>, ProviderError> {
        let resp: AccountsResponse = self
            .post_json(
                "/accounts/get",
                &AccessTokenRequest {
                    access_token: access_token.expose_secret(),
                },
            )
            .await?;
        Ok(resp.accounts)
    }

    async fn institution_name(&self, institution_id: &str) -> Result<String, ProviderError> {
        let resp: InstitutionResponse = self
            .post_json(
                "/institutions/get_by_id",
                &InstitutionRequest {
                    institution_id,
                    country_codes: &self.config.country_codes,
                },
            )
            .await?;
        Ok(resp.institution.name)
    }

    async fn sync_transactions(
        &self,
        access_token: &SecretString,
        cursor: Option<&str>,
    ) -> Result<SyncPage, ProviderError> {
        self.post_json(
            "/transactions/sync",
            &SyncRequest::new(access_token.expose_secret(), cursor),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::json;

    use super::*;

    /// Serves `body` with `status` on `/transactions/sync` and returns the
    /// base URL.
    async fn stub_provider(status: StatusCode, body: serde_json::Value) -> String {
        let app = Router::new().route(
            "/transactions/sync",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: Option<&str>) -> PlaidClient {
        let mut config = PlaidConfig::new(
            "client",
            SecretString::new("secret".to_string()),
            Environment::Sandbox,
        );
        config.base_url = base_url.map(ToString::to_string);
        PlaidClient::new(Client::new(), config)
    }

    #[test]
    fn sync_request_omits_missing_or_blank_cursor() {
        let body = serde_json::to_value(SyncRequest::new("token", None)).unwrap();
        assert!(body.get("cursor").is_none());

        let body = serde_json::to_value(SyncRequest::new("token", Some(""))).unwrap();
        assert!(body.get("cursor").is_none());

        let body = serde_json::to_value(SyncRequest::new("token", Some("c1"))).unwrap();
        assert_eq!(body["cursor"], "c1");
    }

    #[test]
    fn url_uses_environment_or_override() {
        assert_eq!(
            client(None).url("/transactions/sync"),
            "https://sandbox.plaid.com/transactions/sync"
        );
        assert_eq!(
            client(Some("http://127.0.0.1:9000/")).url("/accounts/get"),
            "http://127.0.0.1:9000/accounts/get"
        );
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let rendered = format!("{:?}", client(None));
        assert!(!rendered.contains("\"secret\""));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_network_error() {
        let client = client(Some("http://127.0.0.1:9"));
        let err = client
            .sync_transactions(&SecretString::new("token".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[tokio::test]
    async fn error_body_becomes_api_error() {
        let base = stub_provider(
            StatusCode::BAD_REQUEST,
            json!({
                "error_type": "ITEM_ERROR",
                "error_code": "ITEM_LOGIN_REQUIRED",
                "error_message": "the login details of this item have changed",
            }),
        )
        .await;

        let err = client(Some(&base))
            .sync_transactions(&SecretString::new("token".to_string()), Some("c1"))
            .await
            .unwrap_err();

        match err {
            ProviderError::Api {
                status,
                error_code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(error_code, "ITEM_LOGIN_REQUIRED");
                assert_eq!(message, "the login details of this item have changed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sync_response_is_decoded_into_a_page() {
        let base = stub_provider(
            StatusCode::OK,
            json!({
                "added": [{
                    "transaction_id": "tx-1",
                    "account_id": "acc-a",
                    "amount": 12.34,
                    "date": "2026-03-01",
                    "name": "Coffee",
                    "merchant_name": "",
                    "pending": true,
                    "payment_channel": "in store",
                }],
                "modified": [],
                "removed": [{ "transaction_id": "tx-0" }],
                "next_cursor": "c2",
                "has_more": true,
            }),
        )
        .await;

        let page = client(Some(&base))
            .sync_transactions(&SecretString::new("token".to_string()), None)
            .await
            .unwrap();

        assert_eq!(page.next_cursor, "c2");
        assert!(page.has_more);
        assert!(page.modified.is_empty());
        assert_eq!(page.removed[0].transaction_id, "tx-0");

        assert_eq!(page.added.len(), 1);
        let tx = &page.added[0];
        assert_eq!(tx.transaction_id, "tx-1");
        assert_eq!(tx.account_id, "acc-a");
        assert_eq!(tx.amount, 12.34);
        assert!(tx.pending);
        assert_eq!(tx.merchant_name, None);
        assert!(tx.counterparties.is_empty());
    }
}
