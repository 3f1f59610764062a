//! Client for the bank-data aggregator (Plaid API).
//!
//! All requests are JSON `POST`s with the client credentials in the body.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ServiceError, error_for_status, http_client};

const SERVICE: &str = "Plaid";

/// The products requested when creating a link token.
const LINK_PRODUCTS: [&str; 1] = ["auth"];
const LINK_COUNTRY_CODES: [&str; 1] = ["US"];
const LINK_LANGUAGE: &str = "en";
/// The processor that processor tokens are created for.
const PROCESSOR: &str = "dwolla";

/// Upper bound on `/transactions/sync` pages fetched in one call.
const MAX_SYNC_PAGES: usize = 20;

/// The details needed to create a link token for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTokenRequest {
    /// The ID that the aggregator should associate with the user.
    pub client_user_id: String,
    /// The name shown to the user in the bank-linking flow.
    pub client_name: String,
}

/// The result of exchanging a public token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemAccess {
    /// The token for accessing the linked item's data.
    pub access_token: String,
    /// The ID of the linked item (a login at a bank).
    pub item_id: String,
}

/// A bank account as reported by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountData {
    /// The aggregator's ID for the account.
    pub account_id: String,
    /// The account name.
    pub name: String,
    /// The official name given by the bank.
    pub official_name: Option<String>,
    /// The last digits of the account number.
    pub mask: Option<String>,
    /// The current balance.
    pub current_balance: f64,
    /// The available balance, if the bank reports one.
    pub available_balance: Option<f64>,
    /// e.g. "depository".
    pub account_type: String,
    /// e.g. "checking".
    pub subtype: Option<String>,
    /// The ID of the bank the account is held at.
    pub institution_id: Option<String>,
}

/// A transaction as reported by the aggregator.
///
/// Amounts follow the aggregator's convention: positive amounts are money
/// leaving the account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionData {
    /// The aggregator's ID for the transaction.
    pub transaction_id: String,
    /// The account the transaction belongs to.
    pub account_id: String,
    /// The merchant or description.
    pub name: String,
    /// The amount, positive for debits.
    pub amount: f64,
    /// The date formatted as "YYYY-MM-DD".
    pub date: String,
    /// Legacy category hierarchy, most general first.
    #[serde(default)]
    pub category: Option<Vec<String>>,
    /// The personal finance category.
    #[serde(default)]
    pub personal_finance_category: Option<PersonalFinanceCategory>,
    /// e.g. "online", "in store".
    pub payment_channel: String,
    /// Whether the transaction has not settled yet.
    #[serde(default)]
    pub pending: bool,
}

/// The personal finance category of a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonalFinanceCategory {
    /// e.g. "FOOD_AND_DRINK".
    pub primary: String,
}

impl TransactionData {
    /// The most general category of the transaction, or an empty string.
    pub fn primary_category(&self) -> String {
        self.category
            .as_ref()
            .and_then(|categories| categories.first().cloned())
            .or_else(|| {
                self.personal_finance_category
                    .as_ref()
                    .map(|category| category.primary.clone())
            })
            .unwrap_or_default()
    }
}

/// The operations Walletly needs from the bank-data aggregator.
#[async_trait]
pub trait BankDataClient: Debug + Send + Sync {
    /// Create a short-lived token that starts the bank-linking flow in the browser.
    async fn create_link_token(&self, request: &LinkTokenRequest) -> Result<String, ServiceError>;

    /// Exchange the public token from a finished bank-linking flow for an access token.
    async fn exchange_public_token(&self, public_token: &str) -> Result<ItemAccess, ServiceError>;

    /// Get the accounts of a linked item.
    async fn get_accounts(&self, access_token: &str) -> Result<Vec<AccountData>, ServiceError>;

    /// Create a token that lets the funds-transfer network access an account.
    async fn create_processor_token(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<String, ServiceError>;

    /// Get all transactions of a linked item.
    async fn get_transactions(
        &self,
        access_token: &str,
    ) -> Result<Vec<TransactionData>, ServiceError>;
}

/// Settings for [PlaidClient].
#[derive(Debug, Clone)]
pub struct PlaidConfig {
    /// The API base URL, e.g. "https://sandbox.plaid.com".
    pub base_url: String,
    /// The client ID.
    pub client_id: String,
    /// The client secret.
    pub secret: String,
}

/// A [BankDataClient] that talks to the Plaid API over HTTP.
#[derive(Debug, Clone)]
pub struct PlaidClient {
    config: PlaidConfig,
    http: reqwest::Client,
}

impl PlaidClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: PlaidConfig) -> Result<Self, ServiceError> {
        let http = http_client().map_err(|error| ServiceError::http(SERVICE, error))?;

        Ok(Self { config, http })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let request = Authenticated {
            client_id: &self.config.client_id,
            secret: &self.config.secret,
            body,
        };

        tracing::debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|error| ServiceError::http(SERVICE, error))?;

        error_for_status(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|error| ServiceError::http(SERVICE, error))
    }
}

/// Wraps a request body with the client credentials.
#[derive(Serialize)]
struct Authenticated<'a, B> {
    client_id: &'a str,
    secret: &'a str,
    #[serde(flatten)]
    body: &'a B,
}

#[derive(Serialize)]
struct LinkTokenUser<'a> {
    client_user_id: &'a str,
}

#[derive(Serialize)]
struct LinkTokenCreateBody<'a> {
    user: LinkTokenUser<'a>,
    client_name: &'a str,
    products: [&'static str; 1],
    language: &'static str,
    country_codes: [&'static str; 1],
}

#[derive(Deserialize)]
struct LinkTokenCreateResponse {
    link_token: String,
}

#[derive(Serialize)]
struct PublicTokenBody<'a> {
    public_token: &'a str,
}

#[derive(Serialize)]
struct AccessTokenBody<'a> {
    access_token: &'a str,
}

#[derive(Deserialize)]
struct AccountsGetResponse {
    accounts: Vec<RawAccount>,
    item: RawItem,
}

#[derive(Deserialize)]
struct RawItem {
    institution_id: Option<String>,
}

#[derive(Deserialize)]
struct RawAccount {
    account_id: String,
    balances: RawBalances,
    mask: Option<String>,
    name: String,
    official_name: Option<String>,
    #[serde(rename = "type")]
    account_type: String,
    subtype: Option<String>,
}

#[derive(Deserialize)]
struct RawBalances {
    available: Option<f64>,
    current: Option<f64>,
}

#[derive(Serialize)]
struct ProcessorTokenBody<'a> {
    access_token: &'a str,
    account_id: &'a str,
    processor: &'static str,
}

#[derive(Deserialize)]
struct ProcessorTokenResponse {
    processor_token: String,
}

#[derive(Serialize)]
struct TransactionsSyncBody<'a> {
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
}

#[derive(Deserialize)]
struct TransactionsSyncResponse {
    added: Vec<TransactionData>,
    next_cursor: String,
    has_more: bool,
}

#[async_trait]
impl BankDataClient for PlaidClient {
    async fn create_link_token(&self, request: &LinkTokenRequest) -> Result<String, ServiceError> {
        let body = LinkTokenCreateBody {
            user: LinkTokenUser {
                client_user_id: &request.client_user_id,
            },
            client_name: &request.client_name,
            products: LINK_PRODUCTS,
            language: LINK_LANGUAGE,
            country_codes: LINK_COUNTRY_CODES,
        };

        let response: LinkTokenCreateResponse = self.post("/link/token/create", &body).await?;

        Ok(response.link_token)
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<ItemAccess, ServiceError> {
        self.post(
            "/item/public_token/exchange",
            &PublicTokenBody { public_token },
        )
        .await
    }

    async fn get_accounts(&self, access_token: &str) -> Result<Vec<AccountData>, ServiceError> {
        let response: AccountsGetResponse = self
            .post("/accounts/get", &AccessTokenBody { access_token })
            .await?;
        let institution_id = response.item.institution_id;

        Ok(response
            .accounts
            .into_iter()
            .map(|account| AccountData {
                account_id: account.account_id,
                name: account.name,
                official_name: account.official_name,
                mask: account.mask,
                current_balance: account.balances.current.unwrap_or(0.0),
                available_balance: account.balances.available,
                account_type: account.account_type,
                subtype: account.subtype,
                institution_id: institution_id.clone(),
            })
            .collect())
    }

    async fn create_processor_token(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<String, ServiceError> {
        let response: ProcessorTokenResponse = self
            .post(
                "/processor/token/create",
                &ProcessorTokenBody {
                    access_token,
                    account_id,
                    processor: PROCESSOR,
                },
            )
            .await?;

        Ok(response.processor_token)
    }

    async fn get_transactions(
        &self,
        access_token: &str,
    ) -> Result<Vec<TransactionData>, ServiceError> {
        let mut transactions = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_SYNC_PAGES {
            let response: TransactionsSyncResponse = self
                .post(
                    "/transactions/sync",
                    &TransactionsSyncBody {
                        access_token,
                        cursor: cursor.as_deref(),
                    },
                )
                .await?;

            transactions.extend(response.added);

            if !response.has_more {
                return Ok(transactions);
            }

            cursor = Some(response.next_cursor);
        }

        tracing::warn!(
            "Stopped syncing transactions after {MAX_SYNC_PAGES} pages, \
            returning {} transactions",
            transactions.len()
        );

        Ok(transactions)
    }
}

#[cfg(test)]
mod plaid_client_tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, method, path},
    };

    use crate::services::ServiceError;

    use super::{BankDataClient, LinkTokenRequest, PlaidClient, PlaidConfig};

    fn new_client(server: &MockServer) -> PlaidClient {
        PlaidClient::new(PlaidConfig {
            base_url: server.uri(),
            client_id: "client-id".to_owned(),
            secret: "secret".to_owned(),
        })
        .expect("Could not create Plaid client")
    }

    #[tokio::test]
    async fn create_link_token_sends_credentials_and_link_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/link/token/create"))
            .and(body_partial_json(json!({
                "client_id": "client-id",
                "secret": "secret",
                "user": { "client_user_id": "42" },
                "client_name": "Jane Doe",
                "products": ["auth"],
                "language": "en",
                "country_codes": ["US"],
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "link_token": "link-123" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = new_client(&server)
            .create_link_token(&LinkTokenRequest {
                client_user_id: "42".to_owned(),
                client_name: "Jane Doe".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(token, "link-123");
    }

    #[tokio::test]
    async fn get_accounts_maps_balances_and_institution() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/get"))
            .and(body_partial_json(json!({ "access_token": "access-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accounts": [{
                    "account_id": "acc-1",
                    "balances": { "available": 100.5, "current": 110.25 },
                    "mask": "0000",
                    "name": "Plaid Checking",
                    "official_name": "Plaid Gold Standard 0% Interest Checking",
                    "type": "depository",
                    "subtype": "checking"
                }],
                "item": { "institution_id": "ins_109508", "item_id": "item-1" }
            })))
            .mount(&server)
            .await;

        let accounts = new_client(&server).get_accounts("access-1").await.unwrap();

        assert_eq!(accounts.len(), 1);
        let account = &accounts[0];
        assert_eq!(account.account_id, "acc-1");
        assert_eq!(account.current_balance, 110.25);
        assert_eq!(account.available_balance, Some(100.5));
        assert_eq!(account.mask.as_deref(), Some("0000"));
        assert_eq!(account.institution_id.as_deref(), Some("ins_109508"));
    }

    #[tokio::test]
    async fn create_processor_token_requests_token_for_transfer_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/processor/token/create"))
            .and(body_partial_json(json!({
                "access_token": "access-1",
                "account_id": "acc-1",
                "processor": "dwolla",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "processor_token": "processor-1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = new_client(&server)
            .create_processor_token("access-1", "acc-1")
            .await
            .unwrap();

        assert_eq!(token, "processor-1");
    }

    #[tokio::test]
    async fn get_transactions_follows_cursor_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transactions/sync"))
            .and(body_partial_json(json!({ "cursor": "page-2" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "added": [{
                    "transaction_id": "t-2",
                    "account_id": "acc-1",
                    "name": "Uber",
                    "amount": 5.4,
                    "date": "2024-03-02",
                    "category": ["Travel", "Taxi"],
                    "payment_channel": "online",
                    "pending": false
                }],
                "next_cursor": "page-3",
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/transactions/sync"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "added": [{
                    "transaction_id": "t-1",
                    "account_id": "acc-1",
                    "name": "Starbucks",
                    "amount": 4.33,
                    "date": "2024-03-01",
                    "personal_finance_category": { "primary": "FOOD_AND_DRINK" },
                    "payment_channel": "in store"
                }],
                "next_cursor": "page-2",
                "has_more": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transactions = new_client(&server)
            .get_transactions("access-1")
            .await
            .unwrap();

        let ids: Vec<_> = transactions
            .iter()
            .map(|transaction| transaction.transaction_id.as_str())
            .collect();
        assert_eq!(ids, ["t-1", "t-2"]);
        assert_eq!(transactions[0].primary_category(), "FOOD_AND_DRINK");
        assert_eq!(transactions[1].primary_category(), "Travel");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/item/public_token/exchange"))
            .respond_with(ResponseTemplate::new(400).set_body_string("INVALID_PUBLIC_TOKEN"))
            .mount(&server)
            .await;

        let result = new_client(&server).exchange_public_token("bad").await;

        assert_eq!(
            result,
            Err(ServiceError::Api {
                service: "Plaid",
                status: 400,
                body: "INVALID_PUBLIC_TOKEN".to_owned(),
            })
        );
    }
}
