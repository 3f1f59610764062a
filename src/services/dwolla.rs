//! Client for the funds-transfer network (Dwolla API).
//!
//! Requests are authenticated with an OAuth client-credentials token that is
//! fetched on first use and reused until shortly before it expires.
//! Created resources are identified by the URL in the `Location` header.

use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{ServiceError, error_for_status, http_client};

const SERVICE: &str = "Dwolla";
const HAL_JSON: &str = "application/vnd.dwolla.v1.hal+json";
/// Tokens are refreshed this long before they actually expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The details of a new personal payment customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    /// The customer's first name.
    pub first_name: String,
    /// The customer's last name.
    pub last_name: String,
    /// The customer's email address.
    pub email: String,
    /// The first line of the customer's street address.
    pub address1: String,
    /// The customer's city.
    pub city: String,
    /// The two-letter state abbreviation.
    pub state: String,
    /// The five-digit postal code.
    pub postal_code: String,
    /// The date of birth formatted as "YYYY-MM-DD".
    pub date_of_birth: String,
    /// The social security number.
    pub ssn: String,
}

/// The details needed to attach a bank account to a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingSourceRequest {
    /// The ID of the customer that owns the account.
    pub customer_id: String,
    /// The processor token issued by the bank-data aggregator.
    pub processor_token: String,
    /// The display name of the funding source.
    pub bank_name: String,
}

/// The details of a transfer between two funding sources.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    /// The URL of the funding source the money comes from.
    pub source_funding_source_url: String,
    /// The URL of the funding source the money goes to.
    pub destination_funding_source_url: String,
    /// The amount in US dollars.
    pub amount: f64,
}

/// The operations Walletly needs from the funds-transfer network.
#[async_trait]
pub trait TransferClient: Debug + Send + Sync {
    /// Create a personal customer and return the customer's URL.
    async fn create_customer(&self, customer: &NewCustomer) -> Result<String, ServiceError>;

    /// Attach a bank account to a customer and return the funding source URL.
    async fn add_funding_source(
        &self,
        request: &FundingSourceRequest,
    ) -> Result<String, ServiceError>;

    /// Start a transfer and return the transfer URL.
    async fn create_transfer(&self, request: &TransferRequest) -> Result<String, ServiceError>;
}

/// Get the customer ID from a customer URL, i.e. the last path segment.
///
/// Returns `None` if the URL has no non-empty last segment.
pub fn extract_customer_id_from_url(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
}

/// Settings for [DwollaClient].
#[derive(Debug, Clone)]
pub struct DwollaConfig {
    /// The API base URL, e.g. "https://api-sandbox.dwolla.com".
    pub base_url: String,
    /// The application key.
    pub key: String,
    /// The application secret.
    pub secret: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// A [TransferClient] that talks to the Dwolla API over HTTP.
#[derive(Debug)]
pub struct DwollaClient {
    config: DwollaConfig,
    http: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct Link {
    href: String,
}

#[derive(Deserialize)]
struct SelfLinks {
    #[serde(rename = "self")]
    self_link: Link,
}

#[derive(Deserialize)]
struct OnDemandAuthorization {
    #[serde(rename = "_links")]
    links: SelfLinks,
}

#[derive(Serialize)]
struct LinkOut<'a> {
    href: &'a str,
}

#[derive(Serialize)]
struct FundingSourceLinks<'a> {
    #[serde(rename = "on-demand-authorization")]
    on_demand_authorization: LinkOut<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FundingSourceBody<'a> {
    plaid_token: &'a str,
    name: &'a str,
    #[serde(rename = "_links")]
    links: FundingSourceLinks<'a>,
}

#[derive(Serialize)]
struct TransferLinks<'a> {
    source: LinkOut<'a>,
    destination: LinkOut<'a>,
}

#[derive(Serialize)]
struct Amount {
    currency: &'static str,
    value: String,
}

#[derive(Serialize)]
struct TransferBody<'a> {
    #[serde(rename = "_links")]
    links: TransferLinks<'a>,
    amount: Amount,
}

#[derive(Serialize)]
struct CustomerBody<'a> {
    #[serde(flatten)]
    customer: &'a NewCustomer,
    #[serde(rename = "type")]
    customer_type: &'static str,
}

impl DwollaClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: DwollaConfig) -> Result<Self, ServiceError> {
        let http = http_client().map_err(|error| ServiceError::http(SERVICE, error))?;

        Ok(Self {
            config,
            http,
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn access_token(&self) -> Result<String, ServiceError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.access_token.clone());
        }

        tracing::debug!("Requesting new {SERVICE} access token");
        let response = self
            .http
            .post(self.url("/token"))
            .basic_auth(&self.config.key, Some(&self.config.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|error| ServiceError::http(SERVICE, error))?;
        let response: TokenResponse = error_for_status(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|error| ServiceError::http(SERVICE, error))?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(response.access_token)
    }

    async fn post(
        &self,
        url: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<reqwest::Response, ServiceError> {
        let token = self.access_token().await?;

        tracing::debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(ACCEPT, HAL_JSON)
            .header(CONTENT_TYPE, HAL_JSON)
            .body(serde_json::to_vec(body).map_err(|error| ServiceError::Http {
                service: SERVICE,
                message: error.to_string(),
            })?)
            .send()
            .await
            .map_err(|error| ServiceError::http(SERVICE, error))?;

        error_for_status(SERVICE, response).await
    }

    async fn post_for_location(
        &self,
        url: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<String, ServiceError> {
        let response = self.post(url, body).await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or(ServiceError::MissingField {
                service: SERVICE,
                what: "the Location header",
            })
    }
}

#[async_trait]
impl TransferClient for DwollaClient {
    async fn create_customer(&self, customer: &NewCustomer) -> Result<String, ServiceError> {
        self.post_for_location(
            &self.url("/customers"),
            &CustomerBody {
                customer,
                customer_type: "personal",
            },
        )
        .await
    }

    async fn add_funding_source(
        &self,
        request: &FundingSourceRequest,
    ) -> Result<String, ServiceError> {
        let authorization: OnDemandAuthorization = self
            .post(&self.url("/on-demand-authorizations"), &serde_json::json!({}))
            .await?
            .json()
            .await
            .map_err(|error| ServiceError::http(SERVICE, error))?;

        let url = self.url(&format!("/customers/{}/funding-sources", request.customer_id));
        let body = FundingSourceBody {
            plaid_token: &request.processor_token,
            name: &request.bank_name,
            links: FundingSourceLinks {
                on_demand_authorization: LinkOut {
                    href: &authorization.links.self_link.href,
                },
            },
        };

        self.post_for_location(&url, &body).await
    }

    async fn create_transfer(&self, request: &TransferRequest) -> Result<String, ServiceError> {
        let body = TransferBody {
            links: TransferLinks {
                source: LinkOut {
                    href: &request.source_funding_source_url,
                },
                destination: LinkOut {
                    href: &request.destination_funding_source_url,
                },
            },
            amount: Amount {
                currency: "USD",
                value: format!("{:.2}", request.amount),
            },
        };

        self.post_for_location(&self.url("/transfers"), &body).await
    }
}

#[cfg(test)]
mod extract_customer_id_tests {
    use super::extract_customer_id_from_url;

    #[test]
    fn returns_last_path_segment() {
        assert_eq!(
            extract_customer_id_from_url("https://api-sandbox.dwolla.com/customers/abc-123"),
            Some("abc-123")
        );
    }

    #[test]
    fn ignores_trailing_slash() {
        assert_eq!(
            extract_customer_id_from_url("https://api-sandbox.dwolla.com/customers/abc-123/"),
            Some("abc-123")
        );
    }

    #[test]
    fn rejects_url_without_path() {
        assert_eq!(extract_customer_id_from_url("https://"), None);
        assert_eq!(extract_customer_id_from_url(""), None);
    }
}

#[cfg(test)]
mod dwolla_client_tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use crate::services::ServiceError;

    use super::{
        DwollaClient, DwollaConfig, FundingSourceRequest, NewCustomer, TransferClient,
        TransferRequest,
    };

    async fn mount_token(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "token-1",
                "token_type": "bearer",
                "expires_in": 3600
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn new_client(server: &MockServer) -> DwollaClient {
        DwollaClient::new(DwollaConfig {
            base_url: server.uri(),
            key: "key".to_owned(),
            secret: "secret".to_owned(),
        })
        .expect("Could not create Dwolla client")
    }

    fn customer() -> NewCustomer {
        NewCustomer {
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            email: "jane@example.com".to_owned(),
            address1: "1 Main St".to_owned(),
            city: "Springfield".to_owned(),
            state: "NY".to_owned(),
            postal_code: "11101".to_owned(),
            date_of_birth: "1990-01-01".to_owned(),
            ssn: "123-45-6789".to_owned(),
        }
    }

    #[tokio::test]
    async fn create_customer_returns_location() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .and(header("authorization", "Bearer token-1"))
            .and(body_partial_json(json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "type": "personal",
                "postalCode": "11101",
                "dateOfBirth": "1990-01-01",
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", "https://dwolla.test/customers/cust-1"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = new_client(&server).create_customer(&customer()).await.unwrap();

        assert_eq!(url, "https://dwolla.test/customers/cust-1");
    }

    #[tokio::test]
    async fn token_is_reused_between_requests() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", "https://dwolla.test/customers/cust-1"),
            )
            .expect(2)
            .mount(&server)
            .await;
        let client = new_client(&server);

        client.create_customer(&customer()).await.unwrap();
        client.create_customer(&customer()).await.unwrap();
    }

    #[tokio::test]
    async fn missing_location_is_an_error() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let result = new_client(&server).create_customer(&customer()).await;

        assert_eq!(
            result,
            Err(ServiceError::MissingField {
                service: "Dwolla",
                what: "the Location header",
            })
        );
    }

    #[tokio::test]
    async fn add_funding_source_uses_on_demand_authorization() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/on-demand-authorizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_links": { "self": { "href": "https://dwolla.test/on-demand-authorizations/oda-1" } },
                "bodyText": "I agree",
                "buttonText": "Agree"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/customers/cust-1/funding-sources"))
            .and(body_partial_json(json!({
                "plaidToken": "processor-1",
                "name": "Plaid Checking",
                "_links": {
                    "on-demand-authorization": {
                        "href": "https://dwolla.test/on-demand-authorizations/oda-1"
                    }
                }
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", "https://dwolla.test/funding-sources/fs-1"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = new_client(&server)
            .add_funding_source(&FundingSourceRequest {
                customer_id: "cust-1".to_owned(),
                processor_token: "processor-1".to_owned(),
                bank_name: "Plaid Checking".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(url, "https://dwolla.test/funding-sources/fs-1");
    }

    #[tokio::test]
    async fn create_transfer_sends_amount_in_dollars() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/transfers"))
            .and(body_partial_json(json!({
                "_links": {
                    "source": { "href": "https://dwolla.test/funding-sources/a" },
                    "destination": { "href": "https://dwolla.test/funding-sources/b" }
                },
                "amount": { "currency": "USD", "value": "12.50" }
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", "https://dwolla.test/transfers/tr-1"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = new_client(&server)
            .create_transfer(&TransferRequest {
                source_funding_source_url: "https://dwolla.test/funding-sources/a".to_owned(),
                destination_funding_source_url: "https://dwolla.test/funding-sources/b".to_owned(),
                amount: 12.5,
            })
            .await
            .unwrap();

        assert_eq!(url, "https://dwolla.test/transfers/tr-1");
    }

    #[tokio::test]
    async fn rejected_transfer_is_an_api_error() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/transfers"))
            .respond_with(ResponseTemplate::new(400).set_body_string("InsufficientFunds"))
            .mount(&server)
            .await;

        let result = new_client(&server)
            .create_transfer(&TransferRequest {
                source_funding_source_url: "a".to_owned(),
                destination_funding_source_url: "b".to_owned(),
                amount: 1.0,
            })
            .await;

        assert_eq!(
            result,
            Err(ServiceError::Api {
                service: "Dwolla",
                status: 400,
                body: "InsufficientFunds".to_owned(),
            })
        );
    }
}
