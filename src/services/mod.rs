//! Clients for the third-party services Walletly delegates to.
//!
//! - [plaid]: the bank-data aggregator that issues bank-linking tokens and
//!   serves account balances and transactions.
//! - [dwolla]: the funds-transfer network that holds payment customers,
//!   their funding sources and the transfers between them.
//!
//! Each service sits behind a trait so that route handlers can be exercised
//! with in-process fakes.

pub mod dwolla;
pub mod plaid;

use std::time::Duration;

pub use dwolla::{
    DwollaClient, DwollaConfig, FundingSourceRequest, NewCustomer, TransferClient,
    TransferRequest, extract_customer_id_from_url,
};
pub use plaid::{
    AccountData, BankDataClient, ItemAccess, LinkTokenRequest, PlaidClient, PlaidConfig,
    TransactionData,
};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_ERROR_BODY_CHARS: usize = 512;

/// The errors that may occur when talking to an external service.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ServiceError {
    /// The request could not be sent or the response could not be read.
    #[error("could not reach {service}: {message}")]
    Http {
        /// The name of the service, e.g. "Plaid".
        service: &'static str,
        /// The error reported by the HTTP client.
        message: String,
    },

    /// The service responded with a non-success status code.
    #[error("{service} responded with status {status}: {body}")]
    Api {
        /// The name of the service, e.g. "Plaid".
        service: &'static str,
        /// The HTTP status code.
        status: u16,
        /// The (truncated) response body.
        body: String,
    },

    /// The response was missing something the caller needs.
    #[error("{service} response is missing {what}")]
    MissingField {
        /// The name of the service, e.g. "Plaid".
        service: &'static str,
        /// A description of the missing field.
        what: &'static str,
    },
}

impl ServiceError {
    pub(crate) fn http(service: &'static str, error: reqwest::Error) -> Self {
        Self::Http {
            service,
            message: error.to_string(),
        }
    }
}

/// Build the HTTP client shared by the service clients.
pub(crate) fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Turn a non-success response into a [ServiceError::Api].
pub(crate) async fn error_for_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    tracing::error!("{service} responded with {status}: {body}");

    Err(ServiceError::Api {
        service,
        status: status.as_u16(),
        body,
    })
}
