//! In-process stand-ins for the external service clients.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::{
    AppState, PaginationConfig,
    services::{
        AccountData, BankDataClient, FundingSourceRequest, ItemAccess, LinkTokenRequest,
        NewCustomer, ServiceError, TransactionData, TransferClient, TransferRequest,
    },
};

pub(crate) const FAKE_LINK_TOKEN: &str = "link-sandbox-token";
pub(crate) const FAKE_CUSTOMER_URL: &str = "https://dwolla.test/customers/cust-123";

fn unavailable(service: &'static str) -> ServiceError {
    ServiceError::Api {
        service,
        status: 503,
        body: "unavailable".to_owned(),
    }
}

pub(crate) fn test_account(account_id: &str, current_balance: f64) -> AccountData {
    AccountData {
        account_id: account_id.to_owned(),
        name: "Plaid Checking".to_owned(),
        official_name: Some("Plaid Gold Standard 0% Interest Checking".to_owned()),
        mask: Some("0000".to_owned()),
        current_balance,
        available_balance: Some(current_balance),
        account_type: "depository".to_owned(),
        subtype: Some("checking".to_owned()),
        institution_id: Some("ins_109508".to_owned()),
    }
}

pub(crate) fn test_transaction(id: &str, name: &str, amount: f64, date: &str) -> TransactionData {
    TransactionData {
        transaction_id: id.to_owned(),
        account_id: "acc-1".to_owned(),
        name: name.to_owned(),
        amount,
        date: date.to_owned(),
        category: Some(vec!["Food and Drink".to_owned()]),
        personal_finance_category: None,
        payment_channel: "online".to_owned(),
        pending: false,
    }
}

/// A bank-data aggregator that hands out canned data.
///
/// Every access token maps to the same accounts and transactions.
#[derive(Debug, Default)]
pub(crate) struct FakeBankData {
    pub accounts: Vec<AccountData>,
    pub transactions: Vec<TransactionData>,
    pub fail: bool,
    pub link_token_requests: Mutex<Vec<LinkTokenRequest>>,
    pub processor_token_requests: Mutex<Vec<(String, String)>>,
}

impl FakeBankData {
    pub(crate) fn with_accounts(accounts: Vec<AccountData>) -> Self {
        Self {
            accounts,
            ..Default::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.fail {
            Err(unavailable("Plaid"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BankDataClient for FakeBankData {
    async fn create_link_token(&self, request: &LinkTokenRequest) -> Result<String, ServiceError> {
        self.check()?;
        self.link_token_requests
            .lock()
            .unwrap()
            .push(request.clone());

        Ok(FAKE_LINK_TOKEN.to_owned())
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<ItemAccess, ServiceError> {
        self.check()?;

        Ok(ItemAccess {
            access_token: format!("access-{public_token}"),
            item_id: format!("item-{public_token}"),
        })
    }

    async fn get_accounts(&self, _access_token: &str) -> Result<Vec<AccountData>, ServiceError> {
        self.check()?;

        Ok(self.accounts.clone())
    }

    async fn create_processor_token(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<String, ServiceError> {
        self.check()?;
        self.processor_token_requests
            .lock()
            .unwrap()
            .push((access_token.to_owned(), account_id.to_owned()));

        Ok(format!("processor-{account_id}"))
    }

    async fn get_transactions(
        &self,
        _access_token: &str,
    ) -> Result<Vec<TransactionData>, ServiceError> {
        self.check()?;

        Ok(self.transactions.clone())
    }
}

/// A funds-transfer network that records what it was asked to do.
#[derive(Debug, Default)]
pub(crate) struct FakeTransfers {
    pub fail: bool,
    /// Fail only when adding funding sources.
    pub fail_funding_sources: bool,
    pub customers: Mutex<Vec<NewCustomer>>,
    pub funding_sources: Mutex<Vec<FundingSourceRequest>>,
    pub transfers: Mutex<Vec<TransferRequest>>,
}

impl FakeTransfers {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl TransferClient for FakeTransfers {
    async fn create_customer(&self, customer: &NewCustomer) -> Result<String, ServiceError> {
        if self.fail {
            return Err(unavailable("Dwolla"));
        }
        self.customers.lock().unwrap().push(customer.clone());

        Ok(FAKE_CUSTOMER_URL.to_owned())
    }

    async fn add_funding_source(
        &self,
        request: &FundingSourceRequest,
    ) -> Result<String, ServiceError> {
        if self.fail || self.fail_funding_sources {
            return Err(unavailable("Dwolla"));
        }
        self.funding_sources.lock().unwrap().push(request.clone());

        Ok(format!(
            "https://dwolla.test/funding-sources/fs-{}",
            request.processor_token
        ))
    }

    async fn create_transfer(&self, request: &TransferRequest) -> Result<String, ServiceError> {
        if self.fail {
            return Err(unavailable("Dwolla"));
        }
        let mut transfers = self.transfers.lock().unwrap();
        transfers.push(request.clone());

        Ok(format!("https://dwolla.test/transfers/t-{}", transfers.len()))
    }
}

/// App state backed by an in-memory database and the given fakes.
pub(crate) fn test_app_state(bank_data: FakeBankData, transfers: FakeTransfers) -> AppState {
    test_app_state_with_fakes(Arc::new(bank_data), Arc::new(transfers))
}

/// Like [test_app_state], but lets the caller keep handles to the fakes.
pub(crate) fn test_app_state_with_fakes(
    bank_data: Arc<FakeBankData>,
    transfers: Arc<FakeTransfers>,
) -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(
        connection,
        "foobar",
        "Etc/UTC",
        PaginationConfig::default(),
        bank_data,
        transfers,
    )
    .expect("Could not create app state")
}
