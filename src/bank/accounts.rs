//! Account balances fetched live from the bank-data aggregator.

use crate::{
    Error,
    bank::{Bank, BankId},
    services::{AccountData, BankDataClient, ServiceError},
};

/// A snapshot of a linked account for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The aggregator's ID for the account.
    pub id: String,
    pub name: String,
    pub official_name: Option<String>,
    /// The last digits of the account number.
    pub mask: Option<String>,
    pub institution_id: Option<String>,
    pub current_balance: f64,
    pub available_balance: Option<f64>,
    pub account_type: String,
    pub subtype: Option<String>,
    pub shareable_id: String,
    /// The ID of the bank document the account belongs to.
    pub bank_row_id: BankId,
}

impl Account {
    fn new(data: AccountData, bank: &Bank) -> Self {
        Self {
            id: data.account_id,
            name: data.name,
            official_name: data.official_name,
            mask: data.mask,
            institution_id: data.institution_id,
            current_balance: data.current_balance,
            available_balance: data.available_balance,
            account_type: data.account_type,
            subtype: data.subtype,
            shareable_id: bank.shareable_id.clone(),
            bank_row_id: bank.id,
        }
    }
}

/// The accounts of a user and their combined balance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccountsSummary {
    pub accounts: Vec<Account>,
    pub total_banks: usize,
    pub total_current_balance: f64,
}

/// Get the account behind `bank` from the aggregator.
///
/// # Errors
///
/// Returns a [ServiceError] if the aggregator fails or reports no accounts.
pub async fn get_account(bank: &Bank, client: &dyn BankDataClient) -> Result<Account, Error> {
    let accounts = client.get_accounts(&bank.access_token).await?;

    let mut linked = None;
    let mut first = None;
    for account in accounts {
        if account.account_id == bank.account_id {
            linked = Some(account);
            break;
        }
        if first.is_none() {
            first = Some(account);
        }
    }

    linked
        .or(first)
        .map(|data| Account::new(data, bank))
        .ok_or_else(|| {
            ServiceError::MissingField {
                service: "Plaid",
                what: "accounts",
            }
            .into()
        })
}

/// Get the accounts for every bank in `banks` and total their balances.
///
/// # Errors
///
/// Fails if any of the accounts cannot be fetched.
pub async fn get_accounts(
    banks: &[Bank],
    client: &dyn BankDataClient,
) -> Result<AccountsSummary, Error> {
    let mut accounts = Vec::with_capacity(banks.len());

    for bank in banks {
        accounts.push(get_account(bank, client).await?);
    }

    let total_current_balance = accounts
        .iter()
        .map(|account| account.current_balance)
        .sum();

    Ok(AccountsSummary {
        total_banks: accounts.len(),
        total_current_balance,
        accounts,
    })
}
