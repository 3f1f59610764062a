//! Linked bank accounts: linking, storage and display.

mod accounts;
mod card;
pub(crate) mod core;
mod exchange_endpoint;
mod link_page;
mod my_banks_page;
mod selector;
mod shareable_id;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    AppState,
    services::{BankDataClient, TransferClient},
};

pub use accounts::{Account, AccountsSummary, get_accounts};
pub use card::bank_card;
pub use core::{
    Bank, BankId, NewBank, create_bank_table, get_bank, get_bank_by_account_id, get_banks,
    insert_bank,
};
pub use exchange_endpoint::exchange_public_token_endpoint;
pub use link_page::get_link_account_page;
pub use my_banks_page::get_my_banks_page;
pub use selector::{bank_tabs, select_bank};
pub use shareable_id::{decrypt_id, encrypt_id};

/// The state needed by the bank pages and endpoints.
#[derive(Debug, Clone)]
pub struct BankState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub bank_data: Arc<dyn BankDataClient>,
    pub transfers: Arc<dyn TransferClient>,
}

impl FromRef<AppState> for BankState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            bank_data: state.bank_data.clone(),
            transfers: state.transfers.clone(),
        }
    }
}
