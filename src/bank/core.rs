//! Bank documents: a linked bank account and the tokens needed to use it.

use rusqlite::{Connection, Row};

use crate::{Error, UserID};

pub type BankId = i64;

/// A bank account linked by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Bank {
    pub id: BankId,
    /// The user that linked the account.
    pub user_id: UserID,
    /// The aggregator's ID for the bank login (an "item").
    pub bank_id: String,
    /// The aggregator's ID for the account.
    pub account_id: String,
    /// The token for reading the account's data from the aggregator.
    pub access_token: String,
    /// The funding source for the account on the funds-transfer network.
    pub funding_source_url: String,
    /// The ID that other users use to send money to this account.
    pub shareable_id: String,
}

/// The data needed to insert a bank.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBank {
    pub user_id: UserID,
    pub bank_id: String,
    pub account_id: String,
    pub access_token: String,
    pub funding_source_url: String,
    pub shareable_id: String,
}

pub fn create_bank_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS bank (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            bank_id TEXT NOT NULL,
            account_id TEXT NOT NULL UNIQUE,
            access_token TEXT NOT NULL,
            funding_source_url TEXT NOT NULL,
            shareable_id TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Insert a bank document.
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateBank] if the account has already been linked.
/// - [Error::SqlError] if another SQL related error occurred.
pub fn insert_bank(new_bank: NewBank, connection: &Connection) -> Result<Bank, Error> {
    connection.execute(
        "INSERT INTO bank (user_id, bank_id, account_id, access_token, funding_source_url, shareable_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            new_bank.user_id.as_i64(),
            &new_bank.bank_id,
            &new_bank.account_id,
            &new_bank.access_token,
            &new_bank.funding_source_url,
            &new_bank.shareable_id,
        ),
    )?;

    Ok(Bank {
        id: connection.last_insert_rowid(),
        user_id: new_bank.user_id,
        bank_id: new_bank.bank_id,
        account_id: new_bank.account_id,
        access_token: new_bank.access_token,
        funding_source_url: new_bank.funding_source_url,
        shareable_id: new_bank.shareable_id,
    })
}

const SELECT_BANK: &str = "SELECT id, user_id, bank_id, account_id, access_token, \
    funding_source_url, shareable_id FROM bank";

fn map_row_to_bank(row: &Row) -> Result<Bank, rusqlite::Error> {
    Ok(Bank {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        bank_id: row.get(2)?,
        account_id: row.get(3)?,
        access_token: row.get(4)?,
        funding_source_url: row.get(5)?,
        shareable_id: row.get(6)?,
    })
}

/// Get the banks linked by `user_id` in the order they were linked.
pub fn get_banks(user_id: UserID, connection: &Connection) -> Result<Vec<Bank>, Error> {
    connection
        .prepare(&format!("{SELECT_BANK} WHERE user_id = ?1 ORDER BY id"))?
        .query_map([user_id.as_i64()], map_row_to_bank)?
        .map(|bank| bank.map_err(Error::from))
        .collect()
}

/// Get a bank by its ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no bank with the ID.
pub fn get_bank(id: BankId, connection: &Connection) -> Result<Bank, Error> {
    connection
        .prepare(&format!("{SELECT_BANK} WHERE id = ?1"))?
        .query_row([id], map_row_to_bank)
        .map_err(Error::from)
}

/// Get the bank linked to the aggregator account `account_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the account has not been linked.
pub fn get_bank_by_account_id(account_id: &str, connection: &Connection) -> Result<Bank, Error> {
    connection
        .prepare(&format!("{SELECT_BANK} WHERE account_id = ?1"))?
        .query_row([account_id], map_row_to_bank)
        .map_err(Error::from)
}
