//! Transfer documents: locally recorded transfers between linked banks.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, UserID, bank::BankId};

pub type TransferId = i64;

/// A transfer that was accepted by the funds-transfer network.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub id: TransferId,
    /// The note entered by the sender.
    pub name: String,
    /// The amount in dollars, always positive.
    pub amount: f64,
    pub channel: String,
    pub category: String,
    pub sender_id: UserID,
    pub receiver_id: UserID,
    pub sender_bank_id: BankId,
    pub receiver_bank_id: BankId,
    /// The recipient's email address.
    pub email: String,
    /// The URL of the transfer on the funds-transfer network.
    pub transfer_url: String,
    pub created_at: OffsetDateTime,
}

/// The data needed to record a transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    pub name: String,
    pub amount: f64,
    pub sender_id: UserID,
    pub receiver_id: UserID,
    pub sender_bank_id: BankId,
    pub receiver_bank_id: BankId,
    pub email: String,
    pub transfer_url: String,
}

pub const TRANSFER_CHANNEL: &str = "online";
pub const TRANSFER_CATEGORY: &str = "Transfer";

pub fn create_transfer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transfer (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            channel TEXT NOT NULL,
            category TEXT NOT NULL,
            sender_id INTEGER NOT NULL,
            receiver_id INTEGER NOT NULL,
            sender_bank_id INTEGER NOT NULL,
            receiver_bank_id INTEGER NOT NULL,
            email TEXT NOT NULL,
            transfer_url TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(sender_bank_id) REFERENCES bank(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(receiver_bank_id) REFERENCES bank(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transfer_sender_bank ON transfer(sender_bank_id)",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transfer_receiver_bank ON transfer(receiver_bank_id)",
        (),
    )?;

    Ok(())
}

/// Record a transfer created now.
pub fn insert_transfer(new_transfer: NewTransfer, connection: &Connection) -> Result<Transfer, Error> {
    let now = OffsetDateTime::now_utc();
    // Whole seconds so the timestamp reads back unchanged.
    let created_at = now.replace_nanosecond(0).unwrap_or(now);

    connection.execute(
        "INSERT INTO transfer (name, amount, channel, category, sender_id, receiver_id,
            sender_bank_id, receiver_bank_id, email, transfer_url, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            new_transfer.name,
            new_transfer.amount,
            TRANSFER_CHANNEL,
            TRANSFER_CATEGORY,
            new_transfer.sender_id.as_i64(),
            new_transfer.receiver_id.as_i64(),
            new_transfer.sender_bank_id,
            new_transfer.receiver_bank_id,
            new_transfer.email,
            new_transfer.transfer_url,
            created_at,
        ],
    )?;

    Ok(Transfer {
        id: connection.last_insert_rowid(),
        name: new_transfer.name,
        amount: new_transfer.amount,
        channel: TRANSFER_CHANNEL.to_owned(),
        category: TRANSFER_CATEGORY.to_owned(),
        sender_id: new_transfer.sender_id,
        receiver_id: new_transfer.receiver_id,
        sender_bank_id: new_transfer.sender_bank_id,
        receiver_bank_id: new_transfer.receiver_bank_id,
        email: new_transfer.email,
        transfer_url: new_transfer.transfer_url,
        created_at,
    })
}

fn map_row_to_transfer(row: &Row) -> Result<Transfer, rusqlite::Error> {
    Ok(Transfer {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        channel: row.get(3)?,
        category: row.get(4)?,
        sender_id: UserID::new(row.get(5)?),
        receiver_id: UserID::new(row.get(6)?),
        sender_bank_id: row.get(7)?,
        receiver_bank_id: row.get(8)?,
        email: row.get(9)?,
        transfer_url: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Get the transfers sent from or received by `bank_id`, newest first.
pub fn get_transfers_for_bank(
    bank_id: BankId,
    connection: &Connection,
) -> Result<Vec<Transfer>, Error> {
    connection
        .prepare(
            "SELECT id, name, amount, channel, category, sender_id, receiver_id,
                sender_bank_id, receiver_bank_id, email, transfer_url, created_at
            FROM transfer
            WHERE sender_bank_id = ?1 OR receiver_bank_id = ?1
            ORDER BY created_at DESC, id DESC",
        )?
        .query_map([bank_id], map_row_to_transfer)?
        .map(|transfer| transfer.map_err(Error::from))
        .collect()
}
