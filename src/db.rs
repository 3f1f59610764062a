//! Sets up the application's SQLite database.

use rusqlite::Connection;

use crate::{
    Error, bank::create_bank_table, transfer::create_transfer_table, user::create_user_table,
};

/// Create the tables for the domain models if they do not exist.
///
/// Also turns on foreign key enforcement for `connection`.
///
/// # Errors
///
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;
    create_user_table(&transaction)?;
    create_bank_table(&transaction)?;
    create_transfer_table(&transaction)?;
    transaction.commit()?;

    Ok(())
}
