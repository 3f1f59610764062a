use std::sync::Mutex;

use rusqlite::Connection;

use crate::{Error, User, UserID, user::get_user_by_id};

/// Get the user that owns the current session.
///
/// `user_id` is the ID the auth middleware put into the request extensions.
///
/// # Errors
///
/// Returns:
/// - [Error::SessionExpired] if the user no longer exists.
/// - [Error::DatabaseLockError] if the database lock is poisoned.
pub fn get_logged_in_user(user_id: UserID, db_connection: &Mutex<Connection>) -> Result<User, Error> {
    let connection = db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    match get_user_by_id(user_id, &connection) {
        Err(Error::NotFound) => {
            tracing::warn!("session belongs to user {user_id} who no longer exists");
            Err(Error::SessionExpired)
        }
        result => result,
    }
}
