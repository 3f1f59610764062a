//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The social security number given at sign-up is sent to the funds-transfer
/// network and is never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's email address, unique across users.
    pub email: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The first line of the user's street address.
    pub address1: String,
    /// The user's city.
    pub city: String,
    /// The two-letter state abbreviation.
    pub state: String,
    /// The five-digit postal code.
    pub postal_code: String,
    /// The user's date of birth.
    pub date_of_birth: Date,
    /// The URL of the user's payment customer.
    pub dwolla_customer_url: String,
    /// The ID of the user's payment customer.
    pub dwolla_customer_id: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

impl User {
    /// The user's full name, e.g. "Jane Doe".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The data needed to insert a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: Date,
    pub dwolla_customer_url: String,
    pub dwolla_customer_id: String,
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                address1 TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                postal_code TEXT NOT NULL,
                date_of_birth TEXT NOT NULL,
                dwolla_customer_url TEXT NOT NULL,
                dwolla_customer_id TEXT NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateEmail] if a user with the same email already exists.
/// - [Error::SqlError] if another SQL related error occurred.
pub fn insert_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (
            email, first_name, last_name, address1, city, state, postal_code,
            date_of_birth, dwolla_customer_url, dwolla_customer_id, password
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            new_user.email,
            new_user.first_name,
            new_user.last_name,
            new_user.address1,
            new_user.city,
            new_user.state,
            new_user.postal_code,
            new_user.date_of_birth,
            new_user.dwolla_customer_url,
            new_user.dwolla_customer_id,
            new_user.password_hash.as_ref(),
        ],
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: new_user.email,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        address1: new_user.address1,
        city: new_user.city,
        state: new_user.state,
        postal_code: new_user.postal_code,
        date_of_birth: new_user.date_of_birth,
        dwolla_customer_url: new_user.dwolla_customer_url,
        dwolla_customer_id: new_user.dwolla_customer_id,
        password_hash: new_user.password_hash,
    })
}

const SELECT_USER: &str = "SELECT id, email, first_name, last_name, address1, city, state,
    postal_code, date_of_birth, dwolla_customer_url, dwolla_customer_id, password FROM user";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(11)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        address1: row.get(4)?,
        city: row.get(5)?,
        state: row.get(6)?,
        postal_code: row.get(7)?,
        date_of_birth: row.get(8)?,
        dwolla_customer_url: row.get(9)?,
        dwolla_customer_id: row.get(10)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`.
///
/// Emails are compared case-insensitively.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has the email address.
pub fn get_user_by_email(email: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE email = :email COLLATE NOCASE"))?
        .query_row(&[(":email", email)], map_user_row)
        .map_err(|error| error.into())
}
