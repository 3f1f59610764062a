//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    alert::Alert, endpoints, internal_server_error::InternalServerError, not_found::NotFoundError,
    services::ServiceError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The session cookie could not be read or has expired.
    #[error("the session is invalid or has expired")]
    SessionExpired,

    /// The user provided a password that is shorter than the minimum length.
    #[error("password must be at least {0} characters long")]
    PasswordTooShort(usize),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// A user with the email address already exists.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The bank account has already been linked.
    #[error("the bank account has already been linked")]
    DuplicateBank,

    /// The user has not linked any bank accounts.
    #[error("no bank accounts have been linked")]
    NoBankAccounts,

    /// The shareable ID could not be decoded.
    #[error("the shareable ID is invalid")]
    InvalidShareableId,

    /// The shareable ID does not belong to a linked bank account.
    #[error("no bank account matches the shareable ID")]
    RecipientNotFound,

    /// The source and destination of a transfer are the same bank account.
    #[error("cannot transfer money to the same bank account")]
    SelfTransfer,

    /// A transfer amount was zero, negative or not a number.
    #[error("the amount {0} is not a positive number")]
    InvalidAmount(String),

    /// An external service failed.
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("bank.account_id") =>
            {
                Error::DuplicateBank
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::CookieMissing | Error::SessionExpired => {
                Redirect::to(endpoints::SIGN_IN_VIEW).into_response()
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::Service(error) => {
                tracing::error!("An external service failed: {error}");
                InternalServerError {
                    description: "Could not reach your bank",
                    fix: "One of our banking partners did not respond. Try again in a few minutes.",
                }
                .into_response()
            }
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::DuplicateBank => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Bank already linked".to_owned(),
                    details: "This bank account has already been linked to a Walletly account."
                        .to_owned(),
                },
            ),
            Error::NoBankAccounts => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "No bank accounts".to_owned(),
                    details: "Link a bank account before transferring money.".to_owned(),
                },
            ),
            Error::InvalidShareableId => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid sharable ID".to_owned(),
                    details: "Check the recipient's sharable ID and try again.".to_owned(),
                },
            ),
            Error::RecipientNotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Recipient not found".to_owned(),
                    details: "No bank account matches the sharable ID.".to_owned(),
                },
            ),
            Error::SelfTransfer => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid recipient".to_owned(),
                    details: "The source and recipient bank accounts must be different."
                        .to_owned(),
                },
            ),
            Error::InvalidEmail(email) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid email address".to_owned(),
                    details: format!("{email} is not a valid email address."),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!("{amount} is not a valid amount. Enter a positive number."),
                },
            ),
            Error::Service(error) => {
                tracing::error!("An external service failed: {error}");
                (
                    StatusCode::BAD_GATEWAY,
                    Alert::Error {
                        message: "Could not reach your bank".to_owned(),
                        details: "One of our banking partners did not respond. \
                            Try again in a few minutes."
                            .to_owned(),
                    },
                )
            }
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The requested resource could not be found.".to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
