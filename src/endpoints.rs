//! The API endpoints URIs.
//!
//! Pages that show one bank at a time take the bank in the query string,
//! see [with_bank].

use crate::bank::BankId;

/// The home page for signed in users.
pub const ROOT: &str = "/";
/// The page for signing in.
pub const SIGN_IN_VIEW: &str = "/sign-in";
/// The page for signing up.
pub const SIGN_UP_VIEW: &str = "/sign-up";
/// The page for linking a bank account.
pub const LINK_ACCOUNT_VIEW: &str = "/link-account";
/// The page listing the user's linked bank accounts.
pub const MY_BANKS_VIEW: &str = "/my-banks";
/// The page listing the transactions of one bank account.
pub const TRANSACTION_HISTORY_VIEW: &str = "/transaction-history";
/// The page for sending money to another bank account.
pub const TRANSFER_VIEW: &str = "/payment-transfer";
/// The page to display when an unexpected error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The directory that static files are served from.
pub const STATIC: &str = "/static";

/// The route for signing in.
pub const SIGN_IN_API: &str = "/api/sign-in";
/// The route for creating users.
pub const USERS: &str = "/api/users";
/// The route for signing out.
pub const SIGN_OUT: &str = "/api/sign-out";
/// The route that finishes linking a bank account.
pub const EXCHANGE_PUBLIC_TOKEN: &str = "/api/exchange-public-token";
/// The route for creating transfers.
pub const TRANSFERS_API: &str = "/api/transfers";

/// Append the bank selection and page number to `endpoint`.
pub fn with_bank(endpoint: &str, bank: BankId, page: Option<u64>) -> String {
    match page {
        Some(page) => format!("{endpoint}?id={bank}&page={page}"),
        None => format!("{endpoint}?id={bank}"),
    }
}
