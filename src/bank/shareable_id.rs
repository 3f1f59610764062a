//! Shareable IDs are what a user gives to others so they can send them money.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::Error;

/// Encode an aggregator account ID as a shareable ID.
pub fn encrypt_id(account_id: &str) -> String {
    STANDARD.encode(account_id)
}

/// Decode a shareable ID back into the aggregator account ID.
///
/// # Errors
///
/// Returns [Error::InvalidShareableId] if `shareable_id` is not standard
/// base64 or does not decode to UTF-8 text.
pub fn decrypt_id(shareable_id: &str) -> Result<String, Error> {
    let bytes = STANDARD
        .decode(shareable_id.trim())
        .map_err(|_| Error::InvalidShareableId)?;

    String::from_utf8(bytes).map_err(|_| Error::InvalidShareableId)
}
