//! Reading and writing the session cookie.
//!
//! The cookie holds a JSON [Token] and is encrypted by [PrivateCookieJar],
//! so its contents can be trusted once decrypted.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserID, auth::Token};

/// The name of the session cookie.
pub(crate) const COOKIE_TOKEN: &str = "walletly-session";
/// The default duration for which sessions are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

fn session_cookie(value: String, expiry: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((COOKIE_TOKEN, value))
        .path("/")
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add a session cookie for `user_id` that expires `duration` from now.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the token cannot be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    set_token(
        jar,
        Token {
            user_id,
            expires_at: OffsetDateTime::now_utc() + duration,
        },
    )
}

fn set_token(jar: PrivateCookieJar, token: Token) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(session_cookie(value, token.expires_at)))
}

/// Overwrite the session cookie with an expired one so the browser deletes it.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = session_cookie("deleted".to_owned(), OffsetDateTime::UNIX_EPOCH);
    cookie.set_max_age(Duration::ZERO);

    jar.add(cookie)
}

/// Get the session token from the cookie jar.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no session cookie.
/// - [Error::SessionExpired] if the cookie cannot be read or the session has ended.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::SessionExpired)?;

    if token.is_expired() {
        return Err(Error::SessionExpired);
    }

    Ok(token)
}

/// Push the session expiry out to at least `duration` from now.
///
/// Sessions that already last longer, e.g. "remember me" sessions, are left alone.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or(Error::SessionExpired)?;

    set_token(
        jar,
        Token {
            user_id: token.user_id,
            expires_at: max(token.expires_at, new_expiry),
        },
    )
}
