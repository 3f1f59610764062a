//! The sign-in page and the handler for sign-in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, ValidatedPassword,
    auth::{invalidate_auth_cookie, redirect::normalize_redirect_url, set_auth_cookie},
    endpoints,
    html::{FormField, auth_layout, base, link, submit_button},
    user::get_user_by_email,
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";
pub const INVALID_EMAIL_ERROR_MSG: &str = "Invalid email address";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// One optional error message per sign-in field.
#[derive(Debug, Default)]
struct SignInErrors {
    email: Option<String>,
    password: Option<String>,
}

impl SignInErrors {
    fn password(message: &str) -> Self {
        Self {
            password: Some(message.to_owned()),
            ..Default::default()
        }
    }
}

fn sign_in_form(email: &str, errors: &SignInErrors, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_IN_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="flex flex-col gap-4"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (FormField {
                name: "email",
                label: "Email",
                placeholder: "Enter your email",
                input_type: "email",
                value: email,
                error: errors.email.as_deref(),
                required: true,
            }.into_html())

            (FormField {
                name: "password",
                label: "Password",
                placeholder: "Enter your password",
                input_type: "password",
                value: "",
                error: errors.password.as_deref(),
                required: true,
            }.into_html())

            (submit_button("Sign In"))

            p class="text-sm text-center text-gray-600 dark:text-gray-400"
            {
                "Don't have an account? "
                (link(endpoints::SIGN_UP_VIEW, "Sign up"))
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the sign-in page.
pub async fn get_sign_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "sign-in query");
    let form = sign_in_form("", &SignInErrors::default(), redirect_url.as_deref());
    let content = auth_layout("Sign In", "Please enter your details", &form);

    base("Sign In", &[], &content).into_response()
}

/// The state needed to sign a user in.
#[derive(Debug, Clone)]
pub struct SignInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignInState> for Key {
    fn from_ref(state: &SignInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data entered by the user in the sign-in form.
#[derive(Clone, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    /// Optional URL to redirect to after signing in.
    pub redirect_url: Option<String>,
}

/// Check the email format and password length before touching the database.
fn validate_form(form: &SignInForm) -> Option<SignInErrors> {
    let email = (!EmailAddress::is_valid(form.email.trim()))
        .then(|| INVALID_EMAIL_ERROR_MSG.to_owned());
    let password = ValidatedPassword::new(&form.password)
        .err()
        .map(|error| error.to_string());

    (email.is_some() || password.is_some()).then_some(SignInErrors { email, password })
}

fn verify_credentials(state: &SignInState, form: &SignInForm) -> Result<crate::User, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_email(form.email.trim(), &connection) {
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            result => result?,
        }
    };

    match user.password_hash.verify(&form.password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}

/// Handler for sign-in requests via the POST method.
///
/// On success the auth cookie is set and the client is redirected to the
/// requested page or the home page. Otherwise the form is returned with an
/// error message.
pub async fn post_sign_in(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    Form(form): Form<SignInForm>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "sign-in form");
    let redirect_url = redirect_url.as_deref();

    if let Some(errors) = validate_form(&form) {
        return sign_in_form(&form.email, &errors, redirect_url).into_response();
    }

    let user = match verify_credentials(&state, &form) {
        Ok(user) => user,
        Err(Error::InvalidCredentials) => {
            let errors = SignInErrors::password(INVALID_CREDENTIALS_ERROR_MSG);
            return sign_in_form(&form.email, &errors, redirect_url).into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            let errors = SignInErrors::password(INTERNAL_ERROR_MSG);
            return sign_in_form(&form.email, &errors, redirect_url).into_response();
        }
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::ROOT);

    set_auth_cookie(jar.clone(), user.id, state.cookie_duration)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}


#[cfg(test)]
mod sign_in_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        auth::cookie::COOKIE_TOKEN,
        endpoints,
        test_utils::{FakeBankData, FakeTransfers, test_app_state},
        user::{insert_user, user_tests::new_user},
    };

    use scraper::{Html, Selector};

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, INVALID_EMAIL_ERROR_MSG, SignInState, post_sign_in,
    };

    const PASSWORD: &str = "correct horse";

    fn insert_user_with_password(email: &str, connection: &Connection) {
        let mut user = new_user(email);
        user.password_hash = PasswordHash::from_raw_password(PASSWORD, 4).unwrap();
        insert_user(user, connection).unwrap();
    }

    fn get_test_server() -> TestServer {
        let state = test_app_state(FakeBankData::default(), FakeTransfers::default());
        insert_user_with_password("jane@example.com", &state.db_connection.lock().unwrap());
        let state: SignInState = axum::extract::FromRef::from_ref(&state);

        let app = Router::new()
            .route(endpoints::SIGN_IN_API, post(post_sign_in))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn sign_in_succeeds_with_valid_credentials() {
        let server = get_test_server();

        let response = server
            .post(endpoints::SIGN_IN_API)
            .form(&[("email", "jane@example.com"), ("password", PASSWORD)])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::ROOT);
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[tokio::test]
    async fn email_is_case_insensitive() {
        let server = get_test_server();

        let response = server
            .post(endpoints::SIGN_IN_API)
            .form(&[("email", "Jane@Example.com"), ("password", PASSWORD)])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn sign_in_redirects_to_requested_url() {
        let server = get_test_server();
        let redirect_url = "/transaction-history?id=abc&page=2";

        let response = server
            .post(endpoints::SIGN_IN_API)
            .form(&[
                ("email", "jane@example.com"),
                ("password", PASSWORD),
                ("redirect_url", redirect_url),
            ])
            .await;

        assert_eq!(response.header("hx-redirect"), redirect_url);
    }

    #[tokio::test]
    async fn wrong_password_shows_error() {
        let server = get_test_server();

        let response = server
            .post(endpoints::SIGN_IN_API)
            .form(&[("email", "jane@example.com"), ("password", "wrong password")])
            .await;

        response.assert_status_ok();
        response.assert_text_contains(INVALID_CREDENTIALS_ERROR_MSG);
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
    }

    #[tokio::test]
    async fn unknown_email_shows_same_error() {
        let server = get_test_server();

        let response = server
            .post(endpoints::SIGN_IN_API)
            .form(&[("email", "john@example.com"), ("password", PASSWORD)])
            .await;

        response.assert_status_ok();
        response.assert_text_contains(INVALID_CREDENTIALS_ERROR_MSG);
    }

    fn field_error(text: &str, name: &str) -> Option<String> {
        let html = Html::parse_fragment(text);
        let selector = Selector::parse(&format!("input[name={name}] + p")).unwrap();

        html.select(&selector)
            .next()
            .map(|p| p.text().collect::<String>())
    }

    #[tokio::test]
    async fn malformed_fields_show_errors_under_inputs() {
        let server = get_test_server();

        let response = server
            .post(endpoints::SIGN_IN_API)
            .form(&[("email", "not-an-email"), ("password", "short")])
            .await;

        response.assert_status_ok();
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
        let text = response.text();
        assert_eq!(
            field_error(&text, "email").as_deref(),
            Some(INVALID_EMAIL_ERROR_MSG)
        );
        assert_eq!(
            field_error(&text, "password").as_deref(),
            Some("password must be at least 8 characters long")
        );
        assert!(!text.contains(INVALID_CREDENTIALS_ERROR_MSG));
    }

    #[tokio::test]
    async fn short_password_is_rejected_before_lookup() {
        let server = get_test_server();

        let response = server
            .post(endpoints::SIGN_IN_API)
            .form(&[("email", "jane@example.com"), ("password", "short")])
            .await;

        response.assert_status_ok();
        let text = response.text();
        assert!(field_error(&text, "email").is_none());
        assert!(field_error(&text, "password").is_some());
        assert!(!text.contains(INVALID_CREDENTIALS_ERROR_MSG));
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let server = get_test_server();

        server
            .post(endpoints::SIGN_IN_API)
            .form(&[("email", "jane@example.com")])
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
