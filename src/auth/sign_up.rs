//! The sign-up page and the handler that creates users.
//!
//! A user is only written to the database once the funds-transfer network
//! has accepted them as a customer, so a failed sign-up leaves nothing behind.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Duration, macros::format_description};

use crate::{
    AppState, Error, PasswordHash,
    auth::{
        set_auth_cookie,
        sign_up_form::{SignUpErrors, SignUpForm, ValidatedSignUp},
    },
    endpoints,
    html::{FormField, auth_layout, base, link, submit_button},
    internal_server_error::get_internal_server_error_redirect,
    services::{NewCustomer, ServiceError, TransferClient, extract_customer_id_from_url},
    user::{NewUser, User, get_user_by_email, insert_user},
};

pub const DUPLICATE_EMAIL_ERROR_MSG: &str = "An account with this email already exists.";

fn field<'a>(
    name: &'a str,
    label: &'a str,
    placeholder: &'a str,
    value: &'a str,
    error: &'a Option<String>,
    required: bool,
) -> Markup {
    FormField {
        name,
        label,
        placeholder,
        input_type: "text",
        value,
        error: error.as_deref(),
        required,
    }
    .into_html()
}

/// The SSN and password are never echoed back.
fn sign_up_form(form: &SignUpForm, errors: &SignUpErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="flex flex-col gap-4"
        {
            div class="flex gap-4"
            {
                (field("first_name", "First Name", "Enter your first name", &form.first_name, &errors.first_name, true))
                (field("last_name", "Last Name", "Enter your last name", &form.last_name, &errors.last_name, true))
            }

            (field("address1", "Address", "Enter your specific address", &form.address1, &errors.address1, false))
            (field("city", "City", "Enter your city", &form.city, &errors.city, false))

            div class="flex gap-4"
            {
                (field("state", "State", "Example: NY", &form.state, &errors.state, true))
                (field("postal_code", "Postal Code", "Example: 11101", &form.postal_code, &errors.postal_code, true))
            }

            div class="flex gap-4"
            {
                (field("date_of_birth", "Date of Birth", "YYYY-MM-DD", &form.date_of_birth, &errors.date_of_birth, true))
                (field("ssn", "SSN", "Example: 123-45-6789", "", &errors.ssn, true))
            }

            (FormField {
                name: "email",
                label: "Email",
                placeholder: "Enter your email",
                input_type: "email",
                value: &form.email,
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

            (submit_button("Sign Up"))

            p class="text-sm text-center text-gray-600 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::SIGN_IN_VIEW, "Sign in"))
            }
        }
    }
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    let form = sign_up_form(&SignUpForm::default(), &SignUpErrors::default());
    let content = auth_layout("Sign Up", "Please enter your details", &form);

    base("Sign Up", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
    /// Creates the payment customer for new users.
    pub transfers: Arc<dyn TransferClient>,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
            transfers: state.transfers.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignUpState> for Key {
    fn from_ref(state: &SignUpState) -> Self {
        state.cookie_key.clone()
    }
}

fn is_email_taken(email: &str, db_connection: &Mutex<Connection>) -> Result<bool, Error> {
    let connection = db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    match get_user_by_email(email, &connection) {
        Ok(_) => Ok(true),
        Err(Error::NotFound) => Ok(false),
        Err(error) => Err(error),
    }
}

fn new_customer(sign_up: &ValidatedSignUp) -> NewCustomer {
    let date_of_birth = sign_up
        .date_of_birth
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default();

    NewCustomer {
        first_name: sign_up.first_name.clone(),
        last_name: sign_up.last_name.clone(),
        email: sign_up.email.clone(),
        address1: sign_up.address1.clone(),
        city: sign_up.city.clone(),
        state: sign_up.state.clone(),
        postal_code: sign_up.postal_code.clone(),
        date_of_birth,
        ssn: sign_up.ssn.clone(),
    }
}

/// Create the payment customer and then the user.
async fn create_user(
    state: &SignUpState,
    sign_up: ValidatedSignUp,
    password_hash: PasswordHash,
) -> Result<User, Error> {
    let customer_url = state
        .transfers
        .create_customer(&new_customer(&sign_up))
        .await?;
    let customer_id = extract_customer_id_from_url(&customer_url)
        .ok_or(ServiceError::MissingField {
            service: "Dwolla",
            what: "a customer ID in the customer URL",
        })?
        .to_owned();

    let new_user = NewUser {
        email: sign_up.email,
        first_name: sign_up.first_name,
        last_name: sign_up.last_name,
        address1: sign_up.address1,
        city: sign_up.city,
        state: sign_up.state,
        postal_code: sign_up.postal_code,
        date_of_birth: sign_up.date_of_birth,
        dwolla_customer_url: customer_url,
        dwolla_customer_id: customer_id,
        password_hash,
    };

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    insert_user(new_user, &connection)
}

/// Handler for sign-up requests via the POST method.
///
/// Invalid fields re-render the form with messages under each field.
/// Failures from the funds-transfer network are shown as an alert.
/// On success the user is signed in and sent to the link-account page.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    jar: PrivateCookieJar,
    Form(form): Form<SignUpForm>,
) -> Response {
    let sign_up = match form.validate() {
        Ok(sign_up) => sign_up,
        Err(errors) => return sign_up_form(&form, &errors).into_response(),
    };

    let duplicate_email_form = || {
        sign_up_form(
            &form,
            &SignUpErrors {
                email: Some(DUPLICATE_EMAIL_ERROR_MSG.to_owned()),
                ..Default::default()
            },
        )
        .into_response()
    };

    match is_email_taken(&sign_up.email, &state.db_connection) {
        Ok(false) => {}
        Ok(true) => return duplicate_email_form(),
        Err(error) => {
            tracing::error!("Could not check whether the email is registered: {error}");
            return error.into_alert_response();
        }
    }

    let password_hash =
        match PasswordHash::new(sign_up.password.clone(), PasswordHash::DEFAULT_COST) {
            Ok(hash) => hash,
            Err(error) => {
                tracing::error!("an error occurred while hashing a password: {error}");
                return get_internal_server_error_redirect();
            }
        };

    let user = match create_user(&state, sign_up, password_hash).await {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => return duplicate_email_form(),
        Err(error) => {
            tracing::error!("Could not sign up user: {error}");
            return error.into_alert_response();
        }
    };

    tracing::info!("Created user {} with customer {}", user.id, user.dwolla_customer_id);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::LINK_ACCOUNT_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}
