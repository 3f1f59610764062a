//! Finishes linking a bank: turns the public token from the browser into a
//! bank document with a funding source on the funds-transfer network.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    Error, User, UserID,
    auth::get_logged_in_user,
    bank::{Bank, BankState, NewBank, encrypt_id, insert_bank},
    endpoints,
    services::{FundingSourceRequest, ServiceError},
};

#[derive(Debug, Deserialize)]
pub struct ExchangeForm {
    /// The public token returned by the bank-linking flow.
    pub public_token: String,
}

/// Exchange the public token, add the account as a funding source and save the bank.
///
/// External resources created before a failing step are not cleaned up.
async fn exchange_public_token(
    state: &BankState,
    public_token: &str,
    user: &User,
) -> Result<Bank, Error> {
    let item = state.bank_data.exchange_public_token(public_token).await?;

    let account = state
        .bank_data
        .get_accounts(&item.access_token)
        .await?
        .into_iter()
        .next()
        .ok_or(ServiceError::MissingField {
            service: "Plaid",
            what: "accounts",
        })?;

    let processor_token = state
        .bank_data
        .create_processor_token(&item.access_token, &account.account_id)
        .await?;

    let funding_source_url = state
        .transfers
        .add_funding_source(&FundingSourceRequest {
            customer_id: user.dwolla_customer_id.clone(),
            processor_token,
            bank_name: account.name,
        })
        .await?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    insert_bank(
        NewBank {
            user_id: user.id,
            bank_id: item.item_id,
            shareable_id: encrypt_id(&account.account_id),
            account_id: account.account_id,
            access_token: item.access_token,
            funding_source_url,
        },
        &connection,
    )
}

/// A route handler for linking a bank, redirects to the home page on success.
pub async fn exchange_public_token_endpoint(
    State(state): State<BankState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExchangeForm>,
) -> Response {
    let user = match get_logged_in_user(user_id, &state.db_connection) {
        Ok(user) => user,
        Err(error) => return error.into_alert_response(),
    };

    match exchange_public_token(&state, &form.public_token, &user).await {
        Ok(bank) => {
            tracing::info!(
                public_token_exchange = "complete",
                "User {} linked bank {}",
                user.id,
                bank.id
            );
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::ROOT.to_owned()),
                (),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not exchange public token for user {}: {error}", user.id);
            error.into_alert_response()
        }
    }
}
