//! Creates a transfer between the user's bank and a recipient's bank.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use serde::Deserialize;

use crate::{
    Error, User, UserID,
    auth::get_logged_in_user,
    bank::{Bank, BankId, BankState, decrypt_id, get_bank, get_bank_by_account_id, get_banks},
    endpoints,
    services::TransferRequest,
    transfer::{NewTransfer, Transfer, insert_transfer},
};

/// The data entered by the user in the transfer form.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferForm {
    /// The ID of the bank to send the money from.
    pub source_bank: BankId,
    /// The recipient's shareable ID.
    pub shareable_id: String,
    /// The amount in dollars, kept as text so bad input can be echoed back.
    pub amount: String,
    /// A short note describing the transfer.
    pub name: String,
    /// The recipient's email address.
    pub email: String,
}

/// Parse a dollar amount of at least one cent with at most two decimal places.
fn parse_amount(amount: &str) -> Result<f64, Error> {
    let invalid = || Error::InvalidAmount(amount.to_owned());
    let value = amount.trim().parse::<f64>().map_err(|_| invalid())?;

    if !value.is_finite() {
        return Err(invalid());
    }

    let cents = (value * 100.0).round();
    if cents < 1.0 || (value * 100.0 - cents).abs() > 1e-6 {
        return Err(invalid());
    }

    Ok(cents / 100.0)
}

/// Check the form against the database and find the source and recipient banks.
fn find_banks(form: &TransferForm, user: &User, state: &BankState) -> Result<(Bank, Bank), Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    if get_banks(user.id, &connection)?.is_empty() {
        return Err(Error::NoBankAccounts);
    }

    let source = get_bank(form.source_bank, &connection)?;
    if source.user_id != user.id {
        return Err(Error::NotFound);
    }

    let account_id = decrypt_id(&form.shareable_id)?;
    let recipient = match get_bank_by_account_id(&account_id, &connection) {
        Err(Error::NotFound) => return Err(Error::RecipientNotFound),
        result => result?,
    };

    if recipient.id == source.id {
        return Err(Error::SelfTransfer);
    }

    Ok((source, recipient))
}

async fn create_transfer(
    state: &BankState,
    user: &User,
    form: &TransferForm,
) -> Result<Transfer, Error> {
    let amount = parse_amount(&form.amount)?;
    let email = form.email.trim();
    if !EmailAddress::is_valid(email) {
        return Err(Error::InvalidEmail(email.to_owned()));
    }

    let (source, recipient) = find_banks(form, user, state)?;

    let transfer_url = state
        .transfers
        .create_transfer(&TransferRequest {
            source_funding_source_url: source.funding_source_url.clone(),
            destination_funding_source_url: recipient.funding_source_url.clone(),
            amount,
        })
        .await?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    insert_transfer(
        NewTransfer {
            name: form.name.trim().to_owned(),
            amount,
            sender_id: user.id,
            receiver_id: recipient.user_id,
            sender_bank_id: source.id,
            receiver_bank_id: recipient.id,
            email: email.to_owned(),
            transfer_url,
        },
        &connection,
    )
}

/// A route handler for sending money, redirects to the home page on success.
pub async fn create_transfer_endpoint(
    State(state): State<BankState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransferForm>,
) -> Response {
    let user = match get_logged_in_user(user_id, &state.db_connection) {
        Ok(user) => user,
        Err(error) => return error.into_alert_response(),
    };

    match create_transfer(&state, &user, &form).await {
        Ok(transfer) => {
            tracing::info!(
                "User {} sent {} from bank {} to bank {}",
                user.id,
                transfer.amount,
                transfer.sender_bank_id,
                transfer.receiver_bank_id
            );
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::ROOT.to_owned()),
                (),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create transfer for user {}: {error}", user.id);
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod parse_amount_tests {
    use crate::Error;

    use super::parse_amount;

    #[test]
    fn accepts_whole_cents() {
        assert_eq!(parse_amount("0.01").unwrap(), 0.01);
        assert_eq!(parse_amount(" 12.5 ").unwrap(), 12.5);
        assert_eq!(parse_amount("100").unwrap(), 100.0);
    }

    #[test]
    fn rejects_fractions_of_a_cent() {
        for amount in ["0.004", "0.005", "1.234", "0.009"] {
            assert!(
                matches!(parse_amount(amount), Err(Error::InvalidAmount(_))),
                "accepted {amount:?}"
            );
        }
    }

    #[test]
    fn rejects_amounts_below_one_cent() {
        for amount in ["0", "0.00", "-0.01", "inf"] {
            assert!(parse_amount(amount).is_err(), "accepted {amount:?}");
        }
    }
}

#[cfg(test)]
mod create_transfer_tests {
    use std::sync::Arc;

    use axum::{Extension, Router, extract::FromRef, http::StatusCode, routing::post};
    use axum_test::TestServer;

    use crate::{
        AppState,
        bank::{Bank, BankState, core::bank_tests::insert_test_bank, encrypt_id},
        endpoints,
        test_utils::{FakeBankData, FakeTransfers, test_app_state_with_fakes},
        transfer::get_transfers_for_bank,
        user::{User, user_tests::insert_test_user},
    };

    use super::create_transfer_endpoint;

    struct Fixture {
        server: TestServer,
        state: AppState,
        transfers: Arc<FakeTransfers>,
        sender: User,
        sender_bank: Bank,
        recipient_bank: Bank,
    }

    fn fixture(transfers: FakeTransfers) -> Fixture {
        let transfers = Arc::new(transfers);
        let state = test_app_state_with_fakes(Arc::new(FakeBankData::default()), transfers.clone());
        let (sender, sender_bank, recipient_bank) = {
            let connection = state.db_connection.lock().unwrap();
            let sender = insert_test_user("jane@example.com", &connection);
            let recipient = insert_test_user("john@example.com", &connection);
            let sender_bank = insert_test_bank(sender.id, "acc-1", &connection);
            let recipient_bank = insert_test_bank(recipient.id, "acc-2", &connection);
            (sender, sender_bank, recipient_bank)
        };
        let app = Router::new()
            .route(endpoints::TRANSFERS_API, post(create_transfer_endpoint))
            .layer(Extension(sender.id))
            .with_state(BankState::from_ref(&state));

        Fixture {
            server: TestServer::try_new(app).expect("Could not create test server."),
            state,
            transfers,
            sender,
            sender_bank,
            recipient_bank,
        }
    }

    fn form(source_bank: i64, shareable_id: &str, amount: &str) -> Vec<(&'static str, String)> {
        vec![
            ("source_bank", source_bank.to_string()),
            ("shareable_id", shareable_id.to_owned()),
            ("amount", amount.to_owned()),
            ("name", "Rent".to_owned()),
            ("email", "john@example.com".to_owned()),
        ]
    }

    fn transfer_count(fixture: &Fixture) -> usize {
        get_transfers_for_bank(
            fixture.sender_bank.id,
            &fixture.state.db_connection.lock().unwrap(),
        )
        .unwrap()
        .len()
    }

    #[tokio::test]
    async fn transfer_is_sent_and_recorded() {
        let fixture = fixture(FakeTransfers::default());

        let response = fixture
            .server
            .post(endpoints::TRANSFERS_API)
            .form(&form(
                fixture.sender_bank.id,
                &fixture.recipient_bank.shareable_id,
                "12.50",
            ))
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::ROOT);
        let requests = fixture.transfers.transfers.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].source_funding_source_url,
            fixture.sender_bank.funding_source_url
        );
        assert_eq!(
            requests[0].destination_funding_source_url,
            fixture.recipient_bank.funding_source_url
        );
        assert_eq!(requests[0].amount, 12.5);

        let recorded = get_transfers_for_bank(
            fixture.recipient_bank.id,
            &fixture.state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].sender_id, fixture.sender.id);
        assert_eq!(recorded[0].receiver_id, fixture.recipient_bank.user_id);
        assert_eq!(recorded[0].transfer_url, "https://dwolla.test/transfers/t-1");
    }

    #[tokio::test]
    async fn invalid_amounts_are_rejected() {
        let fixture = fixture(FakeTransfers::default());

        for amount in ["0", "-5", "abc", "NaN", "0.004", "1.234"] {
            fixture
                .server
                .post(endpoints::TRANSFERS_API)
                .form(&form(
                    fixture.sender_bank.id,
                    &fixture.recipient_bank.shareable_id,
                    amount,
                ))
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }
        assert!(fixture.transfers.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_recipient_is_not_found() {
        let fixture = fixture(FakeTransfers::default());

        let response = fixture
            .server
            .post(endpoints::TRANSFERS_API)
            .form(&form(fixture.sender_bank.id, &encrypt_id("acc-404"), "5"))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_text_contains("Recipient not found");
        assert_eq!(transfer_count(&fixture), 0);
    }

    #[tokio::test]
    async fn malformed_shareable_id_is_rejected() {
        let fixture = fixture(FakeTransfers::default());

        let response = fixture
            .server
            .post(endpoints::TRANSFERS_API)
            .form(&form(fixture.sender_bank.id, "not base64!", "5"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text_contains("Invalid sharable ID");
    }

    #[tokio::test]
    async fn cannot_send_to_same_bank() {
        let fixture = fixture(FakeTransfers::default());

        let response = fixture
            .server
            .post(endpoints::TRANSFERS_API)
            .form(&form(
                fixture.sender_bank.id,
                &fixture.sender_bank.shareable_id,
                "5",
            ))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text_contains("Invalid recipient");
        assert!(fixture.transfers.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cannot_send_from_another_users_bank() {
        let fixture = fixture(FakeTransfers::default());

        let response = fixture
            .server
            .post(endpoints::TRANSFERS_API)
            .form(&form(
                fixture.recipient_bank.id,
                &fixture.sender_bank.shareable_id,
                "5",
            ))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(fixture.transfers.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_transfer_is_not_recorded() {
        let fixture = fixture(FakeTransfers::failing());

        let response = fixture
            .server
            .post(endpoints::TRANSFERS_API)
            .form(&form(
                fixture.sender_bank.id,
                &fixture.recipient_bank.shareable_id,
                "5",
            ))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        assert_eq!(transfer_count(&fixture), 0);
    }
}
