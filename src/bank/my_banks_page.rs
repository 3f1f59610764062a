//! Lists the user's linked banks as cards.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error, UserID,
    auth::get_logged_in_user,
    bank::{Account, BankState, bank_card, get_accounts, get_banks},
    dashboard::{app_layout, header_box, page_section},
    endpoints,
    html::LINK_STYLE,
};

fn my_banks_view(accounts: &[Account], user_name: &str) -> Markup {
    html! {
        div class="flex flex-col gap-4"
        {
            h2 class="text-lg font-semibold text-gray-900 dark:text-white" { "Your cards" }

            @if accounts.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "You have not linked any banks yet. "
                    a href=(endpoints::LINK_ACCOUNT_VIEW) class=(LINK_STYLE) { "Link a bank" }
                    "."
                }
            } @else {
                div class="flex flex-wrap gap-6"
                {
                    @for account in accounts {
                        (bank_card(account, user_name, true))
                    }
                }
            }
        }
    }
}

/// Display the "My Banks" page.
///
/// # Errors
///
/// Fails if the banks cannot be loaded or the aggregator cannot be reached.
pub async fn get_my_banks_page(
    State(state): State<BankState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let user = get_logged_in_user(user_id, &state.db_connection)?;
    let banks = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_banks(user.id, &connection)?
    };
    let summary = get_accounts(&banks, state.bank_data.as_ref()).await?;

    let content = page_section(
        header_box(
            "My Bank Accounts",
            "Effortlessly manage your banking activities.",
            None,
        ),
        my_banks_view(&summary.accounts, &user.full_name()),
    );

    Ok(app_layout("My Banks", endpoints::MY_BANKS_VIEW, &user, &[], &content).into_response())
}

#[cfg(test)]
mod my_banks_page_tests {
    use axum::{Extension, extract::FromRef, extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        bank::{BankState, core::bank_tests::insert_test_bank},
        endpoints,
        test_utils::{
            FakeBankData, FakeTransfers, assert_valid_html, parse_html_document, test_account,
            test_app_state,
        },
        user::user_tests::insert_test_user,
    };

    use super::get_my_banks_page;

    #[tokio::test]
    async fn shows_card_per_bank() {
        let state = test_app_state(
            FakeBankData::with_accounts(vec![
                test_account("acc-1", 10.0),
                test_account("acc-2", 20.0),
            ]),
            FakeTransfers::default(),
        );
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let user = insert_test_user("jane@example.com", &connection);
            insert_test_bank(user.id, "acc-1", &connection);
            insert_test_bank(user.id, "acc-2", &connection);
            user
        };

        let response = get_my_banks_page(State(BankState::from_ref(&state)), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let cards = document
            .select(&Selector::parse("[data-bank-card]").unwrap())
            .count();
        assert_eq!(cards, 2);
    }

    #[tokio::test]
    async fn no_banks_links_to_link_account_page() {
        let state = test_app_state(FakeBankData::default(), FakeTransfers::default());
        let user = insert_test_user("jane@example.com", &state.db_connection.lock().unwrap());

        let response = get_my_banks_page(State(BankState::from_ref(&state)), Extension(user.id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let selector =
            Selector::parse(&format!("section a[href=\"{}\"]", endpoints::LINK_ACCOUNT_VIEW))
                .unwrap();
        assert!(document.select(&selector).next().is_some());
    }
}
