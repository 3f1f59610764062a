//! The page for sending money to another linked bank.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error, UserID,
    auth::get_logged_in_user,
    bank::{Account, BankState, get_accounts, get_banks},
    dashboard::{app_layout, header_box, page_section},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, FormField, LINK_STYLE, format_currency,
        submit_button,
    },
};

fn source_bank_select(accounts: &[Account]) -> Markup {
    html! {
        div class="flex flex-col w-full"
        {
            label for="source_bank" class=(FORM_LABEL_STYLE) { "Select Source Bank" }
            select name="source_bank" id="source_bank" class=(FORM_TEXT_INPUT_STYLE) required
            {
                @for account in accounts {
                    option value=(account.bank_row_id)
                    {
                        (account.name) " (" (format_currency(account.current_balance)) ")"
                    }
                }
            }
        }
    }
}

fn transfer_form(accounts: &[Account]) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSFERS_API)
            hx-swap="none"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="flex flex-col gap-5 max-w-xl"
        {
            (source_bank_select(accounts))

            (FormField {
                name: "name",
                label: "Transfer Note",
                placeholder: "Write a short note here",
                input_type: "text",
                value: "",
                error: None,
                required: true,
            }.into_html())

            h2 class="text-lg font-semibold pt-4" { "Bank account details" }

            (FormField {
                name: "email",
                label: "Recipient's Email Address",
                placeholder: "ex: johndoe@gmail.com",
                input_type: "email",
                value: "",
                error: None,
                required: true,
            }.into_html())

            (FormField {
                name: "shareable_id",
                label: "Receiver's Plaid Sharable Id",
                placeholder: "Enter the public account number",
                input_type: "text",
                value: "",
                error: None,
                required: true,
            }.into_html())

            div class="flex flex-col w-full"
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input
                    type="number"
                    name="amount"
                    id="amount"
                    placeholder="ex: 5.00"
                    min="0.01"
                    step="0.01"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            (submit_button("Transfer Funds"))
        }
    }
}

/// Display the transfer page.
///
/// # Errors
///
/// Fails if the banks cannot be loaded or the aggregator cannot be reached.
pub async fn get_transfer_page(
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

    let body = if summary.accounts.is_empty() {
        html! {
            p class="text-gray-600 dark:text-gray-400"
            {
                "Link a bank before sending money. "
                a href=(endpoints::LINK_ACCOUNT_VIEW) class=(LINK_STYLE) { "Link a bank" }
            }
        }
    } else {
        transfer_form(&summary.accounts)
    };
    let content = page_section(
        header_box(
            "Payment Transfer",
            "Please provide any specific details or notes related to the payment transfer",
            None,
        ),
        body,
    );

    Ok(app_layout("Transfer Funds", endpoints::TRANSFER_VIEW, &user, &[], &content).into_response())
}
