//! The page that launches the bank-linking flow.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error, UserID,
    auth::get_logged_in_user,
    bank::BankState,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, HeadElement, auth_layout, base, link, loading_spinner},
    services::LinkTokenRequest,
};

const PLAID_LINK_SCRIPT: &str = "https://cdn.plaid.com/link/v2/stable/link-initialize.js";

/// `static/app.js` opens the bank-linking flow with the token in
/// `data-link-token` and posts the resulting public token with the form.
fn plaid_link_view(link_token: &str) -> Markup {
    html! {
        div id="plaid-link" data-link-token=(link_token) class="flex flex-col gap-4"
        {
            button type="button" id="plaid-link-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Connect bank"
            }

            form
                id="exchange-form"
                hx-post=(endpoints::EXCHANGE_PUBLIC_TOKEN)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                class="hidden"
            {
                input type="hidden" name="public_token" id="public_token" value="";
            }

            p id="indicator" class="htmx-indicator text-sm text-gray-600 dark:text-gray-400"
            {
                (loading_spinner())
                "Linking your bank..."
            }

            p class="text-sm text-center text-gray-600 dark:text-gray-400"
            {
                "Want to do this later? "
                (link(endpoints::ROOT, "Go to your dashboard"))
            }
        }
    }
}

/// Display the link-account page with a fresh link token for the user.
///
/// # Errors
///
/// Fails if the aggregator does not issue a link token.
pub async fn get_link_account_page(
    State(state): State<BankState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let user = get_logged_in_user(user_id, &state.db_connection)?;

    let link_token = state
        .bank_data
        .create_link_token(&LinkTokenRequest {
            client_user_id: user.id.to_string(),
            client_name: user.full_name(),
        })
        .await
        .inspect_err(|error| tracing::error!("Could not create link token: {error}"))?;

    let content = auth_layout(
        "Link Account",
        "Link your account to get started",
        &plaid_link_view(&link_token),
    );

    Ok(base(
        "Link Account",
        &[HeadElement::ScriptLink(PLAID_LINK_SCRIPT.to_owned())],
        &content,
    )
    .into_response())
}
