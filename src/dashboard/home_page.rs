//! The home page: balances, recent transactions and the user's banks.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error, UserID,
    auth::get_logged_in_user,
    bank::{AccountsSummary, bank_tabs, get_accounts, get_banks, select_bank},
    dashboard::{
        header_box, layout::app_layout, right_sidebar::right_sidebar,
        total_balance::total_balance_box,
    },
    endpoints::{self, with_bank},
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE},
    timezone::get_local_offset,
    transaction::{
        BankQuery, CategoryCount, Transaction, TransactionsState, count_transaction_categories,
        get_bank_transactions, transactions_table,
    },
};

const GUEST_NAME: &str = "Guest";

fn recent_transactions(
    summary: &AccountsSummary,
    selected: Option<(i64, &[Transaction])>,
    today: time::Date,
) -> Markup {
    html! {
        section class="flex flex-col gap-6" data-recent-transactions
        {
            header class="flex items-center justify-between"
            {
                h2 class="text-xl font-semibold" { "Recent transactions" }
                @if let Some((bank_id, _)) = selected {
                    a
                        href=(with_bank(endpoints::TRANSACTION_HISTORY_VIEW, bank_id, None))
                        class="rounded-lg border border-gray-300 px-4 py-2 text-sm font-semibold
                            text-gray-700 dark:border-gray-600 dark:text-gray-200"
                    {
                        "View all"
                    }
                }
            }

            @match selected {
                Some((bank_id, transactions)) => {
                    (bank_tabs(&summary.accounts, bank_id, endpoints::ROOT))
                    (transactions_table(transactions, today))
                }
                None => {
                    p class="text-gray-600 dark:text-gray-400"
                    {
                        "Link a bank to see your transactions. "
                        a href=(endpoints::LINK_ACCOUNT_VIEW) class=(LINK_STYLE) { "Link a bank" }
                    }
                }
            }
        }
    }
}

/// Display the home page for the signed-in user.
///
/// `?id=` picks the bank whose transactions are shown, the first bank by default.
///
/// # Errors
///
/// Returns [Error::NotFound] if the chosen bank does not belong to the user.
pub async fn get_home_page(
    State(state): State<TransactionsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<BankQuery>,
) -> Result<Response, Error> {
    let user = get_logged_in_user(user_id, &state.db_connection)?;
    let banks = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_banks(user.id, &connection)?
    };
    let offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = time::OffsetDateTime::now_utc().to_offset(offset).date();

    let summary = get_accounts(&banks, state.bank_data.as_ref()).await?;

    let (selected, categories): (Option<(i64, Vec<Transaction>)>, Vec<CategoryCount>) =
        if banks.is_empty() {
            (None, Vec::new())
        } else {
            let bank = select_bank(&banks, query.id)?;
            let transactions =
                get_bank_transactions(bank, state.bank_data.as_ref(), &state.db_connection, offset)
                    .await?;
            let categories = count_transaction_categories(&transactions);
            (Some((bank.id, transactions)), categories)
        };

    let page_size = state.pagination_config.page_size as usize;
    let selected = selected
        .as_ref()
        .map(|(bank_id, transactions)| {
            (*bank_id, &transactions[..transactions.len().min(page_size)])
        });

    let first_name = if user.first_name.is_empty() {
        GUEST_NAME
    } else {
        &user.first_name
    };

    let content = html! {
        div class="flex flex-col xl:flex-row w-full"
        {
            section class={ (PAGE_CONTAINER_STYLE) " xl:flex-1" }
            {
                header class="flex flex-col gap-8"
                {
                    (header_box(
                        "Welcome",
                        "Access and manage your account and transactions efficiently.",
                        Some(first_name),
                    ))
                    (total_balance_box(&summary))
                }

                (recent_transactions(&summary, selected, today))
            }

            (right_sidebar(&user, &summary.accounts, &categories))
        }
    };

    Ok(app_layout("Home", endpoints::ROOT, &user, &[], &content).into_response())
}
