//! The transaction history page for one linked bank.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, PaginationConfig, UserID,
    auth::get_logged_in_user,
    bank::{Account, BankId, bank_tabs, get_accounts, get_banks, select_bank},
    dashboard::{app_layout, header_box, page_section},
    endpoints::{self, with_bank},
    html::{LINK_STYLE, format_currency},
    pagination::{create_pagination_indicators, page_count, page_of, pagination_view},
    services::BankDataClient,
    timezone::get_local_offset,
    transaction::{get_bank_transactions, transactions_table},
};

/// The state needed by the pages that list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub bank_data: Arc<dyn BankDataClient>,
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            bank_data: state.bank_data.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Which bank and page of transactions to show.
#[derive(Debug, Default, Deserialize)]
pub struct BankQuery {
    pub id: Option<BankId>,
    pub page: Option<u64>,
}

fn account_info(account: &Account) -> Markup {
    html! {
        div
            class="flex flex-col justify-between gap-4 rounded-lg bg-blue-600 px-4 py-5
                text-white md:flex-row"
            data-account-info
        {
            div class="flex flex-col gap-2"
            {
                h2 class="text-lg font-bold" { (account.name) }
                @if let Some(official_name) = &account.official_name {
                    p class="text-sm text-blue-100" { (official_name) }
                }
                p class="text-sm font-semibold tracking-[1.1px]"
                {
                    "●●●● ●●●● ●●●● "
                    (account.mask.as_deref().unwrap_or("0000"))
                }
            }

            div class="flex flex-col items-start md:items-end gap-1 rounded-md bg-blue-500/50 px-4 py-2"
            {
                p class="text-sm" { "Current balance" }
                p class="text-2xl font-bold" { (format_currency(account.current_balance)) }
            }
        }
    }
}

fn no_banks_view() -> Markup {
    html! {
        p class="text-gray-600 dark:text-gray-400"
        {
            "Link a bank to see its transactions. "
            a href=(endpoints::LINK_ACCOUNT_VIEW) class=(LINK_STYLE) { "Link a bank" }
        }
    }
}

/// Display the transactions of the bank chosen by `?id=`, one page at a time.
///
/// The first linked bank is shown when no bank is chosen.
///
/// # Errors
///
/// Returns [Error::NotFound] if the chosen bank does not belong to the user.
pub async fn get_transaction_history_page(
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
    let header = header_box(
        "Transaction History",
        "Gather your transaction details and all relevant information.",
        None,
    );

    if banks.is_empty() {
        let content = page_section(header, no_banks_view());
        return Ok(app_layout(
            "Transaction History",
            endpoints::TRANSACTION_HISTORY_VIEW,
            &user,
            &[],
            &content,
        )
        .into_response());
    }

    let bank = select_bank(&banks, query.id)?;
    let offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = time::OffsetDateTime::now_utc().to_offset(offset).date();

    let summary = get_accounts(&banks, state.bank_data.as_ref()).await?;
    let account = summary
        .accounts
        .iter()
        .find(|account| account.bank_row_id == bank.id)
        .ok_or(Error::NotFound)?;
    let transactions =
        get_bank_transactions(bank, state.bank_data.as_ref(), &state.db_connection, offset)
            .await?;

    let page_size = state.pagination_config.page_size;
    let (page, rows) = page_of(&transactions, query.page.unwrap_or(1), page_size);
    let indicators = create_pagination_indicators(
        page,
        page_count(transactions.len(), page_size),
        state.pagination_config.max_pages,
    );
    let bank_id = bank.id;

    let body = html! {
        (bank_tabs(&summary.accounts, bank_id, endpoints::TRANSACTION_HISTORY_VIEW))
        (account_info(account))

        section class="flex flex-col gap-4"
        {
            h2 class="text-lg font-semibold" { "Transaction history" }
            (transactions_table(rows, today))
            (pagination_view(&indicators, |page| {
                with_bank(endpoints::TRANSACTION_HISTORY_VIEW, bank_id, Some(page))
            }))
        }
    };
    let content = page_section(header, body);

    Ok(app_layout(
        "Transaction History",
        endpoints::TRANSACTION_HISTORY_VIEW,
        &user,
        &[],
        &content,
    )
    .into_response())
}
