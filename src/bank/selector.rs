//! Choosing which linked bank a page shows.

use maud::{Markup, html};

use crate::{
    Error,
    bank::{Account, Bank, BankId},
    endpoints::with_bank,
};

/// Find the bank with `id` in `banks`, or the first bank if no ID is given.
///
/// # Errors
///
/// Returns [Error::NotFound] if `id` is not one of `banks`, or
/// [Error::NoBankAccounts] if `banks` is empty.
pub fn select_bank(banks: &[Bank], id: Option<BankId>) -> Result<&Bank, Error> {
    match id {
        Some(id) => banks.iter().find(|bank| bank.id == id).ok_or(Error::NotFound),
        None => banks.first().ok_or(Error::NoBankAccounts),
    }
}

/// Tabs that switch `endpoint` between the user's banks.
pub fn bank_tabs(accounts: &[Account], selected: BankId, endpoint: &str) -> Markup {
    html! {
        nav class="flex gap-2 overflow-x-auto border-b border-gray-200 dark:border-gray-700"
            aria-label="Banks"
        {
            @for account in accounts {
                @let is_selected = account.bank_row_id == selected;
                a
                    href=(with_bank(endpoint, account.bank_row_id, Some(1)))
                    aria-current=[is_selected.then_some("page")]
                    class=(if is_selected {
                        "shrink-0 px-3 py-2 border-b-2 border-blue-600 font-semibold text-blue-600"
                    } else {
                        "shrink-0 px-3 py-2 border-b-2 border-transparent font-semibold \
                        text-gray-500 hover:text-gray-700 dark:text-gray-400"
                    })
                {
                    (account.name)
                }
            }
        }
    }
}

#[cfg(test)]
mod selector_tests {
    use scraper::{Html, Selector};

    use crate::{
        Error, UserID,
        bank::{Account, Bank},
        endpoints,
    };

    use super::{bank_tabs, select_bank};

    fn bank(id: i64) -> Bank {
        Bank {
            id,
            user_id: UserID::new(1),
            bank_id: format!("item-{id}"),
            account_id: format!("acc-{id}"),
            access_token: format!("access-{id}"),
            funding_source_url: format!("https://dwolla.test/funding-sources/fs-{id}"),
            shareable_id: String::new(),
        }
    }

    fn account(bank_row_id: i64, name: &str) -> Account {
        Account {
            id: format!("acc-{bank_row_id}"),
            name: name.to_owned(),
            official_name: None,
            mask: None,
            institution_id: None,
            current_balance: 0.0,
            available_balance: None,
            account_type: "depository".to_owned(),
            subtype: None,
            shareable_id: String::new(),
            bank_row_id,
        }
    }

    #[test]
    fn defaults_to_first_bank() {
        let banks = [bank(4), bank(7)];

        assert_eq!(select_bank(&banks, None), Ok(&banks[0]));
        assert_eq!(select_bank(&banks, Some(7)), Ok(&banks[1]));
    }

    #[test]
    fn unknown_bank_is_not_found() {
        assert_eq!(select_bank(&[bank(4)], Some(5)), Err(Error::NotFound));
        assert_eq!(select_bank(&[], None), Err(Error::NoBankAccounts));
    }

    #[test]
    fn tabs_mark_selected_bank() {
        let accounts = [account(4, "Checking"), account(7, "Savings")];

        let html = bank_tabs(&accounts, 7, endpoints::ROOT).into_string();
        let fragment = Html::parse_fragment(&html);

        let selected: Vec<(String, Option<&str>)> = fragment
            .select(&Selector::parse("a[aria-current=page]").unwrap())
            .map(|link| (link.text().collect(), link.value().attr("href")))
            .collect();
        assert_eq!(selected, [("Savings".to_owned(), Some("/?id=7&page=1"))]);
    }
}
