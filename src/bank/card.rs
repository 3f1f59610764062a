use maud::{Markup, html};

use crate::{bank::Account, endpoints, html::format_currency};

/// A credit-card style summary of a linked account.
///
/// Links to the account's transaction history.
pub fn bank_card(account: &Account, user_name: &str, show_balance: bool) -> Markup {
    let history_url =
        endpoints::with_bank(endpoints::TRANSACTION_HISTORY_VIEW, account.bank_row_id, None);
    let mask = account.mask.as_deref().unwrap_or("0000");

    html! {
        div class="flex flex-col gap-2" data-bank-card=(account.bank_row_id)
        {
            a
                href=(history_url)
                class="relative flex h-[190px] w-full max-w-[320px] justify-between rounded-[20px]
                    border border-white bg-gradient-to-br from-blue-700 to-sky-500 shadow-lg"
            {
                div class="flex flex-col justify-between gap-4 px-5 pt-5 pb-4 text-white"
                {
                    div
                    {
                        h2 class="text-base font-semibold" { (account.name) }
                        @if show_balance {
                            p class="font-black" { (format_currency(account.current_balance)) }
                        }
                    }

                    article class="flex flex-col gap-2"
                    {
                        div class="flex justify-between gap-4 text-xs font-semibold"
                        {
                            span { (user_name) }
                            span { "●● / ●●" }
                        }
                        p class="text-sm font-semibold tracking-[1.1px]"
                        {
                            "●●●● ●●●● ●●●● "
                            span class="text-base" { (mask) }
                        }
                    }
                }
            }

            div class="flex items-center gap-2 max-w-[320px] text-xs text-gray-600 dark:text-gray-400"
            {
                span class="shrink-0" { "Sharable ID" }
                code class="truncate rounded bg-gray-100 px-2 py-1 dark:bg-gray-800" data-shareable-id
                {
                    (account.shareable_id)
                }
            }
        }
    }
}
