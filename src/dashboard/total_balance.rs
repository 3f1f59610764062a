use maud::{Markup, html};

use crate::{bank::AccountsSummary, html::format_currency};

/// Seconds the balance takes to count up from zero.
const COUNTER_DURATION: &str = "0.75";

/// A dollar amount that `static/app.js` counts up from zero.
///
/// The final amount is rendered as text so the page reads correctly without
/// JavaScript.
pub fn animated_counter(amount: f64) -> Markup {
    html! {
        span
            data-counter-end=(format!("{amount:.2}"))
            data-duration=(COUNTER_DURATION)
            data-prefix="$"
            data-decimals="2"
        {
            (format_currency(amount))
        }
    }
}

/// The number of linked banks, their share of the balance and the total balance.
pub fn total_balance_box(summary: &AccountsSummary) -> Markup {
    html! {
        section
            class="flex w-full items-center gap-4 rounded-xl border border-gray-200 p-4
                shadow-sm sm:gap-6 sm:p-6 dark:border-gray-700"
            data-total-balance
        {
            @if summary.total_current_balance > 0.0 {
                div class="flex w-full max-w-[160px] flex-col gap-1" aria-hidden="true"
                {
                    @for account in &summary.accounts {
                        @let share = account.current_balance.max(0.0) / summary.total_current_balance;
                        div class="h-2 rounded-full bg-blue-600"
                            style=(format!("width: {:.0}%", share * 100.0)) {}
                    }
                }
            }

            div class="flex flex-col gap-6"
            {
                h2 class="text-lg font-semibold text-gray-900 dark:text-white"
                {
                    "Bank Accounts: " span data-total-banks { (summary.total_banks) }
                }

                div class="flex flex-col gap-2"
                {
                    p class="text-sm font-medium text-gray-600 dark:text-gray-400"
                    {
                        "Total Current Balance"
                    }
                    p class="text-2xl lg:text-3xl font-semibold text-gray-900 dark:text-white"
                    {
                        (animated_counter(summary.total_current_balance))
                    }
                }
            }
        }
    }
}
