use maud::{Markup, html};

use crate::{
    User,
    bank::{Account, bank_card},
    endpoints,
    transaction::{CategoryCount, category_style},
};

/// The most bank cards shown in the sidebar.
const MAX_CARDS: usize = 2;

fn category_bar(category: &CategoryCount) -> Markup {
    let style = category_style(&category.name);
    let percent = if category.total_count == 0 {
        0
    } else {
        category.count * 100 / category.total_count
    };

    html! {
        li class={ "flex flex-col gap-1 rounded-lg p-3 " (style.chip_background) }
            data-category=(category.name)
        {
            div class={ "flex justify-between text-sm font-medium " (style.text) }
            {
                span { (category.name) }
                span { (category.count) }
            }
            div class="h-2 w-full rounded-full bg-white/60"
            {
                div class={ "h-2 rounded-full " (style.background) }
                    style=(format!("width: {percent}%")) {}
            }
        }
    }
}

/// The profile, bank cards and spending categories shown beside the home page.
pub fn right_sidebar(user: &User, accounts: &[Account], categories: &[CategoryCount]) -> Markup {
    let user_name = user.full_name();

    html! {
        aside
            class="flex w-full flex-col gap-8 border-t border-gray-200 px-5 py-8
                xl:max-w-[355px] xl:border-t-0 xl:border-l dark:border-gray-700"
            data-right-sidebar
        {
            section class="flex items-center gap-4"
            {
                span
                    class="flex size-16 shrink-0 items-center justify-center rounded-full
                        bg-gray-100 text-3xl font-bold text-blue-600 dark:bg-gray-800"
                    aria-hidden="true"
                {
                    (user.first_name.chars().next().unwrap_or('?'))
                }
                div class="min-w-0"
                {
                    h1 class="truncate text-xl font-semibold" { (user_name) }
                    p class="truncate text-sm text-gray-600 dark:text-gray-400" { (user.email) }
                }
            }

            section class="flex flex-col gap-6"
            {
                div class="flex justify-between items-center"
                {
                    h2 class="text-lg font-semibold" { "My Banks" }
                    a
                        href=(endpoints::LINK_ACCOUNT_VIEW)
                        class="text-sm font-semibold text-gray-600 hover:text-blue-600 dark:text-gray-300"
                    {
                        "+ Add Bank"
                    }
                }

                @for account in accounts.iter().take(MAX_CARDS) {
                    (bank_card(account, &user_name, false))
                }
            }

            @if !categories.is_empty() {
                section class="flex flex-col gap-4"
                {
                    h2 class="text-lg font-semibold" { "Top categories" }
                    ul class="flex flex-col gap-3"
                    {
                        @for category in categories {
                            (category_bar(category))
                        }
                    }
                }
            }
        }
    }
}
