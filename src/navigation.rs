//! This file defines the templates for the sidebar and the mobile navigation menu.

use maud::{Markup, html};

use crate::{endpoints, html::logo};

/// Template for a link in the navigation menus.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "flex gap-3 items-center py-2 px-4 rounded-lg font-semibold text-white \
            bg-gradient-to-r from-blue-600 to-sky-500"
        } else {
            "flex gap-3 items-center py-2 px-4 rounded-lg font-semibold text-gray-700 \
            hover:bg-gray-100 dark:text-gray-200 dark:hover:bg-gray-800"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
    user_name: &'a str,
}

impl<'a> NavBar<'a> {
    /// Get the navigation menus for the signed-in user called `user_name`.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str, user_name: &'a str) -> NavBar<'a> {
        let links = [
            (endpoints::ROOT, "Home"),
            (endpoints::MY_BANKS_VIEW, "My Banks"),
            (endpoints::TRANSACTION_HISTORY_VIEW, "Transaction History"),
            (endpoints::TRANSFER_VIEW, "Transfer Funds"),
        ]
        .into_iter()
        .map(|(url, title)| Link {
            url,
            title,
            is_current: active_endpoint == url,
        })
        .collect();

        NavBar { links, user_name }
    }

    fn footer(&self) -> Markup {
        html!(
            footer class="flex items-center justify-between gap-2 pt-6 border-t border-gray-200 dark:border-gray-700"
            {
                div class="flex items-center gap-2 min-w-0"
                {
                    span
                        class="flex items-center justify-center shrink-0 w-10 h-10 rounded-full
                            bg-gray-100 text-blue-600 font-bold dark:bg-gray-800"
                        aria-hidden="true"
                    {
                        (self.user_name.chars().next().unwrap_or('?'))
                    }

                    p class="truncate text-sm font-semibold text-gray-700 dark:text-gray-200"
                        data-user-name="true"
                    {
                        (self.user_name)
                    }
                }

                a
                    href=(endpoints::SIGN_OUT)
                    class="text-sm font-semibold text-gray-600 hover:text-blue-600 dark:text-gray-300"
                {
                    "Sign out"
                }
            }
        )
    }

    pub fn into_html(self) -> Markup {
        let footer = self.footer();

        html!(
            aside
                class="hidden lg:flex sticky top-0 h-screen w-full max-w-[264px] flex-col
                    justify-between border-r border-gray-200 bg-white px-4 py-8
                    dark:border-gray-700 dark:bg-gray-900"
            {
                nav class="flex flex-col gap-4"
                {
                    div class="mb-8 px-4" { (logo()) }

                    @for link in self.links.clone() {
                        (link.into_html())
                    }
                }

                (footer)
            }

            header
                class="flex lg:hidden items-center justify-between h-16 px-5 border-b
                    border-gray-200 bg-white dark:border-gray-700 dark:bg-gray-900"
            {
                (logo())

                details class="relative"
                {
                    summary
                        class="list-none [&::-webkit-details-marker]:hidden cursor-pointer
                            px-3 py-2 rounded-lg text-gray-700 dark:text-gray-200"
                        aria-label="Open menu"
                    {
                        "Menu"
                    }

                    nav
                        class="absolute right-0 z-40 mt-2 flex w-72 flex-col gap-2 rounded-xl
                            border border-gray-200 bg-white p-4 shadow-lg
                            dark:border-gray-700 dark:bg-gray-900"
                    {
                        @for link in self.links {
                            (link.into_html())
                        }

                        (footer)
                    }
                }
            }
        )
    }
}
