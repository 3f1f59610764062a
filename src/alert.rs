//! Success and error alerts that are swapped into the page's alert container.
//!
//! Alerts are returned by `/api` routes and rendered with `hx-swap-oob` so
//! they land in `#alert-container` no matter what the request targeted.

use maud::{Markup, html};

/// A message shown to the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action succeeded.
    Success {
        /// A short summary.
        message: String,
        /// A longer explanation.
        details: String,
    },
    /// The action failed.
    Error {
        /// A short summary.
        message: String,
        /// A longer explanation, ideally with a suggested fix.
        details: String,
    },
}

impl Alert {
    /// Render the alert as an out-of-band swap for `#alert-container`.
    pub fn into_html(self) -> Markup {
        let (container_style, icon, message, details) = match self {
            Alert::Success { message, details } => (
                "flex items-start gap-3 p-4 rounded-lg shadow-lg border \
                text-green-800 bg-green-50 border-green-300 \
                dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
                "✓",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "flex items-start gap-3 p-4 rounded-lg shadow-lg border \
                text-red-800 bg-red-50 border-red-300 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                "!",
                message,
                details,
            ),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    span class="font-bold" aria-hidden="true" { (icon) }

                    div class="flex-1"
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-auto text-sm font-semibold"
                        aria-label="Dismiss"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}
