//! Shared page layout, style constants and small view helpers.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-600 \
    disabled:bg-blue-800 hover:enabled:bg-blue-700 text-white font-semibold \
    rounded-lg shadow-sm";

// Form styles
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-700 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded-lg text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-white \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600";
pub const FORM_ERROR_STYLE: &str = "mt-1 text-red-500 text-sm";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-500 bg-gray-50 \
    dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_CELL_STYLE: &str = "px-4 py-3";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col gap-8 px-5 py-7 lg:py-12 lg:px-8 w-full text-gray-900 dark:text-white";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Walletly" }
                link rel="icon" href="/static/favicon.ico";

                script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                script src="https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js" {}
                script src="https://unpkg.com/htmx-ext-response-targets@2.0.4/response-targets.js" {}

                style
                {
                    r#"
                    #indicator.htmx-indicator {
                        display: none;
                    }

                    #indicator.htmx-request .htmx-indicator,
                    #indicator.htmx-request.htmx-indicator {
                        display: inline;
                    }
                    "#
                }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                    }
                }

                script src="/static/app.js" defer {}
            }

            body
                hx-ext="response-targets"
                class="min-h-screen bg-white dark:bg-gray-900"
            {
                (content)

                // Alert container for out-of-band swaps
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p class="mb-4 text-xl md:text-2xl tracking-tight text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600 hover:bg-blue-800
                            font-medium rounded text-sm px-5 py-2.5 text-center my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

/// The Walletly logo and name.
pub fn logo() -> Markup {
    html! {
        a href="/" class="flex items-center gap-2 text-2xl font-bold text-gray-900 dark:text-white"
        {
            span
                class="flex items-center justify-center w-8 h-8 rounded-lg bg-blue-600 text-white text-lg"
                aria-hidden="true"
            {
                "W"
            }
            "Walletly"
        }
    }
}

/// The split layout used by the sign-in, sign-up and link-account pages.
pub fn auth_layout(heading: &str, subheading: &str, form: &Markup) -> Markup {
    html! {
        main class="flex min-h-screen w-full"
        {
            section class="flex flex-col justify-center w-full max-w-[420px] mx-auto gap-5 py-10 px-6 md:gap-8"
            {
                header class="flex flex-col gap-5 md:gap-8"
                {
                    (logo())

                    div class="flex flex-col gap-1 md:gap-3"
                    {
                        h1 class="text-2xl lg:text-4xl font-semibold text-gray-900 dark:text-white"
                        {
                            (heading)
                        }

                        p class="text-base text-gray-600 dark:text-gray-400" { (subheading) }
                    }
                }

                (form)
            }

            div
                class="hidden lg:flex h-screen w-full sticky top-0 items-center justify-end bg-sky-50 dark:bg-gray-800"
                aria-hidden="true"
            {}
        }
    }
}

/// A labelled form input with an optional error message below it.
pub struct FormField<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub placeholder: &'a str,
    pub input_type: &'a str,
    pub value: &'a str,
    pub error: Option<&'a str>,
    pub required: bool,
}

impl FormField<'_> {
    pub fn into_html(self) -> Markup {
        html! {
            div class="flex flex-col w-full"
            {
                label for=(self.name) class=(FORM_LABEL_STYLE) { (self.label) }

                input
                    type=(self.input_type)
                    name=(self.name)
                    id=(self.name)
                    placeholder=(self.placeholder)
                    value=(self.value)
                    class=(FORM_TEXT_INPUT_STYLE)
                    aria-invalid=[self.error.map(|_| "true")]
                    required[self.required];

                @if let Some(error) = self.error {
                    p class=(FORM_ERROR_STYLE) { (error) }
                }
            }
        }
    }
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// A submit button that shows a spinner while the request is in flight.
pub fn submit_button(text: &str) -> Markup {
    html! {
        button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
        {
            span class="inline htmx-indicator" id="indicator"
            {
                (loading_spinner())
            }
            (text)
        }
    }
}

/// Format `number` as US dollars, e.g. "$1,234.56" or "-$4.33".
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .expect("\"$\" is a valid currency prefix")
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .expect("\"-$\" is a valid currency prefix")
            .precision(Precision::Decimals(2))
    });

    let mut formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // numfmt renders zero as "0"
        return "$0.00".to_owned();
    };

    // numfmt drops one trailing zero, e.g. "12.30" comes out as "12.3".
    if formatted_string.as_bytes()[formatted_string.len() - 3] != b'.' {
        formatted_string.push('0');
    }

    formatted_string
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE) { (text) }
    )
}

#[cfg(test)]
mod format_currency_tests {
    use super::format_currency;

    #[test]
    fn formats_thousands_with_separator() {
        assert_eq!(format_currency(1234.56), "$1,234.56");
    }

    #[test]
    fn formats_negative_with_leading_minus() {
        assert_eq!(format_currency(-4.33), "-$4.33");
    }

    #[test]
    fn pads_single_decimal() {
        assert_eq!(format_currency(12.3), "$12.30");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_currency(0.0), "$0.00");
    }
}
