//! The page frame shared by every page a signed-in user sees.

use maud::{Markup, html};

use crate::{
    User,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// Wrap `content` in the sidebar and mobile navigation.
///
/// `active_endpoint` selects the highlighted navigation link.
pub fn app_layout(
    title: &str,
    active_endpoint: &str,
    user: &User,
    head_elements: &[HeadElement],
    content: &Markup,
) -> Markup {
    let user_name = user.full_name();
    let nav_bar = NavBar::new(active_endpoint, &user_name).into_html();

    let content = html! {
        div class="flex flex-col lg:flex-row min-h-screen w-full"
        {
            (nav_bar)

            div class="flex flex-1 min-w-0 flex-col"
            {
                (content)
            }
        }
    };

    base(title, head_elements, &content)
}

/// The title block at the top of a page.
///
/// With a `user_name` the title reads as a greeting, e.g. "Welcome, Jane".
pub fn header_box(title: &str, subtext: &str, user_name: Option<&str>) -> Markup {
    html! {
        header class="flex flex-col gap-1"
        {
            h1 class="text-2xl lg:text-3xl font-semibold text-gray-900 dark:text-white"
            {
                (title)
                @if let Some(user_name) = user_name {
                    ", "
                    span class="text-blue-600 dark:text-blue-500" { (user_name) }
                }
            }
            p class="text-sm lg:text-base text-gray-600 dark:text-gray-400" { (subtext) }
        }
    }
}

/// The main column of a page with a header box.
pub fn page_section(header: Markup, body: Markup) -> Markup {
    html! {
        section class=(PAGE_CONTAINER_STYLE)
        {
            (header)
            (body)
        }
    }
}
