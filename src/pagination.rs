//! Splits long lists into pages and renders the page links beneath them.

use maud::{Markup, html};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The maximum rows to display per page.
    pub page_size: u64,
    /// The maximum number of page links to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_pages: 5,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// The number of pages needed to show `item_count` items, at least one.
pub fn page_count(item_count: usize, page_size: u64) -> u64 {
    let page_size = page_size.max(1);

    (item_count as u64).div_ceil(page_size).max(1)
}

/// The items on the 1-based `page`, clamping `page` into the valid range.
///
/// Returns the clamped page number alongside the items.
pub fn page_of<T>(items: &[T], page: u64, page_size: u64) -> (u64, &[T]) {
    let page_size = page_size.max(1);
    let page = page.clamp(1, page_count(items.len(), page_size));
    let start = ((page - 1) * page_size) as usize;
    let end = (start + page_size as usize).min(items.len());

    (page, &items[start.min(items.len())..end])
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let half = max_pages / 2;
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let window = if page_count <= max_pages {
        1..=page_count
    } else if curr_page <= half {
        1..=max_pages
    } else if curr_page > page_count - half {
        (page_count - max_pages + 1)..=page_count
    } else {
        (curr_page - half)..=(curr_page + half)
    };
    let mut indicators: Vec<PaginationIndicator> = window.map(map_page).collect();

    if page_count > max_pages {
        if curr_page > half + 1 {
            indicators.splice(
                0..0,
                [PaginationIndicator::Page(1), PaginationIndicator::Ellipsis],
            );
        }

        if curr_page < page_count - half {
            indicators.extend([
                PaginationIndicator::Ellipsis,
                PaginationIndicator::Page(page_count),
            ]);
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render page links for `indicators`.
///
/// `page_url` maps a page number to the URL for that page.
pub fn pagination_view(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    const LINK: &str = "flex items-center justify-center px-3 h-8 leading-tight \
        text-gray-500 bg-white border border-gray-300 hover:bg-gray-100 \
        hover:text-gray-700 dark:bg-gray-800 dark:border-gray-700 \
        dark:text-gray-400 dark:hover:bg-gray-700 dark:hover:text-white";
    const CURRENT: &str = "flex items-center justify-center px-3 h-8 \
        text-blue-600 border border-gray-300 bg-blue-50 dark:border-gray-700 \
        dark:bg-gray-700 dark:text-white";

    if indicators.len() <= 1 {
        return html!();
    }

    html! {
        nav aria-label="Pagination" class="flex justify-center my-4"
        {
            ul class="inline-flex -space-x-px text-sm"
            {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) class=(LINK) { "Previous" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(LINK) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span class=(CURRENT) aria-current="page" { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class=(LINK) { "..." }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) class=(LINK) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::pagination::{
        PaginationIndicator::{self, BackButton, CurrPage, Ellipsis, NextButton, Page},
        create_pagination_indicators, page_count, page_of, pagination_view,
    };

    #[track_caller]
    fn assert_indicators(curr_page: u64, page_count: u64, want: &[PaginationIndicator]) {
        let got = create_pagination_indicators(curr_page, page_count, 5);

        assert_eq!(want, got.as_slice(), "page {curr_page} of {page_count}");
    }

    #[test]
    fn single_page_has_no_buttons() {
        assert_indicators(1, 1, &[CurrPage(1)]);
    }

    #[test]
    fn shows_all_pages_when_they_fit() {
        assert_indicators(
            1,
            5,
            &[
                CurrPage(1),
                Page(2),
                Page(3),
                Page(4),
                Page(5),
                NextButton(2),
            ],
        );
    }

    #[test]
    fn shows_trailing_ellipsis_near_start() {
        assert_indicators(
            3,
            10,
            &[
                BackButton(2),
                Page(1),
                Page(2),
                CurrPage(3),
                Page(4),
                Page(5),
                Ellipsis,
                Page(10),
                NextButton(4),
            ],
        );
    }

    #[test]
    fn shows_leading_ellipsis_near_end() {
        assert_indicators(
            10,
            10,
            &[
                BackButton(9),
                Page(1),
                Ellipsis,
                Page(6),
                Page(7),
                Page(8),
                Page(9),
                CurrPage(10),
            ],
        );
    }

    #[test]
    fn shows_both_ellipses_in_middle() {
        assert_indicators(
            5,
            10,
            &[
                BackButton(4),
                Page(1),
                Ellipsis,
                Page(3),
                Page(4),
                CurrPage(5),
                Page(6),
                Page(7),
                Ellipsis,
                Page(10),
                NextButton(6),
            ],
        );
    }

    #[test]
    fn page_count_rounds_up_and_is_at_least_one() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }

    #[test]
    fn page_of_clamps_out_of_range_pages() {
        let items: Vec<u32> = (1..=25).collect();

        assert_eq!(page_of(&items, 0, 10), (1, &items[0..10]));
        assert_eq!(page_of(&items, 3, 10), (3, &items[20..25]));
        assert_eq!(page_of(&items, 99, 10), (3, &items[20..25]));
    }

    #[test]
    fn page_of_empty_list_is_first_page() {
        let items: Vec<u32> = Vec::new();

        assert_eq!(page_of(&items, 2, 10), (1, &items[..]));
    }

    #[test]
    fn view_links_to_each_page() {
        let indicators = create_pagination_indicators(2, 3, 5);

        let html = pagination_view(&indicators, |page| format!("/things?page={page}")).into_string();
        let fragment = Html::parse_fragment(&html);

        let hrefs: Vec<_> = fragment
            .select(&Selector::parse("a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(
            hrefs,
            [
                "/things?page=1",
                "/things?page=1",
                "/things?page=3",
                "/things?page=3"
            ]
        );
        let current = fragment
            .select(&Selector::parse("[aria-current=page]").unwrap())
            .next()
            .expect("No current page marker");
        assert_eq!(current.text().collect::<String>(), "2");
    }

    #[test]
    fn view_is_empty_for_single_page() {
        let indicators = create_pagination_indicators(1, 1, 5);

        assert!(pagination_view(&indicators, |page| page.to_string())
            .into_string()
            .is_empty());
    }
}
