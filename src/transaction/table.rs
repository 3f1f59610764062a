//! The table of transactions shown on the home and history pages.

use maud::{Markup, html};
use time::Date;

use crate::{
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, format_currency},
    transaction::{Transaction, category_style, remove_special_characters, transaction_status},
};

// Columns that only show once the table is wider than 800px.
const WIDE_HEADER_STYLE: &str = "hidden @min-[801px]:table-cell px-4 py-3";
const WIDE_CELL_STYLE: &str = "hidden @min-[801px]:table-cell px-4 py-3";

fn category_badge(category: &str) -> Markup {
    let style = category_style(category);

    html! {
        div
            class={
                "inline-flex items-center gap-1 px-2 py-0.5 rounded-full border "
                (style.border) " " (style.chip_background)
            }
        {
            div class={ "size-2 rounded-full " (style.background) } {}
            p class={ "text-xs font-medium " (style.text) } { (category) }
        }
    }
}

/// Format `date` as M/D/YYYY, e.g. "5/1/2024".
fn format_date(date: Date) -> String {
    format!("{}/{}/{}", u8::from(date.month()), date.day(), date.year())
}

fn transaction_row(transaction: &Transaction, today: Date) -> Markup {
    let amount = format_currency(transaction.amount);
    let (row_style, amount_style, amount) = if transaction.is_debit() {
        ("bg-red-50/40 dark:bg-gray-800", "text-red-600", format!("-{amount}"))
    } else {
        ("bg-green-50/40 dark:bg-gray-800", "text-green-600", amount)
    };

    html! {
        tr class={ "border-b border-gray-200 dark:border-gray-700 " (row_style) }
            data-transaction-id=(transaction.id)
        {
            td class={ (TABLE_CELL_STYLE) " max-w-[250px]" }
            {
                p class="truncate font-semibold text-gray-700 dark:text-gray-200"
                {
                    (remove_special_characters(&transaction.name))
                }
            }
            td class={ (TABLE_CELL_STYLE) " font-semibold " (amount_style) } data-amount
            {
                (amount)
            }
            td class=(WIDE_CELL_STYLE)
            {
                (category_badge(transaction_status(transaction.date, today)))
            }
            td class=(TABLE_CELL_STYLE) { (format_date(transaction.date)) }
            td class={ (WIDE_CELL_STYLE) " capitalize min-w-24" } { (transaction.payment_channel) }
            td class=(TABLE_CELL_STYLE) { (category_badge(&transaction.category)) }
        }
    }
}

/// Render `transactions` as a table.
///
/// `today` decides which transactions are still processing. The status and
/// channel columns are hidden when the table is narrow.
pub fn transactions_table(transactions: &[Transaction], today: Date) -> Markup {
    html! {
        div class="@container w-full overflow-x-auto"
        {
            table class="w-full text-sm text-left text-gray-600 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transaction" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(WIDE_HEADER_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(WIDE_HEADER_STYLE) { "Channel" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    }
                }
                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction, today))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td colspan="6" class="px-4 py-6 text-center"
                            {
                                "No transactions yet."
                            }
                        }
                    }
                }
            }
        }
    }
}
