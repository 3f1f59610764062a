//! Transactions of linked banks and the pages that show them.

mod core;
mod history_page;
mod table;

pub use core::{
    CategoryCount, Transaction, category_style, count_transaction_categories,
    get_bank_transactions, remove_special_characters, transaction_status,
};
pub use history_page::{BankQuery, TransactionsState, get_transaction_history_page};
pub use table::transactions_table;
