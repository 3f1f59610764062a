//! Transactions as shown to the user and the helpers for displaying them.

use std::{collections::HashMap, sync::Mutex};

use rusqlite::Connection;
use time::{Date, Duration, UtcOffset, macros::format_description};

use crate::{
    Error,
    bank::{Bank, BankId},
    services::{BankDataClient, TransactionData},
    transfer::{Transfer, get_transfers_for_bank},
};

/// Whether money left or entered the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Debit,
    Credit,
}

/// A transaction on a linked account.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub name: String,
    /// The amount in dollars, always positive. See `transaction_type` for the direction.
    pub amount: f64,
    pub date: Date,
    pub category: String,
    pub payment_channel: String,
    pub transaction_type: TransactionType,
    pub pending: bool,
}

impl Transaction {
    /// Convert an aggregator transaction, which uses positive amounts for debits.
    ///
    /// Returns `None` if the date cannot be parsed.
    pub fn from_aggregator(data: TransactionData) -> Option<Self> {
        let date = match Date::parse(&data.date, format_description!("[year]-[month]-[day]")) {
            Ok(date) => date,
            Err(error) => {
                tracing::warn!(
                    "Skipping transaction {} with invalid date {:?}: {error}",
                    data.transaction_id,
                    data.date
                );
                return None;
            }
        };
        let category = data.primary_category();

        Some(Self {
            transaction_type: if data.amount > 0.0 {
                TransactionType::Debit
            } else {
                TransactionType::Credit
            },
            amount: data.amount.abs(),
            id: data.transaction_id,
            name: data.name,
            date,
            category,
            payment_channel: data.payment_channel,
            pending: data.pending,
        })
    }

    /// Convert a recorded transfer as seen from `bank_id`.
    pub fn from_transfer(transfer: Transfer, bank_id: BankId, offset: UtcOffset) -> Self {
        Self {
            id: format!("transfer-{}", transfer.id),
            transaction_type: if transfer.sender_bank_id == bank_id {
                TransactionType::Debit
            } else {
                TransactionType::Credit
            },
            name: transfer.name,
            amount: transfer.amount,
            date: transfer.created_at.to_offset(offset).date(),
            category: transfer.category,
            payment_channel: transfer.channel,
            pending: false,
        }
    }

    pub fn is_debit(&self) -> bool {
        self.transaction_type == TransactionType::Debit
    }
}

/// Get the transactions of `bank`, newest first.
///
/// Combines the aggregator's transactions for the bank's account with the
/// transfers recorded for the bank. Transfer dates are taken in `offset`.
///
/// # Errors
///
/// Fails if the transfers cannot be read or the aggregator cannot be reached.
pub async fn get_bank_transactions(
    bank: &Bank,
    client: &dyn BankDataClient,
    db_connection: &Mutex<Connection>,
    offset: UtcOffset,
) -> Result<Vec<Transaction>, Error> {
    let transfers = {
        let connection = db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_transfers_for_bank(bank.id, &connection)?
    };

    let mut transactions: Vec<Transaction> = client
        .get_transactions(&bank.access_token)
        .await?
        .into_iter()
        .filter(|transaction| transaction.account_id == bank.account_id)
        .filter_map(Transaction::from_aggregator)
        .collect();

    transactions.extend(
        transfers
            .into_iter()
            .map(|transfer| Transaction::from_transfer(transfer, bank.id, offset)),
    );
    // Stable, so same-day transactions keep the aggregator's order.
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(transactions)
}

/// Transactions within two days of `today` are still being processed.
pub fn transaction_status(date: Date, today: Date) -> &'static str {
    if date > today - Duration::days(2) {
        "Processing"
    } else {
        "Success"
    }
}

/// Drop every character that is not a word character or whitespace.
pub fn remove_special_characters(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

/// The Tailwind classes for a category badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub border: &'static str,
    pub text: &'static str,
    pub chip_background: &'static str,
    pub background: &'static str,
}

const DEFAULT_CATEGORY_STYLE: CategoryStyle = CategoryStyle {
    border: "border-blue-600",
    text: "text-blue-700",
    chip_background: "bg-blue-50",
    background: "bg-blue-500",
};

pub fn category_style(category: &str) -> CategoryStyle {
    match category {
        "Food and Drink" => CategoryStyle {
            border: "border-pink-600",
            text: "text-pink-700",
            chip_background: "bg-pink-50",
            background: "bg-pink-500",
        },
        "Payment" | "Success" => CategoryStyle {
            border: "border-green-600",
            text: "text-green-700",
            chip_background: "bg-green-50",
            background: "bg-green-600",
        },
        "Bank Fees" => CategoryStyle {
            border: "border-emerald-600",
            text: "text-emerald-700",
            chip_background: "bg-emerald-50",
            background: "bg-emerald-600",
        },
        "Transfer" => CategoryStyle {
            border: "border-red-600",
            text: "text-red-700",
            chip_background: "bg-red-50",
            background: "bg-red-600",
        },
        "Processing" => CategoryStyle {
            border: "border-gray-200",
            text: "text-gray-700",
            chip_background: "bg-gray-100",
            background: "bg-gray-500",
        },
        "Travel" => CategoryStyle {
            border: "border-sky-600",
            text: "text-sky-700",
            chip_background: "bg-sky-50",
            background: "bg-sky-500",
        },
        _ => DEFAULT_CATEGORY_STYLE,
    }
}

/// How many transactions fall into a category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
    pub total_count: usize,
}

/// Count the transactions per category, most common first.
///
/// Transactions without a category are counted as "Uncategorized". Ties are
/// ordered by name.
pub fn count_transaction_categories(transactions: &[Transaction]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        let category = if transaction.category.is_empty() {
            "Uncategorized"
        } else {
            &transaction.category
        };
        *counts.entry(category).or_default() += 1;
    }

    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_owned(),
            count,
            total_count: transactions.len(),
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    counts
}
