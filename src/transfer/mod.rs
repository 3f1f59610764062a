//! Sending money from one linked bank to another over the funds-transfer network.

mod core;
mod endpoint;
mod page;

pub use core::{
    NewTransfer, Transfer, create_transfer_table, get_transfers_for_bank, insert_transfer,
};
pub use endpoint::create_transfer_endpoint;
pub use page::get_transfer_page;
