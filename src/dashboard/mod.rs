//! The home page and the layout shared by the pages of signed-in users.

mod home_page;
mod layout;
mod right_sidebar;
mod total_balance;

pub use home_page::get_home_page;
pub use layout::{app_layout, header_box, page_section};
