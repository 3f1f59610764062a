//! Sessions, sign-in, sign-up and sign-out.

pub(crate) mod cookie;
mod current_user;
mod middleware;
mod password;
mod redirect;
mod sign_in;
mod sign_out;
mod sign_up;
mod sign_up_form;
mod token;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use current_user::get_logged_in_user;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use sign_in::{get_sign_in_page, post_sign_in};
pub use sign_out::get_sign_out;
pub use sign_up::{get_sign_up_page, post_sign_up};
pub(crate) use token::Token;
