#![allow(missing_docs)]

pub(crate) mod fakes;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use fakes::{
    FakeBankData, FakeTransfers, test_account, test_app_state, test_app_state_with_fakes,
    test_transaction,
};
pub(crate) use form::{
    assert_form_input, assert_form_submit_button_with_text, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::assert_status_ok;
