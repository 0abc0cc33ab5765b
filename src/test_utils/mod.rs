#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod renderer;
pub(crate) mod response;

pub(crate) use form::{
    assert_form_action, assert_form_input, assert_form_submit_button_with_text,
    must_get_form_with_field,
};
pub(crate) use renderer::StubChartRenderer;
pub(crate) use response::{
    assert_content_type, assert_status_ok, assert_valid_html, body_text, get_header,
    parse_html_document,
};
