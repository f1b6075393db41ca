#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod multipart;

pub(crate) use form::{
    assert_form_input, assert_form_submit_button_with_text, assert_hx_endpoint, form_input_values,
    must_get_form,
};
pub(crate) use html::{
    assert_alert_message, assert_valid_html, parse_html_document, parse_html_fragment,
    select_text,
};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok, get_header};
pub(crate) use multipart::{
    MultipartPart, multipart_body, multipart_content_type, must_make_multipart,
};
