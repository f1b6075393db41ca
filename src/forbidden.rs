//! Defines the page to display when the current role may not use a page.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub struct ForbiddenError;

impl IntoResponse for ForbiddenError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Html(
                error_view(
                    "Forbidden",
                    "403",
                    "You don't have access to this page.",
                    "Your role cannot use this page. Ask an administrator if you need access.",
                )
                .into_string(),
            ),
        )
            .into_response()
    }
}
