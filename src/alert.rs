//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element of the base page
//! with an out-of-band swap, so any htmx request can respond with one.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A message to show the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action worked, with extra details.
    Success { message: String, details: String },
    /// The action worked.
    SuccessSimple { message: String },
    /// The action failed, with details on how to fix it.
    Error { message: String, details: String },
    /// The action failed.
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_markup(self) -> Markup {
        let (is_success, message, details) = match self {
            Alert::Success { message, details } => (true, message, Some(details)),
            Alert::SuccessSimple { message } => (true, message, None),
            Alert::Error { message, details } => (false, message, Some(details)),
            Alert::ErrorSimple { message } => (false, message, None),
        };

        let style = if is_success {
            "flex items-start gap-3 p-4 rounded-lg shadow border \
            text-green-800 bg-green-50 border-green-300 \
            dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        } else {
            "flex items-start gap-3 p-4 rounded-lg shadow border \
            text-red-800 bg-red-50 border-red-300 \
            dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div role="alert" class=(style)
                {
                    div class="flex-1"
                    {
                        p class="text-sm font-medium" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty()) {
                            p class="mt-1 text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="text-sm font-semibold"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }

    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
