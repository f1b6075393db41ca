//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, forbidden::ForbiddenError, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A stock-out submission did not select any meter type.
    #[error("at least one meter type must be selected")]
    MissingMeterType,

    /// A stock-out submission did not say who the stock was issued to.
    #[error("the person or team the stock was issued to must be given")]
    MissingStockIssuedTo,

    /// A quantity in a submission was not a whole number of zero or more.
    ///
    /// Holds the name of the offending form field.
    #[error("{0} must be a whole number of zero or more")]
    InvalidQuantity(String),

    /// An uploaded photo had no usable file name.
    #[error("invalid photo file name \"{0}\"")]
    InvalidPhotoName(String),

    /// An uploaded file was not a JPEG or PNG image.
    #[error("\"{0}\" is not a JPG or PNG image")]
    NotAnImage(String),

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// A stock-out submission was larger than the configured upload limit.
    #[error("the submitted form is larger than the upload limit")]
    UploadTooLarge,

    /// No transaction has the given ID.
    ///
    /// For HTTP request handlers, the client should check that the ID is
    /// correct and that the transaction has been recorded.
    #[error("transaction \"{0}\" could not be found")]
    TransactionNotFound(String),

    /// A stored photo could not be found.
    #[error("photo \"{0}\" could not be found")]
    PhotoNotFound(String),

    /// The ledger file could not be parsed.
    ///
    /// This never leaves [crate::ledger::LedgerStore::load], which falls back
    /// to an empty ledger instead.
    #[error("the ledger is corrupt: {0}")]
    CorruptLedger(String),

    /// The ledger could not be serialized as CSV.
    #[error("could not write CSV: {0}")]
    Csv(String),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The photo archive could not be built.
    #[error("could not create the photo archive: {0}")]
    Archive(String),

    /// Could not acquire the ledger lock.
    #[error("could not acquire the ledger lock")]
    LedgerLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The request did not carry a role that may use the requested page.
    #[error("the current role may not access this page")]
    Forbidden,
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::Csv(value.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(value: zip::result::ZipError) -> Self {
        Error::Archive(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::TransactionNotFound(_) | Error::PhotoNotFound(_) => {
                NotFoundError.into_response()
            }
            Error::Forbidden => ForbiddenError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::LedgerLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::MissingMeterType => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Missing meter type".to_owned(),
                    details: "Please select at least one Meter Type.".to_owned(),
                },
            ),
            Error::MissingStockIssuedTo => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Missing recipient".to_owned(),
                    details: "Please enter who stock was issued to.".to_owned(),
                },
            ),
            Error::InvalidQuantity(field) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid quantity".to_owned(),
                    details: format!("{field} must be a whole number of zero or more."),
                },
            ),
            Error::NotAnImage(file_name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unsupported photo".to_owned(),
                    details: format!(
                        "\"{file_name}\" is not a JPG or PNG image. Upload photos as .jpg, .jpeg or .png files."
                    ),
                },
            ),
            Error::InvalidPhotoName(file_name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unsupported photo".to_owned(),
                    details: format!("\"{file_name}\" is not a valid file name."),
                },
            ),
            Error::MultipartError(_) => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Could not read the submitted form, please try again.".to_owned(),
                },
            ),
            Error::UploadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Alert::Error {
                    message: "Photos too large".to_owned(),
                    details: "The submission is over the upload limit. \
                        Try again with fewer or smaller photos."
                        .to_owned(),
                },
            ),
            Error::TransactionNotFound(id) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Transaction not found".to_owned(),
                    details: format!(
                        "No transaction has the ID \"{id}\". \
                        Try refreshing the page to see the latest transactions."
                    ),
                },
            ),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                Alert::ErrorSimple {
                    message: "You are not allowed to do that.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
