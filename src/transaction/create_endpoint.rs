//! Defines the endpoint for recording a stock-out transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{
        FromRef, Multipart, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    alert::Alert,
    internal_server_error::get_internal_server_error_redirect,
    ledger::LedgerStore,
    photo::{PhotoStore, is_accepted_image},
    timezone::local_now,
    transaction::core::{PhotoUpload, StockOutSubmission, create_transaction},
};

/// The state needed to record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The ledger the transaction is appended to.
    pub ledger_store: Arc<Mutex<LedgerStore>>,
    /// Where uploaded photos are saved.
    pub photo_store: PhotoStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger_store: state.ledger_store.clone(),
            photo_store: state.photo_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for recording a stock-out transaction from the multipart
/// stock-out form, responds with an alert with the new transaction ID.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    multipart: Multipart,
) -> Response {
    let Some(now) = local_now(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let submission = match parse_submission(multipart).await {
        Ok(submission) => submission,
        Err(error) => {
            tracing::debug!("Rejected stock out submission: {error}");
            return error.into_alert_response();
        }
    };

    let ledger_store = match state.ledger_store.lock() {
        Ok(ledger_store) => ledger_store,
        Err(error) => {
            tracing::error!("could not acquire ledger lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let record = match create_transaction(&ledger_store, &state.photo_store, submission, now) {
        Ok(record) => record,
        Err(error) => {
            tracing::error!("could not record stock out: {error}");
            return error.into_alert_response();
        }
    };

    let message = format!("Stock Out recorded. Transaction ID: {}", record.id);
    let alert = match record.photo_paths.len() {
        0 => Alert::SuccessSimple { message },
        count => Alert::Success {
            message,
            details: format!("{count} photo(s) saved."),
        },
    };

    (StatusCode::CREATED, alert.into_html()).into_response()
}

/// Read the stock-out form.
///
/// File inputs that were left empty are skipped. A quantity that is left
/// empty counts as zero.
async fn parse_submission(mut multipart: Multipart) -> Result<StockOutSubmission, Error> {
    let mut submission = StockOutSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "meter_type" => submission.meter_types.push(read_text(field).await?),
            "meter_quantity" => {
                submission.meter_quantity =
                    parse_quantity(&read_text(field).await?, "Meter Quantity")?
            }
            "ciu_quantity" => {
                submission.ciu_quantity = parse_quantity(&read_text(field).await?, "CIU Quantity")?
            }
            "stock_issued_to" => submission.stock_issued_to = read_text(field).await?,
            "notes" => submission.notes = read_text(field).await?,
            "photos" => {
                if let Some(photo) = read_photo(field).await? {
                    submission.photos.push(photo);
                }
            }
            other => tracing::debug!("Ignoring unknown form field {other:?}"),
        }
    }

    Ok(submission)
}

async fn read_text(field: Field<'_>) -> Result<String, Error> {
    field.text().await.map_err(multipart_error)
}

async fn read_photo(field: Field<'_>) -> Result<Option<PhotoUpload>, Error> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let content_type = field.content_type().map(str::to_owned);

    let bytes = field.bytes().await.map_err(multipart_error)?;

    // Browsers send an empty part for a file input with no files selected.
    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }

    if !is_accepted_image(&file_name, content_type.as_deref()) {
        return Err(Error::NotAnImage(file_name));
    }

    tracing::debug!("Received photo '{}' that is {} bytes", file_name, bytes.len());

    Ok(Some(PhotoUpload {
        file_name,
        bytes: bytes.to_vec(),
    }))
}

/// Body limit errors are told apart so the client can be asked for smaller photos.
fn multipart_error(error: MultipartError) -> Error {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!("Stock out submission is over the upload limit: {error}");
        return Error::UploadTooLarge;
    }

    tracing::error!("Could not read multipart form: {error}");
    Error::MultipartError(error.to_string())
}

fn parse_quantity(text: &str, field_label: &str) -> Result<u32, Error> {
    let text = text.trim();

    if text.is_empty() {
        return Ok(0);
    }

    text.parse()
        .map_err(|_| Error::InvalidQuantity(field_label.to_owned()))
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::{Arc, Mutex},
    };

    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use tempfile::{TempDir, tempdir};

    use crate::{
        Error,
        ledger::{LedgerStore, Status},
        photo::PhotoStore,
        test_utils::{
            MultipartPart, assert_alert_message, must_make_multipart, parse_html_fragment,
        },
        transaction::{
            core::METER_TYPE_OPTIONS,
            create_endpoint::{CreateTransactionState, create_transaction_endpoint, parse_quantity},
        },
    };

    fn get_test_state() -> (TempDir, CreateTransactionState) {
        let dir = tempdir().unwrap();
        let state = CreateTransactionState {
            ledger_store: Arc::new(Mutex::new(LedgerStore::in_dir(&dir.path().join("data")))),
            photo_store: PhotoStore::new(dir.path().join("photos")),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (dir, state)
    }

    fn form_fields(meter_type: &'static str, stock_issued_to: &'static str) -> Vec<MultipartPart> {
        vec![
            MultipartPart::text("meter_type", meter_type),
            MultipartPart::text("meter_quantity", "5"),
            MultipartPart::text("ciu_quantity", "2"),
            MultipartPart::text("stock_issued_to", stock_issued_to),
            MultipartPart::text("notes", ""),
        ]
    }

    #[tokio::test]
    async fn records_stock_out_with_photos() {
        let (dir, state) = get_test_state();
        let mut parts = form_fields(METER_TYPE_OPTIONS[0], "Team A");
        parts.push(MultipartPart::file("photos", "serial-1.jpg", "image/jpeg", "first"));
        parts.push(MultipartPart::file("photos", "serial-2.png", "image/png", "second"));

        let response =
            create_transaction_endpoint(State(state.clone()), must_make_multipart(&parts).await)
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let ledger = state.ledger_store.lock().unwrap().load();
        assert_eq!(ledger.len(), 1);
        let record = &ledger.records()[0];
        assert_eq!(record.status, Status::PendingApproval);
        assert_eq!(record.meter_quantity, 5);
        assert_eq!(record.ciu_quantity, 2);
        assert_eq!(record.photo_paths.len(), 2);
        for name in ["serial-1.jpg", "serial-2.png"] {
            let path = dir.path().join("photos").join(format!("{}_{name}", record.id));
            assert!(path.is_file(), "want photo at {}", path.display());
        }
        let html = parse_html_fragment(response).await;
        assert_alert_message(
            &html,
            &format!("Stock Out recorded. Transaction ID: {}", record.id),
        );
    }

    #[tokio::test]
    async fn skips_empty_file_inputs() {
        let (_dir, state) = get_test_state();
        let mut parts = form_fields(METER_TYPE_OPTIONS[1], "Team B");
        parts.push(MultipartPart::file("photos", "", "application/octet-stream", ""));

        let response =
            create_transaction_endpoint(State(state.clone()), must_make_multipart(&parts).await)
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let ledger = state.ledger_store.lock().unwrap().load();
        assert!(ledger.records()[0].photo_paths.is_empty());
    }

    #[tokio::test]
    async fn rejects_missing_meter_type() {
        let (_dir, state) = get_test_state();
        let parts = vec![
            MultipartPart::text("meter_quantity", "5"),
            MultipartPart::text("stock_issued_to", "Team A"),
        ];

        let response =
            create_transaction_endpoint(State(state.clone()), must_make_multipart(&parts).await)
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_alert_message(&html, "Missing meter type");
        assert!(state.ledger_store.lock().unwrap().load().is_empty());
    }

    #[tokio::test]
    async fn rejects_missing_recipient() {
        let (_dir, state) = get_test_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            must_make_multipart(&form_fields(METER_TYPE_OPTIONS[0], "")).await,
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.ledger_store.lock().unwrap().load().is_empty());
    }

    #[tokio::test]
    async fn rejects_files_that_are_not_images() {
        let (dir, state) = get_test_state();
        let mut parts = form_fields(METER_TYPE_OPTIONS[0], "Team A");
        parts.push(MultipartPart::file("photos", "notes.txt", "text/plain", "hello"));

        let response =
            create_transaction_endpoint(State(state.clone()), must_make_multipart(&parts).await)
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.ledger_store.lock().unwrap().load().is_empty());
        assert!(!dir.path().join("photos").exists());
    }

    #[test]
    fn quantities_must_be_whole_numbers() {
        assert_eq!(parse_quantity("", "Meter Quantity"), Ok(0));
        assert_eq!(parse_quantity(" 12 ", "Meter Quantity"), Ok(12));
        assert_eq!(
            parse_quantity("-1", "CIU Quantity"),
            Err(Error::InvalidQuantity("CIU Quantity".to_owned()))
        );
        assert_eq!(
            parse_quantity("1.5", "Meter Quantity"),
            Err(Error::InvalidQuantity("Meter Quantity".to_owned()))
        );
    }

    #[tokio::test]
    async fn ledger_file_is_written() {
        let (_dir, state) = get_test_state();

        create_transaction_endpoint(
            State(state.clone()),
            must_make_multipart(&form_fields(METER_TYPE_OPTIONS[0], "Team A")).await,
        )
        .await;

        let path = state.ledger_store.lock().unwrap().path().to_owned();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("Team A"));
    }
}
