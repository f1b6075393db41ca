//! The reconciliation page and the download endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, empty_state, status_badge,
    },
    ledger::{Ledger, LedgerStore},
    navigation::NavBar,
    photo::PhotoStore,
    report::{
        export::{
            LEDGER_EXPORT_FILE_NAME, PHOTO_EXPORT_FILE_NAME, PhotoBundle, export_csv,
            export_photo_bundle,
        },
        summary::{SummaryRow, summarize},
    },
    role::Role,
};

/// The state needed for the reports page and downloads.
#[derive(Debug, Clone)]
pub struct ReportsState {
    pub ledger_store: Arc<Mutex<LedgerStore>>,
    pub photo_store: PhotoStore,
}

impl FromRef<AppState> for ReportsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger_store: state.ledger_store.clone(),
            photo_store: state.photo_store.clone(),
        }
    }
}

impl ReportsState {
    fn load_ledger(&self) -> Result<Ledger, Error> {
        Ok(self
            .ledger_store
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
            .map_err(|_| Error::LedgerLockError)?
            .load())
    }
}

/// Renders the stock summary with links to download the ledger and photos.
pub async fn get_reports_page(
    State(state): State<ReportsState>,
    Extension(role): Extension<Role>,
) -> Result<Response, Error> {
    let ledger = state.load_ledger()?;
    let has_photos = has_photos(&state.photo_store);

    Ok(reports_view(&ledger, has_photos, role).into_response())
}

/// Responds with the whole ledger as a CSV file download.
pub async fn export_ledger_csv(State(state): State<ReportsState>) -> Result<Response, Error> {
    let ledger = state.load_ledger()?;
    let bytes = export_csv(&ledger)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{LEDGER_EXPORT_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Responds with every stored photo as a zip file download.
///
/// If there are no photos, an alert saying so is returned with the status
/// 404 Not Found instead of an empty archive.
pub async fn export_photos_zip(State(state): State<ReportsState>) -> Response {
    match export_photo_bundle(state.photo_store.dir()) {
        Ok(PhotoBundle::Archive(bytes)) => (
            [
                (CONTENT_TYPE, "application/zip".to_owned()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{PHOTO_EXPORT_FILE_NAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(PhotoBundle::Empty) => (
            StatusCode::NOT_FOUND,
            Alert::ErrorSimple {
                message: "No photos available yet.".to_owned(),
            },
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not bundle photos: {error}");
            error.into_response()
        }
    }
}

fn has_photos(photo_store: &PhotoStore) -> bool {
    std::fs::read_dir(photo_store.dir())
        .map(|mut entries| {
            entries.any(|entry| {
                entry
                    .and_then(|entry| entry.file_type())
                    .is_ok_and(|file_type| file_type.is_file())
            })
        })
        .unwrap_or(false)
}

fn reports_view(ledger: &Ledger, has_photos: bool, role: Role) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW, role).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg space-y-6"
            {
                h2 class="text-xl font-bold" { "Reconciliation & Exports" }

                @if ledger.is_empty() {
                    (empty_state("No data to reconcile."))
                } @else {
                    section class="space-y-2"
                    {
                        h3 class="text-lg font-semibold" { "Quick Summary" }

                        (summary_table(&summarize(ledger)))
                    }

                    section class="space-y-2"
                    {
                        h3 class="text-lg font-semibold" { "Download full ledger" }

                        a
                            href=(endpoints::EXPORT_LEDGER_CSV)
                            download=(LEDGER_EXPORT_FILE_NAME)
                            class={ "inline-block text-center max-w-xs " (BUTTON_PRIMARY_STYLE) }
                        {
                            "Download CSV"
                        }
                    }

                    section class="space-y-2"
                    {
                        h3 class="text-lg font-semibold" { "Download photos as ZIP (all photos)" }

                        @if has_photos {
                            a
                                href=(endpoints::EXPORT_PHOTOS_ZIP)
                                download=(PHOTO_EXPORT_FILE_NAME)
                                class={ "inline-block text-center max-w-xs " (BUTTON_PRIMARY_STYLE) }
                            {
                                "Download photos.zip"
                            }
                        } @else {
                            (empty_state("No photos available yet."))
                        }
                    }
                }
            }
        }
    };

    base("Reports", &content)
}

fn summary_table(rows: &[SummaryRow]) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md rounded"
        {
            table id="summary" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Meter Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Meter Quantity" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "CIU Quantity" }
                    }
                }

                tbody
                {
                    @for row in rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (row.meter_type) }
                            td class=(TABLE_CELL_STYLE) { (status_badge(row.status)) }
                            td class={ (TABLE_CELL_STYLE) " text-right" } { (row.meter_quantity) }
                            td class={ (TABLE_CELL_STYLE) " text-right" } { (row.ciu_quantity) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension,
        extract::State,
        http::{StatusCode, header::CONTENT_DISPOSITION},
        response::Response,
    };
    use tempfile::{TempDir, tempdir};
    use time::macros::datetime;

    use crate::{
        endpoints,
        ledger::{Action, Ledger, LedgerStore, Status, TransactionId, TransactionRecord},
        photo::PhotoStore,
        report::reports_page::{
            ReportsState, export_ledger_csv, export_photos_zip, get_reports_page,
        },
        role::Role,
        test_utils::{
            assert_content_type, assert_valid_html, get_header, parse_html_document, select_text,
        },
    };

    fn record(id: &str, status: Status) -> TransactionRecord {
        TransactionRecord {
            date: datetime!(2025-10-05 09:05:07),
            id: TransactionId::new(id),
            action: Action::StockOut,
            meter_type: "DN15 - 15mm LXC Blue Meter (inside blue & white meter box)".to_owned(),
            meter_quantity: 5,
            ciu_quantity: 2,
            stock_issued_to: "Team A".to_owned(),
            photo_paths: Vec::new(),
            status,
            notes: String::new(),
        }
    }

    fn get_test_state(records: Vec<TransactionRecord>) -> (TempDir, ReportsState) {
        let dir = tempdir().unwrap();
        let ledger_store = LedgerStore::in_dir(dir.path());
        if !records.is_empty() {
            ledger_store.save(&Ledger::new(records)).unwrap();
        }
        let photo_store = PhotoStore::new(dir.path().join("photos"));

        (
            dir,
            ReportsState {
                ledger_store: Arc::new(Mutex::new(ledger_store)),
                photo_store,
            },
        )
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn empty_ledger_has_nothing_to_reconcile() {
        let (_dir, state) = get_test_state(Vec::new());

        let response = get_reports_page(State(state), Extension(Role::Manager))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(
            select_text(&document, "[data-empty-state]"),
            ["No data to reconcile."]
        );
        assert!(select_text(&document, "#summary").is_empty());
    }

    #[tokio::test]
    async fn shows_summary_and_downloads() {
        let (dir, state) = get_test_state(vec![
            record("TXN-1", Status::Approved),
            record("TXN-2", Status::Approved),
            record("TXN-3", Status::PendingApproval),
        ]);
        fs::create_dir(dir.path().join("photos")).unwrap();
        fs::write(dir.path().join("photos/TXN-1_a.jpg"), b"a").unwrap();

        let response = get_reports_page(State(state), Extension(Role::Manager))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let rows = select_text(&document, "#summary tbody tr");
        assert_eq!(rows.len(), 2);
        assert_eq!(
            select_text(&document, "#summary tbody tr:first-child td:nth-child(3)"),
            ["5"]
        );
        assert_eq!(
            select_text(&document, "#summary tbody tr:nth-child(2) td:nth-child(3)"),
            ["10"]
        );
        let link_selector = scraper::Selector::parse("a[download]").unwrap();
        let hrefs = document
            .select(&link_selector)
            .map(|link| link.value().attr("href").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(
            hrefs,
            [endpoints::EXPORT_LEDGER_CSV, endpoints::EXPORT_PHOTOS_ZIP]
        );
    }

    #[tokio::test]
    async fn no_photos_message_replaces_zip_link() {
        let (_dir, state) = get_test_state(vec![record("TXN-1", Status::Approved)]);

        let response = get_reports_page(State(state), Extension(Role::Admin))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert_eq!(
            select_text(&document, "[data-empty-state]"),
            ["No photos available yet."]
        );
    }

    #[tokio::test]
    async fn ledger_csv_is_an_attachment() {
        let (_dir, state) = get_test_state(vec![record("TXN-1", Status::Approved)]);
        let want = state.ledger_store.lock().unwrap().load().to_csv().unwrap();

        let response = export_ledger_csv(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/csv; charset=utf-8");
        assert_eq!(
            get_header(&response, CONTENT_DISPOSITION.as_str()),
            "attachment; filename=\"stock_ledger.csv\""
        );
        assert_eq!(body_bytes(response).await, want);
    }

    #[tokio::test]
    async fn photos_zip_is_an_attachment() {
        let (dir, state) = get_test_state(Vec::new());
        fs::create_dir(dir.path().join("photos")).unwrap();
        fs::write(dir.path().join("photos/TXN-1_a.jpg"), b"a").unwrap();

        let response = export_photos_zip(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "application/zip");
        assert_eq!(
            get_header(&response, CONTENT_DISPOSITION.as_str()),
            "attachment; filename=\"photos.zip\""
        );
        assert!(body_bytes(response).await.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn photos_zip_without_photos_says_so() {
        let (_dir, state) = get_test_state(Vec::new());

        let response = export_photos_zip(State(state)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(text.contains("No photos available yet."));
    }
}
