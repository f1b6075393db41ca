//! The page showing the photos of a transaction and the route serving them.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{PAGE_CONTAINER_STYLE, base, empty_state, link, status_badge},
    ledger::{LedgerStore, TransactionId, TransactionRecord},
    navigation::NavBar,
    photo::{Photo, PhotoStore, content_type_for},
    role::Role,
    transaction::core::find_by_id,
};

/// The state needed for viewing photos.
#[derive(Debug, Clone)]
pub struct PhotosPageState {
    pub ledger_store: Arc<Mutex<LedgerStore>>,
    pub photo_store: PhotoStore,
}

impl FromRef<AppState> for PhotosPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger_store: state.ledger_store.clone(),
            photo_store: state.photo_store.clone(),
        }
    }
}

/// Renders the photos uploaded with a transaction.
///
/// Photos whose files have gone missing are listed with a warning instead.
pub async fn get_transaction_photos_page(
    State(state): State<PhotosPageState>,
    Extension(role): Extension<Role>,
    Path(transaction_id): Path<String>,
) -> Result<Response, Error> {
    let ledger = state
        .ledger_store
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
        .map_err(|_| Error::LedgerLockError)?
        .load();

    let record = find_by_id(&ledger, &TransactionId::new(&transaction_id))?;
    let photos = state.photo_store.list_photos(record);

    Ok(photos_view(record, &photos, role).into_response())
}

/// Serves the bytes of a stored photo.
pub async fn get_photo(
    State(state): State<PhotosPageState>,
    Path(file_name): Path<String>,
) -> Result<Response, Error> {
    let bytes = state.photo_store.read_photo(&file_name)?;

    Ok((
        [
            (CONTENT_TYPE, content_type_for(&file_name)),
            (CACHE_CONTROL, "private, max-age=3600"),
        ],
        bytes,
    )
        .into_response())
}

fn photos_view(record: &TransactionRecord, photos: &[Photo], role: Role) -> Markup {
    let nav_bar = NavBar::new(endpoints::REVIEW_VIEW, role).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md space-y-4"
            {
                p { (link(endpoints::REVIEW_VIEW, "Back to review")) }

                h2 class="text-xl font-bold"
                {
                    "Photos for " span class="font-mono" { (record.id) }
                }

                p class="text-sm"
                {
                    (record.stock_issued_to) " · " (record.date_text()) " · "
                    (status_badge(record.status))
                }

                @if photos.is_empty() {
                    (empty_state("No photos uploaded for this transaction."))
                }

                @for photo in photos {
                    @if photo.missing {
                        div
                            role="status"
                            data-missing-photo=(photo.file_name)
                            class="p-4 text-sm rounded-lg text-yellow-800 bg-yellow-50
                                dark:bg-gray-800 dark:text-yellow-300"
                        {
                            "Photo file missing: " (photo.path.display())
                        }
                    } @else {
                        figure
                        {
                            img
                                src=(format_endpoint(endpoints::PHOTO, &photo.file_name))
                                alt=(photo.file_name)
                                class="w-full h-auto rounded-lg";

                            figcaption class="mt-2 text-sm text-center text-gray-500 dark:text-gray-400"
                            {
                                (photo.file_name)
                            }
                        }
                    }
                }
            }
        }
    };

    base("Photos", &content)
}
