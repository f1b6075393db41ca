//! Reconciliation reports and exports.
//!
//! - [summarize] totals the ledger by meter type and status.
//! - [export_csv] and [export_photo_bundle] produce the downloads.

mod export;
mod reports_page;
mod summary;

pub use export::{
    LEDGER_EXPORT_FILE_NAME, PHOTO_EXPORT_FILE_NAME, PhotoBundle, export_csv, export_photo_bundle,
};
pub use reports_page::{export_ledger_csv, export_photos_zip, get_reports_page};
pub use summary::{SummaryRow, summarize};
