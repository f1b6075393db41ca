//! Implements a struct that holds the state of the server.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{ledger::LedgerStore, photo::PhotoStore};

/// The largest stock-out submission accepted unless configured otherwise: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The CSV ledger of stock-out transactions.
    ///
    /// The lock is held for the whole load, change and save cycle so that
    /// concurrent requests cannot overwrite each other's changes.
    pub ledger_store: Arc<Mutex<LedgerStore>>,

    /// Where uploaded photos are kept.
    pub photo_store: PhotoStore,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The body size limit in bytes for stock-out submissions, photos included.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create a new [AppState] that keeps the ledger in `data_dir` and photos
    /// in `photo_dir`.
    ///
    /// Neither directory needs to exist yet, they are created on the first
    /// write. `local_timezone` should be a valid, canonical timezone name,
    /// e.g. "Pacific/Auckland".
    pub fn new(data_dir: &Path, photo_dir: &Path, local_timezone: &str) -> Self {
        Self {
            ledger_store: Arc::new(Mutex::new(LedgerStore::in_dir(data_dir))),
            photo_store: PhotoStore::new(photo_dir),
            local_timezone: local_timezone.to_owned(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Accept stock-out submissions of up to `megabytes` MiB.
    pub fn with_max_upload_mb(mut self, megabytes: usize) -> Self {
        self.max_upload_bytes = megabytes.saturating_mul(1024 * 1024);
        self
    }
}
