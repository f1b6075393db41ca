//! Reading and writing the ledger file.

use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use time::OffsetDateTime;

use crate::{Error, ledger::Ledger};

/// The file name of the ledger inside the data directory.
pub const LEDGER_FILE_NAME: &str = "stock_ledger.csv";

/// Loads and saves the whole [Ledger] as a CSV file.
///
/// The store does no locking of its own. Callers that load, change and save
/// the ledger must hold the lock around the store in [crate::AppState] for
/// the whole sequence, otherwise concurrent updates can be lost.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Create a store for the ledger file at `path`.
    ///
    /// Nothing is read or written until [LedgerStore::load] or
    /// [LedgerStore::save] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store for [LEDGER_FILE_NAME] inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(LEDGER_FILE_NAME))
    }

    /// The path of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger from disk.
    ///
    /// This never fails. A missing file gives an empty ledger. A file that
    /// cannot be read or parsed also gives an empty ledger: the problem is
    /// logged and an unparseable file is renamed to
    /// `<file name>.corrupt-<unix time>` so that the next save does not
    /// overwrite the only copy of the old rows.
    pub fn load(&self) -> Ledger {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    "No ledger found at {}, starting with an empty ledger",
                    self.path.display()
                );
                return Ledger::default();
            }
            Err(error) => {
                tracing::warn!(
                    "Could not read the ledger at {}, using an empty ledger: {error}",
                    self.path.display()
                );
                return Ledger::default();
            }
        };

        match Ledger::from_csv(bytes.as_slice()) {
            Ok(ledger) => ledger,
            Err(error) => {
                tracing::warn!(
                    "The ledger at {} is corrupt, using an empty ledger: {error}",
                    self.path.display()
                );
                self.move_corrupt_file_aside();
                Ledger::default()
            }
        }
    }

    /// Write the whole ledger to disk, replacing the previous file.
    ///
    /// The rows are written to a temporary file next to the ledger which is
    /// then renamed over it, so a crash mid-write leaves the old ledger intact.
    ///
    /// # Errors
    /// Returns an [Error::Csv] if the rows cannot be serialized or an
    /// [Error::Io] if the file cannot be written.
    pub fn save(&self, ledger: &Ledger) -> Result<(), Error> {
        let data = ledger.to_csv()?;

        write_atomic(&self.path, &data)
            .inspect_err(|error| tracing::error!("Could not save the ledger: {error}"))
    }

    fn move_corrupt_file_aside(&self) {
        let Some(file_name) = self.path.file_name() else {
            return;
        };

        let backup_path = self.path.with_file_name(format!(
            "{}.corrupt-{}",
            file_name.to_string_lossy(),
            OffsetDateTime::now_utc().unix_timestamp()
        ));

        match fs::rename(&self.path, &backup_path) {
            Ok(()) => tracing::warn!("Moved the corrupt ledger to {}", backup_path.display()),
            Err(error) => tracing::error!(
                "Could not move the corrupt ledger to {}: {error}",
                backup_path.display()
            ),
        }
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), Error> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Io(format!("invalid ledger path {}", path.display())))?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}
