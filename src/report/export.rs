//! Downloads of the ledger and the stored photos.

use std::{
    fs,
    io::{Cursor, ErrorKind, Write},
    path::Path,
};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{Error, ledger::Ledger};

/// The file name offered for the ledger download.
pub const LEDGER_EXPORT_FILE_NAME: &str = "stock_ledger.csv";
/// The file name offered for the photo download.
pub const PHOTO_EXPORT_FILE_NAME: &str = "photos.zip";

/// The result of bundling the photo directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoBundle {
    /// There were no photos to bundle.
    Empty,
    /// A zip archive with every photo.
    Archive(Vec<u8>),
}

/// The ledger as CSV, byte for byte the same as the ledger file.
///
/// # Errors
/// Returns an [Error::Csv] if a row could not be written.
pub fn export_csv(ledger: &Ledger) -> Result<Vec<u8>, Error> {
    ledger.to_csv()
}

/// Bundle every file directly inside `dir` into a zip archive.
///
/// Entries are named after the file only, without folders, and added in
/// file name order. Sub-directories are skipped.
///
/// # Errors
/// Returns an [Error::Io] if the directory or a file could not be read, or an
/// [Error::Archive] if the archive could not be written.
pub fn export_photo_bundle(dir: &Path) -> Result<PhotoBundle, Error> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::debug!("No photo directory at {}", dir.display());
            return Ok(PhotoBundle::Empty);
        }
        Err(error) => return Err(error.into()),
    };

    let mut files = Vec::new();

    for entry in entries {
        let entry = entry?;

        if entry.file_type()?.is_file() {
            files.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }

    if files.is_empty() {
        return Ok(PhotoBundle::Empty);
    }

    files.sort();

    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, path) in &files {
        let bytes = fs::read(path)?;
        archive.start_file(name.as_str(), options)?;
        archive.write_all(&bytes)?;
    }

    let bytes = archive.finish()?.into_inner();

    tracing::debug!(
        "Bundled {} photo(s) into a {} byte archive",
        files.len(),
        bytes.len()
    );

    Ok(PhotoBundle::Archive(bytes))
}
