//! Photos attached to stock transactions.
//!
//! Photos live in one flat directory. Each file is named
//! `<transaction ID>_<uploaded file name>` so the owning transaction can be
//! read off the file name.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    Error,
    ledger::{TransactionId, TransactionRecord},
};

/// The file extensions accepted for uploaded photos.
const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A photo listed for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// The path stored in the ledger.
    pub path: PathBuf,
    /// The file name inside the photo directory, e.g. "TXN-20251005090507_serial.jpg".
    pub file_name: String,
    /// Whether the file no longer exists on disk.
    pub missing: bool,
}

/// Reads and writes photos in a directory.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// Create a store for photos in `dir`.
    ///
    /// The directory is created when the first photo is stored.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the photos.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an uploaded photo for the transaction `id`.
    ///
    /// Only the final component of `original_file_name` is used, so a name
    /// such as `C:\Users\me\serial.jpg` is stored as `<id>_serial.jpg`.
    /// Any character other than an ASCII letter, digit, `.`, `_` or `-` is
    /// replaced with `_`, so `front|back.jpg` is stored as `<id>_front_back.jpg`.
    /// The bytes are written as they are, whatever the image format.
    ///
    /// Returns the path the photo was written to.
    ///
    /// # Errors
    /// Returns an [Error::InvalidPhotoName] if the file name is empty once
    /// reduced to its final component, or an [Error::Io] if the file could
    /// not be written.
    pub fn store_photo(
        &self,
        id: &TransactionId,
        original_file_name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, Error> {
        let base_name = base_name(original_file_name)
            .map(url_safe_name)
            .ok_or_else(|| Error::InvalidPhotoName(original_file_name.to_owned()))?;

        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(format!("{id}_{base_name}"));
        fs::write(&path, bytes)
            .inspect_err(|error| tracing::error!("Could not save photo {}: {error}", path.display()))?;

        tracing::debug!("Saved {} bytes to {}", bytes.len(), path.display());

        Ok(path)
    }

    /// Delete photos written by [PhotoStore::store_photo] for a submission
    /// that was not recorded.
    ///
    /// Files that cannot be removed are logged and skipped.
    pub fn remove_photos(&self, paths: &[PathBuf]) {
        for path in paths {
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!("Removed unrecorded photo {}", path.display()),
                Err(error) if error.kind() == ErrorKind::NotFound => {}
                Err(error) => tracing::warn!(
                    "Could not remove unrecorded photo {}: {error}",
                    path.display()
                ),
            }
        }
    }

    /// List the photos of `record` in upload order.
    ///
    /// Photos whose file has gone are still listed with `missing` set so the
    /// caller can show a warning for each one.
    pub fn list_photos(&self, record: &TransactionRecord) -> Vec<Photo> {
        record
            .photo_paths
            .iter()
            .map(|stored_path| {
                let path = PathBuf::from(stored_path);
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| stored_path.clone());
                let missing = !path.is_file();

                if missing {
                    tracing::warn!(
                        "Photo {} of transaction {} is missing",
                        path.display(),
                        record.id
                    );
                }

                Photo {
                    path,
                    file_name,
                    missing,
                }
            })
            .collect()
    }

    /// Read the photo called `file_name` from the photo directory.
    ///
    /// # Errors
    /// Returns an [Error::PhotoNotFound] if `file_name` is not a plain file
    /// name or there is no such photo, or an [Error::Io] if the file could not
    /// be read.
    pub fn read_photo(&self, file_name: &str) -> Result<Vec<u8>, Error> {
        if base_name(file_name) != Some(file_name) {
            tracing::warn!("Refusing to read photo with path-like name {file_name:?}");
            return Err(Error::PhotoNotFound(file_name.to_owned()));
        }

        match fs::read(self.dir.join(file_name)) {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Err(Error::PhotoNotFound(file_name.to_owned()))
            }
            Err(error) => Err(error.into()),
        }
    }
}

/// Whether an uploaded file should be accepted as a photo.
///
/// A file is accepted if its content type is JPEG or PNG, or failing that,
/// if its extension is one of [ACCEPTED_EXTENSIONS].
pub fn is_accepted_image(file_name: &str, content_type: Option<&str>) -> bool {
    if matches!(content_type, Some("image/jpeg" | "image/png")) {
        return true;
    }

    extension(file_name).is_some_and(|extension| ACCEPTED_EXTENSIONS.contains(&extension.as_str()))
}

/// The content type to serve a stored photo with.
pub fn content_type_for(file_name: &str) -> &'static str {
    match extension(file_name).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
}

/// Replace characters that would need escaping in a URL path or that clash
/// with [crate::ledger::PHOTO_PATH_SEPARATOR] in the ledger.
fn url_safe_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The last component of a path using either `/` or `\` as the separator.
///
/// Returns `None` for names that would not be a plain file name.
fn base_name(file_name: &str) -> Option<&str> {
    let base_name = file_name.rsplit(['/', '\\']).next()?.trim();

    match base_name {
        "" | "." | ".." => None,
        base_name => Some(base_name),
    }
}
