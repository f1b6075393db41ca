//! The stock-out transaction lifecycle: create, review and query.

use serde::Deserialize;
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    ledger::{
        Action, Ledger, LedgerStore, METER_TYPE_SEPARATOR, Status, TransactionId,
        TransactionRecord,
    },
    photo::PhotoStore,
};

/// The meter types installers can choose from.
pub const METER_TYPE_OPTIONS: [&str; 2] = [
    "DN15 - 15mm LXC Blue Meter (inside blue & white meter box)",
    "CIU - White keypad with red button",
];

const TRANSACTION_ID_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year][month][day][hour][minute][second]");

/// A photo uploaded with a stock-out submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// The file name given by the client.
    pub file_name: String,
    /// The file contents.
    pub bytes: Vec<u8>,
}

/// The details an installer submits when taking stock out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockOutSubmission {
    /// The labels of the selected meter types.
    pub meter_types: Vec<String>,
    /// The number of meters taken.
    pub meter_quantity: u32,
    /// The number of customer interface units taken.
    pub ciu_quantity: u32,
    /// The installer or team the stock is issued to.
    pub stock_issued_to: String,
    /// Free text, may be empty.
    pub notes: String,
    /// Photos of the serial numbers.
    pub photos: Vec<PhotoUpload>,
}

/// An admin's verdict on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The stock out is accepted.
    Approve,
    /// The stock out is refused.
    Reject,
}

impl Decision {
    /// The status a transaction gets from this decision.
    pub fn status(self) -> Status {
        match self {
            Decision::Approve => Status::Approved,
            Decision::Reject => Status::Rejected,
        }
    }
}

/// Which transactions to show on the review page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StatusFilter {
    /// Every transaction.
    #[default]
    All,
    /// Transactions with this status.
    Only(Status),
}

impl StatusFilter {
    /// Every filter in the order they are offered to the user.
    pub const OPTIONS: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(Status::PendingApproval),
        StatusFilter::Only(Status::Approved),
        StatusFilter::Only(Status::Rejected),
    ];

    /// The label shown to the user and used in query strings.
    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }

    fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();

        if value.is_empty() || value == "All" {
            return Ok(StatusFilter::All);
        }

        Status::from_label(value)
            .map(StatusFilter::Only)
            .ok_or_else(|| format!("unknown status filter \"{value}\""))
    }
}

/// Create the ID for a transaction recorded at `now`.
///
/// The ID is `TXN-` followed by the timestamp to the second. If `ledger`
/// already has that ID, e.g. two submissions in the same second, `-2`, `-3`
/// and so on is appended until the ID is unused.
pub fn generate_transaction_id(ledger: &Ledger, now: PrimitiveDateTime) -> TransactionId {
    // The format only has numeric components so formatting cannot fail.
    let timestamp = now
        .format(TRANSACTION_ID_FORMAT)
        .unwrap_or_else(|_| now.assume_utc().unix_timestamp().to_string());
    let base_id = format!("TXN-{timestamp}");

    let mut id = TransactionId::new(&base_id);
    let mut suffix = 2;

    while ledger.contains(&id) {
        id = TransactionId::new(&format!("{base_id}-{suffix}"));
        suffix += 1;
    }

    id
}

/// Record a stock-out transaction.
///
/// The submission is checked, the photos are written to `photos`, and the new
/// record is appended to the ledger with the status
/// [Status::PendingApproval]. `now` is the local time of the submission.
///
/// # Errors
/// Returns:
/// - [Error::MissingMeterType] if no meter type was selected,
/// - [Error::MissingStockIssuedTo] if the recipient is blank,
/// - [Error::InvalidPhotoName] if a photo has no usable file name,
/// - [Error::Io] or [Error::Csv] if a photo or the ledger could not be written.
///
/// Nothing is written if the submission is invalid, and photos already
/// written are removed again if a later photo or the ledger fails to save.
pub fn create_transaction(
    store: &LedgerStore,
    photos: &PhotoStore,
    submission: StockOutSubmission,
    now: PrimitiveDateTime,
) -> Result<TransactionRecord, Error> {
    let meter_types: Vec<&str> = submission
        .meter_types
        .iter()
        .map(|meter_type| meter_type.trim())
        .filter(|meter_type| !meter_type.is_empty())
        .collect();

    if meter_types.is_empty() {
        return Err(Error::MissingMeterType);
    }

    let stock_issued_to = submission.stock_issued_to.trim();

    if stock_issued_to.is_empty() {
        return Err(Error::MissingStockIssuedTo);
    }

    let mut ledger = store.load();
    let id = generate_transaction_id(&ledger, now);

    let mut written = Vec::with_capacity(submission.photos.len());

    for photo in &submission.photos {
        match photos.store_photo(&id, &photo.file_name, &photo.bytes) {
            Ok(path) => written.push(path),
            Err(error) => {
                photos.remove_photos(&written);
                return Err(error);
            }
        }
    }

    let photo_paths = written
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();

    let record = TransactionRecord {
        date: now.replace_nanosecond(0).unwrap_or(now),
        id,
        action: Action::StockOut,
        meter_type: meter_types.join(METER_TYPE_SEPARATOR),
        meter_quantity: submission.meter_quantity,
        ciu_quantity: submission.ciu_quantity,
        stock_issued_to: stock_issued_to.to_owned(),
        photo_paths,
        status: Status::PendingApproval,
        notes: submission.notes.trim().to_owned(),
    };

    ledger.push(record.clone());
    store
        .save(&ledger)
        .inspect_err(|_| photos.remove_photos(&written))?;

    tracing::info!(
        "Recorded stock out {} for {} with {} photo(s)",
        record.id,
        record.stock_issued_to,
        record.photo_paths.len()
    );

    Ok(record)
}

/// Approve or reject the transaction `id` and save the ledger.
///
/// The new status overwrites the old one whatever it was.
///
/// # Errors
/// Returns an [Error::TransactionNotFound] if there is no such transaction,
/// in which case the ledger file is left untouched, or an [Error::Io] or
/// [Error::Csv] if the ledger could not be saved.
pub fn set_status(
    store: &LedgerStore,
    id: &TransactionId,
    decision: Decision,
) -> Result<TransactionRecord, Error> {
    let mut ledger = store.load();
    let record = ledger.set_status(id, decision.status())?.clone();

    store.save(&ledger)?;

    tracing::info!("Transaction {id} is now {}", record.status);

    Ok(record)
}

/// The transactions that match `filter`, newest first.
///
/// Transactions recorded in the same second keep their ledger order.
pub fn filter_by_status(ledger: &Ledger, filter: StatusFilter) -> Vec<TransactionRecord> {
    let mut records: Vec<TransactionRecord> = ledger
        .records()
        .iter()
        .filter(|record| filter.matches(record.status))
        .cloned()
        .collect();

    records.sort_by(|a, b| b.date.cmp(&a.date));

    records
}

/// Get the transaction `id`.
///
/// # Errors
/// Returns an [Error::TransactionNotFound] if there is no such transaction.
pub fn find_by_id<'a>(ledger: &'a Ledger, id: &TransactionId) -> Result<&'a TransactionRecord, Error> {
    ledger
        .get(id)
        .ok_or_else(|| Error::TransactionNotFound(id.to_string()))
}
