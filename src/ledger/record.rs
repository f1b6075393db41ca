//! The transaction record and the row format it is persisted as.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

/// The columns of the ledger file, in order.
///
/// Renaming a column or one of the status labels breaks existing ledger
/// files, so these must stay stable across versions.
pub const LEDGER_COLUMNS: [&str; 10] = [
    "Date",
    "Transaction_ID",
    "Action",
    "Meter_Type",
    "Meter_Quantity",
    "CIU_Quantity",
    "Stock_Issued_To",
    "Photo_Path",
    "Status",
    "Notes",
];

/// Format of the `Date` column, e.g. "2025-10-05 14:03:59".
pub const RECORD_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Separator between the meter type labels in the `Meter_Type` column.
pub const METER_TYPE_SEPARATOR: &str = ", ";

/// Separator between the attachment paths in the `Photo_Path` column.
pub const PHOTO_PATH_SEPARATOR: char = '|';

/// The identifier of a transaction, e.g. "TXN-20251005140359".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wrap an existing identifier, e.g. one taken from a URL path.
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_owned())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened to the stock in a transaction.
///
/// Only stock leaving the store is recorded at the moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Stock was taken out for installation.
    #[serde(rename = "Stock Out")]
    StockOut,
}

impl Action {
    /// The label used in the ledger file and in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::StockOut => "Stock Out",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The review state of a transaction.
///
/// The declaration order is the lifecycle order and is used when sorting
/// report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Submitted by an installer and waiting for an admin.
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    /// Accepted by an admin.
    Approved,
    /// Declined by an admin.
    Rejected,
}

impl Status {
    /// Every status in lifecycle order.
    pub const ALL: [Status; 3] = [Status::PendingApproval, Status::Approved, Status::Rejected];

    /// The label used in the ledger file and in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Status::PendingApproval => "Pending Approval",
            Status::Approved => "Approved",
            Status::Rejected => "Rejected",
        }
    }

    /// Parse a status from its label.
    pub fn from_label(label: &str) -> Option<Self> {
        Status::ALL
            .into_iter()
            .find(|status| status.label() == label.trim())
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One stock-out event with its metadata and attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// When the transaction was recorded, in local time.
    pub date: PrimitiveDateTime,
    /// The unique identifier of the transaction.
    pub id: TransactionId,
    /// What happened to the stock.
    pub action: Action,
    /// The selected meter type labels joined with [METER_TYPE_SEPARATOR].
    pub meter_type: String,
    /// The number of meters taken.
    pub meter_quantity: u32,
    /// The number of customer interface units taken.
    pub ciu_quantity: u32,
    /// The installer or team the stock was issued to.
    pub stock_issued_to: String,
    /// Paths of the photos stored for this transaction, in upload order.
    ///
    /// Set when the transaction is created and never changed afterwards.
    pub photo_paths: Vec<String>,
    /// The review state.
    pub status: Status,
    /// Free text, empty if the installer left no notes.
    pub notes: String,
}

impl TransactionRecord {
    /// The date formatted with [RECORD_DATE_FORMAT].
    pub fn date_text(&self) -> String {
        // Formatting a date with only numeric components cannot fail.
        self.date
            .format(RECORD_DATE_FORMAT)
            .unwrap_or_else(|_| self.date.to_string())
    }
}

/// A transaction record as it is laid out in the ledger file.
///
/// The field order must match [LEDGER_COLUMNS].
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct LedgerRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Transaction_ID")]
    transaction_id: TransactionId,
    #[serde(rename = "Action")]
    action: Action,
    #[serde(rename = "Meter_Type")]
    meter_type: String,
    #[serde(rename = "Meter_Quantity")]
    meter_quantity: u32,
    #[serde(rename = "CIU_Quantity")]
    ciu_quantity: u32,
    #[serde(rename = "Stock_Issued_To")]
    stock_issued_to: String,
    #[serde(rename = "Photo_Path")]
    photo_path: String,
    #[serde(rename = "Status")]
    status: Status,
    #[serde(rename = "Notes")]
    notes: String,
}

impl From<&TransactionRecord> for LedgerRow {
    fn from(record: &TransactionRecord) -> Self {
        let photo_path = record
            .photo_paths
            .join(&PHOTO_PATH_SEPARATOR.to_string());

        Self {
            date: record.date_text(),
            transaction_id: record.id.clone(),
            action: record.action,
            meter_type: record.meter_type.clone(),
            meter_quantity: record.meter_quantity,
            ciu_quantity: record.ciu_quantity,
            stock_issued_to: record.stock_issued_to.clone(),
            photo_path,
            status: record.status,
            notes: record.notes.clone(),
        }
    }
}

impl TryFrom<LedgerRow> for TransactionRecord {
    type Error = time::error::Parse;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let date = PrimitiveDateTime::parse(row.date.trim(), RECORD_DATE_FORMAT)?;
        let photo_paths = row
            .photo_path
            .split(PHOTO_PATH_SEPARATOR)
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Self {
            date,
            id: row.transaction_id,
            action: row.action,
            meter_type: row.meter_type,
            meter_quantity: row.meter_quantity,
            ciu_quantity: row.ciu_quantity,
            stock_issued_to: row.stock_issued_to,
            photo_paths,
            status: row.status,
            notes: row.notes,
        })
    }
}
