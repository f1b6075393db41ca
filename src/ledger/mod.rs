//! The ledger of stock transactions and the file it is persisted in.
//!
//! - [Ledger] is the in-memory table of [TransactionRecord]s.
//! - [LedgerStore] loads and saves the table as a CSV file.

mod record;
mod store;

use std::io::Read;

pub use record::{
    Action, LEDGER_COLUMNS, METER_TYPE_SEPARATOR, PHOTO_PATH_SEPARATOR, RECORD_DATE_FORMAT,
    Status, TransactionId, TransactionRecord,
};
pub use store::{LEDGER_FILE_NAME, LedgerStore};

use record::LedgerRow;

use crate::Error;

/// Every transaction, in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<TransactionRecord>,
}

impl Ledger {
    /// Create a ledger from existing records.
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }

    /// The records in the order they were added.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record with `id` exists.
    pub fn contains(&self, id: &TransactionId) -> bool {
        self.records.iter().any(|record| &record.id == id)
    }

    /// Get the record with `id`.
    pub fn get(&self, id: &TransactionId) -> Option<&TransactionRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Append a record.
    ///
    /// The caller is responsible for the record's ID being unique.
    pub fn push(&mut self, record: TransactionRecord) {
        self.records.push(record);
    }

    /// Overwrite the status of the record with `id`.
    ///
    /// There is no check on the current status: a rejected transaction can
    /// be approved and vice versa. Setting the same status again changes
    /// nothing.
    ///
    /// # Errors
    /// Returns an [Error::TransactionNotFound] if there is no record with
    /// `id`, in which case the ledger is not modified.
    pub fn set_status(
        &mut self,
        id: &TransactionId,
        status: Status,
    ) -> Result<&TransactionRecord, Error> {
        let record = self
            .records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| Error::TransactionNotFound(id.to_string()))?;

        record.status = status;

        Ok(record)
    }

    /// Serialize the ledger as CSV with a header row of [LEDGER_COLUMNS].
    ///
    /// The header is written even if the ledger is empty.
    ///
    /// # Errors
    /// Returns an [Error::Csv] if a row could not be written.
    pub fn to_csv(&self) -> Result<Vec<u8>, Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(LEDGER_COLUMNS)?;

        for record in &self.records {
            writer.serialize(LedgerRow::from(record))?;
        }

        writer
            .into_inner()
            .map_err(|error| Error::Csv(error.to_string()))
    }

    /// Parse a ledger from CSV data written by [Ledger::to_csv].
    ///
    /// Empty input is an empty ledger.
    ///
    /// # Errors
    /// Returns an [Error::CorruptLedger] if the header does not match
    /// [LEDGER_COLUMNS] or any row cannot be parsed.
    pub fn from_csv(reader: impl Read) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|error| Error::CorruptLedger(error.to_string()))?;

        if headers.is_empty() {
            return Ok(Self::default());
        }

        if headers.iter().map(str::trim).ne(LEDGER_COLUMNS) {
            return Err(Error::CorruptLedger(format!(
                "unexpected columns {:?}",
                headers.iter().collect::<Vec<_>>()
            )));
        }

        let mut records = Vec::new();

        for (row_number, row) in reader.deserialize::<LedgerRow>().enumerate() {
            let row = row.map_err(|error| Error::CorruptLedger(error.to_string()))?;
            let record = TransactionRecord::try_from(row).map_err(|error| {
                Error::CorruptLedger(format!("invalid date on row {}: {error}", row_number + 1))
            })?;

            records.push(record);
        }

        Ok(Self { records })
    }
}
