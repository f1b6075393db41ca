//! Stock totals grouped by meter type and status.

use std::collections::BTreeMap;

use crate::ledger::{Ledger, Status};

/// The total stock for one combination of meter type and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// The `Meter_Type` text exactly as recorded, which may list several types.
    pub meter_type: String,
    pub status: Status,
    /// Total meters.
    pub meter_quantity: u64,
    /// Total CIUs.
    pub ciu_quantity: u64,
}

/// Sums the meter and CIU quantities of every transaction grouped by meter
/// type and status.
///
/// # Returns
/// One row per group that has at least one transaction, sorted by meter type
/// and then by status in lifecycle order. The totals over all rows equal the
/// totals over the ledger.
pub fn summarize(ledger: &Ledger) -> Vec<SummaryRow> {
    let mut totals: BTreeMap<(&str, Status), (u64, u64)> = BTreeMap::new();

    for record in ledger.records() {
        let (meter_quantity, ciu_quantity) = totals
            .entry((record.meter_type.as_str(), record.status))
            .or_default();

        *meter_quantity += u64::from(record.meter_quantity);
        *ciu_quantity += u64::from(record.ciu_quantity);
    }

    totals
        .into_iter()
        .map(
            |((meter_type, status), (meter_quantity, ciu_quantity))| SummaryRow {
                meter_type: meter_type.to_owned(),
                status,
                meter_quantity,
                ciu_quantity,
            },
        )
        .collect()
}
