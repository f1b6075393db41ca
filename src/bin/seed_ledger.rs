use std::{error::Error, path::PathBuf, process::exit};

use clap::Parser;
use time::{Duration, macros::datetime};

use meter_stock::{
    Decision, METER_TYPE_OPTIONS, PhotoStore, StockOutSubmission, create_transaction,
    ledger::{LEDGER_FILE_NAME, LedgerStore},
    set_status,
};

/// A utility for creating a ledger with sample transactions for manual testing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory to write `stock_ledger.csv` to.
    #[arg(long, short)]
    data_dir: PathBuf,

    /// Directory the server saves photos to.
    #[arg(long, default_value = "photos")]
    photo_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if args.data_dir.join(LEDGER_FILE_NAME).is_file() {
        eprintln!(
            "A ledger already exists in {:#?}!",
            args.data_dir.join(LEDGER_FILE_NAME)
        );
        exit(1);
    }

    let store = LedgerStore::in_dir(&args.data_dir);
    let photos = PhotoStore::new(&args.photo_dir);
    println!("Creating ledger at {:#?}", store.path());

    let start = datetime!(2025-10-01 08:30:00);
    let teams = ["Team A", "Team B", "Team C"];

    for day in 0..9_usize {
        let submission = StockOutSubmission {
            meter_types: vec![METER_TYPE_OPTIONS[day % METER_TYPE_OPTIONS.len()].to_owned()],
            meter_quantity: (day % 4 + 1) as u32,
            ciu_quantity: (day % 3) as u32,
            stock_issued_to: teams[day % teams.len()].to_owned(),
            notes: if day == 4 {
                "Urgent job".to_owned()
            } else {
                String::new()
            },
            photos: Vec::new(),
        };

        let now = start + Duration::days(day as i64);
        let record = create_transaction(&store, &photos, submission, now)?;

        match day % 3 {
            0 => {
                set_status(&store, &record.id, Decision::Approve)?;
            }
            1 if day > 4 => {
                set_status(&store, &record.id, Decision::Reject)?;
            }
            _ => {}
        }
    }

    println!("Success!");

    Ok(())
}
