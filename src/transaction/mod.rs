//! Stock-out transactions.
//!
//! This module contains everything related to the transaction lifecycle:
//! - Recording a stock-out with its photos and reviewing it
//! - Querying the ledger by status or ID
//! - The route handlers for the stock-out form, the review page and photos

mod core;
mod create_endpoint;
mod create_page;
mod photos_page;
mod review_page;
mod status_endpoint;

pub use core::{
    Decision, METER_TYPE_OPTIONS, PhotoUpload, StatusFilter, StockOutSubmission,
    create_transaction, filter_by_status, find_by_id, generate_transaction_id, set_status,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_stock_out_page;
pub use photos_page::{get_photo, get_transaction_photos_page};
pub use review_page::get_review_page;
pub use status_endpoint::{approve_transaction_endpoint, reject_transaction_endpoint};
