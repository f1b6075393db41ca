//! Meter Stock is a web app for recording smart-meter stock taken out for
//! installation and reconciling it afterwards.
//!
//! Installers record stock-out transactions with photos of the serial
//! numbers, admins approve or reject them, and managers download the ledger
//! and photos. The ledger is a single CSV file and photos live in a flat
//! directory next to it.
//!
//! This library provides the HTTP server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod endpoints;
mod error;
mod forbidden;
mod html;
mod internal_server_error;
pub mod ledger;
mod logging;
mod navigation;
mod not_found;
mod photo;
mod report;
mod role;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use error::Error;
pub use logging::logging_middleware;
pub use photo::PhotoStore;
pub use report::{PhotoBundle, SummaryRow, export_csv, export_photo_bundle, summarize};
pub use role::{ROLE_HEADER, Role};
pub use routing::build_router;
pub use timezone::{get_local_offset, local_now};
pub use transaction::{
    Decision, METER_TYPE_OPTIONS, PhotoUpload, StatusFilter, StockOutSubmission,
    create_transaction, filter_by_status, find_by_id, generate_transaction_id, set_status,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
