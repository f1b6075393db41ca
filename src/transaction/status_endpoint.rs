//! Endpoints for approving and rejecting transactions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;

use crate::{
    AppState, Error,
    alert::Alert,
    internal_server_error::get_internal_server_error_redirect,
    ledger::{LedgerStore, TransactionId},
    transaction::{
        core::{Decision, set_status},
        review_page::transaction_row,
    },
};

/// The state needed to review a transaction.
#[derive(Debug, Clone)]
pub struct ReviewTransactionState {
    pub ledger_store: Arc<Mutex<LedgerStore>>,
}

impl FromRef<AppState> for ReviewTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger_store: state.ledger_store.clone(),
        }
    }
}

/// A route handler for approving a transaction.
///
/// Responds with the updated row of the review table and a success alert.
pub async fn approve_transaction_endpoint(
    State(state): State<ReviewTransactionState>,
    Path(transaction_id): Path<String>,
) -> Response {
    review_transaction(&state, &TransactionId::new(&transaction_id), Decision::Approve)
}

/// A route handler for rejecting a transaction.
///
/// Responds with the updated row of the review table and a success alert.
pub async fn reject_transaction_endpoint(
    State(state): State<ReviewTransactionState>,
    Path(transaction_id): Path<String>,
) -> Response {
    review_transaction(&state, &TransactionId::new(&transaction_id), Decision::Reject)
}

fn review_transaction(
    state: &ReviewTransactionState,
    id: &TransactionId,
    decision: Decision,
) -> Response {
    if id.as_str().is_empty() {
        return Error::TransactionNotFound(String::new()).into_alert_response();
    }

    let ledger_store = match state.ledger_store.lock() {
        Ok(ledger_store) => ledger_store,
        Err(error) => {
            tracing::error!("could not acquire ledger lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let record = match set_status(&ledger_store, id, decision) {
        Ok(record) => record,
        Err(error) => {
            tracing::warn!("Could not review transaction {id}: {error}");
            return error.into_alert_response();
        }
    };

    let alert = Alert::SuccessSimple {
        message: format!("Transaction {} {}.", record.id, record.status),
    };

    let body = html! {
        (transaction_row(&record))
        (alert.into_markup())
    };

    (StatusCode::OK, Html(body.into_string())).into_response()
}
