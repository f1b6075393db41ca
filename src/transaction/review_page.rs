//! The admin page for reviewing stock-out requests.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_APPROVE_STYLE, BUTTON_REJECT_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        empty_state, link, status_badge,
    },
    ledger::{Ledger, LedgerStore, TransactionRecord},
    navigation::NavBar,
    role::Role,
    transaction::core::{StatusFilter, filter_by_status},
};

/// The state needed for the review page.
#[derive(Debug, Clone)]
pub struct ReviewPageState {
    pub ledger_store: Arc<Mutex<LedgerStore>>,
}

impl FromRef<AppState> for ReviewPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger_store: state.ledger_store.clone(),
        }
    }
}

/// The query string of the review page, e.g. `?status=Pending+Approval`.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    #[serde(default)]
    pub status: StatusFilter,
}

/// Renders the transactions that match the status filter, newest first,
/// with buttons to approve or reject each one.
pub async fn get_review_page(
    State(state): State<ReviewPageState>,
    Extension(role): Extension<Role>,
    Query(query): Query<ReviewQuery>,
) -> Result<Response, Error> {
    let ledger = state
        .ledger_store
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire ledger lock: {error}"))
        .map_err(|_| Error::LedgerLockError)?
        .load();

    Ok(review_view(&ledger, query.status, role).into_response())
}

fn review_view(ledger: &Ledger, filter: StatusFilter, role: Role) -> Markup {
    let nav_bar = NavBar::new(endpoints::REVIEW_VIEW, role).into_html();
    let records = filter_by_status(ledger, filter);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-4"
            {
                h2 class="text-xl font-bold" { "Review Stock Out Requests" }

                @if ledger.is_empty() {
                    (empty_state("No transactions recorded yet."))
                } @else {
                    (status_filter_form(filter))

                    @if records.is_empty() {
                        (empty_state("No transactions match this filter."))
                    } @else {
                        div class="relative overflow-x-auto shadow-md rounded"
                        {
                            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                            {
                                thead class=(TABLE_HEADER_STYLE)
                                {
                                    tr
                                    {
                                        @for heading in [
                                            "Date", "Transaction ID", "Meter Type", "Meter Qty",
                                            "CIU Qty", "Issued To", "Status", "Notes", "Photos",
                                            "Actions",
                                        ] {
                                            th scope="col" class=(TABLE_CELL_STYLE) { (heading) }
                                        }
                                    }
                                }

                                tbody
                                {
                                    @for record in &records {
                                        (transaction_row(record))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Review", &content)
}

fn status_filter_form(selected: StatusFilter) -> Markup {
    html! {
        form method="get" action=(endpoints::REVIEW_VIEW) class="flex items-end gap-2 max-w-xs"
        {
            div class="flex-1"
            {
                label for="status" class=(FORM_LABEL_STYLE) { "Filter by Status" }

                select
                    name="status"
                    id="status"
                    onchange="this.form.submit()"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for option in StatusFilter::OPTIONS {
                        option value=(option.label()) selected[option == selected]
                        {
                            (option.label())
                        }
                    }
                }
            }

            noscript
            {
                button type="submit" class="px-3 py-2 text-sm underline" { "Filter" }
            }
        }
    }
}

/// A row of the review table.
///
/// The approve and reject buttons replace the row with the updated row
/// returned by the status endpoints.
pub(crate) fn transaction_row(record: &TransactionRecord) -> Markup {
    let approve_url = format_endpoint(endpoints::APPROVE_TRANSACTION, record.id.as_str());
    let reject_url = format_endpoint(endpoints::REJECT_TRANSACTION, record.id.as_str());
    let photos_url = format_endpoint(endpoints::TRANSACTION_PHOTOS_VIEW, record.id.as_str());

    html! {
        tr class=(TABLE_ROW_STYLE) id={ "transaction-" (record.id) } data-transaction-id=(record.id)
        {
            td class=(TABLE_CELL_STYLE) { (record.date_text()) }
            td class={ (TABLE_CELL_STYLE) " font-mono whitespace-nowrap" } { (record.id) }
            td class=(TABLE_CELL_STYLE) { (record.meter_type) }
            td class={ (TABLE_CELL_STYLE) " text-right" } { (record.meter_quantity) }
            td class={ (TABLE_CELL_STYLE) " text-right" } { (record.ciu_quantity) }
            td class=(TABLE_CELL_STYLE) { (record.stock_issued_to) }
            td class=(TABLE_CELL_STYLE) { (status_badge(record.status)) }
            td class=(TABLE_CELL_STYLE) { (record.notes) }
            td class=(TABLE_CELL_STYLE)
            {
                @if record.photo_paths.is_empty() {
                    "None"
                } @else {
                    (link(&photos_url, &format!("View ({})", record.photo_paths.len())))
                }
            }
            td class={ (TABLE_CELL_STYLE) " whitespace-nowrap" }
            {
                div class="flex gap-4"
                {
                    button
                        hx-post=(approve_url)
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        class=(BUTTON_APPROVE_STYLE)
                    {
                        "Approve"
                    }

                    button
                        hx-post=(reject_url)
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        class=(BUTTON_REJECT_STYLE)
                    {
                        "Reject"
                    }
                }
            }
        }
    }
}
