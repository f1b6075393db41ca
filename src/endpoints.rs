//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}/photos',
//! use [format_endpoint].

/// The root route which redirects to the landing page for the current role.
pub const ROOT: &str = "/";
/// The page for recording a stock-out transaction.
pub const STOCK_OUT_VIEW: &str = "/stock-out";
/// The page for approving or rejecting transactions.
pub const REVIEW_VIEW: &str = "/review";
/// The page listing the photos attached to a transaction.
pub const TRANSACTION_PHOTOS_VIEW: &str = "/transactions/{transaction_id}/photos";
/// The page with the stock summary and downloads.
pub const REPORTS_VIEW: &str = "/reports";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for a single stored photo.
pub const PHOTO: &str = "/photos/{file_name}";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to record a stock-out transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to approve a transaction.
pub const APPROVE_TRANSACTION: &str = "/api/transactions/{transaction_id}/approve";
/// The route to reject a transaction.
pub const REJECT_TRANSACTION: &str = "/api/transactions/{transaction_id}/reject";
/// The route to download the ledger as CSV.
pub const EXPORT_LEDGER_CSV: &str = "/api/export/ledger.csv";
/// The route to download every stored photo as a zip archive.
pub const EXPORT_PHOTOS_ZIP: &str = "/api/export/photos.zip";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/photos/{file_name}', '{file_name}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter. `value` is inserted as is, so it must already be
/// safe to use in a URI path.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
