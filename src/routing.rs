//! Application router configuration with role-gated and unprotected route definitions.

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::{export_ledger_csv, export_photos_zip, get_reports_page},
    role::{ANY_ROLE, REPORT_ROLES, REVIEW_ROLES, Role, STOCK_ROLES, role_guard, role_guard_hx},
    transaction::{
        approve_transaction_endpoint, create_transaction_endpoint, get_photo, get_review_page,
        get_stock_out_page, get_transaction_photos_page, reject_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let any_role_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .layer(middleware::from_fn_with_state(ANY_ROLE, role_guard));

    let stock_routes = Router::new()
        .route(endpoints::STOCK_OUT_VIEW, get(get_stock_out_page))
        .layer(middleware::from_fn_with_state(STOCK_ROLES, role_guard))
        .merge(
            Router::new()
                .route(
                    endpoints::TRANSACTIONS_API,
                    post(create_transaction_endpoint),
                )
                .layer(DefaultBodyLimit::max(state.max_upload_bytes))
                .layer(middleware::from_fn_with_state(STOCK_ROLES, role_guard_hx)),
        );

    // The POST routes answer with alerts so that HTMX can show why a request was refused.
    let review_routes = Router::new()
        .route(endpoints::REVIEW_VIEW, get(get_review_page))
        .route(
            endpoints::TRANSACTION_PHOTOS_VIEW,
            get(get_transaction_photos_page),
        )
        .route(endpoints::PHOTO, get(get_photo))
        .layer(middleware::from_fn_with_state(REVIEW_ROLES, role_guard))
        .merge(
            Router::new()
                .route(
                    endpoints::APPROVE_TRANSACTION,
                    post(approve_transaction_endpoint),
                )
                .route(
                    endpoints::REJECT_TRANSACTION,
                    post(reject_transaction_endpoint),
                )
                .layer(middleware::from_fn_with_state(REVIEW_ROLES, role_guard_hx)),
        );

    let report_routes = Router::new()
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::EXPORT_LEDGER_CSV, get(export_ledger_csv))
        .route(endpoints::EXPORT_PHOTOS_ZIP, get(export_photos_zip))
        .layer(middleware::from_fn_with_state(REPORT_ROLES, role_guard));

    any_role_routes
        .merge(stock_routes)
        .merge(review_routes)
        .merge(report_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the first page the role can use.
async fn get_index_page(Extension(role): Extension<Role>) -> Redirect {
    Redirect::to(role.landing_page())
}


#[cfg(test)]
mod router_tests {
    use std::fs;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use tempfile::{TempDir, tempdir};

    use crate::{
        AppState, build_router, endpoints,
        endpoints::format_endpoint,
        ledger::Status,
        role::ROLE_HEADER,
        test_utils::{MultipartPart, multipart_body, multipart_content_type},
        transaction::METER_TYPE_OPTIONS,
    };

    fn get_test_server() -> (TempDir, AppState, TestServer) {
        get_test_server_with_upload_limit(None)
    }

    fn get_test_server_with_upload_limit(
        max_upload_mb: Option<usize>,
    ) -> (TempDir, AppState, TestServer) {
        let dir = tempdir().unwrap();
        let mut state =
            AppState::new(&dir.path().join("data"), &dir.path().join("photos"), "Etc/UTC");
        if let Some(max_upload_mb) = max_upload_mb {
            state = state.with_max_upload_mb(max_upload_mb);
        }
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        (dir, state, server)
    }

    fn stock_out_parts(photo: MultipartPart) -> Vec<MultipartPart> {
        vec![
            MultipartPart::text("meter_type", METER_TYPE_OPTIONS[0]),
            MultipartPart::text("meter_quantity", "1"),
            MultipartPart::text("ciu_quantity", "0"),
            MultipartPart::text("stock_issued_to", "Team A"),
            photo,
        ]
    }

    #[tokio::test]
    async fn requests_without_a_role_are_forbidden() {
        let (_dir, _state, server) = get_test_server();

        for path in [
            endpoints::ROOT,
            endpoints::STOCK_OUT_VIEW,
            endpoints::REVIEW_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::EXPORT_LEDGER_CSV,
        ] {
            server
                .get(path)
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn roles_only_reach_their_pages() {
        let (_dir, _state, server) = get_test_server();

        let cases = [
            ("installer", endpoints::STOCK_OUT_VIEW, StatusCode::OK),
            ("installer", endpoints::REVIEW_VIEW, StatusCode::FORBIDDEN),
            ("installer", endpoints::REPORTS_VIEW, StatusCode::FORBIDDEN),
            ("admin", endpoints::STOCK_OUT_VIEW, StatusCode::OK),
            ("admin", endpoints::REVIEW_VIEW, StatusCode::OK),
            ("admin", endpoints::REPORTS_VIEW, StatusCode::OK),
            ("manager", endpoints::STOCK_OUT_VIEW, StatusCode::FORBIDDEN),
            ("manager", endpoints::REVIEW_VIEW, StatusCode::FORBIDDEN),
            ("manager", endpoints::REPORTS_VIEW, StatusCode::OK),
        ];

        for (role, path, want) in cases {
            let response = server.get(path).add_header(ROLE_HEADER, role).await;
            assert_eq!(
                response.status_code(),
                want,
                "role {role} requesting {path}"
            );
        }
    }

    #[tokio::test]
    async fn stock_out_then_approve() {
        let (_dir, state, server) = get_test_server();

        server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(ROLE_HEADER, "installer")
            .content_type(&multipart_content_type())
            .bytes(
                multipart_body(&[
                    MultipartPart::text("meter_type", METER_TYPE_OPTIONS[0]),
                    MultipartPart::text("meter_quantity", "5"),
                    MultipartPart::text("ciu_quantity", "2"),
                    MultipartPart::text("stock_issued_to", "Team A"),
                    MultipartPart::file("photos", "serial.jpg", "image/jpeg", "jpg"),
                ])
                .into(),
            )
            .await
            .assert_status(StatusCode::CREATED);

        let id = state.ledger_store.lock().unwrap().load().records()[0]
            .id
            .to_string();

        server
            .post(&format_endpoint(endpoints::APPROVE_TRANSACTION, &id))
            .add_header(ROLE_HEADER, "installer")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .post(&format_endpoint(endpoints::APPROVE_TRANSACTION, &id))
            .add_header(ROLE_HEADER, "admin")
            .await
            .assert_status_ok();

        let ledger = state.ledger_store.lock().unwrap().load();
        assert_eq!(ledger.records()[0].status, Status::Approved);

        server
            .get(&format_endpoint(endpoints::TRANSACTION_PHOTOS_VIEW, &id))
            .add_header(ROLE_HEADER, "admin")
            .await
            .assert_status_ok();
        server
            .get(&format_endpoint(endpoints::PHOTO, &format!("{id}_serial.jpg")))
            .add_header(ROLE_HEADER, "admin")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn accepts_photos_larger_than_two_megabytes() {
        let (_dir, state, server) = get_test_server();
        let photo = vec![0xFF; 3 * 1024 * 1024];

        server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(ROLE_HEADER, "installer")
            .content_type(&multipart_content_type())
            .bytes(
                multipart_body(&stock_out_parts(MultipartPart::file(
                    "photos",
                    "serial.jpg",
                    "image/jpeg",
                    photo.clone(),
                )))
                .into(),
            )
            .await
            .assert_status(StatusCode::CREATED);

        let ledger = state.ledger_store.lock().unwrap().load();
        assert_eq!(ledger.records().len(), 1);
        let photos = state.photo_store.list_photos(&ledger.records()[0]);
        assert_eq!(photos.len(), 1);
        assert_eq!(fs::read(&photos[0].path).unwrap(), photo);
    }

    #[tokio::test]
    async fn refuses_submissions_over_the_upload_limit() {
        let (dir, state, server) = get_test_server_with_upload_limit(Some(1));

        server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(ROLE_HEADER, "installer")
            .content_type(&multipart_content_type())
            .bytes(
                multipart_body(&stock_out_parts(MultipartPart::file(
                    "photos",
                    "serial.jpg",
                    "image/jpeg",
                    vec![0xFF; 2 * 1024 * 1024],
                )))
                .into(),
            )
            .await
            .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        assert!(state.ledger_store.lock().unwrap().load().is_empty());
        assert!(!dir.path().join("photos").exists());
    }

    #[tokio::test]
    async fn photo_names_with_the_path_separator_stay_linked() {
        let (_dir, state, server) = get_test_server();

        server
            .post(endpoints::TRANSACTIONS_API)
            .add_header(ROLE_HEADER, "installer")
            .content_type(&multipart_content_type())
            .bytes(
                multipart_body(&stock_out_parts(MultipartPart::file(
                    "photos",
                    "front|back #1.jpg",
                    "image/jpeg",
                    "jpg",
                )))
                .into(),
            )
            .await
            .assert_status(StatusCode::CREATED);

        let ledger = state.ledger_store.lock().unwrap().load();
        let record = &ledger.records()[0];
        let photos = state.photo_store.list_photos(record);
        assert_eq!(photos.len(), 1);
        assert!(!photos[0].missing);
        assert_eq!(photos[0].file_name, format!("{}_front_back__1.jpg", record.id));

        server
            .get(&format_endpoint(endpoints::PHOTO, &photos[0].file_name))
            .add_header(ROLE_HEADER, "admin")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (_dir, _state, server) = get_test_server();

        server
            .get("/does-not-exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn coffee_is_not_served() {
        let (_dir, _state, server) = get_test_server();

        server
            .get(endpoints::COFFEE)
            .await
            .assert_status(StatusCode::IM_A_TEAPOT);
    }
}
