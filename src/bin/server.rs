use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use meter_stock::{AppState, build_router, get_local_offset, graceful_shutdown, logging_middleware};

/// The web server for recording and reconciling meter stock.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the ledger file `stock_ledger.csv`.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory that uploaded photos are saved to.
    #[arg(long, default_value = "photos")]
    photo_dir: PathBuf,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    ///
    /// Transaction dates and IDs use the local time.
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// The largest stock-out submission accepted, in MiB, photos included.
    #[arg(long, default_value_t = 50)]
    max_upload_mb: usize,

    /// File to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!(
            "Invalid timezone {:?}, expected a canonical timezone name such as \"Pacific/Auckland\"",
            args.timezone
        );
        std::process::exit(1);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let state = AppState::new(&args.data_dir, &args.photo_dir, &args.timezone)
        .with_max_upload_mb(args.max_upload_mb);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!(
        "Ledger at {}, photos in {}",
        args.data_dir.display(),
        args.photo_dir.display()
    );
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start the server");
}

fn setup_logging(log_path: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
