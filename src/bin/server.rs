use std::{fs::OpenOptions, net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use axum::middleware;
#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;
#[cfg(debug_assertions)]
use walletly::logging_middleware;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use walletly::{
    AppState, PaginationConfig, build_router, graceful_shutdown,
    services::{DwollaClient, DwollaConfig, PlaidClient, PlaidConfig},
};

/// The web server for Walletly.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "America/New_York".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// The client ID for the bank-data aggregator.
    #[arg(long, env = "PLAID_CLIENT_ID")]
    plaid_client_id: String,

    /// The secret for the bank-data aggregator.
    #[arg(long, env = "PLAID_SECRET", hide_env_values = true)]
    plaid_secret: String,

    /// The base URL of the bank-data aggregator's API.
    #[arg(long, env = "PLAID_BASE_URL", default_value = "https://sandbox.plaid.com")]
    plaid_base_url: String,

    /// The API key for the funds-transfer network.
    #[arg(long, env = "DWOLLA_KEY")]
    dwolla_key: String,

    /// The API secret for the funds-transfer network.
    #[arg(long, env = "DWOLLA_SECRET", hide_env_values = true)]
    dwolla_secret: String,

    /// The base URL of the funds-transfer network's API.
    #[arg(long, env = "DWOLLA_BASE_URL", default_value = "https://api-sandbox.dwolla.com")]
    dwolla_base_url: String,

    /// The secret used to sign and encrypt session cookies.
    #[arg(long, env = "SECRET", hide_env_values = true)]
    secret: String,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let bank_data = PlaidClient::new(PlaidConfig {
        base_url: args.plaid_base_url,
        client_id: args.plaid_client_id,
        secret: args.plaid_secret,
    })
    .expect("Could not create the bank-data client");

    let transfers = DwollaClient::new(DwollaConfig {
        base_url: args.dwolla_base_url,
        key: args.dwolla_key,
        secret: args.dwolla_secret,
    })
    .expect("Could not create the funds-transfer client");

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let app_state = AppState::new(
        conn,
        &args.secret,
        &args.timezone,
        PaginationConfig::default(),
        Arc::new(bank_data),
        Arc::new(transfers),
    )
    .expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router
        .layer(middleware::from_fn(logging_middleware))
        .layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
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
