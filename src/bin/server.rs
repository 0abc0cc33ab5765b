use std::{fs::OpenOptions, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use agent_dashboard::{
    AppState, DirectoryCacheStore, EChartsRenderer, ReportCache, build_router, get_local_offset,
    graceful_shutdown, seed_demo_agents,
};

/// The web server for the agent dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DASHBOARD_DB_PATH", default_value = "database.db")]
    db_path: PathBuf,

    /// Directory where rendered chart images are cached.
    #[arg(long, env = "DASHBOARD_CACHE_DIR", default_value = "cache/")]
    cache_dir: PathBuf,

    /// The port to serve the dashboard from.
    #[arg(short, long, env = "DASHBOARD_PORT", default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    ///
    /// Decides which month and year are "current" for the charts.
    #[arg(long, env = "DASHBOARD_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// Do not insert the demo agents into the database.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!("Invalid timezone {}", args.timezone);
        std::process::exit(1);
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let conn = Connection::open(&args.db_path).expect("Could not open the database.");
    let cache_store =
        DirectoryCacheStore::new(&args.cache_dir).expect("Could not create the cache directory.");
    let report_cache = ReportCache::new(cache_store, EChartsRenderer);
    let app_state =
        AppState::new(conn, report_cache, &args.timezone).expect("Could not initialize database.");

    if !args.no_seed {
        let connection = app_state
            .db_connection
            .lock()
            .expect("Could not acquire database lock.");
        let inserted = seed_demo_agents(&connection).expect("Could not seed the demo agents.");
        tracing::info!("Seeded {inserted} demo agents");
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on http://{}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly.");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
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
