//! StockGuard REST API Server
//!
//! Run with: cargo run --features server --bin stockguard-server
//!
//! Environment:
//!   STOCKGUARD_DB    - store path (default ./data/stockguard.mdb)
//!   STOCKGUARD_BIND  - listen address (default 0.0.0.0:$PORT, PORT default 8080)
//!   STOCKGUARD_SEED  - seed demo data into an empty store (default true)
//!   RUST_LOG         - tracing filter (default info,tower_http=debug)

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stockguard::config::ServerConfig;
use stockguard::server::{router, AppState};
use stockguard::{bootstrap, is_bootstrapped, Store};

#[tokio::main]
async fn main() -> stockguard::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();

    let config = ServerConfig::from_env()?;
    tracing::info!(path = %config.db_path.display(), "opening store");
    let store = Store::open(&config.db_path)?;
    if config.seed && !is_bootstrapped(&store)? {
        bootstrap(&store)?;
    }

    // CORS for the browser front end
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let app = router(AppState::new(store)).layer(TraceLayer::new_for_http()).layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "stockguard server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
