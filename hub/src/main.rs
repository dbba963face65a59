mod auth;
mod bucketing;
mod config;
mod db;
mod error;
mod filters;
mod pagination;
mod routes;
mod state;

use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use config::HubConfig;
use state::AppState;

#[tokio::main]
async fn main() {
    // Load .env before reading any configuration.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = HubConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", cfg.bind, cfg.port)
        .parse()
        .expect("invalid bind address");

    if cfg.seed_demo {
        if let Err(e) = seed_demo_data(&cfg) {
            tracing::error!("Demo seed failed: {e}");
        }
    }

    let state = AppState::new(cfg);
    let app = routes::build_app(state);

    tracing::info!("Fleet hub listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

/// Create the schema and fill an empty database with demo telemetry.
fn seed_demo_data(cfg: &HubConfig) -> Result<(), error::HubError> {
    let mut conn = rusqlite::Connection::open(&cfg.db_path)?;
    let today = chrono::Local::now().date_naive();
    db::schema::seed_demo(&mut conn, today, cfg.seed_days, &mut rand::thread_rng())?;
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, gracefully stopping…");
}
