use anyhow::{Context, Result};
use beedash::{config::AppConfig, data::load_aggregated, server};
use std::env;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();
    info!("startup");

    // ─── 2) config ───────────────────────────────────────────────────
    let config = AppConfig::load()?;
    info!(?config, "configured");

    // ─── 3) load + aggregate once; nothing is served if this fails ───
    let table = load_aggregated(&config.data_path)
        .with_context(|| format!("loading dataset {}", config.data_path.display()))?;
    info!("{} aggregated records ready", table.len());

    // ─── 4) serve ────────────────────────────────────────────────────
    let addr = config.addr();
    let state = server::AppState::new(table, config);
    let routes = server::routes(state);

    info!("Dashboard running at http://{}", addr);
    info!("Health check: http://{}/health", addr);
    warp::serve(routes).run(addr).await;

    Ok(())
}
