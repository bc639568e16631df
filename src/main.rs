use anyhow::Result;
use sheetgate::{server, Config};
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

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::from_env();
    let port = config.port;
    info!(
        sheet_id = %config.sheet_id,
        writes = config.write_enabled,
        credential = config.write_token.is_some(),
        tokenizer = ?config.tokenizer,
        "starting sheetgate"
    );

    // ─── 3) serve ────────────────────────────────────────────────────
    let gateway = server::Gateway::new(config)?;
    let routes = server::routes(gateway);

    info!("Server starting on port {}", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("Tasks endpoint: http://localhost:{}/api/tasks", port);

    warp::serve(routes).run(([0, 0, 0, 0], port)).await;

    Ok(())
}
