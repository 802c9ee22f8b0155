mod bootstrap;
mod browser;
mod health;
pub mod storefront;

use anyhow::Result;
use carty_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use carty_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let router = storefront::router(app.db_pool.clone(), &app.config.server.static_dir)
        .merge(health::router(app.db_pool.clone()));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let local_address = listener.local_addr()?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %local_address,
        "carty-server listening"
    );

    if app.config.server.open_browser {
        browser::open_storefront(&format!("http://{local_address}/"));
    }

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "carty-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
