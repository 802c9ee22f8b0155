use carty_core::config::{AppConfig, ConfigError, LoadOptions};
use carty_db::repositories::RepositoryError;
use carty_db::{connect_with_settings, migrations, seed_default_catalog, DbPool, SeedOutcome};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("catalog seeding failed: {0}")]
    Seed(#[source] RepositoryError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    match seed_default_catalog(&db_pool).await.map_err(BootstrapError::Seed)? {
        SeedOutcome::Seeded(count) => info!(
            event_name = "system.bootstrap.catalog_seeded",
            correlation_id = "bootstrap",
            products = count,
            "default catalog seeded"
        ),
        SeedOutcome::AlreadySeeded => info!(
            event_name = "system.bootstrap.catalog_present",
            correlation_id = "bootstrap",
            "catalog already seeded, leaving store as is"
        ),
    }

    Ok(Application { config, db_pool })
}
