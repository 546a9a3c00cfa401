use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use autoflex_core::config::{AppConfig, ConfigError, LoadOptions};
use autoflex_core::production::ProductionService;
use autoflex_db::{
    connect_with_settings, migrations, CatalogRepositories, CatalogService, DbPool,
    RepositoryProductionSource,
};

use crate::api::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
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

    let repositories = CatalogRepositories::sql(db_pool.clone());
    let production = ProductionService::with_policy(
        RepositoryProductionSource::new(repositories.clone()),
        config.production.commit_policy,
    );
    let state =
        AppState { catalog: CatalogService::new(repositories), production: Arc::new(production) };

    Ok(Application { config, db_pool, state })
}
