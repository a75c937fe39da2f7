use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_core::database::DatabaseContext;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::infra::{app_state::AppState, config::Config};

/// Connect to PostgreSQL, bootstrap the schema and assemble the state the
/// router runs against.
pub async fn build_app_state(
    config: Arc<Config>,
    shutdown: &CancellationToken,
) -> Result<AppState> {
    let database = &config.database;
    let url = database
        .url
        .as_deref()
        .context("database url missing from resolved configuration")?;

    let context = DatabaseContext::connect_postgres(
        url,
        database.pool_options(),
        database.retry_policy(),
        database.hilo_block_size,
        shutdown,
    )
    .await
    .context("failed to initialise the catalog database")?;

    info!(
        pool_size = context.postgres().pool().size(),
        max_connections = database.max_connections,
        max_retry_count = database.max_retry_count,
        max_retry_delay = %humantime::format_duration(database.max_retry_delay),
        "catalog database ready"
    );

    let state = AppState::from_unit_of_work(&context.unit_of_work(), Arc::clone(&config))
        .context("failed to build the request dispatcher")?;
    Ok(state)
}
