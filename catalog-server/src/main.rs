//! # Catalog Server
//!
//! HTTP catalog microservice: CRUD over catalog items plus brand listing and
//! creation, backed by PostgreSQL.
//!
//! Every request is translated into a typed command or query and handed to
//! the in-process dispatcher. Database calls run under a retry policy
//! (15 retries, 30s maximum delay by default) and new ids come from high-low
//! sequences.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use catalog_core::database::PostgresDatabase;
use catalog_server::{
    infra::{
        config::{Config, ConfigLoad, ConfigLoader},
        startup::build_app_state,
    },
    routes::create_app,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "catalog-server")]
#[command(about = "Catalog microservice for items and brands")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a catalog.toml file (overrides CATALOG_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Check that PostgreSQL is reachable under the retry policy and exit
    Ping,
    /// Create the catalog tables and hi-lo sequences if missing and exit
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        Some(Command::Db(DbCommand::Ping)) => run_db_ping(&config).await,
        Some(Command::Db(DbCommand::Init)) => run_db_init(&config).await,
        None => run_server(config).await,
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.clone() {
        loader = loader.with_config_path(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }

    if !warnings.is_empty() {
        for warning in &warnings.items {
            match &warning.hint {
                Some(hint) => {
                    warn!(message = %warning.message, hint = %hint, "configuration warning")
                }
                None => {
                    warn!(message = %warning.message, "configuration warning")
                }
            }
        }
    }

    Ok(Arc::new(config))
}

async fn connect_postgres(
    config: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<PostgresDatabase> {
    let database = &config.database;
    let url = database
        .url
        .as_deref()
        .context("database url missing from resolved configuration")?;

    PostgresDatabase::connect(
        url,
        database.pool_options(),
        database.retry_policy(),
        cancel,
    )
    .await
    .context("failed to connect to PostgreSQL")
}

async fn run_db_ping(config: &Config) -> anyhow::Result<()> {
    let cancel = shutdown_token();
    let pg = connect_postgres(config, &cancel).await?;
    pg.ping(&cancel).await.context("database ping failed")?;
    info!("PostgreSQL is reachable");
    Ok(())
}

async fn run_db_init(config: &Config) -> anyhow::Result<()> {
    let cancel = shutdown_token();
    let pg = connect_postgres(config, &cancel).await?;
    pg.ensure_schema(config.database.hilo_block_size, &cancel)
        .await
        .context("database schema bootstrap failed")?;
    info!("Catalog schema is in place");
    Ok(())
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let shutdown = shutdown_token();

    let state = build_app_state(Arc::clone(&config), &shutdown).await?;
    let router = create_app(state);

    let server = &config.server;
    let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", server.host, server.port))?;
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, "catalog server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("server error")?;

    info!("catalog server stopped");
    Ok(())
}

/// Token cancelled on Ctrl+C; startup retries and the serve loop observe it.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                trigger.cancel();
            }
            Err(err) => error!(error = %err, "failed to listen for shutdown signal"),
        }
    });
    token
}
