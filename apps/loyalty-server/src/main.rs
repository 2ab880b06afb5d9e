mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use clap::{Parser, Subcommand};
use loyalty_ledger::api::rest::routes::register_routes;
use loyalty_ledger::domain::service::Service;
use loyalty_ledger::infra::storage::SeaOrmLedgerStore;
use loyalty_ledger::infra::storage::migrations::Migrator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, CliOverrides, DatabaseConfig, LoggingConfig};

/// Loyalty Ledger Server - merchant wallets and customer points over HTTP
#[derive(Parser)]
#[command(name = "loyalty-server")]
#[command(about = "Loyalty Ledger Server - merchant wallets and customer points over HTTP")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database (sqlite::memory:)
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (LOYALTY__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides {
        port: cli.port,
        verbose: cli.verbose,
        mock: cli.mock,
    });

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    init_logging(&config.logging);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
        Commands::Migrate => migrate(&config).await,
    }
}

/// Logs go to stderr so `--print-config` output stays parseable.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn connect(database: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(database.dsn.clone());
    opts.max_connections(database.max_conns).sqlx_logging(false);
    if database.is_memory() {
        opts.max_connections(1).min_connections(1);
    }
    let db = Database::connect(opts)
        .await
        .context("failed to connect to database")?;
    tracing::info!(backend = ?db.get_database_backend(), "Database connected");
    Ok(db)
}

async fn migrate(config: &AppConfig) -> Result<()> {
    config.validate()?;
    let db = connect(&config.database).await?;
    Migrator::up(&db, None)
        .await
        .context("failed to apply migrations")?;
    tracing::info!("Migrations applied");
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    config.validate()?;
    let addr = config.socket_addr()?;

    let db = connect(&config.database).await?;
    Migrator::up(&db, None)
        .await
        .context("failed to apply migrations")?;

    let store = Arc::new(SeaOrmLedgerStore::new(db));
    let service = Arc::new(Service::new(store, config.ledger));
    let app = register_routes(Router::new(), service).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Loyalty ledger listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with an error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
