//! Deal service entry point.
//!
//! Serves the equity, deal, bot and moderation endpoints. Moderation state
//! lives in Postgres when `DATABASE_URL` is set and in memory otherwise.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use pd_server::{
    api::{self, AppState, middleware::AdminToken},
    config::{ConfigOverrides, ServerConfig},
    logging, metrics,
};
use pico_args::Arguments;
use poker_deal::{
    db::Database,
    moderation::{
        MemoryModerationRepository, ModerationManager, ModerationRepository,
        PgModerationRepository,
    },
};

const HELP: &str = "\
Run the tournament deal service

USAGE:
  pd_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6970]
  --db-url        URL      Database connection string  [default: env DATABASE_URL, in-memory if unset]
  --metrics-bind  IP:PORT  Prometheus exporter address [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  ADMIN_TOKEN              Bearer token for the moderation API (32+ chars)
  DEFAULT_EQUITY_METHOD    approximate | chip_chop | exact | simulated
  SIMULATION_TRIALS        Simulation trials when a request names none
  MAX_SIMULATION_TRIALS    Largest trial count a request may ask for
  RUST_LOG                 Log filter (e.g., info,pd_server=debug)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = ConfigOverrides {
        bind: pargs
            .opt_value_from_str::<_, SocketAddr>("--bind")
            .context("Invalid --bind address")?,
        database_url: pargs
            .opt_value_from_str::<_, String>("--db-url")
            .context("Invalid --db-url")?,
        metrics_bind: pargs
            .opt_value_from_str::<_, SocketAddr>("--metrics-bind")
            .context("Invalid --metrics-bind address")?,
    };

    logging::init();

    let config = ServerConfig::from_env(overrides).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        tracing::info!(%addr, "Prometheus exporter listening");
    }

    let database = match &config.database {
        Some(db_config) => {
            let db = Database::new(db_config)
                .await
                .context("Failed to connect to database")?;
            db.migrate().await.context("Failed to apply migrations")?;
            db.health_check()
                .await
                .context("Database did not answer after migration")?;
            Some(db)
        }
        None => None,
    };

    let repo: Arc<dyn ModerationRepository> = match &database {
        Some(db) => {
            tracing::info!("Moderation store backed by Postgres");
            Arc::new(PgModerationRepository::new(db.pool().clone()))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set; bans and ledger entries are kept in memory and lost on exit"
            );
            Arc::new(MemoryModerationRepository::new())
        }
    };

    let admin_token = AdminToken::new(&config.admin_token);
    tracing::info!(
        fingerprint = %admin_token.fingerprint(),
        "Admin token loaded"
    );
    tracing::info!(
        method = %config.equity.default_method,
        default_trials = config.equity.default_trials,
        max_trials = config.equity.max_trials,
        "Equity settings"
    );

    let state = AppState {
        moderation: ModerationManager::new(repo),
        admin_token: Arc::new(admin_token),
        equity: config.equity.clone(),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(bind = %config.bind, "Deal service listening; Ctrl+C stops it");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(db) = database {
        db.close().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C; shutting down");
    }
}
