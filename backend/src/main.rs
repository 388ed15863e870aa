//! Backend entry-point: runs one of the user, restaurant, menu or file
//! services against a shared PostgreSQL database.

mod server;

use std::ffi::OsString;
use std::iter;

use actix_web::web;
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use food_backend::config::{ServiceKind, ServiceSettings};
use food_backend::inbound::http::health::HealthState;
use food_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, create_server};

/// Command line for a single service process.
#[derive(Debug, Parser)]
#[command(name = "food-backend", about = "Run one food-delivery backend service")]
struct Cli {
    /// Service to run.
    #[arg(value_enum)]
    service: ServiceKind,
    /// Settings flags forwarded to the configuration loader.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    settings: Vec<OsString>,
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = ServiceSettings::load_from_iter(
        iter::once(OsString::from("food-backend")).chain(cli.settings),
    )
    .map_err(|err| eyre!("failed to load settings: {err}"))?;

    let database_url = settings.database_url()?;
    let migration_url = database_url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .wrap_err("migration task panicked")??;
    info!(applied, "database schema up to date");

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await?;

    let health_state = web::Data::new(HealthState::new(cli.service.label()));
    let config = ServerConfig::from_settings(cli.service, &settings, pool)?;
    create_server(health_state, config)?.await?;
    Ok(())
}
