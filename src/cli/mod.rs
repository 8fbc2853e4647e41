use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::app::{app, AppState};
use crate::config::{AppConfig, Environment, StoreBackend};
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "formspace")]
#[command(about = "Formspace - form builder backend with workspaces, sharing and response collection")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides FORMSPACE_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply the database schema and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = crate::config::config();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Migrate => migrate(config).await,
    }
}

async fn serve(config: &AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    info!("Starting Formspace API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let (store, pool) = open_store(config).await?;
    let state = AppState::new(store, pool, config);
    let router = app(state, config);

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Formspace API listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    DatabaseManager::close(pool).await;
    Ok(())
}

/// Build the configured store. Postgres gets its schema applied on start.
async fn open_store(config: &AppConfig) -> anyhow::Result<(Arc<dyn Store>, Option<sqlx::PgPool>)> {
    match config.database.backend {
        StoreBackend::Memory => {
            if config.environment == Environment::Production {
                tracing::warn!("running production with the in-memory store; data will not survive a restart");
            }
            info!("Using in-memory store");
            Ok((Arc::new(MemoryStore::new()), None))
        }
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok((Arc::new(PgStore::new(pool.clone())), Some(pool)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_accepts_a_port() {
        let cli = Cli::try_parse_from(["formspace", "serve", "--port", "4100"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(4100) })));

        let cli = Cli::try_parse_from(["formspace"]).unwrap();
        assert!(cli.command.is_none());
    }
}
