//! Mining Game - HTTP server and maintenance commands.

#![warn(missing_docs)]

mod cli;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use mining_game::{AccountRepository, Catalog, GameConfig, GameService, Store, pages, router};
use tracing::{error, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mining_game=debug")),
        )
        .init();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            db_path,
            catalog,
        } => {
            let mut settings = GameConfig::load(config.as_deref())?;
            if let Some(host) = host {
                settings.set_host(host);
            }
            if let Some(port) = port {
                settings.set_port(port);
            }
            if let Some(db_path) = db_path {
                settings.set_db_path(db_path);
            }
            if let Some(catalog) = catalog {
                settings.set_catalog_path(catalog);
            }
            run_server(settings).await
        }
        Command::Scoreboard { db_path } => print_scoreboard(db_path),
    }
}

/// Runs the HTTP game server until Ctrl+C, then closes the store.
#[instrument(skip_all, fields(host = %settings.host(), port = settings.port()))]
async fn run_server(settings: GameConfig) -> Result<()> {
    info!("Starting Mining Game server");

    let catalog = load_catalog(settings.catalog_path())?;

    let store = Arc::new(
        Store::open(settings.db_path().as_str())
            .with_context(|| format!("Failed to open store '{}'", settings.db_path()))?,
    );
    let service = GameService::new(AccountRepository::new(Arc::clone(&store)), catalog);
    let app = router(service);

    let listener = tokio::net::TcpListener::bind((settings.host().as_str(), *settings.port()))
        .await
        .with_context(|| format!("Failed to bind {}:{}", settings.host(), settings.port()))?;
    info!(
        "Server ready at http://{}:{}/",
        settings.host(),
        settings.port()
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped, closing store");
    // The router and every handler clone are gone once serve returns.
    match Arc::try_unwrap(store) {
        Ok(store) => store.close()?,
        Err(_) => error!("Store still shared at shutdown, leaving it to drop"),
    }
    Ok(())
}

#[instrument(fields(path = %path.display()))]
fn load_catalog(path: &Path) -> Result<Arc<Catalog>> {
    let catalog = Catalog::from_file(path)
        .with_context(|| format!("Failed to load shop catalog '{}'", path.display()))?;
    info!(
        tools = catalog.tools().len(),
        upgrades = catalog.upgrades().len(),
        "Shop catalog loaded"
    );
    Ok(Arc::new(catalog))
}

#[instrument]
fn print_scoreboard(db_path: String) -> Result<()> {
    let store = Arc::new(Store::open(db_path.as_str())?);
    let service = GameService::new(
        AccountRepository::new(Arc::clone(&store)),
        Arc::new(Catalog::default()),
    );

    let scores = service.scoreboard()?;
    print!("{}", pages::scoreboard_text(&scores));

    drop(service);
    if let Ok(store) = Arc::try_unwrap(store) {
        store.close()?;
    }
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
