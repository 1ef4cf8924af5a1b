//! MinePanel backend server binary.
//!
//! `serve` (the default) runs the HTTP API; `seed-admin` creates the initial
//! administrator account and exits.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use minepanel_api::config::ApiConfig;
use minepanel_api::services::users::{SeedOutcome, seed_admin};
use tracing::{info, warn};

/// CLI arguments for the backend.
#[derive(Parser, Debug)]
#[command(name = "minepanel_server", about = "MinePanel backend server", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// SQLite connection URL.
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", global = true)]
    bind_addr: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5, global = true)]
    max_connections: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Create the initial ADMIN account if it does not exist yet.
    SeedAdmin {
        #[arg(long, default_value = "admin")]
        username: String,
        #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin123")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(
                        "info,minepanel_api=debug,minepanel_core=debug",
                    )
                }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(addr) = args.bind_addr {
        config.bind_addr = addr;
    }

    info!(
        database_url = %config.database_url,
        max_connections = args.max_connections,
        "opening database"
    );
    let pool = minepanel_core::db::connect_and_migrate(&config.database_url, args.max_connections)
        .await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(pool, config).await,
        Command::SeedAdmin { username, password } => {
            if password == "admin123" {
                warn!("seeding with the default password; change it after first login");
            }
            match seed_admin(&pool, &username, &password).await? {
                SeedOutcome::Created(user) => {
                    info!(id = user.id, username = %user.username, "admin created");
                }
                SeedOutcome::AlreadyExists => info!(username = %username, "admin already exists"),
            }
            Ok(())
        }
    }
}

async fn serve(
    pool: sqlx::SqlitePool,
    config: ApiConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    if config.plugin_shared_secret.is_empty() {
        warn!("PLUGIN_SHARED_SECRET is empty; the plugin will reject proxied calls");
    }

    let state = minepanel_api::AppState::new(pool, config.clone())?;

    // Drop elapsed login windows so idle addresses do not accumulate.
    let limiter = state.login_limiter.clone();
    let prune_every = config.login_rate_limit_window.max(std::time::Duration::from_secs(60));
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(prune_every);
        loop {
            tick.tick().await;
            let pruned = limiter.prune_expired();
            if pruned > 0 {
                tracing::debug!(pruned, "pruned login rate-limit windows");
            }
        }
    });

    let app = minepanel_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, plugin = %config.plugin_base_url, "REST API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
