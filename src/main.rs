use std::fs;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use teahouse::config::{SESSION_SECRET_ENV, ServerConfig};
use teahouse::server::{AppState, create_router};
use teahouse::store::{SqliteStore, Store};
use teahouse::types::UserInfo;

#[derive(Parser)]
#[command(name = "teahouse")]
#[command(about = "A tea shop storefront backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Secret for signing session tokens. Falls back to the
        /// TEAHOUSE_SESSION_SECRET environment variable.
        #[arg(long)]
        session_secret: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create the database)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Promote an existing account to admin
    Grant {
        /// Email of the account to promote
        email: String,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("teahouse.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    println!("Database ready at {}", db_path.display());
    Ok(())
}

fn run_grant(email: String, data_dir: String) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    let db_path = data_path.join("teahouse.db");
    if !db_path.exists() {
        bail!("Server not initialized. Run 'teahouse admin init' first.");
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let Some(mut user) = store.get_user_by_email(&email)? else {
        bail!("No account found for {email}");
    };

    let now = Utc::now();
    user.admin = true;
    user.updated_at = now;
    store.update_user(&user)?;

    // The gate reads the profile record, so mirror the flag there.
    let mut info = store
        .get_user_info(&user.email)?
        .unwrap_or_else(|| UserInfo {
            email: user.email.clone(),
            image: None,
            admin: false,
            permissions: false,
            phone: None,
            street_address: None,
            created_at: now,
            updated_at: now,
        });
    info.admin = true;
    info.updated_at = now;
    store.upsert_user_info(&info)?;

    println!("Granted admin to {email}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("teahouse=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init { data_dir } => {
                run_init(data_dir)?;
            }
            AdminCommands::Grant { email, data_dir } => {
                run_grant(email, data_dir)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            session_secret,
        } => {
            let session_secret = session_secret
                .or_else(|| std::env::var(SESSION_SECRET_ENV).ok())
                .unwrap_or_default();

            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                session_secret,
                ..ServerConfig::default()
            };

            if !config.db_path().exists() {
                bail!(
                    "Server not initialized. Run 'teahouse admin init' first to create the database."
                );
            }

            let sessions = config.session_keys()?;

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;

            let state = Arc::new(AppState::new(Arc::new(store), sessions));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
