use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use keyward_config::{Config, ConfigLoad, ConfigLoader, init_tracing};
use keyward_server::{
    bootstrap::{build_state, open_store},
    create_app,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "keyward-server")]
#[command(about = "Multi-tenant credential issuance service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (the default)
    Serve,
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    App(AppCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum AppCommand {
    /// Provision a tenant application and print its id
    Create {
        #[arg(long)]
        name: String,
        /// Token signing secret for the tenant
        #[arg(long, env = "KEYWARD_APP_SECRET", hide_env_values = true)]
        secret: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        None | Some(Command::Serve) => run_server(config).await,
        Some(Command::Db(DbCommand::Migrate)) => {
            open_store(&config).await?;
            info!("Database migrations applied successfully");
            Ok(())
        }
        Some(Command::App(AppCommand::Create { name, secret })) => {
            let store = open_store(&config).await?;
            let app = store
                .create_application(&name, secret.as_bytes())
                .await
                .with_context(|| format!("failed to create application '{name}'"))?;
            info!(app_id = app.id, name = %app.name, "application provisioned");
            println!("{}", app.id);
            Ok(())
        }
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
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

    init_tracing(config.env).context("failed to install tracing subscriber")?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(message = %warning.message, hint = %hint, "configuration warning"),
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(Arc::new(config))
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let state = build_state(Arc::clone(&config), shutdown.clone()).await?;
    let router = create_app(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(env = %config.env, %addr, "Starting Keyward credential server");

    tokio::spawn(shutdown_signal(shutdown.clone()));
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
    shutdown.cancel();
}
