//! Scoring API entry point

use anyhow::Context as _;
use clap::Parser;
use scoring_api::cli::{self, Cli, Commands};
use scoring_api::{create_router, AppState, ServerConfig};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let config = args.resolve()?;
            init_tracing(&config)?;
            serve(config).await?;
        }

        Commands::Token {
            login,
            account,
            config,
        } => {
            init_cli_tracing();
            println!("{}", cli::run_token(&login, &account, config.as_deref())?);
        }

        Commands::Call { file, config } => {
            init_cli_tracing();
            let (envelope, ctx) = cli::run_call(&file, config.as_deref())?;
            eprintln!("{} (request {})", cli::status_line(envelope.code()), ctx.request_id);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            let code = cli::exit_code(&envelope);
            if code != 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let router = create_router(AppState::from_config(&config));

    tracing::info!(%addr, version = scoring_api::VERSION, "Starting scoring API");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Scoring API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}

/// Server logging: `RUST_LOG` filter, text or JSON, stdout or an appended file
fn init_tracing(config: &ServerConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let writer = Mutex::new(file);
            if config.json_logs {
                tracing_subscriber::fmt::layer().json().with_writer(writer).boxed()
            } else {
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed()
            }
        }
        None if config.json_logs => tracing_subscriber::fmt::layer().json().boxed(),
        None => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
    Ok(())
}

/// Offline commands only log warnings, to stderr
fn init_cli_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
