//! Command-line interface
//!
//! `serve` runs the HTTP server, `token` prints the token a caller must
//! present, and `call` runs a request body through the dispatcher offline.

use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use scoring_core::{Context, ADMIN_LOGIN};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{ConfigError, ServerConfig};
use crate::handler::{handle_body, AppState, ResponseEnvelope};

#[derive(Parser, Debug)]
#[command(name = "scoring-api")]
#[command(about = "Scoring API - validated, authenticated scoring calls over HTTP")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Print the token a caller must present
    Token {
        /// Caller login
        #[arg(long)]
        login: String,

        /// Caller account
        #[arg(long, default_value = "")]
        account: String,

        /// Config file (TOML/YAML/JSON) with the salts to use
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run a request body through the dispatcher without a server
    Call {
        /// Path to the request body (JSON, or YAML by extension)
        #[arg(short, long)]
        file: PathBuf,

        /// Config file (TOML/YAML/JSON) with the salts to use
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "SCORING_API_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "SCORING_API_HOST")]
    pub host: Option<String>,

    /// Append logs to this file instead of stdout
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Config file (TOML/YAML/JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl ServeArgs {
    /// Config file values with command-line flags applied on top
    pub fn resolve(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = ServerConfig::load_or_default(self.config.as_deref())?;
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(log) = &self.log {
            config.log_file = Some(log.clone());
        }
        if self.json_logs {
            config.json_logs = true;
        }
        Ok(config)
    }
}

/// Errors from the offline commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML body: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Token for `login`/`account` under the configured salts
pub fn run_token(login: &str, account: &str, config: Option<&Path>) -> Result<String, CliError> {
    let auth = ServerConfig::load_or_default(config)?.authenticator();
    let token = if login == ADMIN_LOGIN {
        auth.admin_token()
    } else {
        auth.user_token(account, login)
    };
    Ok(token)
}

/// Dispatch the body stored at `file`
pub fn run_call(file: &Path, config: Option<&Path>) -> Result<(ResponseEnvelope, Context), CliError> {
    let state = AppState::from_config(&ServerConfig::load_or_default(config)?);
    let content = std::fs::read(file).map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })?;

    let is_yaml = matches!(
        file.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let body = if is_yaml && !content.is_empty() {
        let value: Value = serde_yaml::from_slice(&content)?;
        serde_json::to_vec(&value)?
    } else {
        content
    };

    let mut ctx = Context::generate();
    let envelope = handle_body(&state.dispatcher, &body, &mut ctx);
    Ok((envelope, ctx))
}

/// Status line for a response code
pub fn status_line(code: u16) -> ColoredString {
    let text = format!("{} {}", code, status_phrase(code));
    match code {
        200..=299 => text.green().bold(),
        400..=499 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

fn status_phrase(code: u16) -> &'static str {
    if code == scoring_core::error::OK {
        "OK"
    } else {
        scoring_core::default_message(code)
    }
}

/// Exit code for a response: 0 on success, 1 on a client error, 2 otherwise
pub fn exit_code(envelope: &ResponseEnvelope) -> i32 {
    match envelope.code() {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}
