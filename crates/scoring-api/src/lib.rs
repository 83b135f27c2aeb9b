//! Scoring API
//!
//! HTTP server and command-line front end for `scoring-core`.
//!
//! ## Architecture
//!
//! 1. **Config** (`config`): server settings from defaults, a config file and
//!    command-line flags.
//!
//! 2. **Handler** (`handler/`): axum router, response envelope and the
//!    request id middleware.
//!
//! 3. **CLI** (`cli`): `serve`, `token` and `call` subcommands.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Start the server on port 8080, logging to a file
//! scoring-api serve --port 8080 --log /var/log/scoring.log
//!
//! # Print the token for a login
//! scoring-api token --login h&h --account horns&hoofs
//!
//! # Run a request body without a server
//! scoring-api call --file request.json
//! ```

pub mod cli;
pub mod config;
pub mod handler;

pub use cli::{Cli, Commands, ServeArgs};
pub use config::{ConfigError, ServerConfig};
pub use handler::{create_router, handle_body, AppState, RequestId, ResponseEnvelope};

/// Server version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
