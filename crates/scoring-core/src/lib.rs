//! Scoring Core
//!
//! Declarative request validation, token authentication and method dispatch
//! for the scoring API.
//!
//! ## Architecture
//!
//! 1. **Validation** (`validation/`): field validators and the schema engine
//!    that binds a raw JSON mapping into a typed request.
//!
//! 2. **Requests** (`requests`): the envelope and the two method payloads.
//!
//! 3. **Auth** (`auth`): SHA-512 token checks for regular and admin callers.
//!
//! 4. **Handlers** (`handlers`): `online_score` and `clients_interests`.
//!
//! 5. **Dispatch** (`dispatch`): envelope, then auth, then method routing.
//!
//! 6. **Scoring** (`scoring`): the lookup backend trait and its local
//!    implementation.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use scoring_core::{Authenticator, Context, Dispatcher, LocalScoring};
//! use serde_json::json;
//!
//! let auth = Authenticator::new();
//! let token = auth.user_token("horns&hoofs", "h&h");
//! let dispatcher = Dispatcher::new(auth, Arc::new(LocalScoring::new()));
//!
//! let body = json!({
//!     "account": "horns&hoofs",
//!     "login": "h&h",
//!     "method": "online_score",
//!     "token": token,
//!     "arguments": {"phone": "79175002040", "email": "stupnikov@otus.ru"}
//! });
//!
//! let mut ctx = Context::generate();
//! let response = dispatcher.dispatch(&body, &mut ctx).unwrap();
//! assert_eq!(response["score"], 3.0);
//! ```

pub mod auth;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod requests;
pub mod scoring;
pub mod validation;

pub use auth::{sha512_hex, Authenticator, Clock, SystemClock, ADMIN_SALT, SALT};
pub use dispatch::{lookup, method_handler, Dispatcher, METHODS};
pub use error::{default_message, ApiError, Result};
pub use handlers::{clients_interests, online_score, Context, MethodHandler, ADMIN_SCORE};
pub use requests::{
    ClientsInterestsRequest, MethodRequest, OnlineScoreRequest, ProfileField, ADMIN_LOGIN,
};
pub use scoring::{LocalScoring, Scoring, ScoringError, INTERESTS};
pub use validation::{
    bind_all, BindErrors, Bound, Field, FieldError, FieldErrorKind, FieldKind, FieldSpec, Gender,
    RequestSchema,
};

/// Crate version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
