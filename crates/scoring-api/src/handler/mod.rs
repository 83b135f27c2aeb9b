//! HTTP handler for the scoring API
//!
//! A single `POST /method` endpoint feeds the request body to the core
//! dispatcher and wraps the outcome in the response envelope. Every other
//! path answers with a 404 envelope; a panic inside a handler answers 500.

pub mod middleware;

pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use scoring_core::{ApiError, Authenticator, Context, Dispatcher, LocalScoring, Scoring};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::{ServerConfig, DEFAULT_MAX_BODY_BYTES};

/// Body of every response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Success { response: Value, code: u16 },
    Failure { error: String, code: u16 },
}

impl ResponseEnvelope {
    pub fn success(response: Value) -> Self {
        ResponseEnvelope::Success {
            response,
            code: scoring_core::error::OK,
        }
    }

    pub fn failure(error: &ApiError) -> Self {
        ResponseEnvelope::Failure {
            error: error.public_message(),
            code: error.status_code(),
        }
    }

    pub fn from_result(result: scoring_core::Result<Value>) -> Self {
        match result {
            Ok(response) => Self::success(response),
            Err(err) => Self::failure(&err),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            ResponseEnvelope::Success { code, .. } | ResponseEnvelope::Failure { code, .. } => {
                *code
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success { .. })
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Application state shared by all requests
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    /// Bodies larger than this are answered with a 400 envelope
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(auth: Authenticator, scoring: Arc<dyn Scoring>) -> Self {
        Self {
            dispatcher: Dispatcher::new(auth, scoring),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// State with the configured salts, body limit and the local scoring backend
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.authenticator(), Arc::new(LocalScoring::new()))
            .with_max_body_bytes(config.max_body_bytes)
    }
}

/// Create the router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    let method = post(method_endpoint).fallback(not_found);
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        .route("/method", method.clone())
        .route("/method/", method)
        .fallback(not_found)
        .layer(body_limit)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
}

/// Run one raw body through the dispatcher.
///
/// An empty body or one that is not valid JSON is a 400; anything else is
/// handed to the dispatcher as is.
pub fn handle_body(dispatcher: &Dispatcher, body: &[u8], ctx: &mut Context) -> ResponseEnvelope {
    if body.is_empty() {
        tracing::info!(request_id = %ctx.request_id, "Empty request body");
        return ResponseEnvelope::failure(&ApiError::BadRequest);
    }

    let parsed: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::info!(request_id = %ctx.request_id, error = %err, "Unparseable request body");
            return ResponseEnvelope::failure(&ApiError::BadRequest);
        }
    };

    ResponseEnvelope::from_result(dispatcher.dispatch(&parsed, ctx))
}

/// POST /method
async fn method_endpoint(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Bytes, BytesRejection>,
) -> ResponseEnvelope {
    let mut ctx = Context::new(request_id.0);
    let envelope = match body {
        Ok(body) => handle_body(&state.dispatcher, &body, &mut ctx),
        Err(rejection) => {
            tracing::info!(
                request_id = %ctx.request_id,
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Request body rejected"
            );
            ResponseEnvelope::failure(&ApiError::BadRequest)
        }
    };

    tracing::info!(
        request_id = %ctx.request_id,
        code = envelope.code(),
        has = ?ctx.has,
        nclients = ?ctx.nclients,
        "Request context"
    );

    envelope
}

async fn not_found() -> ResponseEnvelope {
    ResponseEnvelope::failure(&ApiError::NotFound)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Handler panicked");
    ResponseEnvelope::failure(&ApiError::internal(detail)).into_response()
}
