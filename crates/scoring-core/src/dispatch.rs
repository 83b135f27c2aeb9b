//! Method dispatch
//!
//! Binds the envelope, checks the token, then routes `method` through the
//! static registry. The checks run in that order, so a malformed envelope is
//! reported before a bad token and a bad token before an unknown method.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::auth::Authenticator;
use crate::error::{ApiError, Result};
use crate::handlers::{self, Context, MethodHandler};
use crate::requests::MethodRequest;
use crate::scoring::Scoring;
use crate::validation::RequestSchema;

/// Registered methods
pub const METHODS: [(&str, MethodHandler); 2] = [
    ("online_score", handlers::online_score),
    ("clients_interests", handlers::clients_interests),
];

/// Handler registered under `name`
pub fn lookup(name: &str) -> Option<MethodHandler> {
    METHODS
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, handler)| *handler)
}

/// Validate, authenticate and run one call
pub fn method_handler(
    body: &Value,
    ctx: &mut Context,
    auth: &Authenticator,
    scoring: &dyn Scoring,
) -> Result<Value> {
    let empty = Map::new();
    let raw = body.as_object().unwrap_or(&empty);

    let request = MethodRequest::bind(raw)?;

    if !auth.check_auth(&request) {
        tracing::warn!(
            request_id = %ctx.request_id,
            login = %request.login,
            "Authentication failed"
        );
        return Err(ApiError::Forbidden);
    }

    let handler = lookup(&request.method).ok_or_else(|| {
        ApiError::invalid_request(format!("Unknown method: {}", request.method))
    })?;

    tracing::debug!(
        request_id = %ctx.request_id,
        method = %request.method,
        admin = request.is_admin(),
        "Dispatching method"
    );

    handler(&request.arguments, request.is_admin(), ctx, scoring)
}

/// Owns the collaborators a call needs
#[derive(Clone)]
pub struct Dispatcher {
    auth: Authenticator,
    scoring: Arc<dyn Scoring>,
}

impl Dispatcher {
    pub fn new(auth: Authenticator, scoring: Arc<dyn Scoring>) -> Self {
        Self { auth, scoring }
    }

    /// Run one call, recording status and outcome in the log
    pub fn dispatch(&self, body: &Value, ctx: &mut Context) -> Result<Value> {
        let result = method_handler(body, ctx, &self.auth, self.scoring.as_ref());
        match &result {
            Ok(_) => tracing::info!(request_id = %ctx.request_id, code = 200, "Call completed"),
            Err(err) if err.is_client_error() => tracing::info!(
                request_id = %ctx.request_id,
                code = err.status_code(),
                error = %err,
                "Call rejected"
            ),
            Err(err) => tracing::error!(
                request_id = %ctx.request_id,
                code = err.status_code(),
                error = %err,
                "Call failed"
            ),
        }
        result
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("auth", &self.auth)
            .field("methods", &METHODS.map(|(name, _)| name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{LocalScoring, MockScoring};
    use serde_json::json;

    const HORNS_TOKEN: &str = "14199378518d25139eb81b8b03ce7c26c9074889d9552f9657f990863ac08a92\
                               ea5e8462bb7c69e38d9117376b2d58137c9f4e02d1b68f1c00fbcc2bc45913df";

    fn body(method: &str, token: &str, arguments: Value) -> Value {
        json!({
            "account": "horns&hoofs",
            "login": "h&h",
            "method": method,
            "token": token,
            "arguments": arguments
        })
    }

    #[test]
    fn test_lookup_registered_methods() {
        assert!(lookup("online_score").is_some());
        assert!(lookup("clients_interests").is_some());
        assert!(lookup("Online_Score").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_envelope_errors_come_before_auth() {
        let mut ctx = Context::new("t1");
        let err = method_handler(
            &json!({"login": 1, "token": "bad", "method": "online_score", "arguments": {}}),
            &mut ctx,
            &Authenticator::new(),
            &LocalScoring,
        )
        .unwrap_err();
        assert_eq!(err, ApiError::invalid_request("Invalid fields: login"));
    }

    #[test]
    fn test_auth_comes_before_method_lookup() {
        let mut ctx = Context::new("t2");
        let err = method_handler(
            &body("no_such_method", "bad", json!({})),
            &mut ctx,
            &Authenticator::new(),
            &LocalScoring,
        )
        .unwrap_err();
        assert_eq!(err, ApiError::Forbidden);
    }

    #[test]
    fn test_unknown_method_is_invalid() {
        let mut ctx = Context::new("t3");
        let err = method_handler(
            &body("no_such_method", HORNS_TOKEN, json!({})),
            &mut ctx,
            &Authenticator::new(),
            &LocalScoring,
        )
        .unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_non_object_body_is_invalid() {
        let mut ctx = Context::new("t4");
        for raw in [json!([1, 2]), json!("text"), json!(null), json!({})] {
            let err = method_handler(&raw, &mut ctx, &Authenticator::new(), &LocalScoring)
                .unwrap_err();
            assert_eq!(err.status_code(), 422);
        }
    }

    #[test]
    fn test_forbidden_call_never_reaches_scorer() {
        let mut scoring = MockScoring::new();
        scoring.expect_get_score().never();
        scoring.expect_get_interests().never();
        let mut ctx = Context::new("t5");
        let err = method_handler(
            &body("online_score", "", json!({"phone": "79175002040", "email": "a@b"})),
            &mut ctx,
            &Authenticator::new(),
            &scoring,
        )
        .unwrap_err();
        assert_eq!(err, ApiError::Forbidden);
    }

    #[test]
    fn test_dispatcher_routes_to_handler() {
        let mut scoring = MockScoring::new();
        scoring.expect_get_score().times(1).returning(|_| Ok(3.0));
        let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(scoring));
        let mut ctx = Context::new("t6");
        let response = dispatcher
            .dispatch(
                &body("online_score", HORNS_TOKEN, json!({"phone": "79175002040", "email": "a@b"})),
                &mut ctx,
            )
            .unwrap();
        assert_eq!(response, json!({"score": 3.0}));
        assert_eq!(ctx.has, vec!["email", "phone"]);
    }

    #[test]
    fn test_debug_lists_methods() {
        let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(LocalScoring));
        let rendered = format!("{:?}", dispatcher);
        assert!(rendered.contains("online_score"));
        assert!(rendered.contains("clients_interests"));
    }
}
