//! Method handlers
//!
//! Each handler binds its payload schema from the envelope's `arguments`,
//! applies its business rule and calls the [`Scoring`] backend.

use serde_json::{json, Map, Value};

use crate::error::{ApiError, Result};
use crate::requests::{ClientsInterestsRequest, OnlineScoreRequest};
use crate::scoring::Scoring;
use crate::validation::RequestSchema;

/// Score returned to the admin login without consulting the backend
pub const ADMIN_SCORE: u32 = 42;

/// Signature shared by every registered method
pub type MethodHandler =
    fn(&Map<String, Value>, bool, &mut Context, &dyn Scoring) -> Result<Value>;

/// Per-call context, logged once the call completes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub request_id: String,
    /// Non-empty `online_score` fields
    pub has: Vec<String>,
    /// Number of ids asked for by `clients_interests`
    pub nclients: Option<usize>,
}

impl Context {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Default::default()
        }
    }

    /// Context with a fresh hex request id
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string())
    }
}

/// `online_score`: score a client profile
pub fn online_score(
    arguments: &Map<String, Value>,
    is_admin: bool,
    ctx: &mut Context,
    scoring: &dyn Scoring,
) -> Result<Value> {
    let request = OnlineScoreRequest::bind(arguments)?;
    ctx.has = request
        .non_empty_fields()
        .into_iter()
        .map(String::from)
        .collect();

    if !request.has_complete_pair() {
        return Err(ApiError::invalid_request(format!(
            "At least one pair must be present: {}. Empty fields: {}",
            pairs_description(),
            request.empty_pair_fields().join(", ")
        )));
    }

    if is_admin {
        tracing::debug!(request_id = %ctx.request_id, "Admin score returned");
        return Ok(json!({ "score": ADMIN_SCORE }));
    }

    let score = scoring.get_score(&request)?;
    Ok(json!({ "score": score }))
}

/// `clients_interests`: interests per requested client id
pub fn clients_interests(
    arguments: &Map<String, Value>,
    _is_admin: bool,
    ctx: &mut Context,
    scoring: &dyn Scoring,
) -> Result<Value> {
    let request = ClientsInterestsRequest::bind(arguments)?;
    ctx.nclients = Some(request.client_ids.len());

    let mut interests = Map::new();
    for client_id in &request.client_ids {
        let found = scoring.get_interests(*client_id)?;
        interests.insert(client_id.to_string(), json!(found));
    }

    Ok(Value::Object(interests))
}

fn pairs_description() -> String {
    OnlineScoreRequest::REQUIRED_PAIRS
        .iter()
        .map(|(a, b)| format!("({}, {})", a.name(), b.name()))
        .collect::<Vec<_>>()
        .join(", ")
}
