//! End-to-end tests for method dispatch
//!
//! Drives whole request bodies through the dispatcher with a mocked scoring
//! backend and checks the response payload, the error status and the context.

use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;
use scoring_core::{
    ApiError, Authenticator, Clock, Context, Dispatcher, LocalScoring, OnlineScoreRequest,
    Scoring, ScoringError, ADMIN_LOGIN,
};
use serde_json::{json, Value};
use std::sync::Arc;

mock! {
    pub Backend {}

    impl Scoring for Backend {
        fn get_score(&self, profile: &OnlineScoreRequest) -> Result<f64, ScoringError>;
        fn get_interests(&self, client_id: u64) -> Result<Vec<String>, ScoringError>;
    }
}

mock! {
    pub FixedClock {}

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime;
    }
}

/// Helper to build a regular caller's body with a valid token
fn signed_body(method: &str, arguments: Value) -> Value {
    let token = Authenticator::new().user_token("horns&hoofs", "h&h");
    json!({
        "account": "horns&hoofs",
        "login": "h&h",
        "method": method,
        "token": token,
        "arguments": arguments
    })
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn admin_auth() -> Authenticator {
    let mut clock = MockFixedClock::new();
    clock.expect_now().return_const(noon());
    Authenticator::new().with_clock(Arc::new(clock))
}

fn run(dispatcher: &Dispatcher, body: &Value) -> (Result<Value, ApiError>, Context) {
    let mut ctx = Context::new("integration");
    let result = dispatcher.dispatch(body, &mut ctx);
    (result, ctx)
}

#[test]
fn test_online_score_valid_token() {
    let mut backend = MockBackend::new();
    backend
        .expect_get_score()
        .withf(|profile| profile.phone.as_deref() == Some("79175002040"))
        .times(1)
        .returning(|_| Ok(3.0));
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(backend));

    let (result, ctx) = run(
        &dispatcher,
        &signed_body(
            "online_score",
            json!({"phone": "79175002040", "email": "stupnikov@otus.ru"}),
        ),
    );

    let response = result.unwrap();
    assert!(response["score"].is_number());
    assert_eq!(ctx.has, vec!["email", "phone"]);
}

#[test]
fn test_envelope_without_account() {
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(LocalScoring));
    let token = Authenticator::new().user_token("", "h&h");
    let (result, ctx) = run(
        &dispatcher,
        &json!({
            "method": "online_score",
            "login": "h&h",
            "token": token,
            "arguments": {
                "phone": "79175002040",
                "email": "a@b",
                "first_name": "X",
                "last_name": "Y",
                "birthday": "01.01.1990",
                "gender": 1
            }
        }),
    );

    assert_eq!(result.unwrap(), json!({"score": 5.0}));
    assert_eq!(ctx.has.len(), 6);
}

#[test]
fn test_wrong_login_type_names_field() {
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(LocalScoring));
    let (result, _) = run(
        &dispatcher,
        &json!({
            "account": "horns&hoofs",
            "login": 123,
            "method": "online_score",
            "token": "",
            "arguments": {}
        }),
    );

    let err = result.unwrap_err();
    assert_eq!(err.status_code(), 422);
    assert!(err.public_message().contains("login"));
}

#[test]
fn test_bad_token_is_forbidden() {
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(LocalScoring));
    for token in ["", "sdd", "14199378518d25139eb81b8b03ce7c26"] {
        let (result, _) = run(
            &dispatcher,
            &json!({
                "account": "horns&hoofs",
                "login": "h&h",
                "method": "online_score",
                "token": token,
                "arguments": {"phone": "79175002040", "email": "a@b"}
            }),
        );
        assert_eq!(result.unwrap_err(), ApiError::Forbidden);
    }
}

#[test]
fn test_empty_body_is_invalid() {
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(LocalScoring));
    let (result, _) = run(&dispatcher, &json!({}));
    let err = result.unwrap_err();
    assert_eq!(err.status_code(), 422);
    assert_eq!(
        err.public_message(),
        "Invalid fields: login, token, arguments, method"
    );
}

#[test]
fn test_online_score_invalid_arguments() {
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(LocalScoring));
    let cases = [
        json!({}),
        json!({"phone": "79175002040"}),
        json!({"phone": "89175002", "email": "stupnikov@otus.ru"}),
        json!({"phone": "79175002040", "email": "stupnikovotus.ru"}),
        json!({"phone": "79175002040", "email": "stupnikov@otus.ru", "gender": -1}),
        json!({"birthday": "01.01.1890", "gender": 1}),
        json!({"birthday": "XXX", "gender": 1}),
        json!({"first_name": 1, "last_name": "s"}),
        json!({"birthday": "01.01.2000", "gender": 0}),
    ];
    for arguments in cases {
        let (result, _) = run(&dispatcher, &signed_body("online_score", arguments.clone()));
        assert_eq!(
            result.unwrap_err().status_code(),
            422,
            "arguments {} should be rejected",
            arguments
        );
    }
}

#[test]
fn test_online_score_valid_arguments() {
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(LocalScoring));
    let cases = [
        json!({"phone": "79175002040", "email": "stupnikov@otus.ru"}),
        json!({"phone": 79175002040u64, "email": "stupnikov@otus.ru"}),
        json!({"gender": 1, "birthday": "01.01.2000", "first_name": "a", "last_name": "b"}),
        json!({"gender": 2, "birthday": "01.01.2000"}),
        json!({"first_name": "a", "last_name": "b"}),
    ];
    for arguments in cases {
        let (result, ctx) = run(&dispatcher, &signed_body("online_score", arguments.clone()));
        let response = result.unwrap_or_else(|e| panic!("{} rejected: {}", arguments, e));
        let score = response["score"].as_f64().unwrap();
        assert!(score >= 0.0);
        let mut expected: Vec<&str> = arguments
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        expected.sort_unstable();
        let mut has: Vec<&str> = ctx.has.iter().map(String::as_str).collect();
        has.sort_unstable();
        assert_eq!(has, expected);
    }
}

#[test]
fn test_admin_gets_fixed_score() {
    let mut backend = MockBackend::new();
    backend.expect_get_score().never();
    let auth = admin_auth();
    let token = auth.admin_token();
    let dispatcher = Dispatcher::new(auth, Arc::new(backend));

    let (result, _) = run(
        &dispatcher,
        &json!({
            "account": "horns&hoofs",
            "login": ADMIN_LOGIN,
            "method": "online_score",
            "token": token,
            "arguments": {"phone": "79175002040", "email": "stupnikov@otus.ru"}
        }),
    );

    assert_eq!(result.unwrap(), json!({"score": 42}));
}

#[test]
fn test_clients_interests() {
    let mut backend = MockBackend::new();
    backend
        .expect_get_interests()
        .times(3)
        .returning(|id| Ok(vec![format!("books-{}", id), "tv".to_string()]));
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(backend));

    let (result, ctx) = run(
        &dispatcher,
        &signed_body(
            "clients_interests",
            json!({"client_ids": [1, 2, 3], "date": "19.07.2017"}),
        ),
    );

    let response = result.unwrap();
    let object = response.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(object["2"], json!(["books-2", "tv"]));
    assert_eq!(ctx.nclients, Some(3));
}

#[test]
fn test_clients_interests_invalid_arguments() {
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(LocalScoring));
    let cases = [
        json!({}),
        json!({"date": "20.07.2017"}),
        json!({"client_ids": {"1": 2}, "date": "20.07.2017"}),
        json!({"client_ids": ["1", "2"], "date": "20.07.2017"}),
        json!({"client_ids": [1, 2], "date": "XXX"}),
    ];
    for arguments in cases {
        let (result, _) = run(&dispatcher, &signed_body("clients_interests", arguments.clone()));
        assert_eq!(
            result.unwrap_err().status_code(),
            422,
            "arguments {} should be rejected",
            arguments
        );
    }
}

#[test]
fn test_unknown_method() {
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(LocalScoring));
    let (result, _) = run(&dispatcher, &signed_body("delete_everything", json!({})));
    let err = result.unwrap_err();
    assert_eq!(err.status_code(), 422);
    assert!(err.public_message().contains("delete_everything"));
}

#[test]
fn test_backend_failure_is_internal() {
    let mut backend = MockBackend::new();
    backend
        .expect_get_interests()
        .returning(|_| Err(ScoringError::Unavailable("connection refused".to_string())));
    let dispatcher = Dispatcher::new(Authenticator::new(), Arc::new(backend));

    let (result, _) = run(
        &dispatcher,
        &signed_body("clients_interests", json!({"client_ids": [1]})),
    );

    let err = result.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.public_message(), "Internal Server Error");
}
