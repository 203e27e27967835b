//! # Integration Tests for raffle-api
//!
//! Drives the full router with `tower::ServiceExt::oneshot`: health probes,
//! users, the raffle lifecycle, entries, winner selection, error bodies and
//! request metrics.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use raffle_api::state::{AppConfig, AppState};

/// Helper: build the test app with a seeded draw.
fn test_app() -> Router {
    let config = AppConfig {
        rng_seed: Some(7),
        ..AppConfig::default()
    };
    raffle_api::app(AppState::with_config(config))
}

/// Helper: send a request and decode the JSON response (or `Null`).
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_user(app: &Router, email: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/users",
        Some(json!({"email": email, "name": "Test User", "role": role})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_raffle(app: &Router, creator: &str, extra: Value) -> Value {
    let mut req = json!({
        "creator_id": creator,
        "title": "Holiday hamper",
        "raffle_date": "2026-12-20T18:00:00Z",
        "raffle_time": "18:00",
    });
    if let (Some(obj), Some(extra)) = (req.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    let (status, body) = send(app, Method::POST, "/v1/raffles", Some(req)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_health_probes() {
    let app = test_app();
    for (uri, expected) in [("/health/liveness", "ok"), ("/health/readiness", "ready")] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], expected.as_bytes());
    }
}

// -- Users --------------------------------------------------------------------

#[tokio::test]
async fn test_user_registration() {
    let app = test_app();
    let id = create_user(&app, "maria@example.com", "creator").await;

    let (status, body) = send(&app, Method::GET, &format!("/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "creator");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/users",
        Some(json!({"email": "MARIA@example.com", "name": "Dup"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "EmailTaken");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/users",
        Some(json!({"email": "not-an-email", "name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "InvalidUser");

    let (status, body) = send(&app, Method::GET, "/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/users/00000000-0000-4000-8000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "UserNotFound");
}

// -- Raffle Lifecycle ---------------------------------------------------------

#[tokio::test]
async fn test_random_raffle_round_trip() {
    let app = test_app();
    let creator = create_user(&app, "owner@example.com", "creator").await;
    let alice = create_user(&app, "alice@example.com", "client").await;
    let bob = create_user(&app, "bob@example.com", "client").await;

    let raffle = create_raffle(&app, &creator, json!({})).await;
    assert_eq!(raffle["status"], "draft");
    assert_eq!(raffle["selection_method"], "random");
    assert_eq!(raffle["unique_link"].as_str().unwrap().len(), 10);
    let id = raffle["id"].as_str().unwrap().to_string();
    let entries = format!("/v1/raffles/{id}/participations");

    let (status, body) = send(&app, Method::POST, &entries, Some(json!({"user_id": alice}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "RaffleNotActive");
    assert_eq!(body["error"]["message"], "Raffle is not active");

    let (status, body) = send(&app, Method::POST, &format!("/v1/raffles/{id}/activate"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (status, body) = send(
        &app,
        Method::POST,
        &entries,
        Some(json!({"user_id": alice, "selected_number": "12"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["selected_number"].is_null());

    let (status, body) = send(&app, Method::POST, &entries, Some(json!({"user_id": alice}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "DuplicateParticipation");

    let (status, _) = send(&app, Method::POST, &entries, Some(json!({"user_id": bob}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, &entries, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["user_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(listed, vec![alice.clone(), bob.clone()]);

    let winner_uri = format!("/v1/raffles/{id}/winner");
    let (status, body) = send(&app, Method::POST, &winner_uri, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "completed");
    let winner = body["winner_id"].as_str().unwrap().to_string();
    assert!(winner == alice || winner == bob);

    let (status, body) = send(&app, Method::POST, &winner_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "WinnerAlreadySelected");

    let (_, body) = send(&app, Method::GET, &format!("/v1/raffles/{id}"), None).await;
    assert_eq!(body["winner_id"], winner.as_str());
    assert_eq!(body["transition_log"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_selection_without_participants() {
    let app = test_app();
    let creator = create_user(&app, "owner@example.com", "creator").await;
    let raffle = create_raffle(&app, &creator, json!({})).await;
    let id = raffle["id"].as_str().unwrap();

    let (status, body) = send(&app, Method::POST, &format!("/v1/raffles/{id}/winner"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "RaffleMustBeActive");

    send(&app, Method::POST, &format!("/v1/raffles/{id}/activate"), None).await;
    let (status, body) = send(&app, Method::POST, &format!("/v1/raffles/{id}/winner"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NoParticipants");

    let (_, body) = send(&app, Method::GET, &format!("/v1/raffles/{id}"), None).await;
    assert_eq!(body["status"], "active");
    assert!(body["winner_id"].is_null());
}

#[tokio::test]
async fn test_numbered_raffle() {
    let app = test_app();
    let creator = create_user(&app, "owner@example.com", "creator").await;
    let alice = create_user(&app, "alice@example.com", "client").await;
    let bob = create_user(&app, "bob@example.com", "client").await;
    let raffle = create_raffle(
        &app,
        &creator,
        json!({"selection_method": "selection_number", "number_quantity": 200, "number_digits": 3}),
    )
    .await;
    let id = raffle["id"].as_str().unwrap();
    send(&app, Method::POST, &format!("/v1/raffles/{id}/activate"), None).await;
    let entries = format!("/v1/raffles/{id}/participations");

    let (status, body) = send(
        &app,
        Method::POST,
        &entries,
        Some(json!({"user_id": alice, "selected_number": "201"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "InvalidSelectionNumber");

    let (status, body) = send(
        &app,
        Method::POST,
        &entries,
        Some(json!({"user_id": alice, "selected_number": "7"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["selected_number"], "007");

    let (status, body) = send(
        &app,
        Method::POST,
        &entries,
        Some(json!({"user_id": bob, "selected_number": "007"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "InvalidSelectionNumber");

    let winner_uri = format!("/v1/raffles/{id}/winner");
    let (status, body) = send(&app, Method::POST, &winner_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "WinningNumberUnavailable");

    let (status, body) = send(&app, Method::POST, &winner_uri, Some(json!({"winning_number": "8"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NoWinningEntry");

    let (status, body) = send(&app, Method::POST, &winner_uri, Some(json!({"winning_number": "7"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winner_id"], alice.as_str());
    assert_eq!(body["winner_number"], "007");
}

#[tokio::test]
async fn test_raffle_editing_and_cancellation() {
    let app = test_app();
    let creator = create_user(&app, "owner@example.com", "creator").await;
    let raffle = create_raffle(&app, &creator, json!({})).await;
    let id = raffle["id"].as_str().unwrap();
    let uri = format!("/v1/raffles/{id}");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"selection_method": "selection_number", "number_quantity": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["selection_method"], "selection_number");
    assert_eq!(body["version"], 1);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "InvalidTransition");

    send(&app, Method::POST, &format!("{uri}/activate"), None).await;
    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"number_quantity": 10}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "ConfigurationLocked");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"title": "Bigger hamper"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Bigger hamper");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{uri}/cancel"),
        Some(json!({"reason": "venue closed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["transition_log"][1]["reason"], "venue closed");

    let (status, body) = send(&app, Method::POST, &format!("{uri}/activate"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "InvalidTransition");
}

#[tokio::test]
async fn test_patch_null_clears_field() {
    let app = test_app();
    let creator = create_user(&app, "owner@example.com", "creator").await;
    let raffle = create_raffle(
        &app,
        &creator,
        json!({"description": "Proceeds go to the shelter", "price_cents": 500, "is_paid": true}),
    )
    .await;
    let uri = format!("/v1/raffles/{}", raffle["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"description": null, "raffle_time": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["description"].is_null());
    assert!(body["raffle_time"].is_null());
    assert_eq!(body["price_cents"], 500);
    assert_eq!(body["version"], 1);

    let (_, stored) = send(&app, Method::GET, &uri, None).await;
    assert!(stored["description"].is_null());
}

#[tokio::test]
async fn test_raffle_queries() {
    let app = test_app();
    let maria = create_user(&app, "maria@example.com", "creator").await;
    let ivan = create_user(&app, "ivan@example.com", "creator").await;
    let first = create_raffle(&app, &maria, json!({})).await;
    create_raffle(&app, &ivan, json!({})).await;

    let (_, all) = send(&app, Method::GET, "/v1/raffles", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, mine) = send(&app, Method::GET, &format!("/v1/raffles?creator_id={maria}"), None).await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], first["id"]);

    let link = first["unique_link"].as_str().unwrap();
    let (status, body) = send(&app, Method::GET, &format!("/v1/raffles/by-link/{link}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], first["id"]);

    let (status, body) = send(&app, Method::GET, "/v1/raffles/by-link/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "RaffleNotFound");
}

// -- Request Validation -------------------------------------------------------

#[tokio::test]
async fn test_create_raffle_validation() {
    let app = test_app();
    let creator = create_user(&app, "owner@example.com", "creator").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/raffles",
        Some(json!({"creator_id": creator, "title": "", "raffle_date": "2026-12-20T18:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/raffles",
        Some(json!({"creator_id": creator, "title": "T", "raffle_date": "next friday"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/raffles",
        Some(json!({
            "creator_id": creator,
            "title": "T",
            "raffle_date": "2026-12-20T18:00:00Z",
            "selection_method": "selection_number",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "InvalidSelectionMethod");

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/raffles",
        Some(json!({
            "creator_id": "00000000-0000-4000-8000-000000000000",
            "title": "T",
            "raffle_date": "2026-12-20T18:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "UserNotFound");

    let (status, body) = send(&app, Method::POST, "/v1/raffles", Some(json!({"title": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
}

#[tokio::test]
async fn test_unknown_raffle_and_bad_ids() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/raffles/00000000-0000-4000-8000-000000000000/participations",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Raffle not found");

    let (status, _) = send(&app, Method::GET, "/v1/raffles/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_count_requests_and_errors() {
    let app = test_app();
    send(&app, Method::GET, "/v1/users", None).await;
    send(&app, Method::GET, "/v1/raffles/not-a-uuid", None).await;
    send(&app, Method::GET, "/health/liveness", None).await;

    let (status, body) = send(&app, Method::GET, "/v1/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    // The snapshot is taken before the metrics request itself is counted.
    assert_eq!(body["requests"], 2);
    assert_eq!(body["client_errors"], 1);
    assert_eq!(body["server_errors"], 0);
}
