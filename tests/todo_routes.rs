use std::sync::Arc;

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use futures_util::future::join_all;
use serde_json::{Value, json};
use tower::ServiceExt;

use todomvc_server::{
    routes::API_PREFIX,
    state::AppState,
    test_helpers::{test_router, test_state},
};

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

fn app(state: &Arc<AppState>) -> Router {
    test_router(state.clone())
}

fn json_request(method: &str, path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(api_path(path))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(api_path(path))
        .body(Body::empty())
        .unwrap()
}

async fn json_response(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(state)
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json: Value = serde_json::from_slice(&body).expect("body should be json");
    (status, json)
}

async fn status_only(state: &Arc<AppState>, request: Request<Body>) -> StatusCode {
    app(state)
        .oneshot(request)
        .await
        .expect("request should succeed")
        .status()
}

async fn create(state: &Arc<AppState>, title: &str) -> Value {
    let (status, json) =
        json_response(state, json_request("POST", "/todos", json!({ "title": title }))).await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"].clone()
}

#[tokio::test]
async fn health_reports_ok() {
    let state = test_state();
    let (status, json) = json_response(&state, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["ok"], true);
}

#[tokio::test]
async fn create_returns_created_todo_in_envelope() {
    let state = test_state();
    let (status, json) = json_response(
        &state,
        json_request("POST", "/todos", json!({ "title": "  Buy milk " })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], 201);
    assert_eq!(json["message"], "created");
    assert_eq!(json["data"]["id"], 1);
    assert_eq!(json["data"]["title"], "Buy milk");
    assert_eq!(json["data"]["completed"], false);
    assert!(json["data"]["createdAt"].is_string());
    assert!(json["data"]["updatedAt"].is_string());
}

#[tokio::test]
async fn create_with_blank_title_is_bad_request() {
    let state = test_state();
    let (status, json) =
        json_response(&state, json_request("POST", "/todos", json!({ "title": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Title must not be empty");
    assert_eq!(json["data"], Value::Null);
}

#[tokio::test]
async fn malformed_body_is_rewritten_into_json_envelope() {
    let state = test_state();
    let (status, json) =
        json_response(&state, json_request("POST", "/todos", json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn unknown_todo_is_not_found() {
    let state = test_state();
    let (status, json) = json_response(&state, empty_request("GET", "/todos/41")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Todo not found (id=41)");

    let (status, _) = json_response(&state, empty_request("PATCH", "/todos/41/toggle")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = json_response(&state, empty_request("DELETE", "/todos/41")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let state = test_state();
    let (status, json) = json_response(&state, empty_request("GET", "/todos/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let state = test_state();
    let (status, json) = json_response(&state, empty_request("GET", "/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn buy_milk_walk_dog_flow() {
    let state = test_state();
    let milk = create(&state, "Buy milk").await;
    assert_eq!(milk["id"], 1);

    let (status, toggled) = json_response(&state, empty_request("PATCH", "/todos/1/toggle")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["data"]["completed"], true);

    let dog = create(&state, "Walk dog").await;
    assert_eq!(dog["id"], 2);

    let (_, active) = json_response(&state, empty_request("GET", "/todos/count/active")).await;
    assert_eq!(active["data"]["count"], 1);
    let (_, total) = json_response(&state, empty_request("GET", "/todos/count/total")).await;
    assert_eq!(total["data"]["count"], 2);

    let (status, cleared) =
        json_response(&state, empty_request("DELETE", "/todos/completed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["data"]["deleted"], 1);

    let (status, list) = json_response(&state, empty_request("GET", "/todos")).await;
    assert_eq!(status, StatusCode::OK);
    let todos = list["data"].as_array().expect("list should be an array");
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["id"], 2);
    assert_eq!(todos[0]["title"], "Walk dog");
    assert_eq!(todos[0]["completed"], false);
}

#[tokio::test]
async fn toggle_all_marks_everything_and_is_idempotent() {
    let state = test_state();
    create(&state, "A").await;
    create(&state, "B").await;

    let (status, first) = json_response(
        &state,
        json_request("PATCH", "/todos/toggle-all", json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let todos = first["data"].as_array().unwrap();
    assert_eq!(todos.len(), 2);
    assert!(todos.iter().all(|todo| todo["completed"] == true));

    let (_, second) = json_response(
        &state,
        json_request("PATCH", "/todos/toggle-all", json!({ "completed": true })),
    )
    .await;
    assert_eq!(second["data"], first["data"]);
}

#[tokio::test]
async fn update_sets_title_and_completed() {
    let state = test_state();
    let todo = create(&state, "Draft").await;

    let (status, json) = json_response(
        &state,
        json_request("PUT", "/todos/1", json!({ "title": "  x  ", "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "x");
    assert_eq!(json["data"]["completed"], true);
    assert_eq!(json["data"]["createdAt"], todo["createdAt"]);

    let (status, json) =
        json_response(&state, json_request("PATCH", "/todos/1", json!({ "completed": false })))
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "x");
    assert_eq!(json["data"]["completed"], false);
}

#[tokio::test]
async fn update_with_empty_title_deletes_and_returns_no_content() {
    let state = test_state();
    create(&state, "Test").await;

    let status = status_only(
        &state,
        json_request("PUT", "/todos/1", json!({ "title": "", "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = json_response(&state, empty_request("GET", "/todos/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_null_title_leaves_title_alone() {
    let state = test_state();
    create(&state, "Keep me").await;

    let (status, json) = json_response(
        &state,
        json_request("PATCH", "/todos/1", json!({ "title": null, "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Keep me");
    assert_eq!(json["data"]["completed"], true);
}

#[tokio::test]
async fn delete_returns_no_content() {
    let state = test_state();
    create(&state, "Temporary").await;

    let status = status_only(&state, empty_request("DELETE", "/todos/1")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(state.store.count(), 0);
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let state = test_state();
    let requests = (0..25).map(|n| {
        let state = state.clone();
        async move {
            let (status, json) = json_response(
                &state,
                json_request("POST", "/todos", json!({ "title": format!("todo {n}") })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            json["data"]["id"].as_u64().expect("id should be numeric")
        }
    });

    let mut ids = join_all(requests).await;
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 25);
    assert_eq!(state.store.count(), 25);
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let state = test_state();
    let response = app(&state)
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri(api_path("/todos"))
                .header("origin", "http://localhost:4200")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request should succeed");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn unsupported_method_is_rewritten_to_bad_request() {
    let state = test_state();
    create(&state, "Only one").await;

    let (status, json) =
        json_response(&state, json_request("POST", "/todos/1", json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert_eq!(json["data"], Value::Null);
    assert_eq!(state.store.count(), 1);
}
