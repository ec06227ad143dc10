//! End-to-end tests of the HTTP API against an in-memory SQLite database.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use carbon_tracker::api::{create_router, AppState};
use carbon_tracker::{AppConfig, SqliteRepository};

async fn app() -> Router {
    let repo = SqliteRepository::new(":memory:").await.unwrap();
    let state = AppState::new(Arc::new(repo), AppConfig::default());
    create_router(Arc::new(state))
}

fn post_json(uri: &str, body: Value, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn calculate_returns_footprint_impact_and_suggestions() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/calculate",
            json!({
                "transport_mode": "car",
                "transport_distance": "100",
                "food_choices": ["beef", "beef"],
                "energy_kwh": 10,
                "waste_type": "landfill",
                "waste_amount": "2"
            }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let footprint = &body["carbon_footprint"];
    assert_eq!(footprint["breakdown"]["transport"], 17.1);
    assert_eq!(footprint["breakdown"]["food"], 53.0);
    assert_eq!(footprint["breakdown"]["energy"], 4.85);
    assert_eq!(footprint["breakdown"]["waste"], 1.44);
    assert_eq!(footprint["total"], 76.39);
    assert_eq!(footprint["region_category"], "global");

    assert_eq!(body["region"]["country"], "Global");
    assert_eq!(body["is_premium"], false);
    assert!(body["weather"].is_null());
    assert_eq!(body["impact_metrics"]["impact_level"], "Low");
    assert_eq!(body["impact_metrics"]["global_rank"], "Above average");

    let suggestions = body["suggestions"].as_array().unwrap();
    assert!((3..=7).contains(&suggestions.len()));
}

#[tokio::test]
async fn calculate_with_zero_distance_has_no_impact_metrics() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/calculate",
            json!({"transport_mode": "walking", "transport_distance": 5}),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["carbon_footprint"]["total"], 0.0);
    assert!(body["impact_metrics"].is_null());
}

#[tokio::test]
async fn calculate_rejects_missing_and_invalid_fields() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post_json("/api/calculate", json!({"transport_distance": 5}), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "transport_mode");

    let (status, body) = send(
        &app,
        post_json(
            "/api/calculate",
            json!({"transport_mode": "car", "transport_distance": "ten"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "transport_distance");
}

#[tokio::test]
async fn calculate_rejects_mistyped_fields_as_json() {
    let app = app().await;

    for body in [
        json!({"transport_mode": "car", "transport_distance": true}),
        json!({"transport_mode": "car", "transport_distance": {"km": 5}}),
        json!({"transport_mode": "car", "transport_distance": 5, "food_choices": "beef"}),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/calculate", body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/calculate")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn oversized_quantity_is_rejected_and_history_stays_readable() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/calculate",
            json!({"transport_mode": "flight", "transport_distance": 1e307}),
            Some("zed"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "transport_distance");

    let (status, body) = send(
        &app,
        post_json(
            "/api/calculate",
            json!({"transport_mode": "flight", "transport_distance": 1e9}),
            Some("zed"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["carbon_footprint"]["total"].is_f64());
    assert_eq!(body["carbon_footprint"]["breakdown"]["food"], 0.0);

    let (status, body) = send(&app, get("/api/user/history", Some("zed"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["history"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, get("/api/analytics/dashboard", None)).await;
    assert!(body["data"]["total_carbon_kg"].is_f64());
}

#[tokio::test]
async fn calculations_appear_in_history_and_dashboard() {
    let app = app().await;

    for distance in [10, 20] {
        let (status, _) = send(
            &app,
            post_json(
                "/api/calculate",
                json!({"transport_mode": "bus", "transport_distance": distance, "country": "Germany"}),
                Some("alice"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get("/api/user/history", Some("alice"))).await;
    assert_eq!(status, StatusCode::OK);
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["total"], 1.52);
    assert_eq!(history[1]["total"], 0.76);

    let (_, body) = send(&app, get("/api/analytics/dashboard", None)).await;
    assert_eq!(body["data"]["total_calculations"], 2);
    assert_eq!(body["data"]["weekly_calculations"], 2);
    assert_eq!(body["data"]["total_carbon_kg"], 2.28);
}

#[tokio::test]
async fn premium_upgrade_is_reflected_in_calculation() {
    let app = app().await;

    let (status, _) = send(&app, post_json("/api/premium/upgrade", json!({}), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, post_json("/api/premium/upgrade", json!({}), Some("bea"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Premium upgrade successful");

    let (_, body) = send(
        &app,
        post_json(
            "/api/calculate",
            json!({"transport_mode": "train", "transport_distance": 40}),
            Some("bea"),
        ),
    )
    .await;
    assert_eq!(body["is_premium"], true);
    // No generator configured, so premium users still get the static list
    assert!(body["suggestions"].as_array().unwrap().len() >= 3);

    let (_, body) = send(&app, get("/api/analytics/dashboard", None)).await;
    assert_eq!(body["data"]["premium_users"], 1);
}

#[tokio::test]
async fn chat_without_assistant_is_unavailable() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post_json("/api/ecobot/chat", json!({"message": "How do I cut my footprint?"}), None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "AI service temporarily unavailable");
}

#[tokio::test]
async fn region_health_and_security_headers() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/region", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["region"],
        json!({"country": "Global", "city": "Unknown", "region": "Unknown"})
    );

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(response.headers().contains_key("x-request-id"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["healthy"], true);
}

#[tokio::test]
async fn goals_can_be_set() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/goals/set",
            json!({"target_carbon": 2000, "current_carbon": "4500", "deadline": "2030-01-01"}),
            Some("cy"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Goal set successfully");
}
