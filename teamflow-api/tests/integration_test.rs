/// Integration tests for the Teamflow API router
///
/// These tests drive the real router (routes, middleware, error mapping)
/// for every request path that is decided before storage access:
/// - Bearer-token authentication
/// - Role gates
/// - Request validation
/// - Security headers

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::{json, Value};
use teamflow_shared::models::user::UserRole;
use tower::Service as _;

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new();

    for uri in ["/tasks", "/projects", "/notifications", "/users/me"] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);

        let json = body_json(response).await;
        assert_eq!(json["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/tasks")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/tasks")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_worker_cannot_create_tasks() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/tasks")
        .header("authorization", ctx.auth_header(UserRole::Worker))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "title": "Design" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json["error"], "forbidden");
}

#[tokio::test]
async fn test_worker_cannot_create_projects() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/projects")
        .header("authorization", ctx.auth_header(UserRole::Worker))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "Launch" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_worker_cannot_read_activity_stats() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/activity/stats?startDate=2026-01-01T00:00:00Z&endDate=2026-01-31T00:00:00Z")
        .header("authorization", ctx.auth_header(UserRole::Worker))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_manager_cannot_provision_users() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header("authorization", ctx.auth_header(UserRole::Manager))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": "new@example.com", "name": "New" }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_stats_require_date_bounds() {
    let ctx = TestContext::new();

    for uri in [
        "/activity/stats",
        "/activity/stats?startDate=2026-01-01T00:00:00Z",
        "/activity/pdf",
        "/users/with-activity",
    ] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("authorization", ctx.auth_header(UserRole::Admin))
            .body(Body::empty())
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let json = body_json(response).await;
        assert_eq!(json["error"], "bad_request");
    }
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": "not-an-email",
                "password": "abc123!",
                "name": "Test"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_register_enforces_password_policy() {
    let ctx = TestContext::new();

    // No digit, no symbol
    let request = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": "user@example.com",
                "password": "abcdefgh",
                "name": "Test"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "password");
}

#[tokio::test]
async fn test_reset_password_enforces_policy_before_lookup() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/reset-password")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "token": "deadbeef", "newPassword": "short" }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notification_message_validated() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/notifications")
        .header("authorization", ctx.auth_header(UserRole::Worker))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "message": "" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activity_payload_must_carry_tagged_fields() {
    let ctx = TestContext::new();

    // user-activity without its counters is rejected during deserialization
    let request = Request::builder()
        .method("POST")
        .uri("/activity")
        .header("authorization", ctx.auth_header(UserRole::Worker))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "type": "user-activity",
                "timestamp": "2026-01-05T10:00:00Z"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_health_reports_database_state() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    // The lazy pool points at a closed port, so the health check reports
    // a degraded service rather than failing the request.
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], "disconnected");
}

#[tokio::test]
async fn test_security_headers_on_error_responses() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/tasks")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
}
