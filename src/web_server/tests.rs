use super::server::WebServer;
use crate::engine::{MemoryRuleEngine, RuleEngine};
use crate::profile::{HeaderAction, HeaderRule, ProfileDraft, ProfileRepository};
use crate::storage::MemoryStore;
use crate::sync::{RefreshResponse, RuleSynchronizer};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

fn web_server() -> WebServer {
    let synchronizer = RuleSynchronizer::new(
        ProfileRepository::new(Arc::new(MemoryStore::default())),
        Arc::new(MemoryRuleEngine::new()),
    );
    WebServer::new(8080, "localhost".to_string(), synchronizer)
}

fn message(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/message")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_response(response: axum::response::Response) -> RefreshResponse {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_web_server_creation() {
    let web_server = web_server();

    assert_eq!(web_server.port, 8080);
    assert_eq!(web_server.host, "localhost");
}

#[tokio::test]
async fn test_update_rules_message() {
    let server = web_server();
    server
        .synchronizer
        .repository()
        .create(&ProfileDraft::new(
            "Dev",
            "example.com",
            vec![HeaderRule::new(HeaderAction::Add, "X-Env", "dev")],
        ))
        .await
        .unwrap();

    let response = server
        .create_app()
        .oneshot(message(r#"{"action":"updateRules"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_response(response).await, RefreshResponse::ok());

    let rules = server.synchronizer.engine().get_dynamic_rules().await.unwrap();
    assert_eq!(rules.len(), 1);
}

#[tokio::test]
async fn test_update_rules_failure_is_reported() {
    let server = web_server();
    server
        .synchronizer
        .repository()
        .create(&ProfileDraft::new(
            "Bad",
            "||*example.com",
            vec![HeaderRule::delete("Cookie")],
        ))
        .await
        .unwrap();

    let response = server
        .create_app()
        .oneshot(message(r#"{"action":"updateRules"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_response(response).await;
    assert!(!body.success);
    assert!(body.error.is_some());
}

#[tokio::test]
async fn test_unknown_action() {
    let response = web_server()
        .create_app()
        .oneshot(message(r#"{"action":"reboot"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!read_response(response).await.success);
}

#[tokio::test]
async fn test_list_rules_empty() {
    let response = web_server()
        .create_app()
        .oneshot(
            Request::builder()
                .uri("/api/rules")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"[]");
}
