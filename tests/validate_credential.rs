use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use claude_switch::providers::{ProviderId, ProviderRegistry};
use claude_switch::validate::{validate_at, validate_credential, Validation, ValidationError};
use tokio::net::TcpListener;

const GOOD_KEY: &str = "sk-good";

async fn models(headers: HeaderMap) -> StatusCode {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(GOOD_KEY) => StatusCode::OK,
        Some("sk-broken-upstream") => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK
}

async fn spawn_mock() -> SocketAddr {
    let app = Router::new()
        .route("/v1/models", get(models))
        .route("/slow", get(slow));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn accepted_key_is_valid() {
    let addr = spawn_mock().await;
    let url = format!("http://{addr}/v1/models");
    let result = validate_at(&url, GOOD_KEY, Duration::from_secs(5)).await;
    assert_eq!(result.unwrap(), Validation::Valid);
}

#[tokio::test]
async fn rejected_key_is_fatal() {
    let addr = spawn_mock().await;
    let url = format!("http://{addr}/v1/models");
    let err = validate_at(&url, "sk-bad", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidCredential { status: 401 }));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn server_error_is_recoverable() {
    let addr = spawn_mock().await;
    let url = format!("http://{addr}/v1/models");
    let err = validate_at(&url, "sk-broken-upstream", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::UnexpectedStatus { status: 500 }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let addr = spawn_mock().await;
    let url = format!("http://{addr}/slow");
    let err = validate_at(&url, GOOD_KEY, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::Timeout(_)));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn unreachable_endpoint_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/v1/models");
    let err = validate_at(&url, GOOD_KEY, Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::Network(_)));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn unknown_region_skips_validation() {
    let registry = ProviderRegistry::builtin();
    let deepseek = registry.get(ProviderId::DeepSeek).unwrap();
    let result = validate_credential(deepseek, "china", GOOD_KEY).await;
    assert_eq!(result.unwrap(), Validation::Skipped);
}
