use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use keepsake::api::{create_router, AppState};
use keepsake::cdn::CdnClient;
use keepsake::config::{
    BlobConfig, CdnConfig, Config, MemorySettings, ServerConfig, VerificationConfig,
};
use keepsake::store::MemoryBlobStore;
use keepsake::verify::VerificationClient;

pub fn test_config(curator_passwords: Vec<&str>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            curator_passwords: curator_passwords.into_iter().map(str::to_string).collect(),
            session_ttl_secs: 3600,
        },
        blob: BlobConfig {
            base_url: "memory:".to_string(),
            read_token: None,
            write_token: None,
            timeout_secs: 5,
            list_page_size: 100,
            cache_bust: false,
        },
        cdn: CdnConfig {
            delivery_base_url: "https://cdn.example.com/image".to_string(),
            api_base_url: "https://api.example.com/v1/image".to_string(),
            api_key: None,
            api_secret: None,
            timeout_secs: 5,
        },
        verification: VerificationConfig {
            secret: None,
            verify_url: "https://challenges.verification.example/siteverify".to_string(),
            timeout_secs: 5,
        },
        memory: MemorySettings {
            body_max_len: 5000,
            preview_len: 200,
            index_cap: 500,
            hydrate_concurrency: 8,
            photo_delete_concurrency: 4,
            janitor_interval_secs: 3600,
            list_cache_capacity: 4,
        },
    }
}

pub fn build_app(config: Config) -> Router {
    let blob = Arc::new(MemoryBlobStore::new(config.blob.list_page_size as usize));
    let cdn = CdnClient::new(&config.cdn).expect("cdn client");
    let verifier = VerificationClient::new(&config.verification).expect("verification client");
    create_router(AppState::new(config, blob, cdn, verifier))
}

pub fn test_app(curator_passwords: Vec<&str>) -> Router {
    build_app(test_config(curator_passwords))
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}

/// Send a JSON request, optionally with a curator bearer token.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn create_memory(app: &Router, name: &str, email: &str, body: &str) -> (String, String) {
    let (status, json) = send(
        app,
        "POST",
        "/api/memory",
        Some(serde_json::json!({"name": name, "email": email, "body": body})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    (
        json["data"]["id"].as_str().expect("id").to_string(),
        json["data"]["editToken"]
            .as_str()
            .expect("edit token")
            .to_string(),
    )
}

pub async fn curator_login(app: &Router, password: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/auth/session",
        Some(serde_json::json!({"password": password})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "login failed: {json}");
    json["data"]["token"].as_str().expect("token").to_string()
}
