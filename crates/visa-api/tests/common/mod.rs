//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use visa_api::config::ServerConfig;
use visa_api::middleware::GlobalRateLimiter;
use visa_api::{build_router, AppState};
use visa_db::Database;

/// A running server over an in-memory database.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub db: Database,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a minimal application and return its id.
    pub async fn create_application(&self, title: &str) -> String {
        let res = self
            .client
            .post(self.url("/applications"))
            .json(&json!({ "title": title, "visaType": "Blue Card" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
        let body: Value = res.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// POST a minimal document under `application_id` and return its id.
    pub async fn create_document(&self, application_id: &str, name: &str) -> String {
        let res = self
            .client
            .post(self.url(&format!("/applications/{}/documents", application_id)))
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
        let body: Value = res.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

/// Spawn the real router on an ephemeral port, rate limiting disabled.
pub async fn spawn_app() -> TestServer {
    spawn_app_with(Database::in_memory(), None).await
}

pub async fn spawn_app_with(
    db: Database,
    rate_limiter: Option<Arc<GlobalRateLimiter>>,
) -> TestServer {
    let state = AppState::new(db.clone(), rate_limiter);
    let router = build_router(state, &ServerConfig::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base_url,
        client: reqwest::Client::new(),
        db,
    }
}
