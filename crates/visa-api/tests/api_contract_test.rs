//! Envelope, pagination, and error contract of the HTTP API.

mod common;

use serde_json::{json, Value};
use visa_api::config::RateLimitConfig;
use visa_api::middleware::build_rate_limiter;
use visa_db::{Database, MemoryStore};

use common::{spawn_app, spawn_app_with};

#[tokio::test]
async fn test_list_without_pagination_returns_everything() {
    let app = spawn_app().await;
    for title in ["First visa", "Second visa", "Third visa"] {
        app.create_application(title).await;
    }

    let res = app.client.get(app.url("/applications")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["count"], 3);
    assert_eq!(body["total"], 3);
    assert!(body.get("page").is_none());
    assert!(body.get("totalPages").is_none());

    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Third visa", "Second visa", "First visa"]);
}

#[tokio::test]
async fn test_list_with_pagination_metadata() {
    let app = spawn_app().await;
    for i in 0..5 {
        app.create_application(&format!("Application {}", i)).await;
    }

    let res = app
        .client
        .get(app.url("/applications?page=2&limit=2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 2);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["data"][0]["title"], "Application 2");

    let res = app
        .client
        .get(app.url("/applications?page=9&limit=2"))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["count"], 0);
    assert_eq!(body["total"], 5);
}

#[tokio::test]
async fn test_invalid_pagination_is_bad_request() {
    let app = spawn_app().await;
    for query in ["page=0", "limit=500", "limit=abc"] {
        let res = app
            .client
            .get(app.url(&format!("/applications?{}", query)))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "query {}", query);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_list_documents_of_missing_application() {
    let app = spawn_app().await;
    let missing = uuid::Uuid::now_v7();

    let res = app
        .client
        .get(app.url(&format!("/applications/{}/documents", missing)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["message"],
        format!("Application {} does not exist", missing)
    );
}

#[tokio::test]
async fn test_list_documents_paginated() {
    let app = spawn_app().await;
    let application_id = app.create_application("Blue card").await;
    for name in ["Passport", "Contract", "Diploma"] {
        app.create_document(&application_id, name).await;
    }

    let res = app
        .client
        .get(app.url(&format!(
            "/applications/{}/documents?limit=2",
            application_id
        )))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["data"][0]["name"], "Diploma");
}

#[tokio::test]
async fn test_validation_failures_report_first_violation() {
    let app = spawn_app().await;
    let cases = [
        (json!({ "title": "  ", "visaType": "Blue Card" }), "Title is required"),
        (
            json!({ "title": "ab", "visaType": "Blue Card" }),
            "Title must be at least 3 characters long",
        ),
        (
            json!({ "title": "x".repeat(101), "visaType": "Blue Card" }),
            "Title must be at most 100 characters long",
        ),
        (
            json!({ "title": "Tourist", "visaType": "Tourist", "appointmentDate": "2001-01-01" }),
            "Appointment date must be in the future",
        ),
        (
            json!({ "title": "Tourist", "visaType": "Tourist", "notes": "n".repeat(501) }),
            "Notes must be at most 500 characters long",
        ),
    ];

    for (payload, message) in cases {
        let res = app
            .client
            .post(app.url("/applications"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], message);
    }

    let res = app.client.get(app.url("/applications")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_unknown_enum_and_malformed_bodies() {
    let app = spawn_app().await;

    let res = app
        .client
        .post(app.url("/applications"))
        .json(&json!({ "title": "Work permit", "visaType": "Work Permit" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = app
        .client
        .post(app.url("/applications"))
        .json(&json!({ "title": "Work permit", "visaType": "Other", "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = app
        .client
        .post(app.url("/applications"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_malformed_ids_are_bad_request() {
    let app = spawn_app().await;

    let res = app
        .client
        .get(app.url("/applications/64b7f0c2e4b0a1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid application id");

    let res = app
        .client
        .patch(app.url("/documents/not-an-id/toggle"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid document id");
}

#[tokio::test]
async fn test_unknown_route_envelope() {
    let app = spawn_app().await;

    let res = app.client.get(app.url("/visas")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "message": "Route GET /visas not found!" }));

    let res = app
        .client
        .delete(app.url("/api/nothing-here"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Route DELETE /api/nothing-here not found!");
}

#[tokio::test]
async fn test_unsupported_method_on_known_path_envelope() {
    let app = spawn_app().await;
    let application_id = app.create_application("Method check").await;
    let document_id = app.create_document(&application_id, "Passport").await;

    let cases = [
        (reqwest::Method::PATCH, "/applications".to_string()),
        (reqwest::Method::DELETE, "/api/applications".to_string()),
        (reqwest::Method::POST, format!("/documents/{}", document_id)),
        (reqwest::Method::GET, format!("/documents/{}/toggle", document_id)),
        (reqwest::Method::POST, "/health".to_string()),
    ];

    for (method, path) in cases {
        let res = app
            .client
            .request(method.clone(), app.url(&path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404, "{} {}", method, path);
        let body: Value = res.json().await.unwrap();
        assert_eq!(
            body,
            json!({ "success": false, "message": format!("Route {} {} not found!", method, path) })
        );
    }
}

#[tokio::test]
async fn test_oversized_body_envelope() {
    let app = spawn_app().await;

    let res = app
        .client
        .post(app.url("/applications"))
        .json(&json!({
            "title": "Large payload",
            "visaType": "Other",
            "notes": "n".repeat(1024 * 1024 + 16),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 413);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Request body is too large");
}

#[tokio::test]
async fn test_operational_endpoints() {
    let app = spawn_app().await;

    let res = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");

    let res = app.client.get(app.url("/api/test")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Visa tracker API is running!");
    assert!(body["timestamp"].is_string());

    let res = app
        .client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let doc: Value = res.json().await.unwrap();
    assert!(doc["paths"]["/applications"].is_object());
    assert!(doc["paths"]["/documents/{id}/toggle"].is_object());
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let app = spawn_app().await;
    let res = app.client.get(app.url("/health")).send().await.unwrap();
    let request_id = res.headers().get("x-request-id").unwrap().to_str().unwrap();
    let parsed = uuid::Uuid::parse_str(request_id).unwrap();
    assert!(visa_db::is_v7(&parsed));
}

#[tokio::test]
async fn test_rate_limit_returns_envelope() {
    let limiter = build_rate_limiter(&RateLimitConfig {
        enabled: true,
        requests: 2,
        period_secs: 3600,
    });
    let app = spawn_app_with(Database::in_memory(), limiter).await;

    for _ in 0..2 {
        let res = app.client.get(app.url("/health")).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }

    let res = app.client.get(app.url("/applications")).send().await.unwrap();
    assert_eq!(res.status(), 429);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Too many requests, please retry later");
}

#[tokio::test]
async fn test_concurrent_toggles_over_http_can_lose_an_update() {
    let store = MemoryStore::new().with_latency_ms(100);
    let app = spawn_app_with(Database::with_memory_store(store), None).await;
    let application_id = app.create_application("Race condition").await;
    let document_id = app.create_document(&application_id, "Passport").await;
    let url = app.url(&format!("/documents/{}/toggle", document_id));

    let (a, b) = tokio::join!(
        app.client.patch(&url).send(),
        app.client.patch(&url).send()
    );
    assert_eq!(a.unwrap().status(), 200);
    assert_eq!(b.unwrap().status(), 200);

    // Both requests read `false`, so both wrote `true`.
    let res = app
        .client
        .get(app.url(&format!("/documents/{}", document_id)))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["isReady"], true);
}
