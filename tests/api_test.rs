//! Integration tests for the HTTP API
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use feedback_desk_core::{
    api::ApiServer, services::test_utils::ScriptedGenerator, FeedbackStore,
    ENRICHMENT_UNAVAILABLE,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{create_test_state, create_test_store, sample_record, ADMIN_PASSWORD};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        post_json("/admin/login", json!({ "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (_dir, store) = create_test_store();
    let app = ApiServer::router(create_test_state(ScriptedGenerator::replying("x"), store));

    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_submit_feedback() {
    let (_dir, store) = create_test_store();
    let app = ApiServer::router(create_test_state(
        ScriptedGenerator::replying("We are glad you enjoyed it"),
        store.clone(),
    ));

    let (status, body) = send(
        &app,
        post_json("/feedback", json!({ "rating": 5, "review": "Lovely evening" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["user_rating"], 5);
    assert_eq!(body["user_review"], "Lovely evening");
    assert_eq!(body["ai_response"], "We are glad you enjoyed it");

    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_submit_with_llm_down_still_created() {
    let (_dir, store) = create_test_store();
    let app = ApiServer::router(create_test_state(ScriptedGenerator::failing(), store.clone()));

    let (status, body) = send(
        &app,
        post_json("/feedback", json!({ "rating": 1, "review": "Terrible service" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["ai_summary"], ENRICHMENT_UNAVAILABLE);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_submit_rejects_invalid_input() {
    let (_dir, store) = create_test_store();
    let app = ApiServer::router(create_test_state(ScriptedGenerator::replying("x"), store.clone()));

    for payload in [
        json!({ "rating": 7, "review": "Too many stars" }),
        json!({ "rating": 0, "review": "Too few stars" }),
        json!({ "rating": 3, "review": "   " }),
    ] {
        let (status, _) = send(&app, post_json("/feedback", payload.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "payload {}", payload);
    }
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_admin_endpoints_require_login() {
    let (_dir, store) = create_test_store();
    let app = ApiServer::router(create_test_state(ScriptedGenerator::replying("x"), store));

    let (status, _) = send(&app, get("/admin/feedback", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        get("/admin/export", Some("00000000-0000-0000-0000-000000000000")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        post_json("/admin/login", json!({ "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_report_and_logout() {
    let (_dir, store) = create_test_store();
    for (rating, day) in [(5, 1), (1, 2), (2, 3), (4, 4)] {
        store
            .append(&sample_record(rating, &format!("day {}", day), (2024, 4, day)))
            .await
            .unwrap();
    }
    let app = ApiServer::router(create_test_state(ScriptedGenerator::replying("x"), store));
    let token = login(&app).await;

    let (status, body) = send(&app, get("/admin/feedback", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["summary"]["count"], 4);
    assert_eq!(report["summary"]["average_rating"], 3.0);
    assert_eq!(report["summary"]["low_rating_count"], 2);
    assert_eq!(report["records"][0]["user_review"], "day 4");
    assert_eq!(report["attention"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        get(
            "/admin/feedback?ratings=4,5&start=2024-04-01&end=2024-04-03",
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["summary"]["count"], 1);
    assert_eq!(report["records"][0]["user_review"], "day 1");

    let (status, _) = send(
        &app,
        get("/admin/feedback?start=2024-05-01&end=2024-04-01", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let logout = Request::builder()
        .method("POST")
        .uri("/admin/logout")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, logout).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get("/admin/feedback", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_export_download() {
    let (_dir, store) = create_test_store();
    store
        .append(&sample_record(2, "Cold soup", (2024, 4, 1)))
        .await
        .unwrap();
    let app = ApiServer::router(create_test_state(ScriptedGenerator::replying("x"), store));
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(get("/admin/export", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("feedback_export.csv"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.starts_with("timestamp,user_rating,user_review"));
    assert!(text.contains("Cold soup"));
}
