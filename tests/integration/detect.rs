//! End-to-end classification through the HTTP router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use sqli_detector::api::{create_router, AppState, DetectResponse};
use sqli_detector::model::ArtifactPaths;
use sqli_detector::Detector;

use crate::fixture;

fn app() -> Router {
    let paths = ArtifactPaths::new(fixture("rf_model.json"), fixture("tfidf_vectorizer.json"));
    let detector = Detector::load(&paths).expect("fixture artifacts load");
    let handle = PrometheusBuilder::new().build_recorder().handle();
    create_router(AppState::new(Arc::new(detector), handle))
}

async fn classify(app: Router, query: &str) -> DetectResponse {
    let body = serde_json::json!({ "query": query }).to_string();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/detect")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_consistent(response: &DetectResponse) {
    match response.prediction {
        0 => assert_eq!(response.label, "Benign"),
        1 => assert_eq!(response.label, "Malicious"),
        other => panic!("prediction {other} outside {{0, 1}}"),
    }
}

#[tokio::test]
async fn select_statement_scenario() {
    let query = "SELECT * FROM users WHERE id = 1";
    let response = classify(app(), query).await;

    assert_eq!(response.query, query);
    assert_consistent(&response);
}

#[tokio::test]
async fn tautology_and_plain_text_scenarios() {
    for query in ["1 OR 1=1 --", "hello world"] {
        let response = classify(app(), query).await;
        assert_eq!(response.query, query);
        assert_consistent(&response);
    }
}

#[tokio::test]
async fn fixture_model_separates_tautology_from_greeting() {
    assert_eq!(classify(app(), "1 OR 1=1 --").await.label, "Malicious");
    assert_eq!(classify(app(), "hello world").await.label, "Benign");
}

#[tokio::test]
async fn query_is_echoed_byte_for_byte() {
    let queries = [
        "",
        "   ",
        "\t\n",
        "' OR 'a'='a",
        "SELECT name FROM café WHERE note = '日本語 🚀'",
        "UNION\u{00A0}SELECT\r\n1, 2 --",
    ];
    for query in queries {
        let response = classify(app(), query).await;
        assert_eq!(response.query.as_bytes(), query.as_bytes());
        assert_consistent(&response);
    }
}

#[tokio::test]
async fn classification_is_deterministic() {
    let app = app();
    let query = "admin' UNION SELECT password FROM users --";

    let first = classify(app.clone(), query).await;
    let second = classify(app, query).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn concurrent_requests_share_the_detector() {
    let app = app();
    let mut handles = Vec::new();

    for i in 0..32 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let query = if i % 2 == 0 {
                format!("{i} OR 1=1 --")
            } else {
                format!("hello world {i}")
            };
            let response = classify(app, &query).await;
            (query, response)
        }));
    }

    for handle in handles {
        let (query, response) = handle.await.unwrap();
        assert_eq!(response.query, query);
        assert_consistent(&response);
    }
}

#[tokio::test]
async fn root_greets() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].as_str().unwrap().starts_with("Welcome"));
}
