use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::fs;
use stki_core::{EngineConfig, Representation};
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_shelf(dir: &std::path::Path) {
    fs::write(dir.join("a.txt"), "Pedang di tengah hutan.").unwrap();
    fs::write(dir.join("b.txt"), "Kisah cinta yang panjang.").unwrap();
    fs::write(dir.join("c.txt"), "Hutan gelap, pedang tua dan pedang baru.").unwrap();
    fs::write(dir.join("notes.md"), "not part of the collection").unwrap();
}

fn app(dir: &std::path::Path) -> Router {
    stki_server::build_app(dir, Representation::Text, EngineConfig::default()).unwrap()
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn health_is_ok() {
    let dir = tempdir().unwrap();
    build_tiny_shelf(dir.path());
    let (status, body) = call(app(dir.path()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    build_tiny_shelf(dir.path());

    let (status, body) = call(app(dir.path()), "/search?q=pedang%20hutan&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["model"], "TF-IDF");
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    let mut top: Vec<&str> = arr.iter().map(|h| h["doc_id"].as_str().unwrap()).collect();
    top.sort();
    assert_eq!(top, vec!["a.txt", "c.txt"]);
    assert!(arr[0]["snippet"].as_str().unwrap().contains("<em>"));
    assert!(json.get("warning").is_none());
}

#[tokio::test]
async fn search_selects_model() {
    let dir = tempdir().unwrap();
    build_tiny_shelf(dir.path());

    let (_, body) = call(app(dir.path()), "/search?q=pedang&model=bm25&k=50").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["model"], "BM25");
    assert_eq!(json["total_hits"], 3);

    let (_, body) = call(app(dir.path()), "/search?q=pedang&model=vsm-sublinear").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["model"], "TF-IDF Sublinear");
}

#[tokio::test]
async fn boolean_queries_follow_match_mode() {
    let dir = tempdir().unwrap();
    build_tiny_shelf(dir.path());

    let (status, body) = call(app(dir.path()), "/boolean?q=pedang%20AND%20hutan").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["mode"], "exact");
    let ids: Vec<&str> = json["results"].as_array().unwrap().iter().map(|h| h["doc_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a.txt", "c.txt"]);

    let (_, body) = call(app(dir.path()), "/boolean?q=hut").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"], 0);

    let (_, body) = call(app(dir.path()), "/boolean?q=hut&mode=substring").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"], 2);
}

#[tokio::test]
async fn doc_lookup_and_missing_doc() {
    let dir = tempdir().unwrap();
    build_tiny_shelf(dir.path());

    let (status, body) = call(app(dir.path()), "/doc/b.txt").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["text"], "Kisah cinta yang panjang.");

    let (status, body) = call(app(dir.path()), "/doc/notes.md").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "not found");
}

#[tokio::test]
async fn empty_collection_reports_warning() {
    let dir = tempdir().unwrap();
    let (status, body) = call(app(dir.path()), "/search?q=pedang").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["warning"], "empty_collection");
    assert_eq!(json["results"].as_array().unwrap().len(), 0);
}
