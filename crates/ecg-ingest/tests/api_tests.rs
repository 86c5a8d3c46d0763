//! Integration tests for the upload endpoint.

#![cfg(feature = "api")]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::prelude::*;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

use ecg_ingest::{
    BasicAuthConfig, IngestConfig,
    api::{HealthResponse, InfoResponse, create_router},
};

fn router(storage: &Path, auth: Option<(&str, &str)>) -> Router {
    let mut config = IngestConfig::default();
    config.storage.directory = storage.to_path_buf();
    config.auth = auth.map(|(username, password)| BasicAuthConfig {
        username: username.to_string(),
        password: password.to_string(),
    });
    create_router(config)
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64_STANDARD.encode(format!("{}:{}", username, password)))
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn study_xml() -> String {
    format!(
        "<?xml version=\"1.0\"?><restingecgdata><StudyData>{}</StudyData></restingecgdata>",
        BASE64_STANDARD.encode(b"%PDF-1.4 uploaded report")
    )
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), None)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "healthy");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_info_endpoint() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), Some(("admin", "secret")))
        .oneshot(Request::builder().uri("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let info: InfoResponse = serde_json::from_slice(&body).unwrap();
    assert!(info.auth_enabled);
    assert_eq!(info.upload_directory, dir.path().display().to_string());
}

#[tokio::test]
async fn test_upload_requires_credentials() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), Some(("admin", "secret")))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .body(Body::from("%PDF-1.4 report"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"ECG Upload Server\""
    );
    assert_eq!(response.headers()[header::SERVER], "ECG-Upload-Server/1.0");
    assert_eq!(body_text(response).await, "Unauthorized");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_rejects_wrong_password() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), Some(("admin", "secret")))
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/report.pdf")
                .header(header::AUTHORIZATION, basic("admin", "wrong"))
                .body(Body::from("%PDF-1.4 report"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_upload_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), Some(("admin", "secret")))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::AUTHORIZATION, basic("admin", "secret"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "No content");
}

#[tokio::test]
async fn test_post_xml_stores_payload_and_extracted_pdf() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), Some(("admin", "secret")))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ecg")
                .header(header::AUTHORIZATION, basic("admin", "secret"))
                .header(header::CONTENT_DISPOSITION, "attachment; filename=\"patient7.dat\"")
                .body(Body::from(study_xml()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(headers[header::CONNECTION], "close");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers[header::PRAGMA], "no-cache");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::SERVER], "Apache/2.4.0");
    assert_eq!(body_text(response).await, "File uploaded successfully");

    assert_eq!(std::fs::read(dir.path().join("patient7.xml")).unwrap(), study_xml().as_bytes());
    assert_eq!(
        std::fs::read(dir.path().join("patient7_extracted.pdf")).unwrap(),
        b"%PDF-1.4 uploaded report"
    );
}

#[tokio::test]
async fn test_put_uses_path_name_and_content_extension() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), None)
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/incoming/ECG_0042.xml")
                .body(Body::from("%PDF-1.4 report printed by the cart"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(dir.path().join("ECG_0042.pdf").exists());
    assert!(!dir.path().join("ECG_0042.xml").exists());
}

#[tokio::test]
async fn test_put_xml_also_extracts() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), None)
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/study.xml")
                .body(Body::from(study_xml()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(dir.path().join("study.xml").exists());
    assert!(dir.path().join("study_extracted.pdf").exists());
}

#[tokio::test]
async fn test_unnamed_upload_gets_timestamp_name() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), None)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::from(vec![0u8, 1, 2, 3, 4, 5]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("ecg_upload_"));
    assert!(names[0].ends_with(".bin"));
}

#[tokio::test]
async fn test_uploads_accepted_on_health_and_info_paths() {
    let dir = TempDir::new().unwrap();
    let app = router(dir.path(), Some(("admin", "secret")));

    for (method, path) in [("POST", "/health"), ("PUT", "/info")] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(path)
                    .header(header::AUTHORIZATION, basic("admin", "secret"))
                    .body(Body::from("%PDF-1.4 report"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{method} {path}");
        assert_eq!(body_text(response).await, "File uploaded successfully");
    }

    assert!(dir.path().join("health.pdf").exists());
    assert!(dir.path().join("info.pdf").exists());

    let response = app
        .oneshot(Request::builder().method("POST").uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_options_preflight() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), Some(("admin", "secret")))
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
        "POST, PUT, OPTIONS"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Authorization, Content-Type"
    );
}

#[tokio::test]
async fn test_status_page_without_credentials() {
    let dir = TempDir::new().unwrap();
    let response = router(dir.path(), Some(("admin", "secret")))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(body_text(response).await.contains("ECG Upload Server"));
}

#[tokio::test]
async fn test_body_limit_is_enforced() {
    let dir = TempDir::new().unwrap();
    let mut config = IngestConfig::default();
    config.storage.directory = dir.path().to_path_buf();
    config.limits.max_upload_bytes = 16;

    let response = create_router(config)
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/big.bin")
                .header(header::CONTENT_LENGTH, "64")
                .body(Body::from(vec![7u8; 64]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!dir.path().join("big.bin").exists());
}
