//! End-to-end HTTP tests against in-memory collaborators.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use homepage_api::{router, AppState, MediaMount, RouterOptions};
use homepage_core::mock::{sample_png, InMemoryHomeConfigRepository, MockObjectStore};
use homepage_core::{
    AttachmentReplacer, HomeSettingsService, ImageContentValidator, SlotPolicy,
};

const BOUNDARY: &str = "----homepage-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: Vec<u8>,
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn setup_request(parts: &[Part<'_>]) -> Request<Body> {
    let body = multipart_body(parts);
    Request::builder()
        .method("POST")
        .uri("/api/v1/home/setup")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

struct TestApp {
    router: Router,
    store: MockObjectStore,
    repo: InMemoryHomeConfigRepository,
}

impl TestApp {
    fn new() -> Self {
        Self::with(MockObjectStore::new(), RouterOptions::default(), None)
    }

    fn with(store: MockObjectStore, options: RouterOptions, logo_max: Option<u64>) -> Self {
        let repo = InMemoryHomeConfigRepository::new();
        let mut service = HomeSettingsService::new(
            Arc::new(repo.clone()),
            AttachmentReplacer::new(Arc::new(store.clone()), "testing"),
            Arc::new(ImageContentValidator::new()),
        );
        if let Some(max) = logo_max {
            service = service.with_slots(SlotPolicy::new("home/logo", max), SlotPolicy::hero());
        }
        Self {
            router: router(AppState::new(service), options),
            store,
            repo,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

fn logo(data: Vec<u8>) -> Part<'static> {
    Part::File {
        name: "logo",
        filename: "Acme Logo.png",
        content_type: "image/png",
        data,
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.send(get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_get_before_setup_is_404() {
    let app = TestApp::new();
    let (status, body) = app.send(get_request("/api/v1/home")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not yet configured"));
}

#[tokio::test]
async fn test_setup_then_get() {
    let app = TestApp::new();
    let (status, body) = app
        .send(setup_request(&[
            Part::Text("sitename", "  Acme  "),
            Part::Text("aboutus", "Anvils since 1949"),
            logo(sample_png(4, 4)),
        ]))
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["sitename"], "Acme");
    assert!(body["image_url"].is_null());
    let logo_url = body["logo_url"].as_str().unwrap();
    assert!(
        logo_url.starts_with("https://mock.invalid/testing/home/logo/acme-logo-"),
        "{}",
        logo_url
    );
    assert!(logo_url.ends_with(".png"));

    let (status, current) = app.send(get_request("/api/v1/home")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current, body);
    assert_eq!(app.repo.len(), 1);
}

#[tokio::test]
async fn test_second_setup_replaces_logo() {
    let app = TestApp::new();
    let (_, first) = app
        .send(setup_request(&[
            Part::Text("sitename", "Acme"),
            logo(sample_png(2, 2)),
        ]))
        .await;
    let (status, second) = app.send(setup_request(&[logo(sample_png(3, 3))])).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(first["logo_url"], second["logo_url"]);
    assert_eq!(second["sitename"], "Acme");

    let old_key = first["logo_url"]
        .as_str()
        .unwrap()
        .trim_start_matches("https://mock.invalid/")
        .to_string();
    assert_eq!(app.store.delete_count(&old_key), 1);
}

#[tokio::test]
async fn test_empty_file_part_means_no_file() {
    let app = TestApp::new();
    let (status, body) = app
        .send(setup_request(&[
            Part::Text("sitename", "Acme"),
            Part::File {
                name: "hero_image",
                filename: "",
                content_type: "application/octet-stream",
                data: Vec::new(),
            },
        ]))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["image_url"].is_null());
    assert!(app.store.calls().is_empty());
}

#[tokio::test]
async fn test_empty_text_fields_keep_stored_text() {
    let app = TestApp::new();
    let (status, _) = app
        .send(setup_request(&[
            Part::Text("sitename", "Acme"),
            Part::Text("aboutus", "Anvils since 1949"),
            Part::Text("introduction", "Welcome"),
        ]))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(setup_request(&[
            Part::Text("sitename", "Acme"),
            Part::Text("aboutus", ""),
            Part::Text("introduction", ""),
        ]))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["aboutus"], "Anvils since 1949");
    assert_eq!(body["introduction"], "Welcome");
}

#[tokio::test]
async fn test_empty_sitename_is_400() {
    let app = TestApp::new();
    let (status, _) = app.send(setup_request(&[Part::Text("sitename", "")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.repo.is_empty());
}

#[tokio::test]
async fn test_missing_sitename_on_create_is_400() {
    let app = TestApp::new();
    let (status, body) = app
        .send(setup_request(&[Part::Text("aboutus", "no name yet")]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("sitename"));
}

#[tokio::test]
async fn test_long_sitename_is_400() {
    let app = TestApp::new();
    let long = "x".repeat(121);
    let (status, _) = app
        .send(setup_request(&[Part::Text("sitename", &long)]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.repo.is_empty());
}

#[tokio::test]
async fn test_non_image_logo_is_415() {
    let app = TestApp::new();
    let (status, body) = app
        .send(setup_request(&[
            Part::Text("sitename", "Acme"),
            Part::File {
                name: "logo",
                filename: "logo.png",
                content_type: "image/png",
                data: b"<html>not an image</html>".to_vec(),
            },
        ]))
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].is_string());
    assert!(app.store.calls().is_empty());
    assert!(app.repo.is_empty());
}

#[tokio::test]
async fn test_oversized_logo_is_413() {
    let app = TestApp::with(MockObjectStore::new(), RouterOptions::default(), Some(64));
    let (status, body) = app
        .send(setup_request(&[
            Part::Text("sitename", "Acme"),
            logo(vec![0u8; 4096]),
        ]))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("64"));
    assert!(app.store.calls().is_empty());
}

#[tokio::test]
async fn test_body_over_router_limit_is_413() {
    let options = RouterOptions {
        max_request_body_bytes: 1024,
        ..RouterOptions::default()
    };
    let app = TestApp::with(MockObjectStore::new(), options, None);
    let (status, _) = app
        .send(setup_request(&[
            Part::Text("sitename", "Acme"),
            logo(vec![0u8; 8192]),
        ]))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_storage_failure_is_502() {
    let app = TestApp::with(
        MockObjectStore::new().failing_puts(),
        RouterOptions::default(),
        None,
    );
    let (status, _) = app
        .send(setup_request(&[
            Part::Text("sitename", "Acme"),
            logo(sample_png(2, 2)),
        ]))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(app.repo.is_empty());
}

#[tokio::test]
async fn test_unknown_fields_are_ignored() {
    let app = TestApp::new();
    let (status, _) = app
        .send(setup_request(&[
            Part::Text("sitename", "Acme"),
            Part::Text("theme", "dark"),
        ]))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = TestApp::new();
    let (status, doc) = app.send(get_request("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/v1/home/setup"].is_object());
    assert!(doc["components"]["schemas"]["ErrorBody"].is_object());
    assert_eq!(
        doc["paths"]["/api/v1/home/setup"]["post"]["responses"]["400"]["content"]["application/json"]
            ["schema"]["$ref"],
        "#/components/schemas/ErrorBody"
    );
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(get_request("/health"))
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_media_mount_serves_stored_files() {
    let dir = tempfile::tempdir().unwrap();
    let logo_dir = dir.path().join("testing/home/logo");
    std::fs::create_dir_all(&logo_dir).unwrap();
    let png = sample_png(2, 2);
    std::fs::write(logo_dir.join("acme-0011aabb.png"), &png).unwrap();

    let options = RouterOptions {
        media: Some(MediaMount {
            path: "/media".to_string(),
            dir: dir.path().to_path_buf(),
        }),
        ..RouterOptions::default()
    };
    let app = TestApp::with(MockObjectStore::new(), options, None);

    let response = app
        .router
        .clone()
        .oneshot(get_request("/media/testing/home/logo/acme-0011aabb.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), png.as_slice());

    let (status, _) = app.send(get_request("/media/testing/home/logo/missing.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_media_not_served_without_mount() {
    let app = TestApp::new();
    let (status, _) = app.send(get_request("/media/testing/home/logo/a.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
