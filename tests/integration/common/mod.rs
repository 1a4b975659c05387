//! Shared harness for black-box API tests
//!
//! Every test builds its own application over the in-memory stores and a
//! capturing mock mailer, then drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use planmart_common::Config;
use planmart_email::mock::MockEmailService;

pub const BOUNDARY: &str = "planmart-test-boundary";

/// A running application plus a handle on the mail it sends
pub struct TestApp {
    pub router: Router,
    pub email: MockEmailService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_email(config, MockEmailService::new())
    }

    pub fn with_email(config: Config, email: MockEmailService) -> Self {
        let router = planmart_app::create_app(&config, None, Arc::new(email.clone()))
            .expect("memory backend builds");
        Self { router, email }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collects");
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(empty_request(Method::GET, uri)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(empty_request(Method::DELETE, uri)).await
    }

    pub async fn json(&self, method: Method, uri: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn multipart(&self, method: Method, uri: &str, form: PlanUpload) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(form.encode()))
            .unwrap();
        self.send(request).await
    }

    /// Upload a plan and return its JSON summary
    pub async fn create_plan(&self, form: PlanUpload) -> Value {
        let response = self.multipart(Method::POST, "/plans", form).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create failed: {}",
            response.text()
        );
        response.json()
    }
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn error_code(&self) -> String {
        self.json()["error"]["code"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }
}

/// Multipart body for `POST /plans` and `PATCH /plans/{id}`
#[derive(Debug, Clone, Default)]
pub struct PlanUpload {
    pub fields: Vec<(String, String)>,
    pub document: Option<(Vec<u8>, String)>,
}

impl PlanUpload {
    /// A complete creation form carrying `document`
    pub fn plan(title: &str, document: Vec<u8>) -> Self {
        Self::default()
            .field("title", title)
            .field("description", "Step-by-step build guide")
            .field("category", "Furniture")
            .field("machine_type", "CNC")
            .field("difficulty", "intermediate")
            .field("price", "24.99")
            .field("author", "Planmart Workshop")
            .pdf(document)
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.fields.retain(|(existing, _)| existing != name);
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn pdf(self, bytes: Vec<u8>) -> Self {
        self.document(bytes, "application/pdf")
    }

    pub fn document(mut self, bytes: Vec<u8>, content_type: &str) -> Self {
        self.document = Some((bytes, content_type.to_string()));
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in &self.fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((bytes, content_type)) = &self.document {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"plan.pdf\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }
}
