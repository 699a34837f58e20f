//! Shared setup for studio-service integration tests.
//!
//! Builds the real router over an in-memory store and mock providers, so
//! the HTTP surface runs without MongoDB, Gemini or an SMTP relay.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;
use studio_service::config::{
    CorsConfig, GenaiConfig, ImageCacheConfig, MongoConfig, SmtpConfig, StudioConfig,
};
use studio_service::services::{
    EmailProvider, ImageProvider, InMemoryStore, MockEmailProvider, MockImageProvider, SiteStore,
};
use studio_service::startup::{build_router, AppState};
use tower::ServiceExt;

pub const CONTACT_RECIPIENT: &str = "owner@studio.test";

pub fn test_config() -> StudioConfig {
    StudioConfig {
        common: CoreConfig {
            port: 0,
            ..CoreConfig::default()
        },
        mongodb: MongoConfig {
            uri: std::env::var("TEST_MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: format!("studio_test_{}", uuid::Uuid::new_v4().simple()),
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
        },
        genai: GenaiConfig {
            api_key: None,
            image_model: "gemini-3-pro-image-preview".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            request_timeout: Duration::from_secs(5),
        },
        image_cache: ImageCacheConfig {
            max_capacity: 64,
            time_to_idle: None,
        },
        smtp: SmtpConfig {
            host: "smtp.test.local".to_string(),
            port: 587,
            user: None,
            password: None,
            from_email: "noreply@studio.test".to_string(),
            from_name: "Studio Test".to_string(),
            recipient: CONTACT_RECIPIENT.to_string(),
        },
    }
}

/// Router plus handles on the fakes behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub images: Arc<MockImageProvider>,
    pub mail: Arc<MockEmailProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_providers(
            InMemoryStore::new(),
            MockImageProvider::new(),
            MockEmailProvider::new(),
        )
    }

    pub fn with_providers(
        store: InMemoryStore,
        images: MockImageProvider,
        mail: MockEmailProvider,
    ) -> Self {
        let store = Arc::new(store);
        let images = Arc::new(images);
        let mail = Arc::new(mail);

        let state = AppState::new(
            test_config(),
            store.clone() as Arc<dyn SiteStore>,
            images.clone() as Arc<dyn ImageProvider>,
            mail.clone() as Arc<dyn EmailProvider>,
        );

        Self {
            router: build_router(state),
            store,
            images,
            mail,
        }
    }

    /// Router over arbitrary providers, for cases the mocks do not cover.
    pub fn router_with(
        image_provider: Arc<dyn ImageProvider>,
        email_provider: Arc<dyn EmailProvider>,
    ) -> Router {
        let state = AppState::new(
            test_config(),
            Arc::new(InMemoryStore::new()),
            image_provider,
            email_provider,
        );
        build_router(state)
    }

    pub async fn get(&self, uri: &str) -> Response {
        send(&self.router, Method::GET, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        send(&self.router, Method::POST, uri, Some(body)).await
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body")
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "unexpected status for response with headers {:?}",
        response.headers()
    );
}
