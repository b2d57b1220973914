#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use http::{Method, Request};
use rsvpserver::db::Store;
use rsvpserver::hosting::{DocumentHost, HostingError, LinkResolver};
use rsvpserver::routes;
use rsvpserver::state::AppState;
use tower::ServiceExt;

pub const PUBLIC_URL: &str = "http://rsvp.test";

/// Document host whose answers are fixed per test.
pub struct FakeHost {
    pub ready: bool,
    pub url: Option<&'static str>,
    pub publishes: AtomicUsize,
}

impl FakeHost {
    /// Ready host that publishes everything at `url`.
    pub fn publishing(url: &'static str) -> Arc<Self> {
        Arc::new(Self {
            ready: true,
            url: Some(url),
            publishes: AtomicUsize::new(0),
        })
    }

    /// Host that reports itself unavailable.
    pub fn down() -> Arc<Self> {
        Arc::new(Self {
            ready: false,
            url: None,
            publishes: AtomicUsize::new(0),
        })
    }

    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentHost for FakeHost {
    async fn is_ready(&self) -> bool {
        self.ready
    }

    async fn publish(&self, _content: &str) -> Result<String, HostingError> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        self.url
            .map(str::to_string)
            .ok_or_else(|| HostingError("publish rejected".to_string()))
    }
}

/// A created event together with the raw host token.
pub struct TestEvent {
    pub id: String,
    pub token: String,
}

impl TestEvent {
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Test server over an in-memory store. Each instance is isolated.
pub struct TestServer {
    pub state: AppState,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::build(None, 100)
    }

    pub async fn with_host(host: Arc<dyn DocumentHost>) -> Self {
        Self::build(Some(host), 100)
    }

    pub async fn with_max_batch(max_batch: i64) -> Self {
        Self::build(None, max_batch)
    }

    fn build(host: Option<Arc<dyn DocumentHost>>, max_batch: i64) -> Self {
        let resolver = LinkResolver::new(PUBLIC_URL, host, Duration::from_millis(500));
        let state = AppState {
            store: Store::memory(),
            resolver: Arc::new(resolver),
            max_batch,
        };
        Self { state }
    }

    pub fn router(&self) -> axum::Router {
        routes::router(self.state.clone())
    }

    /// Send one request through a fresh router and return status and JSON body.
    pub async fn send(&self, request: Request<Body>) -> (http::StatusCode, serde_json::Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    /// Create an event through the API.
    pub async fn create_event(&self, body: serde_json::Value) -> TestEvent {
        let (status, json) = self
            .send(json_request(Method::POST, "/api/v1/events", &body))
            .await;
        assert_eq!(status, http::StatusCode::OK, "create event failed: {json}");
        TestEvent {
            id: json["data"]["event"]["id"].as_str().unwrap().to_string(),
            token: json["data"]["host_token"].as_str().unwrap().to_string(),
        }
    }

    /// Create a plain event a year out.
    pub async fn create_default_event(&self) -> TestEvent {
        let date = (chrono::Utc::now() + chrono::Duration::days(365))
            .format("%Y-%m-%d")
            .to_string();
        self.create_event(serde_json::json!({
            "name": "Garden Party",
            "date": date,
            "time": "18:30",
            "location": "Back yard"
        }))
        .await
    }

    /// Create invites for `event` and return the `data` array.
    pub async fn create_invites(
        &self,
        event: &TestEvent,
        body: serde_json::Value,
    ) -> Vec<serde_json::Value> {
        let uri = format!("/api/v1/events/{}/invites", event.id);
        let (status, json) = self
            .send(authenticated_json_request(
                Method::POST,
                &uri,
                &event.auth_header(),
                &body,
            ))
            .await;
        assert_eq!(status, http::StatusCode::OK, "create invites failed: {json}");
        json["data"].as_array().unwrap().clone()
    }

    /// Submit an RSVP and return status and body.
    pub async fn rsvp(
        &self,
        event_id: &str,
        body: serde_json::Value,
    ) -> (http::StatusCode, serde_json::Value) {
        let uri = format!("/api/v1/events/{event_id}/rsvp");
        self.send(json_request(Method::POST, &uri, &body)).await
    }
}

// ---------------------------------------------------------------------------
// Request builder helpers
// ---------------------------------------------------------------------------

/// Build an authenticated request with no body.
pub fn authenticated_request(method: Method, uri: &str, auth_header: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", auth_header)
        .body(Body::empty())
        .unwrap()
}

/// Build an authenticated request with a JSON body.
pub fn authenticated_json_request(
    method: Method,
    uri: &str,
    auth_header: &str,
    body: &serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", auth_header)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Build an unauthenticated request with a JSON body.
pub fn json_request(method: Method, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Build an unauthenticated request with no body.
pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Parse a response body into a `serde_json::Value`. Non-JSON bodies become a string.
pub async fn parse_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}
