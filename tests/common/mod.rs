#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use udyomx_site::auth::{GoogleProfile, IdentityProvider, OAuthError};
use udyomx_site::cache::Revalidate;
use udyomx_site::{AppState, MemoryContentStore, Settings};

pub const ADMIN_EMAIL: &str = "admin@udyomx.com";

pub fn settings() -> Settings {
    Settings::from_lookup(|k| match k {
        "DATABASE_URL" => Some("postgres://localhost/udyomx_test".into()),
        "ADMIN_EMAIL" => Some(ADMIN_EMAIL.into()),
        "GOOGLE_CLIENT_ID" => Some("client-id".into()),
        "GOOGLE_CLIENT_SECRET" => Some("client-secret".into()),
        "SITE_URL" => Some("https://udyomx.test".into()),
        _ => None,
    })
    .expect("test settings")
}

/// Records every path it is asked to revalidate.
#[derive(Default)]
pub struct RecordingRevalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingRevalidator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.paths.lock().unwrap().clear();
    }
}

#[async_trait]
impl Revalidate for RecordingRevalidator {
    async fn revalidate_path(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

/// Identity provider that answers every code with a fixed profile. Code `bad` fails.
pub struct StubIdentity {
    pub email: String,
    pub verified: bool,
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    fn authorize_url(&self, redirect_uri: &str, state: Option<&str>) -> Result<String, OAuthError> {
        Ok(format!(
            "https://accounts.test/auth?redirect_uri={}&state={}",
            redirect_uri,
            state.unwrap_or("")
        ))
    }

    async fn resolve_identity(&self, code: &str, _redirect_uri: &str) -> Result<GoogleProfile, OAuthError> {
        if code == "bad" {
            return Err(OAuthError::NoAccessToken);
        }
        Ok(GoogleProfile {
            id: "google-1".into(),
            email: Some(self.email.clone()),
            verified_email: Some(self.verified),
            name: Some("Test User".into()),
            picture: None,
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub revalidations: Arc<RecordingRevalidator>,
}

/// App over an empty in-memory store, signing everyone in as `email`, recording revalidations.
pub fn test_app(email: &str) -> TestApp {
    let revalidations = Arc::new(RecordingRevalidator::default());
    let state = AppState::new(
        Arc::new(MemoryContentStore::new()),
        Arc::new(StubIdentity {
            email: email.into(),
            verified: true,
        }),
        settings(),
    )
    .with_revalidator(revalidations.clone());
    TestApp {
        router: udyomx_site::app(state.clone()),
        state,
        revalidations,
    }
}

/// Same, but revalidation goes to the real page cache.
pub fn cached_app() -> TestApp {
    let state = AppState::new(
        Arc::new(MemoryContentStore::new()),
        Arc::new(StubIdentity {
            email: ADMIN_EMAIL.into(),
            verified: true,
        }),
        settings(),
    );
    TestApp {
        router: udyomx_site::app(state.clone()),
        state,
        revalidations: Arc::new(RecordingRevalidator::default()),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let res = app.clone().oneshot(req).await.expect("infallible");
    let status = res.status();
    let headers = res.headers().clone();
    let body = res.into_body().collect().await.expect("body").to_bytes().to_vec();
    TestResponse { status, headers, body }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> TestResponse {
    let req = Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn json_request(app: &Router, method: &str, uri: &str, body: Value) -> TestResponse {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
}

/// The `name=value` part of a `Set-Cookie` header, ready to send back as `Cookie`.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}
