// Shared helpers for router-level tests on the in-memory backend
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use clinic_server::services::Registrar;
use clinic_server::storage::{InMemoryDatabase, RowCounts, StorageBackend};
use clinic_server::{build_router, AppConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-secret";

pub struct TestApp {
    pub router: Router,
    pub db: Arc<InMemoryDatabase>,
}

impl TestApp {
    /// Router on a fresh in-memory database, without any account
    pub fn new() -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        let storage = StorageBackend::InMemory(db.clone());
        let router = build_router(storage, &AppConfig::default());
        Self { router, db }
    }

    /// Router with the bootstrap administrator already created
    pub async fn with_admin() -> Self {
        let app = Self::new();
        Registrar::new(StorageBackend::InMemory(app.db.clone()), true)
            .ensure_admin(ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .unwrap();
        app
    }

    pub fn counts(&self) -> RowCounts {
        self.db.row_counts()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(encode_form(fields))).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_empty(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Log in and return the `name=value` pair to send back as a Cookie header
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/login",
                &[("username", username), ("password", password)],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/inicio");
        session_cookie(&response).expect("login sets the session cookie")
    }

    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Self-register a patient through the public sign-up form
    pub async fn register_patient(&self, given: &str, family: &str, national_id: &str, email: &str) {
        let response = self
            .post_form(
                "/register",
                &[
                    ("given_name", given),
                    ("family_name", family),
                    ("national_id", national_id),
                    ("email", email),
                    ("password", "patient-pass"),
                    ("confirm_password", "patient-pass"),
                ],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }
}

/// Percent-encode the few reserved characters used by the tests
fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn escape(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('&', "%26")
        .replace('+', "%2B")
        .replace('=', "%3D")
        .replace('@', "%40")
        .replace(' ', "+")
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// The session cookie set by a response, as `name=value`
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("clinic_session="))
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string())
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
