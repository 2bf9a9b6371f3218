// Session middleware and guard extractors
// Decision: The session cookie is resolved once per request into a RequestContext extension
// Decision: Guards redirect (login page or home) instead of answering 401/403

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use clinic_core::Role;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::session::{SessionStore, SESSION_COOKIE};
use crate::storage::SessionAccountRow;

/// The logged-in user as seen by handlers and views
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionUser {
    pub account_id: Uuid,
    pub username: String,
    pub role: Role,
    /// "Given Family", or the username when no person is linked
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    pub is_admin: bool,
    pub is_doctor: bool,
    pub is_secretary: bool,
    pub is_patient: bool,
}

impl SessionUser {
    pub fn new(account_id: Uuid, username: String, role: Role, display_name: String) -> Self {
        Self {
            account_id,
            username,
            role,
            display_name,
            profile_photo: None,
            is_admin: role == Role::Admin,
            is_doctor: role == Role::Doctor,
            is_secretary: role == Role::Secretary,
            is_patient: role == Role::Patient,
        }
    }
}

impl From<SessionAccountRow> for SessionUser {
    fn from(row: SessionAccountRow) -> Self {
        let role = row.role.parse().unwrap_or(Role::Patient);
        let display_name = match (&row.given_name, &row.family_name) {
            (Some(given), Some(family)) => format!("{} {}", given, family),
            _ => row.username.clone(),
        };
        let mut user = SessionUser::new(row.account_id, row.username, role, display_name);
        user.profile_photo = row.profile_photo;
        user
    }
}

/// Per-request context populated by [`resolve_session`]
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<SessionUser>,
}

/// Middleware: resolve the session cookie and attach a [`RequestContext`]
pub async fn resolve_session(
    State(sessions): State<SessionStore>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match jar.get(SESSION_COOKIE) {
        Some(cookie) => match sessions.resolve(cookie.value()).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("Failed to resolve session: {}", e);
                None
            }
        },
        None => None,
    };

    request.extensions_mut().insert(RequestContext { user });
    next.run(request).await
}

/// Guard rejection: where the browser is sent instead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRedirect {
    /// Not logged in
    Login,
    /// Logged in but lacking the required role
    Home,
}

impl AuthRedirect {
    pub fn location(&self) -> &'static str {
        match self {
            AuthRedirect::Login => "/login",
            AuthRedirect::Home => "/inicio",
        }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to(self.location()).into_response()
    }
}

fn current_user(parts: &Parts) -> Option<SessionUser> {
    parts
        .extensions
        .get::<RequestContext>()
        .and_then(|ctx| ctx.user.clone())
}

/// Extractor for an authenticated user
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).map(AuthUser).ok_or(AuthRedirect::Login)
    }
}

/// Extractor for an authenticated administrator
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).ok_or(AuthRedirect::Login)?;
        if !user.is_admin {
            tracing::debug!(username = %user.username, "Non-admin denied admin route");
            return Err(AuthRedirect::Home);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    fn parts_with(user: Option<SessionUser>) -> Parts {
        let (parts, _) = axum::http::Request::builder()
            .uri("/")
            .extension(RequestContext { user })
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    fn user(role: Role) -> SessionUser {
        SessionUser::new(Uuid::now_v7(), "user@example.com".into(), role, "Ana Gomez".into())
    }

    #[test]
    fn test_role_flags() {
        let admin = user(Role::Admin);
        assert!(admin.is_admin && !admin.is_doctor && !admin.is_secretary && !admin.is_patient);
        let doctor = user(Role::Doctor);
        assert!(doctor.is_doctor && !doctor.is_admin);
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let row = SessionAccountRow {
            account_id: Uuid::now_v7(),
            username: "root".into(),
            role: "admin".into(),
            given_name: None,
            family_name: None,
            profile_photo: None,
            expires_at: chrono::Utc::now(),
        };
        let user = SessionUser::from(row);
        assert_eq!(user.display_name, "root");
        assert!(user.is_admin);
    }

    #[tokio::test]
    async fn test_auth_user_requires_session() {
        let mut parts = parts_with(None);
        let rejection = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(rejection, AuthRedirect::Login);

        let mut parts = parts_with(Some(user(Role::Secretary)));
        let AuthUser(found) = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.role, Role::Secretary);
    }

    #[tokio::test]
    async fn test_admin_user_redirects_by_state() {
        let mut parts = parts_with(None);
        let rejection = AdminUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(rejection, AuthRedirect::Login);

        let mut parts = parts_with(Some(user(Role::Doctor)));
        let rejection = AdminUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(rejection, AuthRedirect::Home);

        let mut parts = parts_with(Some(user(Role::Admin)));
        assert!(AdminUser::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[test]
    fn test_redirect_response() {
        let response = AuthRedirect::Home.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/inicio");
    }
}
