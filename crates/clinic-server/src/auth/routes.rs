// Authentication routes: login, logout, self-service registration and landing pages
// Decision: Successful form posts redirect (303) like a classic server-rendered app
// Decision: Login failures share one message so accounts cannot be enumerated

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::config::AuthConfig;
use super::middleware::{AuthUser, SessionUser};
use super::session::{SessionStore, SESSION_COOKIE};
use crate::api::common::{ApiError, ErrorResponse, GENERIC_FAILURE};
use crate::api::forms::{AccountForm, LoginForm};
use crate::services::{
    account::INVALID_CREDENTIALS, AccountService, Credential, LoginError, Profile, Registrar,
    RegistrationRequest,
};

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub sessions: SessionStore,
    pub accounts: Arc<AccountService>,
    pub registrar: Arc<Registrar>,
}

/// Landing and form pages
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageView {
    pub title: String,
}

impl PageView {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

/// Page for an authenticated user (home, agenda)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HomeView {
    pub title: String,
    pub user: SessionUser,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_page).post(register))
        .route("/inicio", get(home))
        .route("/agenda", get(agenda))
        .with_state(state)
}

/// GET / - Landing page, or home when already logged in
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing page", body = PageView),
        (status = 303, description = "Already logged in, redirect to /inicio")
    ),
    tag = "auth"
)]
pub async fn landing(user: Option<AuthUser>) -> Response {
    match user {
        Some(_) => Redirect::to("/inicio").into_response(),
        None => Json(PageView::new("Clinic")).into_response(),
    }
}

/// GET /login - Login page
pub async fn login_page() -> Json<PageView> {
    Json(PageView::new("Login"))
}

/// GET /register - Sign-up page
pub async fn register_page() -> Json<PageView> {
    Json(PageView::new("Register"))
}

/// POST /login - Verify credentials and start a session
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirect to /inicio"),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let account = state
        .accounts
        .login(&form.username, &form.password)
        .await
        .map_err(|e| match e {
            LoginError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            LoginError::Failed(_) => ApiError::Failed(GENERIC_FAILURE),
        })?;

    let token = state.sessions.create(account.id).await.map_err(|e| {
        tracing::error!("Failed to store session: {}", e);
        ApiError::Failed(GENERIC_FAILURE)
    })?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(state.config.session_ttl_secs()))
        .build();

    Ok((jar.add(cookie), Redirect::to("/inicio")))
}

/// GET /logout - End the session
#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 303, description = "Logged out, redirect to /")),
    tag = "auth"
)]
pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state.sessions.destroy(cookie.value()).await {
            tracing::error!("Failed to delete session: {}", e);
        }
    }

    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/"),
    )
}

/// POST /register - Patient self-registration
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = AccountForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Registered, redirect to /login"),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Registration failed", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AuthState>,
    Form(form): Form<AccountForm>,
) -> Result<Redirect, ApiError> {
    let username = form.person.username();
    state
        .registrar
        .register(RegistrationRequest {
            person: form.person.into_details(),
            username,
            credential: Credential::Supplied {
                password: form.password,
                confirmation: form.confirm_password,
            },
            profile: Profile::Patient,
        })
        .await
        .map_err(ApiError::registration)?;

    Ok(Redirect::to("/login"))
}

/// GET /inicio - Home page
#[utoipa::path(
    get,
    path = "/inicio",
    responses(
        (status = 200, description = "Home page", body = HomeView),
        (status = 303, description = "Not logged in, redirect to /login")
    ),
    tag = "auth"
)]
pub async fn home(AuthUser(user): AuthUser) -> Json<HomeView> {
    Json(HomeView {
        title: "Home".to_string(),
        user,
    })
}

/// GET /agenda - Appointment calendar page
#[utoipa::path(
    get,
    path = "/agenda",
    responses(
        (status = 200, description = "Agenda page", body = HomeView),
        (status = 303, description = "Not logged in, redirect to /login")
    ),
    tag = "auth"
)]
pub async fn agenda(AuthUser(user): AuthUser) -> Json<HomeView> {
    Json(HomeView {
        title: "Agenda".to_string(),
        user,
    })
}
