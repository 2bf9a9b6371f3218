// Own profile: view, password change and photo

use axum::{extract::State, response::Redirect, routing::get, Form, Json, Router};
use std::sync::Arc;

use super::common::{non_blank, ApiError, ErrorResponse};
use super::forms::ProfileForm;
use crate::auth::{AuthUser, SessionUser};
use crate::services::{AccountService, UpdateAccountInput};

#[derive(Clone)]
pub struct ProfileState {
    pub accounts: Arc<AccountService>,
}

pub fn routes(state: ProfileState) -> Router {
    Router::new()
        .route("/mi-perfil", get(get_profile).post(update_profile))
        .with_state(state)
}

/// GET /mi-perfil - The logged-in user
#[utoipa::path(
    get,
    path = "/mi-perfil",
    responses(
        (status = 200, description = "Session user", body = SessionUser),
        (status = 303, description = "Not logged in, redirect to /login")
    ),
    tag = "profile"
)]
pub async fn get_profile(AuthUser(user): AuthUser) -> Json<SessionUser> {
    Json(user)
}

/// POST /mi-perfil - Change own password and/or profile photo
#[utoipa::path(
    post,
    path = "/mi-perfil",
    request_body(content = ProfileForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Saved, redirect to /mi-perfil"),
        (status = 422, description = "Passwords do not match", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "profile"
)]
pub async fn update_profile(
    State(state): State<ProfileState>,
    AuthUser(user): AuthUser,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, ApiError> {
    let password = form.password.filter(|p| !p.is_empty());
    let input = UpdateAccountInput {
        confirmation: password
            .as_ref()
            .map(|_| form.confirm_password.unwrap_or_default()),
        password,
        profile_photo: non_blank(form.profile_photo),
        ..Default::default()
    };

    state.accounts.update(user.account_id, input).await?;
    Ok(Redirect::to("/mi-perfil"))
}
