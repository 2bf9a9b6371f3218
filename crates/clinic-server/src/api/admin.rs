// Administrator creation

use axum::{extract::State, http::StatusCode, routing::get, Form, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{ApiError, ErrorResponse};
use super::forms::AccountForm;
use crate::auth::{routes::PageView, AdminUser};
use crate::services::{Credential, IssuedCredentials, Profile, Registrar, RegistrationRequest};

#[derive(Clone)]
pub struct AdminState {
    pub registrar: Arc<Registrar>,
}

/// Acknowledgement of a staff-created account
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub success: bool,
    pub credentials: IssuedCredentials,
}

impl From<IssuedCredentials> for CreatedResponse {
    fn from(credentials: IssuedCredentials) -> Self {
        Self {
            success: true,
            credentials,
        }
    }
}

pub fn routes(state: AdminState) -> Router {
    Router::new()
        .route("/admin/crear", get(admin_form).post(create_admin))
        .with_state(state)
}

/// GET /admin/crear - Administrator creation form
#[utoipa::path(
    get,
    path = "/admin/crear",
    responses(
        (status = 200, description = "Form page", body = PageView),
        (status = 303, description = "Not an administrator, redirect")
    ),
    tag = "admin"
)]
pub async fn admin_form(_admin: AdminUser) -> Json<PageView> {
    Json(PageView::new("Create administrator"))
}

/// POST /admin/crear - Create an administrator account
#[utoipa::path(
    post,
    path = "/admin/crear",
    request_body(content = AccountForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Administrator created", body = CreatedResponse),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Registration failed", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn create_admin(
    State(state): State<AdminState>,
    AdminUser(admin): AdminUser,
    Form(form): Form<AccountForm>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let username = form.person.username();
    let registered = state
        .registrar
        .register(RegistrationRequest {
            person: form.person.into_details(),
            username,
            // Confirmation is mandatory on this form: a missing field compares as empty
            credential: Credential::Supplied {
                password: form.password,
                confirmation: Some(form.confirm_password.unwrap_or_default()),
            },
            profile: Profile::Admin,
        })
        .await
        .map_err(ApiError::registration)?;

    tracing::info!(
        created_by = %admin.account_id,
        account_id = %registered.account_id,
        "Administrator created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::from(registered.credentials)),
    ))
}
