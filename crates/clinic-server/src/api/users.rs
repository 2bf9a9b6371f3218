// User management routes
// Decision: Listing, viewing and status changes are admin-only; the edit form only needs a session
// Decision: Only administrators may change an account's role

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use clinic_core::{Account, FieldError};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{
    non_blank, status_response, ApiError, ErrorResponse, ListResponse, SetStatusRequest,
    StatusChange, StatusResponse,
};
use super::forms::{parse_role, UserEditForm};
use crate::auth::{AdminUser, AuthUser};
use crate::services::{AccountService, UpdateAccountInput};

const LISTING: &str = "/usuarios";
const NOT_FOUND: &str = "User not found";

#[derive(Clone)]
pub struct UsersState {
    pub accounts: Arc<AccountService>,
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ListUsersQuery {
    /// Only accounts with this role
    #[serde(default)]
    pub role: Option<String>,
}

pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/usuarios", get(list_users))
        .route("/usuarios/editar/:id", get(get_user).post(update_user))
        .route("/usuarios/toggle-status/:id", post(set_user_status))
        .with_state(state)
}

/// GET /usuarios - Accounts, newest first
#[utoipa::path(
    get,
    path = "/usuarios",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Accounts", body = ListResponse<Account>),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 422, description = "Unknown role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<UsersState>,
    _admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListResponse<Account>>, ApiError> {
    let role = parse_role(query.role)?;
    let accounts = state.accounts.list(role).await?;
    Ok(Json(ListResponse::new(accounts)))
}

/// GET /usuarios/editar/{id} - Account edit view
#[utoipa::path(
    get,
    path = "/usuarios/editar/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = Account),
        (status = 303, description = "Unknown account or not an administrator, redirect"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<UsersState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let response = match state.accounts.get(id).await? {
        Some(account) => Json(account).into_response(),
        None => Redirect::to(LISTING).into_response(),
    };
    Ok(response)
}

/// POST /usuarios/editar/{id} - Change username, role, password or photo
#[utoipa::path(
    post,
    path = "/usuarios/editar/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body(content = UserEditForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated (or unknown account), redirect to /usuarios"),
        (status = 422, description = "Validation failed or role change refused", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<UsersState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Form(form): Form<UserEditForm>,
) -> Result<Redirect, ApiError> {
    let role = parse_role(form.role)?;
    if let (Some(requested), false) = (role, user.is_admin) {
        let current = state.accounts.get(id).await?.map(|account| account.role);
        if current.is_some_and(|current| current != requested) {
            tracing::warn!(
                account_id = %id,
                edited_by = %user.account_id,
                "Refused role change by non-administrator"
            );
            return Err(ApiError::Invalid(FieldError::new(
                "role",
                "Only administrators can change roles",
            )));
        }
    }

    let input = UpdateAccountInput {
        username: non_blank(form.username),
        role,
        password: form.password.filter(|p| !p.is_empty()),
        confirmation: None,
        profile_photo: non_blank(form.profile_photo),
    };

    if state.accounts.update(id, input).await?.is_some() {
        tracing::info!(account_id = %id, edited_by = %user.account_id, "Account edited");
    }
    Ok(Redirect::to(LISTING))
}

/// POST /usuarios/toggle-status/{id} - Flip or set an account's status
#[utoipa::path(
    post,
    path = "/usuarios/toggle-status/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body(
        content = SetStatusRequest,
        description = "Optional; without `active` the status flips"
    ),
    responses(
        (status = 200, description = "Status changed", body = StatusResponse),
        (status = 422, description = "Unreadable status body", body = ErrorResponse),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 404, description = "User not found", body = StatusResponse),
        (status = 500, description = "Internal server error", body = StatusResponse)
    ),
    tag = "users"
)]
pub async fn set_user_status(
    State(state): State<UsersState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    StatusChange(active): StatusChange,
) -> Response {
    status_response(state.accounts.set_status(id, active).await, NOT_FOUND)
}
