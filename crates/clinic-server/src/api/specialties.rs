// Specialty routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use clinic_core::Specialty;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{
    status_response, ApiError, ErrorResponse, ListResponse, SetStatusRequest, StatusChange,
    StatusResponse,
};
use super::forms::SpecialtyForm;
use crate::auth::AdminUser;
use crate::services::SpecialtyService;

const NOT_FOUND: &str = "Specialty not found";

#[derive(Clone)]
pub struct SpecialtiesState {
    pub specialties: Arc<SpecialtyService>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpecialtyStatus {
    pub active: bool,
}

pub fn routes(state: SpecialtiesState) -> Router {
    Router::new()
        .route("/medicos/especialidades", get(list_specialties))
        .route("/medicos/especialidad/agregar", post(create_specialty))
        .route("/medicos/especialidad/:id", get(get_specialty_status))
        .route("/medicos/especialidad/toggle/:id", post(set_specialty_status))
        .with_state(state)
}

/// GET /medicos/especialidades - All specialties, ordered by name
#[utoipa::path(
    get,
    path = "/medicos/especialidades",
    responses(
        (status = 200, description = "Specialties", body = ListResponse<Specialty>),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "specialties"
)]
pub async fn list_specialties(
    State(state): State<SpecialtiesState>,
    _admin: AdminUser,
) -> Result<Json<ListResponse<Specialty>>, ApiError> {
    let specialties = state.specialties.list(false).await?;
    Ok(Json(ListResponse::new(specialties)))
}

/// POST /medicos/especialidad/agregar - Create a specialty
#[utoipa::path(
    post,
    path = "/medicos/especialidad/agregar",
    request_body(content = SpecialtyForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Specialty created", body = Specialty),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 422, description = "Blank or duplicate name", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "specialties"
)]
pub async fn create_specialty(
    State(state): State<SpecialtiesState>,
    _admin: AdminUser,
    Form(form): Form<SpecialtyForm>,
) -> Result<(StatusCode, Json<Specialty>), ApiError> {
    let specialty = state.specialties.create(&form.name).await?;
    Ok((StatusCode::CREATED, Json(specialty)))
}

/// GET /medicos/especialidad/{id} - Current status of a specialty
#[utoipa::path(
    get,
    path = "/medicos/especialidad/{id}",
    params(("id" = Uuid, Path, description = "Specialty ID")),
    responses(
        (status = 200, description = "Specialty status", body = SpecialtyStatus),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 404, description = "Specialty not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "specialties"
)]
pub async fn get_specialty_status(
    State(state): State<SpecialtiesState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let response = match state.specialties.status(id).await? {
        Some(active) => Json(SpecialtyStatus { active }).into_response(),
        None => ErrorResponse::new(NOT_FOUND)
            .into_response(StatusCode::NOT_FOUND)
            .into_response(),
    };
    Ok(response)
}

/// POST /medicos/especialidad/toggle/{id} - Flip or set a specialty's status
#[utoipa::path(
    post,
    path = "/medicos/especialidad/toggle/{id}",
    params(("id" = Uuid, Path, description = "Specialty ID")),
    request_body(
        content = SetStatusRequest,
        description = "Optional; without `active` the status flips"
    ),
    responses(
        (status = 200, description = "Status changed", body = StatusResponse),
        (status = 422, description = "Unreadable status body", body = ErrorResponse),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 404, description = "Specialty not found", body = StatusResponse),
        (status = 500, description = "Internal server error", body = StatusResponse)
    ),
    tag = "specialties"
)]
pub async fn set_specialty_status(
    State(state): State<SpecialtiesState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    StatusChange(active): StatusChange,
) -> Response {
    status_response(state.specialties.set_status(id, active).await, NOT_FOUND)
}
