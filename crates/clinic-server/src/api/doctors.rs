// Doctor routes: the doctor form data, doctor creation and the doctor listing

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use clinic_core::{Doctor, Specialty};
use std::sync::Arc;

use super::admin::CreatedResponse;
use super::common::{ApiError, ErrorResponse, ListResponse};
use super::forms::DoctorForm;
use crate::auth::AdminUser;
use crate::services::{
    Credential, DoctorService, Profile, Registrar, RegistrationRequest, SpecialtyService,
};

#[derive(Clone)]
pub struct DoctorsState {
    pub registrar: Arc<Registrar>,
    pub doctors: Arc<DoctorService>,
    pub specialties: Arc<SpecialtyService>,
}

pub fn routes(state: DoctorsState) -> Router {
    Router::new()
        .route("/medicos", get(doctor_form))
        .route("/medicos/agregar", post(create_doctor))
        .route("/medicos/profesionales", get(list_doctors))
        .with_state(state)
}

/// GET /medicos - Active specialties offered by the doctor form
#[utoipa::path(
    get,
    path = "/medicos",
    responses(
        (status = 200, description = "Active specialties", body = ListResponse<Specialty>),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "doctors"
)]
pub async fn doctor_form(
    State(state): State<DoctorsState>,
    _admin: AdminUser,
) -> Result<Json<ListResponse<Specialty>>, ApiError> {
    let specialties = state.specialties.list(true).await?;
    Ok(Json(ListResponse::new(specialties)))
}

/// POST /medicos/agregar - Create a doctor account linked to a specialty
///
/// The initial password is the doctor's national ID.
#[utoipa::path(
    post,
    path = "/medicos/agregar",
    request_body(content = DoctorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Doctor created", body = CreatedResponse),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Registration failed", body = ErrorResponse)
    ),
    tag = "doctors"
)]
pub async fn create_doctor(
    State(state): State<DoctorsState>,
    _admin: AdminUser,
    Form(form): Form<DoctorForm>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let specialty_id = form.specialty_id()?;
    let username = form.person.username();
    let registered = state
        .registrar
        .register(RegistrationRequest {
            person: form.person.into_details(),
            username,
            credential: Credential::NationalId,
            profile: Profile::Doctor {
                specialty_id,
                license_number: form.license_number,
            },
        })
        .await
        .map_err(ApiError::registration)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::from(registered.credentials)),
    ))
}

/// GET /medicos/profesionales - List doctors with specialty and license
#[utoipa::path(
    get,
    path = "/medicos/profesionales",
    responses(
        (status = 200, description = "Doctors", body = ListResponse<Doctor>),
        (status = 303, description = "Not an administrator, redirect"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "doctors"
)]
pub async fn list_doctors(
    State(state): State<DoctorsState>,
    _admin: AdminUser,
) -> Result<Json<ListResponse<Doctor>>, ApiError> {
    let doctors = state.doctors.list().await?;
    Ok(Json(ListResponse::new(doctors)))
}
