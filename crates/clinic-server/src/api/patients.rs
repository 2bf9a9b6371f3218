// Patient routes (any logged-in staff member)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use clinic_core::Patient;
use std::sync::Arc;
use uuid::Uuid;

use super::admin::CreatedResponse;
use super::common::{
    status_response, ApiError, ErrorResponse, ListResponse, SetStatusRequest, StatusChange,
    StatusResponse,
};
use super::forms::PersonForm;
use crate::auth::{routes::PageView, AuthUser};
use crate::services::{
    Credential, PatientService, PatientUpdateInput, Profile, Registrar, RegistrationRequest,
};

const LISTING: &str = "/paciente";
const NOT_FOUND: &str = "Patient not found";

#[derive(Clone)]
pub struct PatientsState {
    pub patients: Arc<PatientService>,
    pub registrar: Arc<Registrar>,
}

pub fn routes(state: PatientsState) -> Router {
    Router::new()
        .route("/paciente", get(list_patients))
        .route("/pacientes", get(list_patients))
        .route("/paciente/agregar", get(patient_form).post(create_patient))
        .route("/paciente/editar/:id", get(get_patient).post(update_patient))
        .route("/paciente/toggle-status/:id", post(set_patient_status))
        .with_state(state)
}

/// GET /paciente - Patients ordered by family name, then given name
#[utoipa::path(
    get,
    path = "/paciente",
    responses(
        (status = 200, description = "Patients", body = ListResponse<Patient>),
        (status = 303, description = "Not logged in, redirect to /login"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "patients"
)]
pub async fn list_patients(
    State(state): State<PatientsState>,
    _user: AuthUser,
) -> Result<Json<ListResponse<Patient>>, ApiError> {
    let patients = state.patients.list().await?;
    Ok(Json(ListResponse::new(patients)))
}

/// GET /paciente/agregar - Patient entry form
#[utoipa::path(
    get,
    path = "/paciente/agregar",
    responses(
        (status = 200, description = "Form page", body = PageView),
        (status = 303, description = "Not logged in, redirect to /login")
    ),
    tag = "patients"
)]
pub async fn patient_form(_user: AuthUser) -> Json<PageView> {
    Json(PageView::new("Add patient"))
}

/// POST /paciente/agregar - Staff-entered patient; initial password is the national ID
#[utoipa::path(
    post,
    path = "/paciente/agregar",
    request_body(content = PersonForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Patient created", body = CreatedResponse),
        (status = 303, description = "Not logged in, redirect to /login"),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Registration failed", body = ErrorResponse)
    ),
    tag = "patients"
)]
pub async fn create_patient(
    State(state): State<PatientsState>,
    AuthUser(user): AuthUser,
    Form(form): Form<PersonForm>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let username = form.username();
    let registered = state
        .registrar
        .register(RegistrationRequest {
            person: form.into_details(),
            username,
            credential: Credential::NationalId,
            profile: Profile::Patient,
        })
        .await
        .map_err(ApiError::registration)?;

    tracing::info!(
        created_by = %user.account_id,
        account_id = %registered.account_id,
        "Patient created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::from(registered.credentials)),
    ))
}

/// GET /paciente/editar/{id} - Patient edit view
#[utoipa::path(
    get,
    path = "/paciente/editar/{id}",
    params(("id" = Uuid, Path, description = "Patient account ID")),
    responses(
        (status = 200, description = "Patient", body = Patient),
        (status = 303, description = "Unknown patient or not logged in, redirect"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "patients"
)]
pub async fn get_patient(
    State(state): State<PatientsState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let response = match state.patients.get(id).await? {
        Some(patient) => Json(patient).into_response(),
        None => Redirect::to(LISTING).into_response(),
    };
    Ok(response)
}

/// POST /paciente/editar/{id} - Update a patient's profile and login
#[utoipa::path(
    post,
    path = "/paciente/editar/{id}",
    params(("id" = Uuid, Path, description = "Patient account ID")),
    request_body(content = PersonForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated (or unknown patient), redirect to /paciente"),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "patients"
)]
pub async fn update_patient(
    State(state): State<PatientsState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Form(form): Form<PersonForm>,
) -> Result<Redirect, ApiError> {
    let input = PatientUpdateInput {
        given_name: form.given_name,
        family_name: form.family_name,
        national_id: form.national_id,
        email: form.email,
        phone: form.phone,
        address: form.address,
        locality: form.locality,
    };
    state.patients.update(id, input).await?;
    Ok(Redirect::to(LISTING))
}

/// POST /paciente/toggle-status/{id} - Flip or set a patient's account status
#[utoipa::path(
    post,
    path = "/paciente/toggle-status/{id}",
    params(("id" = Uuid, Path, description = "Patient account ID")),
    request_body(
        content = SetStatusRequest,
        description = "Optional; without `active` the status flips"
    ),
    responses(
        (status = 200, description = "Status changed", body = StatusResponse),
        (status = 422, description = "Unreadable status body", body = ErrorResponse),
        (status = 303, description = "Not logged in, redirect to /login"),
        (status = 404, description = "Patient not found", body = StatusResponse),
        (status = 500, description = "Internal server error", body = StatusResponse)
    ),
    tag = "patients"
)]
pub async fn set_patient_status(
    State(state): State<PatientsState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    StatusChange(active): StatusChange,
) -> Response {
    status_response(state.patients.set_status(id, active).await, NOT_FOUND)
}
