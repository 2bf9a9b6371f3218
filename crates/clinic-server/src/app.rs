// Router assembly
// Decision: Every route runs behind the session middleware; guards are per-handler extractors
// Decision: Swagger UI is part of the router so the document is served in every mode

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{self, ErrorResponse};
use crate::auth::{self, AuthState, SessionStore};
use crate::config::AppConfig;
use crate::openapi::ApiDoc;
use crate::services::{AccountService, DoctorService, PatientService, Registrar, SpecialtyService};
use crate::storage::StorageBackend;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    storage: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

async fn not_found() -> impl IntoResponse {
    ErrorResponse::new("Page not found").into_response(StatusCode::NOT_FOUND)
}

/// Build the application router on top of a storage backend
pub fn build_router(storage: StorageBackend, config: &AppConfig) -> Router {
    let sessions = SessionStore::new(storage.clone(), config.auth.session_ttl);
    let accounts = Arc::new(AccountService::new(storage.clone()));
    let registrar = Arc::new(Registrar::new(storage.clone(), config.echo_credentials));
    let patients = Arc::new(PatientService::new(storage.clone()));
    let specialties = Arc::new(SpecialtyService::new(storage.clone()));
    let doctors = Arc::new(DoctorService::new(storage.clone()));

    let health_state = HealthState {
        storage: if storage.is_dev_mode() {
            "memory"
        } else {
            "postgres"
        },
    };

    Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(auth::routes(AuthState {
            config: config.auth.clone(),
            sessions: sessions.clone(),
            accounts: accounts.clone(),
            registrar: registrar.clone(),
        }))
        .merge(api::profile::routes(api::profile::ProfileState {
            accounts: accounts.clone(),
        }))
        .merge(api::admin::routes(api::admin::AdminState {
            registrar: registrar.clone(),
        }))
        .merge(api::doctors::routes(api::doctors::DoctorsState {
            registrar: registrar.clone(),
            doctors,
            specialties: specialties.clone(),
        }))
        .merge(api::specialties::routes(api::specialties::SpecialtiesState {
            specialties,
        }))
        .merge(api::patients::routes(api::patients::PatientsState {
            patients,
            registrar,
        }))
        .merge(api::users::routes(api::users::UsersState { accounts }))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            sessions,
            auth::resolve_session,
        ))
}
