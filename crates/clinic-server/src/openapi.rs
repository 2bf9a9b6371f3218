// OpenAPI specification generation
//
// Served by Swagger UI at /swagger-ui, raw document at /api-doc/openapi.json.

use crate::api;
use crate::api::ListResponse;
use crate::auth;
use clinic_core::{Account, Doctor, EntityStatus, FieldError, Patient, Person, Role, Specialty};
use utoipa::OpenApi;

/// OpenAPI documentation for the clinic API
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::landing,
        auth::routes::login,
        auth::routes::logout,
        auth::routes::register,
        auth::routes::home,
        auth::routes::agenda,
        api::profile::get_profile,
        api::profile::update_profile,
        api::admin::admin_form,
        api::admin::create_admin,
        api::doctors::doctor_form,
        api::doctors::create_doctor,
        api::doctors::list_doctors,
        api::specialties::list_specialties,
        api::specialties::create_specialty,
        api::specialties::get_specialty_status,
        api::specialties::set_specialty_status,
        api::patients::list_patients,
        api::patients::patient_form,
        api::patients::create_patient,
        api::patients::get_patient,
        api::patients::update_patient,
        api::patients::set_patient_status,
        api::users::list_users,
        api::users::get_user,
        api::users::update_user,
        api::users::set_user_status,
    ),
    components(
        schemas(
            Account, Person, Patient, Doctor, Specialty, Role, EntityStatus, FieldError,
            auth::SessionUser,
            auth::routes::PageView, auth::routes::HomeView,
            api::ErrorResponse, api::StatusResponse,
            api::common::SetStatusRequest,
            api::admin::CreatedResponse,
            api::specialties::SpecialtyStatus,
            api::users::ListUsersQuery,
            api::forms::PersonForm, api::forms::AccountForm, api::forms::DoctorForm,
            api::forms::SpecialtyForm, api::forms::LoginForm, api::forms::UserEditForm,
            api::forms::ProfileForm,
            crate::services::IssuedCredentials,
            ListResponse<Account>,
            ListResponse<Patient>,
            ListResponse<Doctor>,
            ListResponse<Specialty>,
        )
    ),
    tags(
        (name = "auth", description = "Login, logout and self-service registration"),
        (name = "profile", description = "Own profile"),
        (name = "admin", description = "Administrator accounts"),
        (name = "doctors", description = "Doctor accounts"),
        (name = "specialties", description = "Medical specialties"),
        (name = "patients", description = "Patient records"),
        (name = "users", description = "User management")
    ),
    info(
        title = "Clinic API",
        version = "0.1.0",
        description = "Clinic management: sessions, patients, doctors, specialties and users",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/login"));
        assert!(paths.iter().any(|p| p.as_str() == "/medicos/especialidad/toggle/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/usuarios"));
        assert!(paths.iter().any(|p| p.as_str() == "/agenda"));
    }
}
