// URL-encoded form bodies
// Decision: English field names, with the legacy form names accepted as aliases

use clinic_core::{FieldError, Role};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::non_blank;
use crate::services::PersonDetails;

/// Person fields shared by every registration form
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PersonForm {
    #[serde(default, alias = "nombre")]
    pub given_name: String,
    #[serde(default, alias = "apellido")]
    pub family_name: String,
    #[serde(default, alias = "dni")]
    pub national_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "telefono")]
    pub phone: Option<String>,
    #[serde(default, alias = "direccion")]
    pub address: Option<String>,
    #[serde(default, alias = "localidad")]
    pub locality: Option<String>,
    /// Reference to an already-uploaded scan of the identity document
    #[serde(default, alias = "foto_dni")]
    pub id_document_photo: Option<String>,
}

impl PersonForm {
    /// Login identifier derived from the form (the email)
    pub fn username(&self) -> String {
        self.email.trim().to_string()
    }

    pub fn into_details(self) -> PersonDetails {
        PersonDetails {
            given_name: self.given_name,
            family_name: self.family_name,
            national_id: self.national_id,
            email: self.email,
            phone: non_blank(self.phone),
            address: non_blank(self.address),
            locality: non_blank(self.locality),
            id_document_photo: non_blank(self.id_document_photo),
        }
    }
}

/// Self-service patient sign-up and admin creation
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AccountForm {
    #[serde(flatten)]
    pub person: PersonForm,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

/// Doctor creation; the initial password is the national ID
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DoctorForm {
    #[serde(flatten)]
    pub person: PersonForm,
    /// Specialty UUID
    #[serde(default, alias = "especialidad")]
    pub specialty_id: Option<String>,
    #[serde(default, alias = "matricula")]
    pub license_number: String,
}

impl DoctorForm {
    /// Blank means "not chosen"; anything else must be a UUID
    pub fn specialty_id(&self) -> Result<Option<Uuid>, FieldError> {
        match non_blank(self.specialty_id.clone()) {
            Some(raw) => Uuid::parse_str(&raw)
                .map(Some)
                .map_err(|_| FieldError::new("specialty_id", "Specialty does not exist")),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SpecialtyForm {
    #[serde(default, alias = "nombre_esp", alias = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Account edit by staff
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserEditForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "tipo")]
    pub role: Option<String>,
    /// New password; blank keeps the current one
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, alias = "foto_perfil")]
    pub profile_photo: Option<String>,
}

/// Own-profile change
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileForm {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default, alias = "foto_perfil")]
    pub profile_photo: Option<String>,
}

/// Parse an optional role name; blank means "unchanged" or "all"
pub fn parse_role(value: Option<String>) -> Result<Option<Role>, FieldError> {
    match non_blank(value) {
        Some(raw) => raw
            .parse::<Role>()
            .map(Some)
            .map_err(|e| FieldError::new("role", e.to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequest;

    async fn parse_form<T: serde::de::DeserializeOwned>(body: &'static str) -> T {
        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(axum::body::Body::from(body))
            .unwrap();
        let axum::Form(form) = axum::Form::<T>::from_request(request, &()).await.unwrap();
        form
    }

    #[tokio::test]
    async fn test_person_form_accepts_legacy_names() {
        let form: DoctorForm = parse_form(
            "nombre=Laura&apellido=Perez&dni=200&email=laura%40example.com\
             &telefono=&especialidad=&matricula=MP-1",
        )
        .await;

        assert_eq!(form.person.given_name, "Laura");
        assert_eq!(form.person.family_name, "Perez");
        assert_eq!(form.person.national_id, "200");
        assert_eq!(form.license_number, "MP-1");
        assert_eq!(form.specialty_id().unwrap(), None);

        let details = form.person.into_details();
        assert_eq!(details.phone, None);
    }

    #[test]
    fn test_specialty_id_must_be_uuid() {
        let form = DoctorForm {
            specialty_id: Some("cardio".into()),
            ..Default::default()
        };
        assert_eq!(form.specialty_id().unwrap_err().field, "specialty_id");

        let id = Uuid::now_v7();
        let form = DoctorForm {
            specialty_id: Some(id.to_string()),
            ..Default::default()
        };
        assert_eq!(form.specialty_id().unwrap(), Some(id));
    }

    #[tokio::test]
    async fn test_account_form_english_names() {
        let form: AccountForm = parse_form(
            "given_name=Ana&family_name=Gomez&national_id=100&email=ana%40example.com\
             &password=secret&confirm_password=secret",
        )
        .await;
        assert_eq!(form.person.username(), "ana@example.com");
        assert_eq!(form.confirm_password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(Some("medico".into())).unwrap(), Some(Role::Doctor));
        assert_eq!(parse_role(Some("".into())).unwrap(), None);
        assert_eq!(parse_role(Some("janitor".into())).unwrap_err().field, "role");
    }
}
