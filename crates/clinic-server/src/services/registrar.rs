// Identity registration shared by every account-creating flow
// Decision: One operation parameterised by credential source and role profile
// Decision: Uniqueness is left to the database; violations come back as field errors
// Decision: All rows of one registration are written in a single transaction

use anyhow::anyhow;
use clinic_core::{require, FieldError, Role};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ServiceError;
use crate::storage::password::hash_password;
use crate::storage::{
    CreateAccountRow, CreateDoctorRow, CreatePersonRow, NewIdentity, StorageBackend,
};

pub type RegistrationError = ServiceError;

/// Profile data entered on any registration form
#[derive(Debug, Clone, Default)]
pub struct PersonDetails {
    pub given_name: String,
    pub family_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub locality: Option<String>,
    pub id_document_photo: Option<String>,
}

/// Where the initial password comes from
#[derive(Debug, Clone)]
pub enum Credential {
    /// Typed by the user, optionally with a confirmation field
    Supplied {
        password: String,
        confirmation: Option<String>,
    },
    /// Staff-created accounts start with the national ID as password
    NationalId,
}

/// Role to create plus its role-specific data
#[derive(Debug, Clone)]
pub enum Profile {
    Admin,
    Patient,
    Secretary,
    Doctor {
        specialty_id: Option<Uuid>,
        license_number: String,
    },
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Admin => Role::Admin,
            Profile::Patient => Role::Patient,
            Profile::Secretary => Role::Secretary,
            Profile::Doctor { .. } => Role::Doctor,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub person: PersonDetails,
    /// Login identifier (the email in every current flow)
    pub username: String,
    pub credential: Credential,
    pub profile: Profile,
}

/// Login data handed back to staff after creating an account
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssuedCredentials {
    pub username: String,
    /// Only set for national-ID credentials when echoing is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Registered {
    pub account_id: Uuid,
    pub person_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub credentials: IssuedCredentials,
}

/// Validated, trimmed form of a request, ready to be written
struct Prepared {
    person: CreatePersonRow,
    username: String,
    password: String,
    doctor: Option<CreateDoctorRow>,
}

pub struct Registrar {
    db: StorageBackend,
    echo_credentials: bool,
}

impl Registrar {
    pub fn new(db: StorageBackend, echo_credentials: bool) -> Self {
        Self {
            db,
            echo_credentials,
        }
    }

    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<Registered, RegistrationError> {
        let role = request.profile.role();
        let echo_password = matches!(request.credential, Credential::NationalId);
        let prepared = validate(request)?;

        let password_hash = hash_password(&prepared.password).map_err(|e| {
            tracing::error!("Password hashing error: {}", e);
            RegistrationError::Failed(anyhow!(e))
        })?;

        let created = self
            .db
            .create_identity(NewIdentity {
                account: CreateAccountRow {
                    username: prepared.username.clone(),
                    password_hash,
                    role,
                },
                person: prepared.person,
                doctor: prepared.doctor,
            })
            .await?;

        tracing::info!(
            account_id = %created.account.id,
            role = %role,
            "Registered account"
        );

        let initial_password =
            (echo_password && self.echo_credentials).then_some(prepared.password);

        Ok(Registered {
            account_id: created.account.id,
            person_id: created.person.id,
            doctor_id: created.doctor_id,
            credentials: IssuedCredentials {
                username: created.account.username,
                initial_password,
            },
        })
    }

    /// Create the configured administrator unless an account with that username exists
    pub async fn ensure_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, RegistrationError> {
        if self.db.get_account_by_username(username).await?.is_some() {
            tracing::debug!(username, "Bootstrap admin already present");
            return Ok(false);
        }

        let email = if username.contains('@') {
            username.to_string()
        } else {
            format!("{}@localhost", username)
        };

        self.register(RegistrationRequest {
            person: PersonDetails {
                given_name: "System".to_string(),
                family_name: "Administrator".to_string(),
                national_id: username.to_string(),
                email,
                ..Default::default()
            },
            username: username.to_string(),
            credential: Credential::Supplied {
                password: password.to_string(),
                confirmation: None,
            },
            profile: Profile::Admin,
        })
        .await?;

        tracing::info!(username, "Created bootstrap admin");
        Ok(true)
    }
}

/// Trim an optional field; blank becomes None
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate(request: RegistrationRequest) -> Result<Prepared, FieldError> {
    let person = &request.person;
    let given_name = require("given_name", &person.given_name)?.to_string();
    let family_name = require("family_name", &person.family_name)?.to_string();
    let national_id = require("national_id", &person.national_id)?.to_string();
    let email = require("email", &person.email)?.to_string();
    if !email.contains('@') {
        return Err(FieldError::new("email", "email is not a valid address"));
    }
    let username = require("username", &request.username)?.to_string();

    let password = match &request.credential {
        Credential::Supplied {
            password,
            confirmation,
        } => {
            if password.is_empty() {
                return Err(FieldError::new("password", "password is required"));
            }
            if let Some(confirmation) = confirmation {
                if confirmation != password {
                    return Err(FieldError::new("confirm_password", "Passwords do not match"));
                }
            }
            password.clone()
        }
        Credential::NationalId => national_id.clone(),
    };

    let doctor = match &request.profile {
        Profile::Doctor {
            specialty_id,
            license_number,
        } => {
            let specialty_id = specialty_id
                .ok_or_else(|| FieldError::new("specialty_id", "specialty_id is required"))?;
            let license_number = require("license_number", license_number)?.to_string();
            Some(CreateDoctorRow {
                specialty_id,
                license_number,
            })
        }
        _ => None,
    };

    let person = request.person;
    Ok(Prepared {
        person: CreatePersonRow {
            given_name,
            family_name,
            national_id,
            email,
            phone: optional(person.phone),
            address: optional(person.address),
            locality: optional(person.locality),
            id_document_photo: optional(person.id_document_photo),
        },
        username,
        password,
        doctor,
    })
}
