// Services layer for business logic
// Services own validation and call storage directly; handlers only map results to HTTP

pub mod account;
pub mod doctor;
pub mod patient;
pub mod registrar;
pub mod specialty;

pub use account::{AccountService, LoginError, UpdateAccountInput};
pub use doctor::DoctorService;
pub use patient::{PatientService, PatientUpdateInput};
pub use registrar::{
    Credential, IssuedCredentials, PersonDetails, Profile, Registered, Registrar,
    RegistrationError, RegistrationRequest,
};
pub use specialty::SpecialtyService;

use clinic_core::FieldError;
use thiserror::Error;

use crate::storage::{StorageError, UniqueField};

/// Outcome of a failed write: either the input was rejected or something broke
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Recoverable: re-show the form with the message next to `field`
    #[error(transparent)]
    Invalid(#[from] FieldError),

    /// Unexpected storage or hashing failure; already logged
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UniqueViolation(UniqueField::Username) => ServiceError::Invalid(
                FieldError::new("username", "An account with that username already exists"),
            ),
            StorageError::UniqueViolation(UniqueField::NationalId) => ServiceError::Invalid(
                FieldError::new("national_id", "A person with that national ID already exists"),
            ),
            StorageError::UniqueViolation(UniqueField::SpecialtyName) => ServiceError::Invalid(
                FieldError::new("name", "A specialty with that name already exists"),
            ),
            StorageError::ForeignKeyViolation(constraint) if constraint.contains("specialty") => {
                ServiceError::Invalid(FieldError::new("specialty_id", "Specialty does not exist"))
            }
            other => {
                tracing::error!("Storage failure: {}", other);
                ServiceError::Failed(other.into())
            }
        }
    }
}
