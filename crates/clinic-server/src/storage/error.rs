// Storage error classification
// Decision: Constraint violations are surfaced as typed variants so callers can
// turn them into field-level validation failures instead of generic errors.

use thiserror::Error;

/// Unique constraint that a write violated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    NationalId,
    SpecialtyName,
    Other(String),
}

impl UniqueField {
    /// Map a Postgres constraint name (see migrations) to the field it guards
    pub fn from_constraint(constraint: &str) -> Self {
        match constraint {
            "accounts_username_key" => UniqueField::Username,
            "people_national_id_key" => UniqueField::NationalId,
            "specialties_name_key" => UniqueField::SpecialtyName,
            other => UniqueField::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueField::Username => write!(f, "username"),
            UniqueField::NationalId => write!(f, "national_id"),
            UniqueField::SpecialtyName => write!(f, "name"),
            UniqueField::Other(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(UniqueField),

    #[error("foreign key violated: {0}")]
    ForeignKeyViolation(String),

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            if db_err.is_unique_violation() {
                return StorageError::UniqueViolation(UniqueField::from_constraint(&constraint));
            }
            if db_err.is_foreign_key_violation() {
                return StorageError::ForeignKeyViolation(constraint);
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return StorageError::NotFound;
        }
        StorageError::Database(err)
    }
}
