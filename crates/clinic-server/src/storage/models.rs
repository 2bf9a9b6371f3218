// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use clinic_core::{Account, Doctor, EntityStatus, Patient, Person, Role, Specialty};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Accounts and people
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    /// Unknown role names fall back to the least privileged role
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Patient)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PersonRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub locality: Option<String>,
    pub id_document_photo: Option<String>,
    pub profile_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Person {
            id: row.id,
            account_id: row.account_id,
            given_name: row.given_name,
            family_name: row.family_name,
            national_id: row.national_id,
            email: row.email,
            phone: row.phone,
            address: row.address,
            locality: row.locality,
            id_document_photo: row.id_document_photo,
            profile_photo: row.profile_photo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Account joined with its person for user management listings
#[derive(Debug, Clone, FromRow)]
pub struct AccountListingRow {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub active: bool,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub profile_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountListingRow> for Account {
    fn from(row: AccountListingRow) -> Self {
        Account {
            id: row.id,
            role: row.role.parse().unwrap_or(Role::Patient),
            username: row.username,
            status: EntityStatus::from(row.active),
            given_name: row.given_name,
            family_name: row.family_name,
            profile_photo: row.profile_photo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Person joined with the username and status of a patient account
#[derive(Debug, Clone, FromRow)]
pub struct PatientRow {
    pub username: String,
    pub active: bool,
    #[sqlx(flatten)]
    pub person: PersonRow,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Patient {
            account_id: row.person.account_id,
            username: row.username,
            status: EntityStatus::from(row.active),
            person: row.person.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateAccountRow {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct CreatePersonRow {
    pub given_name: String,
    pub family_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub locality: Option<String>,
    pub id_document_photo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateDoctorRow {
    pub specialty_id: Uuid,
    pub license_number: String,
}

/// Everything written by one registration, inserted in a single transaction
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub account: CreateAccountRow,
    pub person: CreatePersonRow,
    pub doctor: Option<CreateDoctorRow>,
}

#[derive(Debug, Clone)]
pub struct CreatedIdentity {
    pub account: AccountRow,
    pub person: PersonRow,
    pub doctor_id: Option<Uuid>,
}

/// Partial account update. Only provided fields change; `updated_at` always refreshes.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccount {
    pub username: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
    pub profile_photo: Option<String>,
}

/// Patient profile update; also renames the login to the new email
#[derive(Debug, Clone)]
pub struct UpdatePatient {
    pub given_name: String,
    pub family_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub locality: Option<String>,
}

// ============================================
// Specialties and doctors
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct SpecialtyRow {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SpecialtyRow> for Specialty {
    fn from(row: SpecialtyRow) -> Self {
        Specialty {
            id: row.id,
            name: row.name,
            status: EntityStatus::from(row.active),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DoctorListingRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub person_id: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub username: String,
    pub specialty_id: Uuid,
    pub specialty_name: String,
    pub license_number: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DoctorListingRow> for Doctor {
    fn from(row: DoctorListingRow) -> Self {
        Doctor {
            id: row.id,
            account_id: row.account_id,
            person_id: row.person_id,
            given_name: row.given_name,
            family_name: row.family_name,
            username: row.username,
            specialty_id: row.specialty_id,
            specialty_name: row.specialty_name,
            license_number: row.license_number,
            status: EntityStatus::from(row.active),
            created_at: row.created_at,
        }
    }
}

// ============================================
// Auth sessions
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct AuthSessionRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAuthSessionRow {
    pub account_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Live session joined with its active account and person
#[derive(Debug, Clone, FromRow)]
pub struct SessionAccountRow {
    pub account_id: Uuid,
    pub username: String,
    pub role: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub profile_photo: Option<String>,
    pub expires_at: DateTime<Utc>,
}
