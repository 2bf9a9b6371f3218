// In-memory storage implementation for dev mode and tests
// Decision: Use parking_lot for thread-safe access
// Decision: One lock over all tables so multi-table writes are atomic
// Decision: Unique and foreign key constraints mirror the PostgreSQL schema
//
// This implementation provides a PostgreSQL-compatible API backed by in-memory
// HashMaps, allowing the server to run without a database for development.

use chrono::{DateTime, Utc};
use clinic_core::Role;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::error::{StorageError, StorageResult, UniqueField};
use super::models::*;

const SPECIALTY_FK: &str = "doctor_specialties_specialty_id_fkey";

#[derive(Debug, Clone)]
struct DoctorRecord {
    id: Uuid,
    person_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct DoctorSpecialtyRecord {
    doctor_id: Uuid,
    specialty_id: Uuid,
    license_number: String,
}

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, AccountRow>,
    people: HashMap<Uuid, PersonRow>,
    specialties: HashMap<Uuid, SpecialtyRow>,
    doctors: HashMap<Uuid, DoctorRecord>,
    doctor_specialties: Vec<DoctorSpecialtyRecord>,
    auth_sessions: HashMap<Uuid, AuthSessionRow>,
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.accounts
            .values()
            .any(|a| a.username == username && Some(a.id) != except)
    }

    fn national_id_taken(&self, national_id: &str, except: Option<Uuid>) -> bool {
        self.people
            .values()
            .any(|p| p.national_id == national_id && Some(p.id) != except)
    }

    fn person_for_account(&self, account_id: Uuid) -> Option<&PersonRow> {
        self.people.values().find(|p| p.account_id == account_id)
    }

    fn patient_row(&self, account_id: Uuid) -> Option<PatientRow> {
        let account = self.accounts.get(&account_id)?;
        if account.role() != Role::Patient {
            return None;
        }
        let person = self.person_for_account(account_id)?;
        Some(PatientRow {
            username: account.username.clone(),
            active: account.active,
            person: person.clone(),
        })
    }

    fn listing_row(&self, account: &AccountRow) -> AccountListingRow {
        let person = self.person_for_account(account.id);
        AccountListingRow {
            id: account.id,
            username: account.username.clone(),
            role: account.role.clone(),
            active: account.active,
            given_name: person.map(|p| p.given_name.clone()),
            family_name: person.map(|p| p.family_name.clone()),
            profile_photo: person.and_then(|p| p.profile_photo.clone()),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Row totals per table, used to assert that failed writes leave nothing behind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub accounts: usize,
    pub people: usize,
    pub doctors: usize,
    pub doctor_specialties: usize,
    pub specialties: usize,
    pub auth_sessions: usize,
}

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    pub fn row_counts(&self) -> RowCounts {
        let tables = self.tables.read();
        RowCounts {
            accounts: tables.accounts.len(),
            people: tables.people.len(),
            doctors: tables.doctors.len(),
            doctor_specialties: tables.doctor_specialties.len(),
            specialties: tables.specialties.len(),
            auth_sessions: tables.auth_sessions.len(),
        }
    }

    // ============================================
    // Registration
    // ============================================

    /// Stage every row, check constraints in insert order, then commit all at once.
    pub async fn create_identity(&self, input: NewIdentity) -> StorageResult<CreatedIdentity> {
        let now = Self::now();
        let mut tables = self.tables.write();

        if tables.username_taken(&input.account.username, None) {
            return Err(StorageError::UniqueViolation(UniqueField::Username));
        }
        let account = AccountRow {
            id: Uuid::now_v7(),
            username: input.account.username,
            password_hash: input.account.password_hash,
            role: input.account.role.as_str().to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        };

        if tables.national_id_taken(&input.person.national_id, None) {
            return Err(StorageError::UniqueViolation(UniqueField::NationalId));
        }
        let person = PersonRow {
            id: Uuid::now_v7(),
            account_id: account.id,
            given_name: input.person.given_name,
            family_name: input.person.family_name,
            national_id: input.person.national_id,
            email: input.person.email,
            phone: input.person.phone,
            address: input.person.address,
            locality: input.person.locality,
            id_document_photo: input.person.id_document_photo,
            profile_photo: None,
            created_at: now,
            updated_at: now,
        };

        let doctor = match input.doctor {
            Some(doctor) => {
                if !tables.specialties.contains_key(&doctor.specialty_id) {
                    return Err(StorageError::ForeignKeyViolation(SPECIALTY_FK.to_string()));
                }
                let record = DoctorRecord {
                    id: Uuid::now_v7(),
                    person_id: person.id,
                    created_at: now,
                };
                let link = DoctorSpecialtyRecord {
                    doctor_id: record.id,
                    specialty_id: doctor.specialty_id,
                    license_number: doctor.license_number,
                };
                Some((record, link))
            }
            None => None,
        };

        tables.accounts.insert(account.id, account.clone());
        tables.people.insert(person.id, person.clone());
        let doctor_id = doctor.map(|(record, link)| {
            let id = record.id;
            tables.doctors.insert(id, record);
            tables.doctor_specialties.push(link);
            id
        });

        Ok(CreatedIdentity {
            account,
            person,
            doctor_id,
        })
    }

    // ============================================
    // Accounts
    // ============================================

    pub async fn get_account_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<AccountRow>> {
        Ok(self
            .tables
            .read()
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    pub async fn list_accounts(&self, role: Option<Role>) -> StorageResult<Vec<AccountListingRow>> {
        let tables = self.tables.read();
        let mut rows: Vec<AccountListingRow> = tables
            .accounts
            .values()
            .filter(|a| role.map_or(true, |r| a.role == r.as_str()))
            .map(|a| tables.listing_row(a))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    pub async fn get_account_listing(&self, id: Uuid) -> StorageResult<Option<AccountListingRow>> {
        let tables = self.tables.read();
        Ok(tables.accounts.get(&id).map(|a| tables.listing_row(a)))
    }

    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateAccount,
    ) -> StorageResult<Option<AccountRow>> {
        let now = Self::now();
        let mut tables = self.tables.write();

        if !tables.accounts.contains_key(&id) {
            return Ok(None);
        }
        if let Some(username) = &input.username {
            if tables.username_taken(username, Some(id)) {
                return Err(StorageError::UniqueViolation(UniqueField::Username));
            }
        }

        if let Some(photo) = input.profile_photo {
            if let Some(person) = tables.people.values_mut().find(|p| p.account_id == id) {
                person.profile_photo = Some(photo);
                person.updated_at = now;
            }
        }

        let Some(account) = tables.accounts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = input.username {
            account.username = username;
        }
        if let Some(role) = input.role {
            account.role = role.as_str().to_string();
        }
        if let Some(password_hash) = input.password_hash {
            account.password_hash = password_hash;
        }
        account.updated_at = now;
        Ok(Some(account.clone()))
    }

    pub async fn set_account_active(
        &self,
        id: Uuid,
        active: Option<bool>,
    ) -> StorageResult<Option<bool>> {
        let mut tables = self.tables.write();
        Ok(tables.accounts.get_mut(&id).map(|account| {
            account.active = active.unwrap_or(!account.active);
            account.updated_at = Self::now();
            account.active
        }))
    }

    // ============================================
    // Patients
    // ============================================

    pub async fn list_patients(&self) -> StorageResult<Vec<PatientRow>> {
        let tables = self.tables.read();
        let mut rows: Vec<PatientRow> = tables
            .accounts
            .keys()
            .filter_map(|id| tables.patient_row(*id))
            .collect();
        // Case-insensitive, as under the database collation
        rows.sort_by_cached_key(|row| {
            (
                row.person.family_name.to_lowercase(),
                row.person.given_name.to_lowercase(),
            )
        });
        Ok(rows)
    }

    pub async fn get_patient(&self, account_id: Uuid) -> StorageResult<Option<PatientRow>> {
        Ok(self.tables.read().patient_row(account_id))
    }

    pub async fn update_patient(
        &self,
        account_id: Uuid,
        input: UpdatePatient,
    ) -> StorageResult<Option<PatientRow>> {
        let now = Self::now();
        let mut tables = self.tables.write();

        let Some(existing) = tables.patient_row(account_id) else {
            return Ok(None);
        };
        if tables.national_id_taken(&input.national_id, Some(existing.person.id)) {
            return Err(StorageError::UniqueViolation(UniqueField::NationalId));
        }
        if tables.username_taken(&input.email, Some(account_id)) {
            return Err(StorageError::UniqueViolation(UniqueField::Username));
        }

        if let Some(person) = tables.people.get_mut(&existing.person.id) {
            person.given_name = input.given_name;
            person.family_name = input.family_name;
            person.national_id = input.national_id;
            person.email = input.email.clone();
            person.phone = input.phone;
            person.address = input.address;
            person.locality = input.locality;
            person.updated_at = now;
        }
        if let Some(account) = tables.accounts.get_mut(&account_id) {
            account.username = input.email;
            account.updated_at = now;
        }

        Ok(tables.patient_row(account_id))
    }

    // ============================================
    // Specialties
    // ============================================

    pub async fn create_specialty(&self, name: &str) -> StorageResult<SpecialtyRow> {
        let now = Self::now();
        let mut tables = self.tables.write();
        if tables.specialties.values().any(|s| s.name == name) {
            return Err(StorageError::UniqueViolation(UniqueField::SpecialtyName));
        }
        let row = SpecialtyRow {
            id: Uuid::now_v7(),
            name: name.to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        tables.specialties.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_specialty(&self, id: Uuid) -> StorageResult<Option<SpecialtyRow>> {
        Ok(self.tables.read().specialties.get(&id).cloned())
    }

    pub async fn list_specialties(&self, active_only: bool) -> StorageResult<Vec<SpecialtyRow>> {
        let mut rows: Vec<SpecialtyRow> = self
            .tables
            .read()
            .specialties
            .values()
            .filter(|s| s.active || !active_only)
            .cloned()
            .collect();
        rows.sort_by_cached_key(|row| row.name.to_lowercase());
        Ok(rows)
    }

    pub async fn set_specialty_active(
        &self,
        id: Uuid,
        active: Option<bool>,
    ) -> StorageResult<Option<bool>> {
        let mut tables = self.tables.write();
        Ok(tables.specialties.get_mut(&id).map(|specialty| {
            specialty.active = active.unwrap_or(!specialty.active);
            specialty.updated_at = Self::now();
            specialty.active
        }))
    }

    // ============================================
    // Doctors
    // ============================================

    pub async fn list_doctors(&self) -> StorageResult<Vec<DoctorListingRow>> {
        let tables = self.tables.read();
        let mut rows: Vec<DoctorListingRow> = tables
            .doctor_specialties
            .iter()
            .filter_map(|link| {
                let doctor = tables.doctors.get(&link.doctor_id)?;
                let person = tables.people.get(&doctor.person_id)?;
                let account = tables.accounts.get(&person.account_id)?;
                let specialty = tables.specialties.get(&link.specialty_id)?;
                Some(DoctorListingRow {
                    id: doctor.id,
                    account_id: account.id,
                    person_id: person.id,
                    given_name: person.given_name.clone(),
                    family_name: person.family_name.clone(),
                    username: account.username.clone(),
                    specialty_id: specialty.id,
                    specialty_name: specialty.name.clone(),
                    license_number: link.license_number.clone(),
                    active: account.active,
                    created_at: doctor.created_at,
                })
            })
            .collect();
        rows.sort_by_cached_key(|row| {
            (
                row.family_name.to_lowercase(),
                row.given_name.to_lowercase(),
                row.specialty_name.to_lowercase(),
            )
        });
        Ok(rows)
    }

    // ============================================
    // Auth sessions
    // ============================================

    pub async fn create_auth_session(
        &self,
        input: CreateAuthSessionRow,
    ) -> StorageResult<AuthSessionRow> {
        let mut tables = self.tables.write();
        if !tables.accounts.contains_key(&input.account_id) {
            return Err(StorageError::ForeignKeyViolation(
                "auth_sessions_account_id_fkey".to_string(),
            ));
        }
        let row = AuthSessionRow {
            id: Uuid::now_v7(),
            account_id: input.account_id,
            token_hash: input.token_hash,
            expires_at: input.expires_at,
            created_at: Self::now(),
        };
        tables.auth_sessions.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_session_account(
        &self,
        token_hash: &str,
    ) -> StorageResult<Option<SessionAccountRow>> {
        let now = Self::now();
        let tables = self.tables.read();
        let Some(session) = tables
            .auth_sessions
            .values()
            .find(|s| s.token_hash == token_hash && s.expires_at > now)
        else {
            return Ok(None);
        };
        let Some(account) = tables
            .accounts
            .get(&session.account_id)
            .filter(|a| a.active)
        else {
            return Ok(None);
        };
        let person = tables.person_for_account(account.id);
        Ok(Some(SessionAccountRow {
            account_id: account.id,
            username: account.username.clone(),
            role: account.role.clone(),
            given_name: person.map(|p| p.given_name.clone()),
            family_name: person.map(|p| p.family_name.clone()),
            profile_photo: person.and_then(|p| p.profile_photo.clone()),
            expires_at: session.expires_at,
        }))
    }

    pub async fn delete_auth_session(&self, token_hash: &str) -> StorageResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.auth_sessions.len();
        tables.auth_sessions.retain(|_, s| s.token_hash != token_hash);
        Ok(tables.auth_sessions.len() < before)
    }

    pub async fn delete_expired_auth_sessions(&self) -> StorageResult<u64> {
        let now = Self::now();
        let mut tables = self.tables.write();
        let before = tables.auth_sessions.len();
        tables.auth_sessions.retain(|_, s| s.expires_at > now);
        Ok((before - tables.auth_sessions.len()) as u64)
    }
}
