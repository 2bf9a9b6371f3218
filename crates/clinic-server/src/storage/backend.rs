// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage.

use clinic_core::Role;
use std::sync::Arc;
use uuid::Uuid;

use super::error::StorageResult;
use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode and tests)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str, max_connections: u32) -> StorageResult<Self> {
        let db = Database::from_url(database_url, max_connections).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Apply migrations; a no-op for the in-memory backend
    pub async fn migrate(&self) -> StorageResult<()> {
        match self {
            Self::Postgres(db) => db.migrate().await,
            Self::InMemory(_) => Ok(()),
        }
    }

    // ============================================
    // Registration
    // ============================================

    pub async fn create_identity(&self, input: NewIdentity) -> StorageResult<CreatedIdentity> {
        match self {
            Self::Postgres(db) => db.create_identity(input).await,
            Self::InMemory(db) => db.create_identity(input).await,
        }
    }

    // ============================================
    // Accounts
    // ============================================

    pub async fn get_account_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<AccountRow>> {
        match self {
            Self::Postgres(db) => db.get_account_by_username(username).await,
            Self::InMemory(db) => db.get_account_by_username(username).await,
        }
    }

    pub async fn list_accounts(&self, role: Option<Role>) -> StorageResult<Vec<AccountListingRow>> {
        match self {
            Self::Postgres(db) => db.list_accounts(role).await,
            Self::InMemory(db) => db.list_accounts(role).await,
        }
    }

    pub async fn get_account_listing(&self, id: Uuid) -> StorageResult<Option<AccountListingRow>> {
        match self {
            Self::Postgres(db) => db.get_account_listing(id).await,
            Self::InMemory(db) => db.get_account_listing(id).await,
        }
    }

    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateAccount,
    ) -> StorageResult<Option<AccountRow>> {
        match self {
            Self::Postgres(db) => db.update_account(id, input).await,
            Self::InMemory(db) => db.update_account(id, input).await,
        }
    }

    pub async fn set_account_active(
        &self,
        id: Uuid,
        active: Option<bool>,
    ) -> StorageResult<Option<bool>> {
        match self {
            Self::Postgres(db) => db.set_account_active(id, active).await,
            Self::InMemory(db) => db.set_account_active(id, active).await,
        }
    }

    // ============================================
    // Patients
    // ============================================

    pub async fn list_patients(&self) -> StorageResult<Vec<PatientRow>> {
        match self {
            Self::Postgres(db) => db.list_patients().await,
            Self::InMemory(db) => db.list_patients().await,
        }
    }

    pub async fn get_patient(&self, account_id: Uuid) -> StorageResult<Option<PatientRow>> {
        match self {
            Self::Postgres(db) => db.get_patient(account_id).await,
            Self::InMemory(db) => db.get_patient(account_id).await,
        }
    }

    pub async fn update_patient(
        &self,
        account_id: Uuid,
        input: UpdatePatient,
    ) -> StorageResult<Option<PatientRow>> {
        match self {
            Self::Postgres(db) => db.update_patient(account_id, input).await,
            Self::InMemory(db) => db.update_patient(account_id, input).await,
        }
    }

    // ============================================
    // Specialties
    // ============================================

    pub async fn create_specialty(&self, name: &str) -> StorageResult<SpecialtyRow> {
        match self {
            Self::Postgres(db) => db.create_specialty(name).await,
            Self::InMemory(db) => db.create_specialty(name).await,
        }
    }

    pub async fn get_specialty(&self, id: Uuid) -> StorageResult<Option<SpecialtyRow>> {
        match self {
            Self::Postgres(db) => db.get_specialty(id).await,
            Self::InMemory(db) => db.get_specialty(id).await,
        }
    }

    pub async fn list_specialties(&self, active_only: bool) -> StorageResult<Vec<SpecialtyRow>> {
        match self {
            Self::Postgres(db) => db.list_specialties(active_only).await,
            Self::InMemory(db) => db.list_specialties(active_only).await,
        }
    }

    pub async fn set_specialty_active(
        &self,
        id: Uuid,
        active: Option<bool>,
    ) -> StorageResult<Option<bool>> {
        match self {
            Self::Postgres(db) => db.set_specialty_active(id, active).await,
            Self::InMemory(db) => db.set_specialty_active(id, active).await,
        }
    }

    // ============================================
    // Doctors
    // ============================================

    pub async fn list_doctors(&self) -> StorageResult<Vec<DoctorListingRow>> {
        match self {
            Self::Postgres(db) => db.list_doctors().await,
            Self::InMemory(db) => db.list_doctors().await,
        }
    }

    // ============================================
    // Auth sessions
    // ============================================

    pub async fn create_auth_session(
        &self,
        input: CreateAuthSessionRow,
    ) -> StorageResult<AuthSessionRow> {
        match self {
            Self::Postgres(db) => db.create_auth_session(input).await,
            Self::InMemory(db) => db.create_auth_session(input).await,
        }
    }

    pub async fn get_session_account(
        &self,
        token_hash: &str,
    ) -> StorageResult<Option<SessionAccountRow>> {
        match self {
            Self::Postgres(db) => db.get_session_account(token_hash).await,
            Self::InMemory(db) => db.get_session_account(token_hash).await,
        }
    }

    pub async fn delete_auth_session(&self, token_hash: &str) -> StorageResult<bool> {
        match self {
            Self::Postgres(db) => db.delete_auth_session(token_hash).await,
            Self::InMemory(db) => db.delete_auth_session(token_hash).await,
        }
    }

    pub async fn delete_expired_auth_sessions(&self) -> StorageResult<u64> {
        match self {
            Self::Postgres(db) => db.delete_expired_auth_sessions().await,
            Self::InMemory(db) => db.delete_expired_auth_sessions().await,
        }
    }
}
