// Specialty service

use clinic_core::{require, Specialty};
use uuid::Uuid;

use super::ServiceError;
use crate::storage::StorageBackend;

pub struct SpecialtyService {
    db: StorageBackend,
}

impl SpecialtyService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Specialties ordered by name; `active_only` hides disabled ones
    pub async fn list(&self, active_only: bool) -> Result<Vec<Specialty>, ServiceError> {
        let rows = self.db.list_specialties(active_only).await?;
        Ok(rows.into_iter().map(Specialty::from).collect())
    }

    pub async fn create(&self, name: &str) -> Result<Specialty, ServiceError> {
        let name = require("name", name)?;
        let row = self.db.create_specialty(name).await?;
        tracing::info!(specialty_id = %row.id, name = %row.name, "Created specialty");
        Ok(row.into())
    }

    /// Current active flag, None when the specialty does not exist
    pub async fn status(&self, id: Uuid) -> Result<Option<bool>, ServiceError> {
        let row = self.db.get_specialty(id).await?;
        Ok(row.map(|r| r.active))
    }

    /// Set the status, or flip it when `active` is None
    pub async fn set_status(
        &self,
        id: Uuid,
        active: Option<bool>,
    ) -> Result<Option<bool>, ServiceError> {
        let value = self.db.set_specialty_active(id, active).await?;
        if let Some(value) = value {
            tracing::info!(specialty_id = %id, active = value, "Changed specialty status");
        }
        Ok(value)
    }
}
