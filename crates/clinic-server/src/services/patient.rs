// Patient service: listing and editing people with the patient role

use clinic_core::{require, FieldError, Patient};
use uuid::Uuid;

use super::ServiceError;
use crate::storage::{StorageBackend, UpdatePatient};

/// Edited patient profile; the email also becomes the login username
#[derive(Debug, Clone, Default)]
pub struct PatientUpdateInput {
    pub given_name: String,
    pub family_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub locality: Option<String>,
}

impl PatientUpdateInput {
    fn validate(self) -> Result<UpdatePatient, FieldError> {
        let email = require("email", &self.email)?.to_string();
        if !email.contains('@') {
            return Err(FieldError::new("email", "email is not a valid address"));
        }
        Ok(UpdatePatient {
            given_name: require("given_name", &self.given_name)?.to_string(),
            family_name: require("family_name", &self.family_name)?.to_string(),
            national_id: require("national_id", &self.national_id)?.to_string(),
            email,
            phone: trimmed(self.phone),
            address: trimmed(self.address),
            locality: trimmed(self.locality),
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct PatientService {
    db: StorageBackend,
}

impl PatientService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Patients ordered by family name, then given name
    pub async fn list(&self) -> Result<Vec<Patient>, ServiceError> {
        let rows = self.db.list_patients().await?;
        Ok(rows.into_iter().map(Patient::from).collect())
    }

    pub async fn get(&self, account_id: Uuid) -> Result<Option<Patient>, ServiceError> {
        let row = self.db.get_patient(account_id).await?;
        Ok(row.map(Patient::from))
    }

    pub async fn update(
        &self,
        account_id: Uuid,
        input: PatientUpdateInput,
    ) -> Result<Option<Patient>, ServiceError> {
        let update = input.validate()?;
        let row = self.db.update_patient(account_id, update).await?;
        if row.is_some() {
            tracing::info!(account_id = %account_id, "Updated patient");
        }
        Ok(row.map(Patient::from))
    }

    /// Set the patient's account status, or flip it when `active` is None.
    /// Accounts without the patient role are reported as missing.
    pub async fn set_status(
        &self,
        account_id: Uuid,
        active: Option<bool>,
    ) -> Result<Option<bool>, ServiceError> {
        if self.db.get_patient(account_id).await?.is_none() {
            return Ok(None);
        }
        let value = self.db.set_account_active(account_id, active).await?;
        if let Some(value) = value {
            tracing::info!(account_id = %account_id, active = value, "Changed patient status");
        }
        Ok(value)
    }
}
