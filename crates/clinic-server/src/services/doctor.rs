// Doctor listing; doctors are created through the registrar

use clinic_core::Doctor;

use super::ServiceError;
use crate::storage::StorageBackend;

pub struct DoctorService {
    db: StorageBackend,
}

impl DoctorService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// One entry per doctor and specialty, ordered by family name, then given name
    pub async fn list(&self) -> Result<Vec<Doctor>, ServiceError> {
        let rows = self.db.list_doctors().await?;
        Ok(rows.into_iter().map(Doctor::from).collect())
    }
}
