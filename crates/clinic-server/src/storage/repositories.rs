// PostgreSQL repository layer
// Decision: Runtime-checked queries (query_as + FromRow) so the crate builds without a live database
// Decision: Multi-table writes run inside one transaction; any error rolls the whole unit back

use chrono::Utc;
use clinic_core::Role;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::error::{StorageError, StorageResult};
use super::models::*;

const ACCOUNT_COLUMNS: &str =
    "id, username, password_hash, role, active, created_at, updated_at";

const PERSON_COLUMNS: &str = "id, account_id, given_name, family_name, national_id, email, \
     phone, address, locality, id_document_photo, profile_photo, created_at, updated_at";

const PATIENT_SELECT: &str = r#"
    SELECT a.username, a.active,
           p.id, p.account_id, p.given_name, p.family_name, p.national_id, p.email,
           p.phone, p.address, p.locality, p.id_document_photo, p.profile_photo,
           p.created_at, p.updated_at
    FROM people p
    JOIN accounts a ON a.id = p.account_id
    WHERE a.role = 'patient'
"#;

const ACCOUNT_LISTING_SELECT: &str = r#"
    SELECT a.id, a.username, a.role, a.active,
           p.given_name, p.family_name, p.profile_photo,
           a.created_at, a.updated_at
    FROM accounts a
    LEFT JOIN people p ON p.account_id = a.id
"#;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create database connection pool from URL
    pub async fn from_url(database_url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Apply pending migrations from `crates/clinic-server/migrations`
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Internal(e.into()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ============================================
    // Registration
    // ============================================

    /// Insert account, person and (for doctors) the doctor rows as one unit.
    pub async fn create_identity(&self, input: NewIdentity) -> StorageResult<CreatedIdentity> {
        let mut tx = self.pool.begin().await?;

        match insert_identity(&mut tx, input).await {
            Ok(created) => {
                tx.commit().await?;
                Ok(created)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("Failed to roll back registration: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    // ============================================
    // Accounts
    // ============================================

    pub async fn get_account_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<AccountRow>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE username = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_accounts(&self, role: Option<Role>) -> StorageResult<Vec<AccountListingRow>> {
        let rows = sqlx::query_as::<_, AccountListingRow>(&format!(
            "{} WHERE ($1::text IS NULL OR a.role = $1) ORDER BY a.created_at DESC, a.id DESC",
            ACCOUNT_LISTING_SELECT
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_account_listing(&self, id: Uuid) -> StorageResult<Option<AccountListingRow>> {
        let row = sqlx::query_as::<_, AccountListingRow>(&format!(
            "{} WHERE a.id = $1",
            ACCOUNT_LISTING_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateAccount,
    ) -> StorageResult<Option<AccountRow>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts
            SET
                username = COALESCE($2, username),
                role = COALESCE($3, role),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .bind(&input.username)
        .bind(input.role.map(|r| r.as_str()))
        .bind(&input.password_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(photo) = &input.profile_photo {
            sqlx::query(
                "UPDATE people SET profile_photo = $2, updated_at = NOW() WHERE account_id = $1",
            )
            .bind(id)
            .bind(photo)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(row))
    }

    /// Set the active flag, or flip it when `active` is None. Returns the new value.
    pub async fn set_account_active(
        &self,
        id: Uuid,
        active: Option<bool>,
    ) -> StorageResult<Option<bool>> {
        let value = sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE accounts
            SET active = COALESCE($2, NOT active), updated_at = NOW()
            WHERE id = $1
            RETURNING active
            "#,
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    // ============================================
    // Patients
    // ============================================

    pub async fn list_patients(&self) -> StorageResult<Vec<PatientRow>> {
        let rows = sqlx::query_as::<_, PatientRow>(&format!(
            "{} ORDER BY p.family_name, p.given_name",
            PATIENT_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_patient(&self, account_id: Uuid) -> StorageResult<Option<PatientRow>> {
        let row = sqlx::query_as::<_, PatientRow>(&format!(
            "{} AND a.id = $1",
            PATIENT_SELECT
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_patient(
        &self,
        account_id: Uuid,
        input: UpdatePatient,
    ) -> StorageResult<Option<PatientRow>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE people p
            SET
                given_name = $2,
                family_name = $3,
                national_id = $4,
                email = $5,
                phone = $6,
                address = $7,
                locality = $8,
                updated_at = NOW()
            FROM accounts a
            WHERE p.account_id = $1 AND a.id = p.account_id AND a.role = 'patient'
            RETURNING p.id
            "#,
        )
        .bind(account_id)
        .bind(&input.given_name)
        .bind(&input.family_name)
        .bind(&input.national_id)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.locality)
        .fetch_optional(&mut *tx)
        .await;

        let updated = match updated {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                tx.rollback().await?;
                return Err(e.into());
            }
        };
        if !updated {
            tx.rollback().await?;
            return Ok(None);
        }

        let rename = "UPDATE accounts SET username = $2, updated_at = NOW() WHERE id = $1";
        if let Err(e) = sqlx::query(rename)
            .bind(account_id)
            .bind(&input.email)
            .execute(&mut *tx)
            .await
        {
            tx.rollback().await?;
            return Err(e.into());
        }

        let row = sqlx::query_as::<_, PatientRow>(&format!(
            "{} AND a.id = $1",
            PATIENT_SELECT
        ))
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    // ============================================
    // Specialties
    // ============================================

    pub async fn create_specialty(&self, name: &str) -> StorageResult<SpecialtyRow> {
        let row = sqlx::query_as::<_, SpecialtyRow>(
            r#"
            INSERT INTO specialties (id, name, active)
            VALUES ($1, $2, TRUE)
            RETURNING id, name, active, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_specialty(&self, id: Uuid) -> StorageResult<Option<SpecialtyRow>> {
        let row = sqlx::query_as::<_, SpecialtyRow>(
            "SELECT id, name, active, created_at, updated_at FROM specialties WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_specialties(&self, active_only: bool) -> StorageResult<Vec<SpecialtyRow>> {
        let rows = sqlx::query_as::<_, SpecialtyRow>(
            r#"
            SELECT id, name, active, created_at, updated_at
            FROM specialties
            WHERE active OR NOT $1
            ORDER BY name
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Set the active flag, or flip it when `active` is None. Returns the new value.
    pub async fn set_specialty_active(
        &self,
        id: Uuid,
        active: Option<bool>,
    ) -> StorageResult<Option<bool>> {
        let value = sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE specialties
            SET active = COALESCE($2, NOT active), updated_at = NOW()
            WHERE id = $1
            RETURNING active
            "#,
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    // ============================================
    // Doctors
    // ============================================

    pub async fn list_doctors(&self) -> StorageResult<Vec<DoctorListingRow>> {
        let rows = sqlx::query_as::<_, DoctorListingRow>(
            r#"
            SELECT d.id, p.account_id, p.id AS person_id, p.given_name, p.family_name,
                   a.username, s.id AS specialty_id, s.name AS specialty_name,
                   ds.license_number, a.active, d.created_at
            FROM doctors d
            JOIN people p ON p.id = d.person_id
            JOIN accounts a ON a.id = p.account_id
            JOIN doctor_specialties ds ON ds.doctor_id = d.id
            JOIN specialties s ON s.id = ds.specialty_id
            ORDER BY p.family_name, p.given_name, s.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Auth sessions
    // ============================================

    pub async fn create_auth_session(
        &self,
        input: CreateAuthSessionRow,
    ) -> StorageResult<AuthSessionRow> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            INSERT INTO auth_sessions (id, account_id, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, account_id, token_hash, expires_at, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.account_id)
        .bind(&input.token_hash)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Resolve a live session to its account. Expired sessions and inactive accounts yield None.
    pub async fn get_session_account(
        &self,
        token_hash: &str,
    ) -> StorageResult<Option<SessionAccountRow>> {
        let row = sqlx::query_as::<_, SessionAccountRow>(
            r#"
            SELECT a.id AS account_id, a.username, a.role,
                   p.given_name, p.family_name, p.profile_photo, s.expires_at
            FROM auth_sessions s
            JOIN accounts a ON a.id = s.account_id
            LEFT JOIN people p ON p.account_id = a.id
            WHERE s.token_hash = $1 AND s.expires_at > $2 AND a.active
            "#,
        )
        .bind(token_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_auth_session(&self, token_hash: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_expired_auth_sessions(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

async fn insert_identity(
    tx: &mut Transaction<'_, Postgres>,
    input: NewIdentity,
) -> StorageResult<CreatedIdentity> {
    let account = sqlx::query_as::<_, AccountRow>(&format!(
        r#"
        INSERT INTO accounts (id, username, password_hash, role, active)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING {}
        "#,
        ACCOUNT_COLUMNS
    ))
    .bind(Uuid::now_v7())
    .bind(&input.account.username)
    .bind(&input.account.password_hash)
    .bind(input.account.role.as_str())
    .fetch_one(&mut **tx)
    .await?;

    let person = sqlx::query_as::<_, PersonRow>(&format!(
        r#"
        INSERT INTO people (
            id, account_id, given_name, family_name, national_id, email,
            phone, address, locality, id_document_photo
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {}
        "#,
        PERSON_COLUMNS
    ))
    .bind(Uuid::now_v7())
    .bind(account.id)
    .bind(&input.person.given_name)
    .bind(&input.person.family_name)
    .bind(&input.person.national_id)
    .bind(&input.person.email)
    .bind(&input.person.phone)
    .bind(&input.person.address)
    .bind(&input.person.locality)
    .bind(&input.person.id_document_photo)
    .fetch_one(&mut **tx)
    .await?;

    let doctor_id = match &input.doctor {
        Some(doctor) => {
            let doctor_id = sqlx::query_scalar::<_, Uuid>(
                "INSERT INTO doctors (id, person_id, active) VALUES ($1, $2, TRUE) RETURNING id",
            )
            .bind(Uuid::now_v7())
            .bind(person.id)
            .fetch_one(&mut **tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO doctor_specialties (doctor_id, specialty_id, license_number)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(doctor_id)
            .bind(doctor.specialty_id)
            .bind(&doctor.license_number)
            .execute(&mut **tx)
            .await?;

            Some(doctor_id)
        }
        None => None,
    };

    Ok(CreatedIdentity {
        account,
        person,
        doctor_id,
    })
}
