//! Integration tests for the PostgreSQL repositories
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p clinic-server --test postgres_integration_test
//!
//! Skipped when DATABASE_URL is not set. Migrations are applied by the tests.

use chrono::{Duration, Utc};
use clinic_core::Role;
use clinic_server::storage::{
    CreateAccountRow, CreateAuthSessionRow, CreateDoctorRow, CreatePersonRow, Database,
    NewIdentity, StorageError, UniqueField, UpdatePatient,
};
use uuid::Uuid;

/// Connect and migrate, or None when no database is configured
async fn create_test_db() -> Option<Database> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL tests");
        return None;
    };
    let db = Database::from_url(&database_url, 2)
        .await
        .expect("Failed to connect to PostgreSQL");
    db.migrate().await.expect("Failed to run migrations");
    Some(db)
}

/// Unique suffix so runs against a shared database do not collide
fn unique() -> String {
    Uuid::now_v7().simple().to_string()
}

fn identity(suffix: &str, role: Role) -> NewIdentity {
    NewIdentity {
        account: CreateAccountRow {
            username: format!("user-{}@example.com", suffix),
            password_hash: "not-a-real-hash".to_string(),
            role,
        },
        person: CreatePersonRow {
            given_name: "Test".to_string(),
            family_name: format!("Person {}", suffix),
            national_id: format!("dni-{}", suffix),
            email: format!("user-{}@example.com", suffix),
            phone: None,
            address: None,
            locality: None,
            id_document_photo: None,
        },
        doctor: None,
    }
}

async fn count(db: &Database, sql: &str, value: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(value)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

async fn cleanup(db: &Database, suffix: &str) {
    let pattern = format!("%{}%", suffix);
    // Delete in reverse dependency order
    for sql in [
        "DELETE FROM doctor_specialties WHERE doctor_id IN (SELECT d.id FROM doctors d \
         JOIN people p ON p.id = d.person_id JOIN accounts a ON a.id = p.account_id \
         WHERE a.username LIKE $1)",
        "DELETE FROM doctors WHERE person_id IN (SELECT p.id FROM people p \
         JOIN accounts a ON a.id = p.account_id WHERE a.username LIKE $1)",
        "DELETE FROM auth_sessions WHERE account_id IN \
         (SELECT id FROM accounts WHERE username LIKE $1)",
        "DELETE FROM people WHERE account_id IN \
         (SELECT id FROM accounts WHERE username LIKE $1)",
        "DELETE FROM accounts WHERE username LIKE $1",
        "DELETE FROM specialties WHERE name LIKE $1",
    ] {
        sqlx::query(sql)
            .bind(&pattern)
            .execute(db.pool())
            .await
            .ok();
    }
}

#[tokio::test]
async fn test_duplicate_national_id_rolls_back_account() {
    let Some(db) = create_test_db().await else {
        return;
    };
    let suffix = unique();

    db.create_identity(identity(&suffix, Role::Patient))
        .await
        .unwrap();

    let mut second = identity(&format!("{}-b", suffix), Role::Patient);
    second.person.national_id = format!("dni-{}", suffix);
    let err = db.create_identity(second).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::UniqueViolation(UniqueField::NationalId)
    ));

    let orphaned = count(
        &db,
        "SELECT COUNT(*) FROM accounts WHERE username = $1",
        &format!("user-{}-b@example.com", suffix),
    )
    .await;
    assert_eq!(orphaned, 0);

    cleanup(&db, &suffix).await;
}

#[tokio::test]
async fn test_doctor_with_unknown_specialty_rolls_back() {
    let Some(db) = create_test_db().await else {
        return;
    };
    let suffix = unique();

    let mut input = identity(&suffix, Role::Doctor);
    input.doctor = Some(CreateDoctorRow {
        specialty_id: Uuid::now_v7(),
        license_number: "MN-1".to_string(),
    });
    let err = db.create_identity(input).await.unwrap_err();
    assert!(matches!(err, StorageError::ForeignKeyViolation(_)));

    let people = count(
        &db,
        "SELECT COUNT(*) FROM people WHERE national_id = $1",
        &format!("dni-{}", suffix),
    )
    .await;
    assert_eq!(people, 0);

    cleanup(&db, &suffix).await;
}

#[tokio::test]
async fn test_doctor_listing_joins_specialty() {
    let Some(db) = create_test_db().await else {
        return;
    };
    let suffix = unique();

    let specialty = db
        .create_specialty(&format!("Cardiology {}", suffix))
        .await
        .unwrap();
    let mut input = identity(&suffix, Role::Doctor);
    input.doctor = Some(CreateDoctorRow {
        specialty_id: specialty.id,
        license_number: format!("MN-{}", suffix),
    });
    let created = db.create_identity(input).await.unwrap();
    assert!(created.doctor_id.is_some());

    let doctors = db.list_doctors().await.unwrap();
    let doctor = doctors
        .iter()
        .find(|d| d.account_id == created.account.id)
        .unwrap();
    assert_eq!(doctor.specialty_name, specialty.name);

    cleanup(&db, &suffix).await;
}

#[tokio::test]
async fn test_status_toggle_and_explicit_set() {
    let Some(db) = create_test_db().await else {
        return;
    };
    let suffix = unique();

    let specialty = db
        .create_specialty(&format!("Neurology {}", suffix))
        .await
        .unwrap();
    assert!(specialty.active);

    assert_eq!(
        db.set_specialty_active(specialty.id, None).await.unwrap(),
        Some(false)
    );
    assert_eq!(
        db.set_specialty_active(specialty.id, None).await.unwrap(),
        Some(true)
    );
    assert_eq!(
        db.set_specialty_active(specialty.id, Some(true))
            .await
            .unwrap(),
        Some(true)
    );
    assert_eq!(
        db.set_specialty_active(Uuid::now_v7(), None).await.unwrap(),
        None
    );

    let err = db
        .create_specialty(&format!("Neurology {}", suffix))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::UniqueViolation(UniqueField::SpecialtyName)
    ));

    cleanup(&db, &suffix).await;
}

#[tokio::test]
async fn test_patient_update_renames_username() {
    let Some(db) = create_test_db().await else {
        return;
    };
    let suffix = unique();

    let created = db
        .create_identity(identity(&suffix, Role::Patient))
        .await
        .unwrap();
    let new_email = format!("renamed-{}@example.com", suffix);

    let updated = db
        .update_patient(
            created.account.id,
            UpdatePatient {
                given_name: "Renamed".to_string(),
                family_name: format!("Person {}", suffix),
                national_id: format!("dni-{}", suffix),
                email: new_email.clone(),
                phone: Some("555-0101".to_string()),
                address: None,
                locality: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.username, new_email);
    assert_eq!(updated.person.given_name, "Renamed");

    let account = db.get_account_by_username(&new_email).await.unwrap();
    assert_eq!(account.map(|a| a.id), Some(created.account.id));

    cleanup(&db, &suffix).await;
}

#[tokio::test]
async fn test_sessions_expire_and_require_active_account() {
    let Some(db) = create_test_db().await else {
        return;
    };
    let suffix = unique();

    let created = db
        .create_identity(identity(&suffix, Role::Patient))
        .await
        .unwrap();

    let live = format!("live-{}", suffix);
    db.create_auth_session(CreateAuthSessionRow {
        account_id: created.account.id,
        token_hash: live.clone(),
        expires_at: Utc::now() + Duration::hours(1),
    })
    .await
    .unwrap();
    let expired = format!("expired-{}", suffix);
    db.create_auth_session(CreateAuthSessionRow {
        account_id: created.account.id,
        token_hash: expired.clone(),
        expires_at: Utc::now() - Duration::hours(1),
    })
    .await
    .unwrap();

    assert!(db.get_session_account(&live).await.unwrap().is_some());
    assert!(db.get_session_account(&expired).await.unwrap().is_none());

    assert!(db.delete_expired_auth_sessions().await.unwrap() >= 1);
    assert!(!db.delete_auth_session(&expired).await.unwrap());

    db.set_account_active(created.account.id, Some(false))
        .await
        .unwrap();
    assert!(db.get_session_account(&live).await.unwrap().is_none());

    cleanup(&db, &suffix).await;
}
