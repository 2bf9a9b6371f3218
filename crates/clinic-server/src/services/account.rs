// Account service: login, user management and own-profile changes

use anyhow::anyhow;
use clinic_core::{Account, FieldError, Role};
use thiserror::Error;
use uuid::Uuid;

use super::ServiceError;
use crate::storage::password::{hash_password, verify_against_dummy, verify_password};
use crate::storage::{AccountRow, StorageBackend, UpdateAccount};

/// Same message for unknown user, inactive account and wrong password
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("login failed: {0}")]
    Failed(#[from] anyhow::Error),
}

/// Fields an account edit may change; None leaves the stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    pub username: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
    /// Must equal `password` when present
    pub confirmation: Option<String>,
    pub profile_photo: Option<String>,
}

pub struct AccountService {
    db: StorageBackend,
}

impl AccountService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Check a credential against an active account
    pub async fn login(&self, username: &str, password: &str) -> Result<AccountRow, LoginError> {
        let account = self
            .db
            .get_account_by_username(username.trim())
            .await
            .map_err(|e| {
                tracing::error!("Database error during login: {}", e);
                LoginError::Failed(e.into())
            })?;

        let Some(account) = account else {
            verify_against_dummy(password);
            tracing::warn!("Rejected login for unknown username");
            return Err(LoginError::InvalidCredentials);
        };

        let valid = verify_password(password, &account.password_hash).map_err(|e| {
            tracing::error!("Password verification error: {}", e);
            LoginError::Failed(anyhow!(e))
        })?;

        if !valid || !account.active {
            tracing::warn!(account_id = %account.id, "Rejected login");
            return Err(LoginError::InvalidCredentials);
        }

        tracing::info!(account_id = %account.id, "Login succeeded");
        Ok(account)
    }

    pub async fn list(&self, role: Option<Role>) -> Result<Vec<Account>, ServiceError> {
        let rows = self.db.list_accounts(role).await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Account>, ServiceError> {
        let row = self.db.get_account_listing(id).await?;
        Ok(row.map(Account::from))
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<Option<Account>, ServiceError> {
        let username = match input.username {
            Some(username) => Some(clinic_core::require("username", &username)?.to_string()),
            None => None,
        };

        let password_hash = match input.password {
            Some(password) => {
                if let Some(confirmation) = &input.confirmation {
                    if *confirmation != password {
                        return Err(
                            FieldError::new("confirm_password", "Passwords do not match").into()
                        );
                    }
                }
                let hash = hash_password(&password).map_err(|e| {
                    tracing::error!("Password hashing error: {}", e);
                    ServiceError::Failed(anyhow!(e))
                })?;
                Some(hash)
            }
            None => None,
        };

        let updated = self
            .db
            .update_account(
                id,
                UpdateAccount {
                    username,
                    role: input.role,
                    password_hash,
                    profile_photo: input.profile_photo,
                },
            )
            .await?;

        if updated.is_none() {
            return Ok(None);
        }
        tracing::info!(account_id = %id, "Updated account");
        self.get(id).await
    }

    /// Set the account status, or flip it when `active` is None
    pub async fn set_status(
        &self,
        id: Uuid,
        active: Option<bool>,
    ) -> Result<Option<bool>, ServiceError> {
        let value = self.db.set_account_active(id, active).await?;
        if let Some(value) = value {
            tracing::info!(account_id = %id, active = value, "Changed account status");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::registrar::{
        Credential, PersonDetails, Profile, Registrar, RegistrationRequest,
    };

    async fn seeded() -> (AccountService, Uuid) {
        let db = StorageBackend::in_memory();
        let registrar = Registrar::new(db.clone(), true);
        let registered = registrar
            .register(RegistrationRequest {
                person: PersonDetails {
                    given_name: "Ana".into(),
                    family_name: "Gomez".into(),
                    national_id: "100".into(),
                    email: "ana@example.com".into(),
                    ..Default::default()
                },
                username: "ana@example.com".into(),
                credential: Credential::Supplied {
                    password: "secret".into(),
                    confirmation: None,
                },
                profile: Profile::Secretary,
            })
            .await
            .unwrap();
        (AccountService::new(db), registered.account_id)
    }

    #[tokio::test]
    async fn test_login_success_and_uniform_failures() {
        let (service, id) = seeded().await;

        let account = service.login("ana@example.com", "secret").await.unwrap();
        assert_eq!(account.id, id);

        let wrong = service.login("ana@example.com", "nope").await.unwrap_err();
        let unknown = service.login("bob@example.com", "secret").await.unwrap_err();
        service.set_status(id, Some(false)).await.unwrap();
        let inactive = service.login("ana@example.com", "secret").await.unwrap_err();

        assert_eq!(wrong.to_string(), INVALID_CREDENTIALS);
        assert_eq!(unknown.to_string(), INVALID_CREDENTIALS);
        assert_eq!(inactive.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_update_rehashes_password() {
        let (service, id) = seeded().await;

        let updated = service
            .update(
                id,
                UpdateAccountInput {
                    password: Some("changed".into()),
                    role: Some(Role::Doctor),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.role, Role::Doctor);
        assert!(service.login("ana@example.com", "secret").await.is_err());
        assert!(service.login("ana@example.com", "changed").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_checks_confirmation_and_missing_account() {
        let (service, id) = seeded().await;

        let err = service
            .update(
                id,
                UpdateAccountInput {
                    password: Some("a".into()),
                    confirmation: Some("b".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(ref f) if f.field == "confirm_password"));

        let missing = service
            .update(Uuid::now_v7(), UpdateAccountInput::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
