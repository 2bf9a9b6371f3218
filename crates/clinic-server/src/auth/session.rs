// Server-side login sessions
// Decision: Opaque random tokens in the cookie, only the SHA-256 hash is stored
// Decision: Expired rows are ignored on lookup and purged when a new session starts

use chrono::Utc;
use rand::Rng;
use std::time::Duration;
use uuid::Uuid;

use super::middleware::SessionUser;
use crate::storage::{CreateAuthSessionRow, StorageBackend, StorageError, StorageResult};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "clinic_session";

/// Generate a session token (64 hex characters)
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

/// Hash a token for database storage (using SHA-256)
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(token.as_bytes());
    hex::encode(hash)
}

#[derive(Clone)]
pub struct SessionStore {
    db: StorageBackend,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(db: StorageBackend, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Start a session for an account and return the raw cookie token
    pub async fn create(&self, account_id: Uuid) -> StorageResult<String> {
        match self.db.delete_expired_auth_sessions().await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!("Purged {} expired sessions", purged),
            Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
        }

        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                StorageError::Internal(anyhow::anyhow!("session ttl out of range: {:?}", self.ttl))
            })?;
        let token = generate_token();

        self.db
            .create_auth_session(CreateAuthSessionRow {
                account_id,
                token_hash: hash_token(&token),
                expires_at,
            })
            .await?;

        Ok(token)
    }

    /// Resolve a raw cookie token to its user, if the session is live
    pub async fn resolve(&self, token: &str) -> StorageResult<Option<SessionUser>> {
        let row = self.db.get_session_account(&hash_token(token)).await?;
        Ok(row.map(SessionUser::from))
    }

    pub async fn destroy(&self, token: &str) -> StorageResult<bool> {
        self.db.delete_auth_session(&hash_token(token)).await
    }
}
