use crate::config::AdminConfig;
use crate::db::DashboardStorage;
use crate::error::DashboardError;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// Lowercase hex SHA-256 digest of `password`. Unsalted.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compare a stored digest against the digest of `provided`, in constant time.
pub fn verify_password(stored_hash: &str, provided: &str) -> bool {
    let candidate = hash_password(provided);
    bool::from(stored_hash.as_bytes().ct_eq(candidate.as_bytes()))
}

/// Checks submitted credentials against the `admin` table.
#[derive(Clone)]
pub struct Authenticator {
    storage: DashboardStorage,
    default_hash: String,
}

impl Authenticator {
    pub fn new(storage: DashboardStorage, admin: &AdminConfig) -> Self {
        Self {
            storage,
            default_hash: hash_password(&admin.default_password),
        }
    }

    /// Create the admin row on first run. Safe to call on every start.
    pub async fn ensure_admin_exists(&self, admin: &AdminConfig) -> Result<(), DashboardError> {
        self.storage.init_schema().await?;
        let created = self
            .storage
            .ensure_admin_exists(&admin.username, &self.default_hash)
            .await?;
        if created {
            info!(username = %admin.username, "created default admin credential");
        }
        let admins = self.storage.list_admins().await?;
        if admins.len() > 1 {
            warn!(
                count = admins.len(),
                usernames = ?admins.iter().map(|a| a.username.as_str()).collect::<Vec<_>>(),
                "more than one admin row present"
            );
        }
        if self.default_credential_in_use(&admin.username).await? {
            warn!(
                username = %admin.username,
                "admin still uses the default password; rotate it"
            );
        }
        Ok(())
    }

    /// Unknown user and wrong password both yield `false`.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, DashboardError> {
        let Some(stored) = self.storage.password_hash_for(username).await? else {
            return Ok(false);
        };
        Ok(verify_password(&stored, password))
    }

    pub async fn default_credential_in_use(&self, username: &str) -> Result<bool, DashboardError> {
        Ok(self
            .storage
            .password_hash_for(username)
            .await?
            .is_some_and(|stored| bool::from(stored.as_bytes().ct_eq(self.default_hash.as_bytes()))))
    }
}
