use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};
use chrono::{DateTime, Utc};
use tracing::info;

use courier_db::Database;
use courier_db::models::UserRow;
use courier_types::api::RegisterRequest;
use courier_types::error::{Error, Result};
use courier_types::models::{PublicProfile, User};

use crate::{fmt_ts, now, parse_ts};

/// Argon2id cost parameters. Fixed by configuration at construction; each
/// stored hash records the parameters it was produced with, so verification
/// is unaffected by later tuning.
#[derive(Debug, Clone)]
pub struct HashSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashSettings {
    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| Error::Storage(anyhow::anyhow!("invalid argon2 parameters: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Owns user records: registration, password verification, login-timestamp
/// tracking. The only component that ever sees a password or its hash.
#[derive(Clone)]
pub struct CredentialStore {
    db: Arc<Database>,
    hash: HashSettings,
}

impl CredentialStore {
    pub fn new(db: Arc<Database>, hash: HashSettings) -> Self {
        Self { db, hash }
    }

    /// Register a new user and return the public projection of the record.
    /// Fails with Conflict when the username is taken. The plaintext
    /// password is consumed here: it is hashed on a blocking worker and only
    /// the hash is persisted.
    pub async fn register(&self, req: RegisterRequest) -> Result<PublicProfile> {
        let settings = self.hash.clone();
        let password = req.password;
        let hash = tokio::task::spawn_blocking(move || hash_password(&settings, &password))
            .await
            .map_err(|e| Error::Storage(anyhow::anyhow!("hash worker failed: {e}")))??;

        let joined_at = fmt_ts(now());
        let row = UserRow {
            username: req.username,
            password: hash,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            last_login_at: joined_at.clone(),
            joined_at,
        };
        if !self.db.create_user(&row)? {
            return Err(Error::Conflict(format!(
                "username {} already taken",
                row.username
            )));
        }

        info!(username = %row.username, "registered user");
        Ok(PublicProfile {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
        })
    }

    /// Check a password against the stored hash. Fails with NotFound for an
    /// unknown username; returns false — not an error — for a wrong
    /// password. Verification runs on a blocking worker.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let row = self
            .db
            .get_user(username)?
            .ok_or_else(|| Error::NotFound(format!("user {username}")))?;

        let stored = row.password;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || verify_password(&stored, &password))
            .await
            .map_err(|e| Error::Storage(anyhow::anyhow!("hash worker failed: {e}")))?
    }

    /// Advance `last_login_at` and return the new timestamp.
    pub fn record_login(&self, username: &str) -> Result<DateTime<Utc>> {
        let logged_in = now();
        if !self.db.touch_last_login(username, &fmt_ts(logged_in))? {
            return Err(Error::NotFound(format!("user {username}")));
        }
        info!(username, "login recorded");
        Ok(logged_in)
    }

    /// Full record, password hash included — internal use. External
    /// surfaces must project before disclosure.
    pub fn get(&self, username: &str) -> Result<User> {
        let row = self
            .db
            .get_user(username)?
            .ok_or_else(|| Error::NotFound(format!("user {username}")))?;
        user_from_row(row)
    }

    /// Every user record, unfiltered. Projection to public fields is the
    /// caller's responsibility.
    pub fn list_all(&self) -> Result<Vec<User>> {
        self.db.list_users()?.into_iter().map(user_from_row).collect()
    }
}

fn hash_password(settings: &HashSettings, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = settings
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Storage(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(stored: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| Error::Storage(anyhow::anyhow!("stored hash is corrupt: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Storage(anyhow::anyhow!(
            "password verification failed: {e}"
        ))),
    }
}

fn user_from_row(row: UserRow) -> Result<User> {
    Ok(User {
        username: row.username,
        password_hash: row.password,
        first_name: row.first_name,
        last_name: row.last_name,
        phone: row.phone,
        joined_at: parse_ts(&row.joined_at)?,
        last_login_at: parse_ts(&row.last_login_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> CredentialStore {
        let db = Arc::new(Database::open_in_memory().unwrap());
        // minimal cost parameters: these tests exercise behavior, not work factor
        let hash = HashSettings {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };
        CredentialStore::new(db, hash)
    }

    fn alice() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            password: "correct horse battery".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Ames".to_string(),
            phone: "+15551230001".to_string(),
        }
    }

    #[tokio::test]
    async fn register_returns_public_projection() {
        let store = test_store();
        let profile = store.register(alice()).await.unwrap();
        assert_eq!(
            profile,
            PublicProfile {
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Ames".to_string(),
                phone: "+15551230001".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = test_store();
        store.register(alice()).await.unwrap();
        let second = store.register(alice()).await;
        assert!(matches!(second, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn stored_hash_is_never_the_password() {
        let store = test_store();
        store.register(alice()).await.unwrap();

        let user = store.get("alice").unwrap();
        assert_ne!(user.password_hash, "correct horse battery");
        assert!(user.password_hash.starts_with("$argon2id$"));

        assert!(store.authenticate("alice", "correct horse battery").await.unwrap());
    }

    #[tokio::test]
    async fn authenticate_distinguishes_wrong_password_from_unknown_user() {
        let store = test_store();
        store.register(alice()).await.unwrap();

        assert!(store.authenticate("alice", "correct horse battery").await.unwrap());
        assert!(!store.authenticate("alice", "wrong").await.unwrap());
        assert!(matches!(
            store.authenticate("nobody", "whatever").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn record_login_advances_timestamp() {
        let store = test_store();
        store.register(alice()).await.unwrap();

        let before = store.get("alice").unwrap();
        let logged_in = store.record_login("alice").unwrap();
        let after = store.get("alice").unwrap();

        assert_eq!(after.last_login_at, logged_in);
        assert!(after.last_login_at >= before.last_login_at);
        assert_eq!(after.joined_at, before.joined_at);

        assert!(matches!(
            store.record_login("nobody"),
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_all_returns_full_records() {
        let store = test_store();
        store.register(alice()).await.unwrap();

        let users = store.list_all().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "alice");
        assert!(!users[0].password_hash.is_empty());
    }
}
