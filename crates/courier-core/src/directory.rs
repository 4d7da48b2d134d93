use std::sync::Arc;

use courier_db::Database;
use courier_types::error::{Error, Result};
use courier_types::models::PublicProfile;

/// Read-side username -> public profile resolution. No mutation; used to
/// embed counterpart identity into message views.
#[derive(Clone)]
pub struct Directory {
    db: Arc<Database>,
}

impl Directory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Resolve a username to its public projection. Fails with NotFound for
    /// an unknown username; never discloses the hash or timestamps.
    pub fn resolve(&self, username: &str) -> Result<PublicProfile> {
        let row = self
            .db
            .get_user(username)?
            .ok_or_else(|| Error::NotFound(format!("user {username}")))?;
        Ok(PublicProfile {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
        })
    }
}
