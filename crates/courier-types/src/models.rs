use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full user record. Deliberately not serializable — the password hash must
/// never leave the credential store; external surfaces use `PublicProfile`
/// or `UserDetail` projections.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl User {
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// The user fields disclosed outside the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// A message with both party profiles embedded.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub from_user: PublicProfile,
    pub to_user: PublicProfile,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// A sent message as it appears in the sender's outbox — only the
/// recipient profile is embedded.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub id: Uuid,
    pub to_user: PublicProfile,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// A received message as it appears in the recipient's inbox.
#[derive(Debug, Clone, Serialize)]
pub struct InboundMessage {
    pub id: Uuid,
    pub from_user: PublicProfile,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Returned by the unread -> read transition.
#[derive(Debug, Clone, Serialize)]
pub struct ReadReceipt {
    pub id: Uuid,
    pub read_at: DateTime<Utc>,
}
