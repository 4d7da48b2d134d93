use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use courier_db::Database;
use courier_db::models::{MessageRow, ProfileRow};
use courier_db::queries::MarkReadOutcome;
use courier_types::error::{Error, Result};
use courier_types::models::{
    InboundMessage, Message, OutboundMessage, PublicProfile, ReadReceipt,
};

use crate::directory::Directory;
use crate::{fmt_ts, now, parse_ts};

/// Owns message records: creation, retrieval, the one-way unread -> read
/// transition. Authorization is not checked here — the boundary evaluates
/// the guard predicates before calling in.
#[derive(Clone)]
pub struct MessageStore {
    db: Arc<Database>,
    directory: Directory,
}

impl MessageStore {
    pub fn new(db: Arc<Database>, directory: Directory) -> Self {
        Self { db, directory }
    }

    /// Create a message. Both usernames must resolve; self-messaging is
    /// allowed. The record starts unread with a fresh id.
    pub fn send(&self, from_username: &str, to_username: &str, body: &str) -> Result<Message> {
        let from_user = self.directory.resolve(from_username)?;
        let to_user = self.directory.resolve(to_username)?;

        let id = Uuid::new_v4();
        let sent_at = now();
        self.db.insert_message(
            &id.to_string(),
            &from_user.username,
            &to_user.username,
            body,
            &fmt_ts(sent_at),
        )?;

        debug!(%id, from = %from_user.username, to = %to_user.username, "message stored");
        Ok(Message {
            id,
            from_user,
            to_user,
            body: body.to_string(),
            sent_at,
            read_at: None,
        })
    }

    pub fn get(&self, id: Uuid) -> Result<Message> {
        let row = self
            .db
            .get_message(&id.to_string())?
            .ok_or_else(|| Error::NotFound(format!("message {id}")))?;
        message_from_row(row)
    }

    /// Unread -> read. At most one caller ever observes success; the rest
    /// get Conflict, and the stored timestamp is never overwritten.
    /// Re-marking is a distinguishable failure, not a no-op.
    pub fn mark_read(&self, id: Uuid) -> Result<ReadReceipt> {
        let read_at = now();
        match self.db.mark_read(&id.to_string(), &fmt_ts(read_at))? {
            MarkReadOutcome::Marked => {
                debug!(%id, "message marked read");
                Ok(ReadReceipt { id, read_at })
            }
            MarkReadOutcome::AlreadyRead => {
                Err(Error::Conflict(format!("message {id} already read")))
            }
            MarkReadOutcome::Missing => Err(Error::NotFound(format!("message {id}"))),
        }
    }

    /// Messages sent by a user, `sent_at` ascending, recipient profile
    /// embedded. Each call is a fresh query reflecting current state.
    pub fn messages_from(&self, username: &str) -> Result<Vec<OutboundMessage>> {
        self.db
            .messages_from(username)?
            .into_iter()
            .map(|row| {
                let msg = message_from_row(row)?;
                Ok(OutboundMessage {
                    id: msg.id,
                    to_user: msg.to_user,
                    body: msg.body,
                    sent_at: msg.sent_at,
                    read_at: msg.read_at,
                })
            })
            .collect()
    }

    /// Messages received by a user, `sent_at` ascending, sender profile
    /// embedded.
    pub fn messages_to(&self, username: &str) -> Result<Vec<InboundMessage>> {
        self.db
            .messages_to(username)?
            .into_iter()
            .map(|row| {
                let msg = message_from_row(row)?;
                Ok(InboundMessage {
                    id: msg.id,
                    from_user: msg.from_user,
                    body: msg.body,
                    sent_at: msg.sent_at,
                    read_at: msg.read_at,
                })
            })
            .collect()
    }
}

fn profile_from_row(row: ProfileRow) -> PublicProfile {
    PublicProfile {
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        phone: row.phone,
    }
}

fn message_from_row(row: MessageRow) -> Result<Message> {
    Ok(Message {
        id: row
            .id
            .parse()
            .map_err(|e| Error::Storage(anyhow::anyhow!("corrupt message id {:?}: {e}", row.id)))?,
        from_user: profile_from_row(row.from_user),
        to_user: profile_from_row(row.to_user),
        body: row.body,
        sent_at: parse_ts(&row.sent_at)?,
        read_at: row.read_at.as_deref().map(parse_ts).transpose()?,
    })
}
