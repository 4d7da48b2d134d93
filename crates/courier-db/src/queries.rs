use crate::Database;
use crate::models::{MessageRow, ProfileRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

/// Outcome of the conditional unread -> read update.
#[derive(Debug, PartialEq, Eq)]
pub enum MarkReadOutcome {
    /// This caller won the transition.
    Marked,
    /// The message exists but `read_at` was already set.
    AlreadyRead,
    /// No such message id.
    Missing,
}

impl Database {
    // -- Users --

    /// Insert a new user row. Returns false when the username is taken —
    /// the primary-key constraint is the uniqueness check, so the insert
    /// stays a single atomic statement.
    pub fn create_user(&self, row: &UserRow) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password, first_name, last_name, phone, joined_at, last_login_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.username,
                    row.password,
                    row.first_name,
                    row.last_name,
                    row.phone,
                    row.joined_at,
                    row.last_login_at,
                ],
            );
            match inserted {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, username))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY username"
            ))?;
            let rows = stmt
                .query_map([], row_to_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Advance `last_login_at`. Returns false when the username is unknown.
    pub fn touch_last_login(&self, username: &str, when: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET last_login_at = ?2 WHERE username = ?1",
                params![username, when],
            )?;
            Ok(changed == 1)
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        id: &str,
        from_username: &str,
        to_username: &str,
        body: &str,
        sent_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, from_username, to_username, body, sent_at, read_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
                params![id, from_username, to_username, body, sent_at],
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    pub fn messages_from(&self, username: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, "m.from_username = ?1", username))
    }

    pub fn messages_to(&self, username: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, "m.to_username = ?1", username))
    }

    /// Conditional unread -> read transition. The UPDATE only fires while
    /// `read_at` is null, so of any number of concurrent callers exactly one
    /// observes `Marked`; the row is never overwritten once set.
    pub fn mark_read(&self, id: &str, when: &str) -> Result<MarkReadOutcome> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET read_at = ?2 WHERE id = ?1 AND read_at IS NULL",
                params![id, when],
            )?;
            if changed == 1 {
                return Ok(MarkReadOutcome::Marked);
            }
            let exists = conn
                .query_row("SELECT 1 FROM messages WHERE id = ?1", [id], |_| Ok(()))
                .optional()?;
            Ok(match exists {
                Some(()) => MarkReadOutcome::AlreadyRead,
                None => MarkReadOutcome::Missing,
            })
        })
    }
}

const USER_COLUMNS: &str =
    "username, password, first_name, last_name, phone, joined_at, last_login_at";

// Both party profiles are joined in up front — message views always embed
// the counterpart, and the single query avoids an N+1 on listings.
const MESSAGE_COLUMNS: &str = "m.id, m.body, m.sent_at, m.read_at, \
     f.username, f.first_name, f.last_name, f.phone, \
     t.username, t.first_name, t.last_name, t.phone";

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        username: row.get(0)?,
        password: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        phone: row.get(4)?,
        joined_at: row.get(5)?,
        last_login_at: row.get(6)?,
    })
}

fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        body: row.get(1)?,
        sent_at: row.get(2)?,
        read_at: row.get(3)?,
        from_user: ProfileRow {
            username: row.get(4)?,
            first_name: row.get(5)?,
            last_name: row.get(6)?,
            phone: row.get(7)?,
        },
        to_user: ProfileRow {
            username: row.get(8)?,
            first_name: row.get(9)?,
            last_name: row.get(10)?,
            phone: row.get(11)?,
        },
    })
}

fn query_user(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
    ))?;

    let row = stmt.query_row([username], row_to_user).optional()?;

    Ok(row)
}

fn query_message(conn: &Connection, id: &str) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLUMNS}
         FROM messages m
         JOIN users f ON m.from_username = f.username
         JOIN users t ON m.to_username = t.username
         WHERE m.id = ?1"
    ))?;

    let row = stmt.query_row([id], row_to_message).optional()?;

    Ok(row)
}

fn query_messages(conn: &Connection, filter: &str, username: &str) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLUMNS}
         FROM messages m
         JOIN users f ON m.from_username = f.username
         JOIN users t ON m.to_username = t.username
         WHERE {filter}
         ORDER BY m.sent_at ASC, m.id ASC"
    ))?;

    let rows = stmt
        .query_map([username], row_to_message)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_row(username: &str) -> UserRow {
        UserRow {
            username: username.to_string(),
            password: "$argon2id$stub".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: "+15550000000".to_string(),
            joined_at: "2026-01-01T00:00:00.000000Z".to_string(),
            last_login_at: "2026-01-01T00:00:00.000000Z".to_string(),
        }
    }

    #[test]
    fn duplicate_username_is_rejected_without_error() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.create_user(&user_row("alice")).unwrap());
        assert!(!db.create_user(&user_row("alice")).unwrap());
    }

    #[test]
    fn mark_read_transitions_exactly_once() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user_row("alice")).unwrap();
        db.create_user(&user_row("bob")).unwrap();
        db.insert_message("m1", "alice", "bob", "hi", "2026-01-02T00:00:00.000000Z")
            .unwrap();

        let first = db.mark_read("m1", "2026-01-02T00:00:01.000000Z").unwrap();
        assert_eq!(first, MarkReadOutcome::Marked);

        let second = db.mark_read("m1", "2026-01-02T00:00:02.000000Z").unwrap();
        assert_eq!(second, MarkReadOutcome::AlreadyRead);

        // the losing call must not have overwritten the timestamp
        let row = db.get_message("m1").unwrap().unwrap();
        assert_eq!(row.read_at.as_deref(), Some("2026-01-02T00:00:01.000000Z"));

        assert_eq!(
            db.mark_read("missing", "2026-01-02T00:00:03.000000Z").unwrap(),
            MarkReadOutcome::Missing
        );
    }
}
