/// Database row types — these map directly to SQLite rows.
/// Distinct from the courier-types API models to keep the DB layer
/// independent; timestamps stay as the RFC 3339 text the columns hold.

pub struct UserRow {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: String,
    pub last_login_at: String,
}

/// The public-profile columns selected off a joined `users` row.
pub struct ProfileRow {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

pub struct MessageRow {
    pub id: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
    pub from_user: ProfileRow,
    pub to_user: ProfileRow,
}
