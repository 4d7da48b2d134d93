pub type Result<T> = std::result::Result<T, Error>;

/// Outcome taxonomy shared by every core component. Callers branch on the
/// variant, never on message text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown username or message id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate username on register, or a message that is already read.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A guard predicate rejected the principal. Raised at the boundary,
    /// before the store is invoked — never by the store itself.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A persistence-layer failure with no domain meaning.
    #[error("storage: {0}")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Storage(err)
    }
}
