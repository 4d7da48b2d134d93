pub mod auth;
pub mod messages;
pub mod middleware;
pub mod users;

use axum::http::StatusCode;
use courier_types::error::Error;
use tracing::error;

/// Map a core outcome onto the boundary's status surface. Storage failures
/// are logged here — nothing is swallowed silently — and leave the process
/// as an opaque 500.
pub(crate) fn error_status(err: Error) -> StatusCode {
    match err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Conflict(_) => StatusCode::CONFLICT,
        Error::Forbidden(_) => StatusCode::FORBIDDEN,
        Error::Storage(e) => {
            error!("storage error: {e:#}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn join_error(err: tokio::task::JoinError) -> StatusCode {
    error!("blocking task failed: {err}");
    StatusCode::INTERNAL_SERVER_ERROR
}
