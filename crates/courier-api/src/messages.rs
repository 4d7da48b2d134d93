use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use courier_core::guard;
use courier_types::api::SendMessageRequest;
use courier_types::error::Error;

use crate::auth::AppState;
use crate::middleware::Principal;
use crate::{error_status, join_error};

/// GET /messages/{id} — visible to the two parties only. The guard runs
/// here, after the point read and before anything is disclosed.
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, StatusCode> {
    let store = state.messages.clone();
    let message = tokio::task::spawn_blocking(move || store.get(id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    if !guard::can_read(&message, &principal.0) {
        return Err(error_status(Error::Forbidden(format!(
            "{} is not a party to message {id}",
            principal.0
        ))));
    }

    Ok(Json(message))
}

/// POST /messages — the principal is the sender; the request body only
/// names the recipient.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.body.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let store = state.messages.clone();
    let message =
        tokio::task::spawn_blocking(move || store.send(&principal.0, &req.to_username, &req.body))
            .await
            .map_err(join_error)?
            .map_err(error_status)?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /messages/{id}/read — recipient only. The guard is evaluated
/// against the current record before the conditional transition is
/// attempted, so a sender's attempt never reaches the store.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, StatusCode> {
    let store = state.messages.clone();
    let message = tokio::task::spawn_blocking(move || store.get(id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    if !guard::can_mark_read(&message, &principal.0) {
        return Err(error_status(Error::Forbidden(format!(
            "only the recipient may mark message {id} read"
        ))));
    }

    let store = state.messages.clone();
    let receipt = tokio::task::spawn_blocking(move || store.mark_read(id))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    Ok(Json(receipt))
}
