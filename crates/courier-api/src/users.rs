use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use courier_types::api::UserDetail;
use courier_types::error::Error;
use courier_types::models::PublicProfile;

use crate::auth::AppState;
use crate::middleware::Principal;
use crate::{error_status, join_error};

/// GET /users — every registered user, projected down to public fields
/// before anything leaves the process.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
) -> Result<impl IntoResponse, StatusCode> {
    let credentials = state.credentials.clone();
    let users = tokio::task::spawn_blocking(move || credentials.list_all())
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    let profiles: Vec<PublicProfile> = users.iter().map(|u| u.public_profile()).collect();
    Ok(Json(profiles))
}

/// GET /users/{username} — account detail, visible to that user only.
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, StatusCode> {
    ensure_self(&principal, &username)?;

    let credentials = state.credentials.clone();
    let user = tokio::task::spawn_blocking(move || credentials.get(&username))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    Ok(Json(UserDetail {
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone,
        joined_at: user.joined_at,
        last_login_at: user.last_login_at,
    }))
}

/// GET /users/{username}/messages/from — the user's outbox.
pub async fn messages_from(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, StatusCode> {
    ensure_self(&principal, &username)?;

    let messages = state.messages.clone();
    let outbox = tokio::task::spawn_blocking(move || messages.messages_from(&username))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    Ok(Json(outbox))
}

/// GET /users/{username}/messages/to — the user's inbox.
pub async fn messages_to(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, StatusCode> {
    ensure_self(&principal, &username)?;

    let messages = state.messages.clone();
    let inbox = tokio::task::spawn_blocking(move || messages.messages_to(&username))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    Ok(Json(inbox))
}

/// Mailboxes and account detail are visible to their owner only.
fn ensure_self(principal: &Principal, username: &str) -> Result<(), StatusCode> {
    if principal.0 != username {
        return Err(error_status(Error::Forbidden(format!(
            "{} may not view {}'s account",
            principal.0, username
        ))));
    }
    Ok(())
}
