use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use courier_core::credentials::CredentialStore;
use courier_core::messages::MessageStore;
use courier_types::api::{LoginRequest, LoginResponse, RegisterRequest};

use crate::{error_status, join_error};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub credentials: CredentialStore,
    pub messages: MessageStore,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Validate input
    if req.username.is_empty() || req.username.len() > 32 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.len() < 8 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let profile = state.credentials.register(req).await.map_err(error_status)?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Verify the credential, then record the login. A wrong password is 401;
/// an unknown username stays 404 — collapsing the two is an upstream
/// concern.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let ok = state
        .credentials
        .authenticate(&req.username, &req.password)
        .await
        .map_err(error_status)?;
    if !ok {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let credentials = state.credentials.clone();
    let username = req.username.clone();
    let last_login_at = tokio::task::spawn_blocking(move || credentials.record_login(&username))
        .await
        .map_err(join_error)?
        .map_err(error_status)?;

    Ok(Json(LoginResponse {
        username: req.username,
        last_login_at,
    }))
}
