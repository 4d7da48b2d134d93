use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// The authenticated username on whose behalf the request runs. Resolved by
/// the upstream authenticating proxy, never inferred from ambient state;
/// every guarded handler takes it explicitly.
#[derive(Debug, Clone)]
pub struct Principal(pub String);

/// Header the upstream authenticator injects after verifying credentials.
pub const PRINCIPAL_HEADER: &str = "x-auth-user";

/// Extract the principal for protected routes. Requests that arrive without
/// an upstream-resolved identity are rejected before any handler runs.
pub async fn require_principal(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let username = req
        .headers()
        .get(PRINCIPAL_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    req.extensions_mut().insert(Principal(username));
    Ok(next.run(req).await)
}
