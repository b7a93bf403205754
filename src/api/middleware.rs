//! Admin access-key middleware.
//!
//! Extracts `X-Access-Key`, decodes the obfuscated token through the gate,
//! and rejects the request when the recovered code no longer matches. This
//! is the same re-derivation the gate performs on every page load.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Header carrying the obfuscated access key issued by `/api/admin/verify`.
pub const ACCESS_KEY_HEADER: &str = "X-Access-Key";

/// Require a valid admin access key.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_admin(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_admin_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_admin_inner(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get(ACCESS_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if !ctx.gate.check_token(token) {
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}
