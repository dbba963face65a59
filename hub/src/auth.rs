use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::HubError;

/// Token the dashboard clients must present, injected as a request extension.
/// Tokens are issued by the external identity provider; the hub only checks them.
#[derive(Clone, Default)]
pub struct AuthToken(pub String);

/// Axum middleware guarding the `/api` tree.
///
/// With a configured token every API request needs `Authorization: Bearer
/// <token>`; anything else gets a 401.  The health probe and the static
/// frontend are never guarded, and an empty token turns the check off.
pub async fn require_auth(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    let guarded = path == "/api" || path.starts_with("/api/");
    let expected = request
        .extensions()
        .get::<AuthToken>()
        .map(|t| t.0.as_str())
        .unwrap_or_default();

    if !guarded || expected.is_empty() || bearer_matches(&request, expected) {
        return next.run(request).await;
    }

    tracing::debug!("Rejected unauthenticated request to {path}");
    HubError::Unauthorized.into_response()
}

fn bearer_matches(request: &Request, expected: &str) -> bool {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|presented| constant_time_eq(presented.as_bytes(), expected.as_bytes()))
}

/// Byte comparison whose running time does not depend on where the inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
