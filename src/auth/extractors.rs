//! Axum extractor gating protected resources on a bearer access token.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use super::errors::{AuthError, AuthErrorKind};
use super::state::HasAuthBackend;
use crate::jwt::{Subject, TokenCodec};

/// Extract the token from an `Authorization: Bearer <token>` header.
/// Returns `None` when the header is absent, not UTF-8, uses another scheme, or is empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let rest = value.strip_prefix("Bearer ")?;
    rest.split_whitespace().next()
}

/// Verify the bearer access token in `headers` and resolve its subject.
pub fn authenticate_bearer(headers: &HeaderMap, codec: &TokenCodec) -> Result<Subject, AuthErrorKind> {
    let token = bearer_token(headers).ok_or(AuthErrorKind::TransportMissing)?;

    codec
        .decode(token)
        .map(|claims| claims.sub)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AuthErrorKind::from(&e)
        })
}

/// Extractor for endpoints that require a valid access token.
/// The resolved subject is handed to the handler; nothing is looked up in the database.
pub struct Auth(pub Subject);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate_bearer(&parts.headers, state.tokens().access_codec())
            .map(Auth)
            .map_err(AuthError::gate)
    }
}
