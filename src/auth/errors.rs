//! Authentication error types.
//!
//! One taxonomy ([`AuthErrorKind`]) shared by the gate, the refresh endpoint and the
//! credential endpoints. The user-facing message depends on which of those surfaces
//! rejected the request.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::cookie::CookiePolicy;
use crate::jwt::TokenError;

/// Internal auth error kind used by the core authentication logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No token or cookie was presented
    TransportMissing,
    Malformed,
    InvalidSignature,
    Expired,
    /// Token is valid but its subject no longer exists
    UnknownSubject,
    DuplicateRegistration,
    /// Unknown email or wrong password; deliberately indistinguishable
    CredentialMismatch,
    /// Collaborator failure (database, hashing, clock, signing)
    Internal,
}

impl From<&TokenError> for AuthErrorKind {
    fn from(e: &TokenError) -> Self {
        match e {
            TokenError::Malformed | TokenError::WrongClass => AuthErrorKind::Malformed,
            TokenError::InvalidSignature => AuthErrorKind::InvalidSignature,
            TokenError::Expired => AuthErrorKind::Expired,
            TokenError::Encoding(_) | TokenError::TimeError | TokenError::LifetimeOverflow => {
                AuthErrorKind::Internal
            }
        }
    }
}

impl AuthErrorKind {
    /// Whether the error is about the presented token itself.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthErrorKind::Malformed | AuthErrorKind::InvalidSignature | AuthErrorKind::Expired
        )
    }
}

/// Which endpoint family produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Bearer-token gate in front of protected resources
    Gate,
    /// Refresh-cookie rotation endpoint
    Refresh,
    /// Register and login
    Credentials,
}

/// Authentication error with a stable, user-safe JSON response.
#[derive(Debug)]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub surface: Surface,
    /// `Set-Cookie` value to attach (refresh cookie removal)
    clear_cookie: Option<String>,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, surface: Surface) -> Self {
        Self {
            kind,
            surface,
            clear_cookie: None,
        }
    }

    pub fn gate(kind: AuthErrorKind) -> Self {
        Self::new(kind, Surface::Gate)
    }

    pub fn credentials(kind: AuthErrorKind) -> Self {
        Self::new(kind, Surface::Credentials)
    }

    /// Refresh errors that concern the token clear the cookie so the client stops retrying it.
    pub fn refresh(kind: AuthErrorKind, cookies: CookiePolicy) -> Self {
        let clear = kind.is_token_error() || kind == AuthErrorKind::Internal;
        Self {
            kind,
            surface: Surface::Refresh,
            clear_cookie: clear.then(|| cookies.clear_refresh_cookie()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            AuthErrorKind::DuplicateRegistration => StatusCode::BAD_REQUEST,
            AuthErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            AuthErrorKind::TransportMissing
            | AuthErrorKind::Malformed
            | AuthErrorKind::InvalidSignature
            | AuthErrorKind::Expired
            | AuthErrorKind::UnknownSubject
            | AuthErrorKind::CredentialMismatch => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn message(&self) -> &'static str {
        match (self.surface, self.kind) {
            (Surface::Gate, AuthErrorKind::TransportMissing) => "No token provided",
            (Surface::Refresh, AuthErrorKind::TransportMissing) => "Refresh token required",
            (Surface::Refresh, AuthErrorKind::Expired) => "Invalid or expired refresh token",
            (Surface::Refresh, AuthErrorKind::Malformed | AuthErrorKind::InvalidSignature) => {
                "Invalid refresh token"
            }
            (Surface::Refresh, AuthErrorKind::Internal) => "Internal server error",
            (_, AuthErrorKind::Malformed | AuthErrorKind::InvalidSignature | AuthErrorKind::Expired) => {
                "Invalid token"
            }
            (_, AuthErrorKind::UnknownSubject) => "User not found",
            (_, AuthErrorKind::DuplicateRegistration) => "User already exists",
            (_, AuthErrorKind::CredentialMismatch) => "Invalid credentials",
            (_, AuthErrorKind::TransportMissing) => "Not authenticated",
            (_, AuthErrorKind::Internal) => "Server error",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: (self.surface == Surface::Refresh).then_some(false),
            message: self.message(),
        };

        let mut response = (self.status_code(), Json(body)).into_response();

        if let Some(cookie) = &self.clear_cookie {
            CookiePolicy::append(response.headers_mut(), cookie);
        }

        response
    }
}
