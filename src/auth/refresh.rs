//! Refresh token rotation.
//!
//! A presented refresh token moves through
//! `Presented -> Decoding -> {Valid, Invalid, Expired} -> {Reissued, Rejected}`.
//! Only a `Valid` token whose subject still exists is `Reissued`: a brand-new pair is
//! minted and the old refresh token is simply superseded. There is no single-use
//! enforcement, so concurrent refreshes with the same valid token are each honored.

use tracing::{debug, error, info};

use super::errors::AuthErrorKind;
use crate::db::{SanitizedUser, UserStore};
use crate::issuer::{TokenIssuer, TokenPair};
use crate::jwt::{Subject, TokenError, now_secs};

/// Result of the decoding step.
#[derive(Debug)]
enum Decoded {
    Valid(Subject),
    /// Bad signature, unparsable, or wrong class
    Invalid(TokenError),
    Expired,
}

impl Decoded {
    fn into_result(self) -> Result<Subject, AuthErrorKind> {
        match self {
            Decoded::Valid(subject) => Ok(subject),
            Decoded::Invalid(e) => Err(AuthErrorKind::from(&e)),
            Decoded::Expired => Err(AuthErrorKind::Expired),
        }
    }
}

/// A successful rotation: the new pair plus the subject's public profile.
#[derive(Debug)]
pub struct Rotation {
    pub pair: TokenPair,
    pub user: SanitizedUser,
}

/// Validates a presented refresh token and re-issues a pair for its subject.
pub struct RefreshCoordinator<'a> {
    tokens: &'a TokenIssuer,
    users: UserStore,
}

impl<'a> RefreshCoordinator<'a> {
    pub fn new(tokens: &'a TokenIssuer, users: UserStore) -> Self {
        Self { tokens, users }
    }

    /// Decode a presented refresh token as of `now`.
    fn decode_at(&self, presented: &str, now: u64) -> Decoded {
        match self.tokens.refresh_codec().decode_at(presented, now) {
            Ok(claims) => Decoded::Valid(claims.sub),
            Err(TokenError::Expired) => Decoded::Expired,
            Err(e) => Decoded::Invalid(e),
        }
    }

    /// Rotate using the wall clock.
    pub async fn rotate(&self, presented: Option<&str>) -> Result<Rotation, AuthErrorKind> {
        let now = now_secs().map_err(|e| {
            error!(error = %e, "Failed to read clock");
            AuthErrorKind::Internal
        })?;
        self.rotate_at(presented, now).await
    }

    /// Rotate as of `now`: yields exactly one new pair, or a rejection with nothing issued.
    pub async fn rotate_at(
        &self,
        presented: Option<&str>,
        now: u64,
    ) -> Result<Rotation, AuthErrorKind> {
        let presented = presented
            .filter(|t| !t.is_empty())
            .ok_or(AuthErrorKind::TransportMissing)?;

        let subject = self.decode_at(presented, now).into_result().map_err(|kind| {
            debug!(?kind, "Rejected refresh token");
            kind
        })?;

        let user = self
            .users
            .find_by_id(subject.as_str())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to get user");
                AuthErrorKind::Internal
            })?
            .ok_or_else(|| {
                debug!(subject = %subject, "Refresh token subject no longer exists");
                AuthErrorKind::UnknownSubject
            })?;

        let pair = self.tokens.issue_pair_at(&subject, now).map_err(|e| {
            error!(error = %e, "Failed to issue token pair");
            AuthErrorKind::Internal
        })?;

        info!(subject = %subject, "Rotated refresh token");

        Ok(Rotation {
            pair,
            user: user.sanitized(),
        })
    }
}
