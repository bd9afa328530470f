//! Token pair issuance.

use crate::jwt::{Subject, TokenClaims, TokenClass, TokenCodec, TokenError, now_secs};

/// Default access token duration: 15 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 15 * 60;

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Lifetimes applied to each token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub access_secs: u64,
    pub refresh_secs: u64,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            access_secs: ACCESS_TOKEN_DURATION_SECS,
            refresh_secs: REFRESH_TOKEN_DURATION_SECS,
        }
    }
}

/// A freshly minted access/refresh pair for one subject.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Signed access token
    pub access: String,
    /// Signed refresh token
    pub refresh: String,
    /// Refresh token lifetime in seconds (cookie Max-Age)
    pub refresh_duration: u64,
}

/// Mints and verifies token pairs. Each class is signed with its own secret, so a leaked
/// access secret cannot forge refresh tokens and vice versa.
#[derive(Clone)]
pub struct TokenIssuer {
    access: TokenCodec,
    refresh: TokenCodec,
    policy: ExpiryPolicy,
}

impl TokenIssuer {
    pub fn new(access_secret: &[u8], refresh_secret: &[u8], policy: ExpiryPolicy) -> Self {
        Self {
            access: TokenCodec::new(TokenClass::Access, access_secret),
            refresh: TokenCodec::new(TokenClass::Refresh, refresh_secret),
            policy,
        }
    }

    /// Issue a new pair for `subject` using the wall clock.
    pub fn issue_pair(&self, subject: &Subject) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(subject, now_secs()?)
    }

    /// Issue a new pair for `subject` as of `now` (Unix seconds).
    pub fn issue_pair_at(&self, subject: &Subject, now: u64) -> Result<TokenPair, TokenError> {
        let access = TokenClaims::new(
            subject.clone(),
            TokenClass::Access,
            now,
            self.policy.access_secs,
        )?;
        let refresh = TokenClaims::new(
            subject.clone(),
            TokenClass::Refresh,
            now,
            self.policy.refresh_secs,
        )?;

        Ok(TokenPair {
            access: self.access.encode(&access)?,
            refresh: self.refresh.encode(&refresh)?,
            refresh_duration: self.policy.refresh_secs,
        })
    }

    /// Validate and decode an access token.
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.access.decode(token)
    }

    /// Validate and decode a refresh token.
    pub fn verify_refresh(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.refresh.decode(token)
    }

    pub fn access_codec(&self) -> &TokenCodec {
        &self.access
    }

    pub fn refresh_codec(&self) -> &TokenCodec {
        &self.refresh
    }
}
