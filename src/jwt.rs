//! JWT encoding and validation for both token classes.
//!
//! Each [`TokenCodec`] is bound to one [`TokenClass`] and one secret. A token is only
//! accepted when its HS256 signature verifies under that secret, its class matches the
//! codec, and the current time is strictly before its expiry.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token class, carried in the `typ` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    /// Short-lived bearer token presented on every protected call
    Access,
    /// Long-lived token exchanged for a new pair, transported as a cookie
    Refresh,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Access => "access",
            TokenClass::Refresh => "refresh",
        }
    }
}

/// Identifier of the authenticated principal (the user's UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Claims carried by both token classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user UUID)
    pub sub: Subject,
    /// Issued at (Unix seconds)
    pub iat: u64,
    /// Expiration time (Unix seconds)
    pub exp: u64,
    /// Token class
    #[serde(rename = "typ")]
    pub class: TokenClass,
    /// Unique token id, so pairs minted in the same second still differ
    pub jti: String,
}

impl TokenClaims {
    /// Build claims for `subject` valid for `duration` seconds starting at `now`.
    pub fn new(
        subject: Subject,
        class: TokenClass,
        now: u64,
        duration: u64,
    ) -> Result<Self, TokenError> {
        let exp = now
            .checked_add(duration)
            .ok_or(TokenError::LifetimeOverflow)?;
        Ok(Self {
            sub: subject,
            iat: now,
            exp,
            class,
            jti: uuid::Uuid::new_v4().to_string(),
        })
    }
}

/// Current wall-clock time in Unix seconds.
pub fn now_secs() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::TimeError)
}

/// Signs and verifies tokens of a single class with a single secret.
#[derive(Clone)]
pub struct TokenCodec {
    class: TokenClass,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    pub fn new(class: TokenClass, secret: &[u8]) -> Self {
        Self {
            class,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign `claims`. Output is deterministic for identical claims.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        if claims.class != self.class {
            return Err(TokenError::WrongClass);
        }
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// Verify and decode a token against the wall clock.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.decode_at(token, now_secs()?)
    }

    /// Verify and decode a token as of `now` (Unix seconds).
    ///
    /// The signature is verified before any claim is read; expiry is checked afterwards
    /// with no leeway, so a token is expired from the second `now == exp` onwards.
    pub fn decode_at(&self, token: &str, now: u64) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        let claims = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?
            .claims;

        if claims.class != self.class || claims.exp <= claims.iat {
            return Err(TokenError::Malformed);
        }
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum TokenError {
    /// Structurally unparsable token, unexpected algorithm, or inconsistent claims
    Malformed,
    /// Signature does not match the codec's secret
    InvalidSignature,
    /// Current time is at or past `exp`
    Expired,
    /// Claims of one class handed to the other class's codec
    WrongClass,
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
    /// `iat + lifetime` does not fit in a timestamp
    LifetimeOverflow,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "Malformed token"),
            TokenError::InvalidSignature => write!(f, "Invalid token signature"),
            TokenError::Expired => write!(f, "Token expired"),
            TokenError::WrongClass => write!(f, "Wrong token class"),
            TokenError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            TokenError::TimeError => write!(f, "System time error"),
            TokenError::LifetimeOverflow => write!(f, "Token lifetime overflows the timestamp"),
        }
    }
}

impl std::error::Error for TokenError {}
