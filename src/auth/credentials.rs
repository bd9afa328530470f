//! Registration and login.

use std::sync::OnceLock;

use tracing::{error, info};

use super::errors::AuthErrorKind;
use crate::db::{NewUser, SanitizedUser, UserStore};
use crate::issuer::{TokenIssuer, TokenPair};
use crate::jwt::Subject;
use crate::password;

/// A newly authenticated session: tokens to hand out plus the public profile.
#[derive(Debug)]
pub struct Session {
    pub pair: TokenPair,
    pub user: SanitizedUser,
}

/// Hash compared against when the email is unknown, so both failure paths cost the same.
static DECOY_HASH: OnceLock<String> = OnceLock::new();

fn decoy_hash() -> String {
    DECOY_HASH
        .get_or_init(|| password::hash("decoy-password").unwrap_or_default())
        .clone()
}

/// Orchestrates register/login: password handling, persistence, and pair issuance.
pub struct CredentialFlow<'a> {
    tokens: &'a TokenIssuer,
    users: UserStore,
}

impl<'a> CredentialFlow<'a> {
    pub fn new(tokens: &'a TokenIssuer, users: UserStore) -> Self {
        Self { tokens, users }
    }

    /// Create a user and sign them in. Inputs are expected to be validated and normalized.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        plain_password: &str,
    ) -> Result<Session, AuthErrorKind> {
        let existing = self.users.find_by_email(email).await.map_err(|e| {
            error!(error = %e, "Failed to look up email");
            AuthErrorKind::Internal
        })?;
        if existing.is_some() {
            return Err(AuthErrorKind::DuplicateRegistration);
        }

        let password_hash = password::hash_blocking(plain_password.to_string())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                AuthErrorKind::Internal
            })?;

        let uuid = uuid::Uuid::new_v4().to_string();
        let new_user = NewUser {
            uuid: &uuid,
            name,
            email,
            password_hash: &password_hash,
        };

        // The UNIQUE constraint settles concurrent registrations of the same email
        self.users.create(&new_user).await.map_err(|e| {
            if UserStore::is_duplicate(&e) {
                AuthErrorKind::DuplicateRegistration
            } else {
                error!(error = %e, "Failed to create user");
                AuthErrorKind::Internal
            }
        })?;

        info!(subject = %uuid, "User registered");

        let user = SanitizedUser {
            id: uuid,
            name: name.to_string(),
            email: email.to_string(),
        };
        self.issue(user)
    }

    /// Check credentials and sign in. Unknown email and wrong password are the same error.
    pub async fn login(&self, email: &str, plain_password: &str) -> Result<Session, AuthErrorKind> {
        let user = self.users.find_by_email(email).await.map_err(|e| {
            error!(error = %e, "Failed to look up email");
            AuthErrorKind::Internal
        })?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => tokio::task::spawn_blocking(decoy_hash)
                .await
                .unwrap_or_default(),
        };
        let matches = password::verify_blocking(plain_password.to_string(), stored_hash).await;

        let user = match user {
            Some(user) if matches => user,
            _ => {
                info!("Login rejected");
                return Err(AuthErrorKind::CredentialMismatch);
            }
        };

        info!(subject = %user.uuid, "User logged in");
        self.issue(user.sanitized())
    }

    fn issue(&self, user: SanitizedUser) -> Result<Session, AuthErrorKind> {
        let pair = self
            .tokens
            .issue_pair(&Subject::new(user.id.clone()))
            .map_err(|e| {
                error!(error = %e, "Failed to issue token pair");
                AuthErrorKind::Internal
            })?;
        Ok(Session { pair, user })
    }
}
