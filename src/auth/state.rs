//! Authentication state traits.

use crate::issuer::TokenIssuer;

/// Trait for state types that can verify access tokens.
pub trait HasAuthBackend {
    fn tokens(&self) -> &TokenIssuer;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have a `tokens: Arc<TokenIssuer>` field.
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn tokens(&self) -> &$crate::issuer::TokenIssuer {
                &self.tokens
            }
        }
    };
}
