//! Dual-token authentication.
//!
//! Short-lived access tokens travel in the `Authorization: Bearer` header and are
//! verified statelessly by the [`Auth`] extractor. Long-lived refresh tokens travel in an
//! HTTP-only cookie and are rotated by [`RefreshCoordinator`] on every refresh.

mod cookie;
mod credentials;
mod errors;
mod extractors;
mod ip;
mod refresh;
mod state;

pub use cookie::{CookiePolicy, REFRESH_COOKIE_NAME, get_cookie};
pub use credentials::{CredentialFlow, Session};
pub use errors::{AuthError, AuthErrorKind, Surface};
pub use extractors::{Auth, authenticate_bearer, bearer_token};
pub use ip::extract_client_ip;
pub use refresh::{RefreshCoordinator, Rotation};
pub use state::HasAuthBackend;
