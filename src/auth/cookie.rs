//! Refresh cookie parsing and construction.

use axum::http::{HeaderMap, HeaderValue, header};

/// Cookie name for the refresh token (long-lived, 7 days).
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Extract a cookie value from the Cookie header(s).
/// HTTP/2 clients may send each cookie in its own header, so all of them are searched.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

/// Attributes applied to every refresh cookie the server writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePolicy {
    /// Add the `Secure` attribute (HTTPS deployments)
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn secure_attr(&self) -> &'static str {
        if self.secure { "; Secure" } else { "" }
    }

    /// `Set-Cookie` value carrying a refresh token for `max_age` seconds.
    pub fn refresh_cookie(&self, token: &str, max_age: u64) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
            REFRESH_COOKIE_NAME,
            token,
            max_age,
            self.secure_attr()
        )
    }

    /// `Set-Cookie` value that removes the refresh cookie.
    pub fn clear_refresh_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0{}",
            REFRESH_COOKIE_NAME,
            self.secure_attr()
        )
    }

    /// Append a cookie string to response headers, skipping values that are not valid headers.
    pub fn append(headers: &mut HeaderMap, cookie: &str) {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Refusing to set invalid cookie header"),
        }
    }
}
