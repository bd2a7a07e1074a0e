//! Session cookie handling.
//!
//! The signed token travels in a cookie named `token`, always `HttpOnly` and
//! scoped to `Path=/`. Production adds `Secure` and `SameSite=Strict`;
//! development uses `SameSite=Lax` over plain HTTP. Logout overwrites the
//! cookie with an empty value that is already expired, so the browser drops
//! it; the token itself stays valid until its embedded expiry because there
//! is no server-side revocation.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};

use super::state::AuthConfig;

pub(super) const SESSION_COOKIE_NAME: &str = "token";

/// `Expires` value used to clear the cookie: the Unix epoch.
const EXPIRED_SENTINEL: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Build the `Set-Cookie` value carrying a freshly issued token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; Max-Age={ttl_seconds}");
    if config.session_cookie_secure() {
        cookie.push_str("; SameSite=Strict; Secure");
    } else {
        cookie.push_str("; SameSite=Lax");
    }
    HeaderValue::from_str(&cookie)
}

/// Build the `Set-Cookie` value that discards the session cookie.
///
/// Carries both `Max-Age=0` and an epoch `Expires` so the expiry is visible
/// in the cookie attributes, not just implied.
pub(super) fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; Max-Age=0; Expires={EXPIRED_SENTINEL}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; SameSite=Strict; Secure");
    } else {
        cookie.push_str("; SameSite=Lax");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the session token out of the `Cookie` header, if present.
///
/// The cookie is the only accepted carrier; there is no bearer-header or
/// query-string fallback.
pub(super) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        // Pairs without '=' are skipped rather than ending the scan.
        if let Some((key, val)) = pair.trim().split_once('=') {
            let key = key.trim();
            let val = val.trim();
            if key == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::super::state::{AuthConfig, Environment};
    use super::*;
    use axum::http::header::AUTHORIZATION;

    fn dev_config() -> AuthConfig {
        AuthConfig::new(
            Environment::Development,
            "http://localhost:5173".to_string(),
        )
    }

    fn prod_config() -> AuthConfig {
        AuthConfig::new(
            Environment::Production,
            "https://gatherguru.dev".to_string(),
        )
    }

    #[test]
    fn development_cookie_is_lax_and_not_secure() {
        let cookie = session_cookie(&dev_config(), "abc.def.ghi").unwrap();
        let value = cookie.to_str().unwrap();
        assert!(value.starts_with("token=abc.def.ghi; "));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=2592000"));
        assert!(value.contains("SameSite=Lax"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn production_cookie_is_strict_and_secure() {
        let cookie = session_cookie(&prod_config(), "abc.def.ghi").unwrap();
        let value = cookie.to_str().unwrap();
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Strict"));
        assert!(value.contains("Secure"));
    }

    #[test]
    fn clear_cookie_expires_in_the_past() {
        let cookie = clear_session_cookie(&dev_config()).unwrap();
        let value = cookie.to_str().unwrap();
        assert!(value.starts_with("token=; "));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(value.contains("HttpOnly"));
    }

    #[test]
    fn extracts_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=a.b.c"));
        assert_eq!(extract_session_token(&headers), Some("a.b.c".to_string()));
    }

    #[test]
    fn extracts_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; token = a.b.c ; lang=en"),
        );
        assert_eq!(extract_session_token(&headers), Some("a.b.c".to_string()));
    }

    #[test]
    fn pair_without_equals_does_not_end_the_scan() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("flag; token=a.b.c"));
        assert_eq!(extract_session_token(&headers), Some("a.b.c".to_string()));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token="));
        assert_eq!(extract_session_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=other"));
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn bearer_header_is_not_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer a.b.c"));
        assert_eq!(extract_session_token(&headers), None);
    }
}
