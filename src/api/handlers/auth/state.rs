//! Auth configuration and shared state.

use std::str::FromStr;

use super::token::{TOKEN_TTL_SECONDS, TokenSigner};

/// Deployment flavor, decided once at startup.
///
/// Production hardens the session cookie (`Secure`, `SameSite=Strict`);
/// development keeps plain-HTTP ergonomics (`SameSite=Lax`, no `Secure`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(anyhow::anyhow!("unknown environment: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    environment: Environment,
    frontend_base_url: String,
    session_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(environment: Environment, frontend_base_url: String) -> Self {
        Self {
            environment,
            frontend_base_url,
            session_ttl_seconds: TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) const fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(super) const fn session_cookie_secure(&self) -> bool {
        self.environment.is_production()
    }
}

/// Immutable per-process auth state: configuration plus the token signer.
///
/// Built once at startup and shared through an `Extension<Arc<AuthState>>`;
/// handlers never read signing material from the environment.
pub struct AuthState {
    config: AuthConfig,
    signer: TokenSigner,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, signer: TokenSigner) -> Self {
        Self { config, signer }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new(
            Environment::Development,
            "http://localhost:5173".to_string(),
        );

        assert_eq!(config.environment(), Environment::Development);
        assert_eq!(config.frontend_base_url(), "http://localhost:5173");
        assert_eq!(config.session_ttl_seconds(), TOKEN_TTL_SECONDS);

        let config = config.with_session_ttl_seconds(3600);
        assert_eq!(config.session_ttl_seconds(), 3600);
    }

    #[test]
    fn cookie_secure_follows_environment() {
        let dev = AuthConfig::new(
            Environment::Development,
            "http://localhost:5173".to_string(),
        );
        assert!(!dev.session_cookie_secure());

        let prod = AuthConfig::new(
            Environment::Production,
            "https://gatherguru.dev".to_string(),
        );
        assert!(prod.session_cookie_secure());
    }

    #[test]
    fn environment_parses_known_values_only() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert!("staging".parse::<Environment>().is_err());
    }
}
