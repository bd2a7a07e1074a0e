use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long("jwt-secret")
                .help("Secret key used to sign session tokens")
                .env("GATHERGURU_JWT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long("environment")
                .help("Deployment environment: development or production")
                .env("GATHERGURU_ENVIRONMENT")
                .default_value("development"),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long("frontend-base-url")
                .help("Frontend origin allowed for credentialed CORS requests")
                .env("GATHERGURU_FRONTEND_BASE_URL")
                .default_value("http://localhost:5173"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long("session-ttl-seconds")
                .help("Session cookie TTL in seconds")
                .env("GATHERGURU_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub environment: String,
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --jwt-secret")?;

        let environment = matches
            .get_one::<String>(ARG_ENVIRONMENT)
            .cloned()
            .context("missing required argument: --environment")?;

        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .context("missing required argument: --frontend-base-url")?;

        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .context("missing required argument: --session-ttl-seconds")?;

        Ok(Self {
            jwt_secret,
            environment,
            frontend_base_url,
            session_ttl_seconds,
        })
    }
}
