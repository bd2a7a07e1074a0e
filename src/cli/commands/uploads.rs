use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_UPLOADS_DIR: &str = "uploads-dir";
pub const ARG_BLOB_URL: &str = "blob-url";
pub const ARG_BLOB_TOKEN: &str = "blob-token";
pub const ARG_REQUEST_TIMEOUT_SECONDS: &str = "request-timeout-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_UPLOADS_DIR)
                .long("uploads-dir")
                .help("Directory for uploaded images, served back under /uploads")
                .env("GATHERGURU_UPLOADS_DIR")
                .default_value("uploads")
                .conflicts_with(ARG_BLOB_URL),
        )
        .arg(
            Arg::new(ARG_BLOB_URL)
                .long("blob-url")
                .help("Remote blob service base URL; omit to keep uploads on local disk")
                .env("GATHERGURU_BLOB_URL")
                .requires(ARG_BLOB_TOKEN),
        )
        .arg(
            Arg::new(ARG_BLOB_TOKEN)
                .long("blob-token")
                .help("Bearer token for the remote blob service")
                .env("GATHERGURU_BLOB_TOKEN")
                .requires(ARG_BLOB_URL),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT_SECONDS)
                .long("request-timeout-seconds")
                .help("Per-request timeout in seconds")
                .env("GATHERGURU_REQUEST_TIMEOUT_SECONDS")
                .default_value("30")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub uploads_dir: String,
    pub blob_url: Option<String>,
    pub blob_token: Option<SecretString>,
    pub request_timeout_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let uploads_dir = matches
            .get_one::<String>(ARG_UPLOADS_DIR)
            .cloned()
            .context("missing required argument: --uploads-dir")?;

        let blob_url = matches.get_one::<String>(ARG_BLOB_URL).cloned();

        let blob_token = matches
            .get_one::<String>(ARG_BLOB_TOKEN)
            .cloned()
            .map(SecretString::from);

        let request_timeout_seconds = matches
            .get_one::<u64>(ARG_REQUEST_TIMEOUT_SECONDS)
            .copied()
            .context("missing required argument: --request-timeout-seconds")?;

        Ok(Self {
            uploads_dir,
            blob_url,
            blob_token,
            request_timeout_seconds,
        })
    }
}
