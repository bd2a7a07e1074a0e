//! Command-line argument dispatch.
//!
//! Maps parsed CLI arguments to the action to run, currently starting the
//! API server with its full configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{auth, uploads};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;
    let upload_opts = uploads::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: auth_opts.jwt_secret,
        environment: auth_opts.environment,
        frontend_base_url: auth_opts.frontend_base_url,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        uploads_dir: upload_opts.uploads_dir,
        blob_url: upload_opts.blob_url,
        blob_token: upload_opts.blob_token,
        request_timeout_seconds: upload_opts.request_timeout_seconds,
    }))
}
