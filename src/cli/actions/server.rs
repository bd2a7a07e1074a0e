use crate::{
    api,
    api::handlers::auth::{AuthConfig, AuthState, Environment, TokenSigner},
    upload::{BlobStore, DiskBlobStore, RemoteBlobStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub environment: String,
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub uploads_dir: String,
    pub blob_url: Option<String>,
    pub blob_token: Option<SecretString>,
    pub request_timeout_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let environment = args
        .environment
        .parse::<Environment>()
        .context("invalid --environment")?;

    let signer = TokenSigner::new(args.jwt_secret, args.session_ttl_seconds)
        .context("invalid session signing configuration")?;

    let config = AuthConfig::new(environment, args.frontend_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    let auth_state = AuthState::new(config, signer);

    // Remote blob service when configured, local disk otherwise. Only the
    // disk backend needs the static /uploads route.
    let (blob_store, uploads_dir): (Arc<dyn BlobStore>, Option<PathBuf>) =
        match (args.blob_url, args.blob_token) {
            (Some(url), Some(token)) => {
                info!("Storing uploads at {url}");
                (Arc::new(RemoteBlobStore::new(&url, token)?), None)
            }
            _ => {
                let dir = PathBuf::from(args.uploads_dir);
                info!("Storing uploads under {}", dir.display());
                (Arc::new(DiskBlobStore::new(dir.clone())), Some(dir))
            }
        };

    api::new(
        args.port,
        args.dsn,
        auth_state,
        blob_store,
        Duration::from_secs(args.request_timeout_seconds),
        uploads_dir,
    )
    .await
}
