//! Service banner for the bare root path.

use axum::response::IntoResponse;
use tracing::debug;

use crate::GIT_COMMIT_HASH;

/// Plain-text banner so anything probing `/` learns which build is running.
pub async fn root() -> impl IntoResponse {
    let commit = GIT_COMMIT_HASH;
    let short_hash = if commit.len() > 7 { &commit[0..7] } else { "" };

    debug!("Serving root banner");

    format!(
        "{} {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn banner_names_the_service() {
        let response = root().await.into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let banner = String::from_utf8(body.to_vec()).unwrap();
        assert!(banner.starts_with(env!("CARGO_PKG_NAME")));
        assert!(banner.contains(env!("CARGO_PKG_VERSION")));
    }
}
