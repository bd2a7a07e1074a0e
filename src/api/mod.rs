use crate::{
    api::handlers::{auth, health, root},
    upload::{BlobStore, MAX_UPLOAD_BYTES},
};
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Router,
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{HeaderName, HeaderValue, Method, Request, header::CONTENT_TYPE},
    routing::{get, options},
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{
    net::TcpListener,
    signal::unix::{SignalKind, signal},
    sync::mpsc,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    services::ServeDir,
    set_header::SetRequestHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;
use url::Url;
use utoipa_axum::router::OpenApiRouter;

pub mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;

pub use openapi::openapi;

// Multipart bodies carry up to MAX_UPLOAD_BYTES of file plus field overhead.
const MAX_REQUEST_BODY_BYTES: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Compose the full application: documented routes, the undocumented `/` and
/// `OPTIONS /health` routes, the static uploads directory, and the middleware
/// stack.
///
/// # Errors
/// Returns an error if the frontend base URL cannot be turned into a CORS
/// origin.
pub fn app(
    pool: PgPool,
    auth_state: Arc<auth::AuthState>,
    blob_store: Arc<dyn BlobStore>,
    request_timeout: Duration,
    uploads_dir: Option<PathBuf>,
) -> Result<Router> {
    let frontend_origin = frontend_origin(auth_state.config().frontend_base_url())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    // Build the router from OpenAPI-wired routes, then extend it with non-doc routes like `/` and
    // preflight-only `OPTIONS /health`. The document itself stays in openapi.rs for the `openapi` binary.
    let (router, _openapi) = router().split_for_parts();
    let mut app = router
        .route("/", get(root::root))
        .route("/health", options(health::health));

    if let Some(uploads_dir) = uploads_dir {
        app = app.nest_service("/uploads", ServeDir::new(uploads_dir));
    }

    let app = app
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(TimeoutLayer::new(request_timeout))
                .layer(Extension(auth_state))
                .layer(Extension(blob_store))
                .layer(Extension(pool)),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES));

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    dsn: String,
    auth_state: auth::AuthState,
    blob_store: Arc<dyn BlobStore>,
    request_timeout: Duration,
    uploads_dir: Option<PathBuf>,
) -> Result<()> {
    // SIGINT/SIGTERM feed the channel, gracefully shutdown on either
    let (tx, mut rx) = mpsc::unbounded_channel();

    spawn_shutdown_watcher(tx);

    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let app = app(
        pool,
        Arc::new(auth_state),
        blob_store,
        request_timeout,
        uploads_dir,
    )?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            rx.recv().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn spawn_shutdown_watcher(tx: mpsc::UnboundedSender<()>) {
    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(error) => {
                error!("Failed to register SIGTERM handler: {}", error);
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
        }

        let _ = tx.send(());
    });
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_origin_keeps_scheme_host_and_port() {
        let origin = frontend_origin("http://localhost:5173").unwrap();
        assert_eq!(origin, HeaderValue::from_static("http://localhost:5173"));
    }

    #[test]
    fn frontend_origin_drops_path_and_default_port() {
        let origin = frontend_origin("https://app.gatherguru.dev/dashboard").unwrap();
        assert_eq!(
            origin,
            HeaderValue::from_static("https://app.gatherguru.dev")
        );
    }

    #[test]
    fn frontend_origin_rejects_hostless_urls() {
        assert!(frontend_origin("mailto:team@gatherguru.dev").is_err());
        assert!(frontend_origin("not a url").is_err());
    }
}
