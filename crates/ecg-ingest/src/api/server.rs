//! API server setup and configuration.

use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{MethodRouter, post},
};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{IngestConfig, IngestError, Result};

use super::{
    handlers::{
        health_handler, info_handler, options_handler, require_basic_auth, status_page_handler, upload_handler,
    },
    types::ApiState,
};

/// Create the API router with all routes configured.
///
/// This is public to allow users to embed the router in their own applications.
///
/// # Examples
///
/// ```no_run
/// use ecg_ingest::{IngestConfig, api::create_router};
///
/// # #[tokio::main]
/// # async fn main() {
/// let router = create_router(IngestConfig::default());
/// # }
/// ```
pub fn create_router(config: IngestConfig) -> Router {
    let limit = config.limits.max_upload_bytes;
    let state = ApiState::new(config);

    // Auth wraps only the upload methods. CORS headers are set by the handlers.
    // Every path accepts uploads; GET decides what is served.
    let uploads: MethodRouter<ApiState> = post(upload_handler)
        .put(upload_handler)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_basic_auth))
        .options(options_handler);

    Router::new()
        .route("/health", uploads.clone().get(health_handler))
        .route("/info", uploads.clone().get(info_handler))
        .route("/", uploads.clone().get(status_page_handler))
        .route("/{*path}", uploads.get(status_page_handler))
        .layer(DefaultBodyLimit::max(limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(limit)),
        )
        .with_state(state)
}

/// Start the upload server on the configured host and port.
///
/// Creates the storage directory before accepting connections.
///
/// # Errors
///
/// Returns `IngestError::Validation` for an unparseable host, `IngestError::Io`
/// when the listener cannot bind.
///
/// # Examples
///
/// ```no_run
/// use ecg_ingest::{IngestConfig, api::serve};
///
/// #[tokio::main]
/// async fn main() -> ecg_ingest::Result<()> {
///     serve(IngestConfig::load(None)?).await
/// }
/// ```
pub async fn serve(config: IngestConfig) -> Result<()> {
    config.validate()?;

    let ip: IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| IngestError::validation(format!("Invalid host address: {}", e)))?;
    let addr = SocketAddr::new(ip, config.server.port);

    let state = ApiState::new(config.clone());
    state.store.ensure_root()?;

    if config.auth.is_none() {
        tracing::warn!("No upload credentials configured, accepting unauthenticated uploads");
    }

    let app = create_router(config);
    tracing::info!(
        upload_directory = %state.store.root().display(),
        "Starting ECG upload server on http://{}", addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(IngestError::Io)?;

    axum::serve(listener, app)
        .await
        .map_err(|e| IngestError::Other(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_router() {
        let _router = create_router(IngestConfig::default());
    }

    #[tokio::test]
    async fn test_serve_rejects_invalid_host() {
        let mut config = IngestConfig::default();
        config.server.host = "not an address".to_string();

        let err = serve(config).await.unwrap_err();
        assert!(matches!(err, IngestError::Validation { .. }));
    }
}
