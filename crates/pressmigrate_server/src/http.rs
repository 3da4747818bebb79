//! axum binding of the export server.

use crate::error::ServerResult;
use crate::server::{ExportReply, ExportServer, NO_STORE_HEADERS};
use crate::source::SourceStore;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Converts a reply into an HTTP response with the no-store headers.
pub fn into_response(reply: ExportReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, reply.body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    for (name, value) in NO_STORE_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    response
}

async fn export<S: SourceStore + 'static>(
    State(server): State<Arc<ExportServer<S>>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    into_response(server.handle_get(path_and_query, authorization))
}

/// Creates the router for both export routes.
///
/// Unknown paths get the JSON 404 body.
pub fn router<S: SourceStore + 'static>(server: Arc<ExportServer<S>>) -> Router {
    let config = server.config();
    Router::new()
        .route(&config.posts_path(), get(export::<S>))
        .route(&config.types_path(), get(export::<S>))
        .fallback(export::<S>)
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Serves the export routes on `addr` until Ctrl-C.
pub async fn serve<S: SourceStore + 'static>(
    server: Arc<ExportServer<S>>,
    addr: SocketAddr,
) -> ServerResult<()> {
    let app = router(server);
    let listener = TcpListener::bind(addr).await?;
    info!("export server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;
    Ok(())
}

/// Resolves once `signal` fires. If the signal handler cannot be
/// installed, the failure is logged and the server keeps running.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("export server shutting down"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_disable_caching() {
        let response = into_response(ExportReply {
            status: 403,
            body: b"{}".to_vec(),
        });
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let headers = response.headers();
        assert_eq!(
            headers["cache-control"],
            "no-store, no-cache, must-revalidate, max-age=0"
        );
        assert_eq!(headers["pragma"], "no-cache");
        assert_eq!(headers["expires"], "0");
        assert_eq!(headers["content-type"], "application/json; charset=utf-8");
    }

    #[tokio::test]
    async fn shutdown_follows_signal() {
        let fired = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            shutdown_on(async { Ok(()) }),
        )
        .await;
        assert!(fired.is_ok());
    }

    #[tokio::test]
    async fn failed_signal_handler_keeps_serving() {
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            shutdown_on(async { Err(io::Error::other("no signal handler")) }),
        )
        .await;
        assert!(waited.is_err());
    }
}
