//! Main export server.

use crate::auth::generate_token;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{HandlerContext, RequestHandler};
use crate::source::SourceStore;
use axum::extract::Query;
use axum::http::Uri;
use pressmigrate_protocol::ExportQuery;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use zeroize::Zeroizing;

/// Headers sent with every export response.
pub const NO_STORE_HEADERS: [(&str, &str); 3] = [
    ("cache-control", "no-store, no-cache, must-revalidate, max-age=0"),
    ("pragma", "no-cache"),
    ("expires", "0"),
];

/// A JSON response, independent of any HTTP framework.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReply {
    /// HTTP status.
    pub status: u16,
    /// JSON body.
    pub body: Vec<u8>,
}

impl ExportReply {
    fn json(status: u16, value: &impl serde::Serialize) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                warn!(error = %e, "cannot encode response");
                Self {
                    status: 500,
                    body: br#"{"code":"internal_error","message":"Internal server error","data":{"status":500}}"#.to_vec(),
                }
            }
        }
    }

    fn error(err: &ServerError) -> Self {
        if err.is_server_error() {
            warn!(error = %err, "export request failed");
        }
        Self::json(err.status(), &err.to_body())
    }

    /// Decodes the body as JSON.
    pub fn json_body(&self) -> ServerResult<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// The export server.
///
/// Serves `GET {prefix}/posts` and `GET {prefix}/post-types` from a
/// [`SourceStore`]. [`ExportServer::handle_get`] takes a raw path and
/// `Authorization` header, so the same server answers real HTTP (see
/// [`crate::router`]) and in-process loopback requests.
///
/// # Example
///
/// ```
/// use pressmigrate_server::{ExportServer, MemorySource, ServerConfig};
///
/// let config = ServerConfig::default().with_token("secret");
/// let server = ExportServer::new(config, MemorySource::new()).unwrap();
///
/// let reply = server.handle_get("/posts?count=5", Some("Bearer secret"));
/// assert_eq!(reply.status, 200);
/// ```
pub struct ExportServer<S: SourceStore> {
    handler: RequestHandler<S>,
    context: Arc<HandlerContext<S>>,
    token: Zeroizing<String>,
}

impl<S: SourceStore> ExportServer<S> {
    /// Creates a new export server. A token is generated when the
    /// configuration carries none.
    pub fn new(config: ServerConfig, source: S) -> ServerResult<Self> {
        Self::with_source(config, Arc::new(source))
    }

    /// Creates an export server over a shared source.
    pub fn with_source(config: ServerConfig, source: Arc<S>) -> ServerResult<Self> {
        let token = match &config.token {
            Some(token) if !token.trim().is_empty() => token.clone(),
            _ => generate_token(),
        };
        let context = Arc::new(HandlerContext::new(config, source, &token)?);
        let handler = RequestHandler::new(Arc::clone(&context));
        Ok(Self {
            handler,
            context,
            token,
        })
    }

    /// Returns the accepted bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.context.config
    }

    /// Returns the record source.
    pub fn source(&self) -> &Arc<S> {
        &self.context.source
    }

    /// Handles a GET request for `path_and_query`.
    pub fn handle_get(&self, path_and_query: &str, authorization: Option<&str>) -> ExportReply {
        match self.dispatch(path_and_query, authorization) {
            Ok(reply) => reply,
            Err(e) => ExportReply::error(&e),
        }
    }

    fn dispatch(&self, path_and_query: &str, authorization: Option<&str>) -> ServerResult<ExportReply> {
        let uri: Uri = path_and_query.parse().map_err(|_| ServerError::NotFound)?;
        let path = uri.path().trim_end_matches('/');
        let config = &self.context.config;

        if path == config.posts_path() {
            let Query(query) = Query::<ExportQuery>::try_from_uri(&uri)
                .map_err(|e| ServerError::InvalidParam(e.body_text()))?;
            let page = self.handler.handle_posts(&query, authorization)?;
            Ok(ExportReply::json(200, &page))
        } else if path == config.types_path() {
            let types = self.handler.handle_post_types(authorization)?;
            Ok(ExportReply::json(200, &types))
        } else {
            Err(ServerError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use pressmigrate_testkit::RecordBuilder;

    fn server(prefix: &str) -> ExportServer<MemorySource> {
        let source = MemorySource::from_records((1..=12).map(|id| RecordBuilder::new(id).build()));
        let config = ServerConfig::default()
            .with_route_prefix(prefix)
            .with_token("t0ken");
        ExportServer::new(config, source).unwrap()
    }

    #[test]
    fn serves_pages() {
        let s = server("");
        let reply = s.handle_get("/posts?count=5&startID=5", Some("Bearer t0ken"));
        assert_eq!(reply.status, 200);
        let body = reply.json_body().unwrap();
        assert_eq!(body["ids"], serde_json::json!([6, 7, 8, 9, 10]));
        assert_eq!(body["startID"], 5);
        assert_eq!(body["records"][0]["ID"], 6);
    }

    #[test]
    fn serves_types_under_prefix() {
        let s = server("/wp-json/batch/v1");
        let reply = s.handle_get("/wp-json/batch/v1/post-types", Some("Bearer t0ken"));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.json_body().unwrap()["post_types"][0]["slug"], "post");
        assert_eq!(s.handle_get("/post-types", Some("Bearer t0ken")).status, 404);
    }

    #[test]
    fn forbidden_without_token() {
        let s = server("");
        let reply = s.handle_get("/posts", None);
        assert_eq!(reply.status, 403);
        let body = reply.json_body().unwrap();
        assert_eq!(body["code"], "forbidden");
        assert_eq!(body["message"], "Missing bearer token");
        assert_eq!(body["data"]["status"], 403);

        let reply = s.handle_get("/posts", Some("Bearer wrong"));
        assert_eq!(reply.json_body().unwrap()["message"], "Invalid token");
    }

    #[test]
    fn bad_count_is_400() {
        let s = server("");
        let reply = s.handle_get("/posts?count=lots", Some("Bearer t0ken"));
        assert_eq!(reply.status, 400);
        assert_eq!(reply.json_body().unwrap()["code"], "rest_invalid_param");
    }

    #[test]
    fn unknown_route_is_404() {
        let s = server("");
        assert_eq!(s.handle_get("/users", Some("Bearer t0ken")).status, 404);
    }

    #[test]
    fn generates_token_when_unset() {
        let s = ExportServer::new(ServerConfig::default(), MemorySource::new()).unwrap();
        assert_eq!(s.token().len(), crate::auth::TOKEN_LEN);
        let header = format!("Bearer {}", s.token());
        assert_eq!(s.handle_get("/posts", Some(&header)).status, 200);
    }
}
