//! Request handlers for the export endpoints.

use crate::auth::TokenAuth;
use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::source::SourceStore;
use pressmigrate_protocol::{ExportPage, ExportQuery, PostTypesResponse};
use std::sync::Arc;
use tracing::debug;

/// Context shared by all handlers.
pub struct HandlerContext<S: SourceStore> {
    /// Server configuration.
    pub config: ServerConfig,
    /// Record source.
    pub source: Arc<S>,
    auth: TokenAuth,
}

impl<S: SourceStore> HandlerContext<S> {
    /// Creates a handler context accepting `token`.
    pub fn new(config: ServerConfig, source: Arc<S>, token: &str) -> ServerResult<Self> {
        Ok(Self {
            config,
            source,
            auth: TokenAuth::new(token)?,
        })
    }
}

/// Handler for export requests.
pub struct RequestHandler<S: SourceStore> {
    context: Arc<HandlerContext<S>>,
}

impl<S: SourceStore> RequestHandler<S> {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext<S>>) -> Self {
        Self { context }
    }

    /// Handles `GET /posts`.
    ///
    /// Authentication runs before anything else is looked at.
    pub fn handle_posts(
        &self,
        query: &ExportQuery,
        authorization: Option<&str>,
    ) -> ServerResult<ExportPage> {
        self.context.auth.authorize(authorization)?;

        let config = &self.context.config;
        let mut query = query.clone();
        query.post_type.get_or_insert_with(|| config.post_type.clone());
        query.status.get_or_insert_with(|| config.status.clone());
        let request = query.resolve(config.default_page_size)?;

        let source = &self.context.source;
        let ids = source.ids_after(&request.post_type, &request.status, request.cursor, request.limit)?;
        if ids.is_empty() {
            debug!(cursor = request.cursor, "export page empty");
            return Ok(ExportPage::empty(request.cursor));
        }
        let records = source.records(&ids)?;
        debug!(
            cursor = request.cursor,
            limit = request.limit,
            count = records.len(),
            "export page served"
        );
        Ok(ExportPage::new(request.cursor, records))
    }

    /// Handles `GET /post-types`.
    pub fn handle_post_types(&self, authorization: Option<&str>) -> ServerResult<PostTypesResponse> {
        self.context.auth.authorize(authorization)?;
        Ok(PostTypesResponse {
            post_types: self.context.source.post_types()?,
        })
    }
}
