//! Server configuration.

use pressmigrate_protocol::{DEFAULT_POST_TYPE, DEFAULT_STATUS};
use std::fmt;
use std::net::SocketAddr;
use zeroize::Zeroizing;

/// Configuration for the export server.
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Prefix of both routes, e.g. `/wp-json/batch/v1`. Empty by default.
    pub route_prefix: String,
    /// Page size when a request names none.
    pub default_page_size: u32,
    /// Content type when a request names none.
    pub post_type: String,
    /// Status when a request names none.
    pub status: String,
    /// Bearer token. One is generated at startup when unset.
    pub token: Option<Zeroizing<String>>,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            route_prefix: String::new(),
            default_page_size: 10,
            post_type: DEFAULT_POST_TYPE.to_string(),
            status: DEFAULT_STATUS.to_string(),
            token: None,
        }
    }

    /// Sets the route prefix. Leading and trailing slashes are normalized.
    pub fn with_route_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim().trim_matches('/');
        self.route_prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    /// Sets the default page size. Zero is raised to 1.
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    /// Sets the default content type and status.
    pub fn with_partition(mut self, post_type: impl Into<String>, status: impl Into<String>) -> Self {
        self.post_type = post_type.into();
        self.status = status.into();
        self
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Zeroizing::new(token.into()));
        self
    }

    /// Returns the path of the records route.
    pub fn posts_path(&self) -> String {
        format!("{}/posts", self.route_prefix)
    }

    /// Returns the path of the types route.
    pub fn types_path(&self) -> String {
        format!("{}/post-types", self.route_prefix)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("route_prefix", &self.route_prefix)
            .field("default_page_size", &self.default_page_size)
            .field("post_type", &self.post_type)
            .field("status", &self.status)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
