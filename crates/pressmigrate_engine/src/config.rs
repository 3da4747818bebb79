//! Configuration for import runs.

use crate::error::{ImportError, ImportResult};
use pressmigrate_protocol::sanitize::sanitize_key;
use pressmigrate_protocol::{PageRequest, DEFAULT_POST_TYPE, DEFAULT_STATUS};
use reqwest::Url;
use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

/// Meta keys never copied to the destination.
pub const DEFAULT_RESERVED_META: [&str; 2] = ["_edit_lock", "_edit_last"];

/// Configuration for an import run.
#[derive(Clone)]
pub struct ImportConfig {
    /// URL of the source's posts endpoint.
    pub posts_url: String,
    /// Bearer token presented to the source.
    pub token: Zeroizing<String>,
    /// Records requested per page.
    pub page_size: u32,
    /// Timeout of one page request.
    pub page_timeout: Duration,
    /// Timeout of the types request.
    pub types_timeout: Duration,
    /// Timeout of one media download.
    pub media_timeout: Duration,
    /// Content type imported when a request names none.
    pub post_type: String,
    /// Status imported when a request names none.
    pub status: String,
    /// Destination identity used when author resolution yields none.
    pub default_author: u64,
    /// Meta keys skipped during reconciliation.
    pub reserved_meta_keys: Vec<String>,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl ImportConfig {
    /// Creates a configuration for the given endpoint and token.
    pub fn new(posts_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            posts_url: posts_url.into(),
            token: Zeroizing::new(token.into()),
            page_size: 5,
            page_timeout: Duration::from_secs(30),
            types_timeout: Duration::from_secs(20),
            media_timeout: Duration::from_secs(300),
            post_type: DEFAULT_POST_TYPE.to_string(),
            status: DEFAULT_STATUS.to_string(),
            default_author: 0,
            reserved_meta_keys: DEFAULT_RESERVED_META.iter().map(|k| k.to_string()).collect(),
            user_agent: concat!("pressmigrate/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Sets the page size. Values below 1 are raised to 1.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Sets the page request timeout.
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Sets the types request timeout.
    pub fn with_types_timeout(mut self, timeout: Duration) -> Self {
        self.types_timeout = timeout;
        self
    }

    /// Sets the media download timeout.
    pub fn with_media_timeout(mut self, timeout: Duration) -> Self {
        self.media_timeout = timeout;
        self
    }

    /// Sets the default content type and status.
    pub fn with_partition(mut self, post_type: impl Into<String>, status: impl Into<String>) -> Self {
        self.post_type = post_type.into();
        self.status = status.into();
        self
    }

    /// Sets the fallback author identity.
    pub fn with_default_author(mut self, author_id: u64) -> Self {
        self.default_author = author_id;
        self
    }

    /// Replaces the reserved meta key list.
    pub fn with_reserved_meta_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.reserved_meta_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns true if the meta key is never copied.
    pub fn is_reserved_meta(&self, key: &str) -> bool {
        self.reserved_meta_keys.iter().any(|k| k == key)
    }

    /// Builds a page request. A type or status that sanitizes to nothing
    /// falls back to the configured partition.
    pub fn page_request(&self, post_type: &str, status: &str, cursor: u64, limit: u32) -> PageRequest {
        let pick = |raw: &str, default: &str| -> String {
            if sanitize_key(raw).is_empty() {
                default.to_string()
            } else {
                raw.to_string()
            }
        };
        PageRequest::new(
            &pick(post_type, &self.post_type),
            &pick(status, &self.status),
            cursor,
            limit,
        )
    }

    /// Checks that the endpoint and token are usable.
    pub fn validate(&self) -> ImportResult<()> {
        if self.posts_url.trim().is_empty() {
            return Err(ImportError::Config("posts endpoint URL is empty".into()));
        }
        if self.token.trim().is_empty() {
            return Err(ImportError::Config("bearer token is empty".into()));
        }
        let url = Url::parse(self.posts_url.trim())
            .map_err(|e| ImportError::Config(format!("invalid posts endpoint URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImportError::Config(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }
        Ok(())
    }

    /// Derives the types endpoint from the posts endpoint.
    ///
    /// The query string and trailing slashes are dropped and the last path
    /// segment is replaced by `post-types`.
    pub fn types_url(&self) -> ImportResult<String> {
        types_endpoint(&self.posts_url)
    }
}

impl fmt::Debug for ImportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportConfig")
            .field("posts_url", &self.posts_url)
            .field("token", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("page_timeout", &self.page_timeout)
            .field("types_timeout", &self.types_timeout)
            .field("media_timeout", &self.media_timeout)
            .field("post_type", &self.post_type)
            .field("status", &self.status)
            .field("default_author", &self.default_author)
            .field("reserved_meta_keys", &self.reserved_meta_keys)
            .finish()
    }
}

fn types_endpoint(posts_url: &str) -> ImportResult<String> {
    let trimmed = posts_url.trim();
    let without_query = trimmed.split(['?', '#']).next().unwrap_or_default();
    let base = without_query.trim_end_matches('/');
    let after_scheme = base.find("://").map(|i| i + 3).unwrap_or(0);
    match base[after_scheme..].rfind('/') {
        Some(slash) => Ok(format!("{}/post-types", &base[..after_scheme + slash])),
        None => Err(ImportError::Config(format!(
            "cannot derive types endpoint from {posts_url}"
        ))),
    }
}
