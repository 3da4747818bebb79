//! HTTP transport implementation.
//!
//! The actual HTTP client is abstracted via [`HttpClient`] so the transport
//! and the media sideloader can run over reqwest, an in-process loopback to
//! an export server, or canned replies in tests.

use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};
use crate::transport::ExportTransport;
use parking_lot::RwLock;
use pressmigrate_protocol::{
    ErrorBody, ExportPage, PageRequest, PostTypeInfo, PostTypesResponse,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tracing::debug;
use zeroize::Zeroizing;

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpReply {
    /// Status code.
    pub status: u16,
    /// `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Creates a reply with a JSON body.
    pub fn json(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: Some("application/json".into()),
            body,
        }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implementations return `Err` only when no response was received
/// (connection failure, timeout); any received status is an `Ok` reply.
pub trait HttpClient: Send + Sync {
    /// Sends a GET request, optionally with a bearer token.
    fn get(&self, url: &str, bearer: Option<&str>, timeout: Duration)
        -> Result<HttpReply, String>;

    /// Downloads `url`, writing a 2xx body to `sink` instead of buffering
    /// it. The returned reply carries the status and content type; its
    /// body is left empty.
    fn download(
        &self,
        url: &str,
        timeout: Duration,
        sink: &mut dyn Write,
    ) -> Result<HttpReply, String> {
        let mut reply = self.get(url, None, timeout)?;
        if reply.is_success() {
            sink.write_all(&reply.body).map_err(|e| e.to_string())?;
        }
        reply.body.clear();
        Ok(reply)
    }
}

/// Blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client sending the given user agent.
    pub fn new(user_agent: &str) -> ImportResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ImportError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
        timeout: Duration,
    ) -> Result<HttpReply, String> {
        let mut request = self.client.get(url).timeout(timeout);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                format!("request timed out after {}s", timeout.as_secs())
            } else {
                e.to_string()
            }
        })?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().map_err(|e| e.to_string())?.to_vec();
        Ok(HttpReply {
            status,
            content_type,
            body,
        })
    }

    fn download(
        &self,
        url: &str,
        timeout: Duration,
        sink: &mut dyn Write,
    ) -> Result<HttpReply, String> {
        let mut response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if response.status().is_success() {
            response.copy_to(sink).map_err(|e| e.to_string())?;
        }
        Ok(HttpReply {
            status,
            content_type,
            body: Vec::new(),
        })
    }
}

const PAGE_QUERY_KEYS: [&str; 4] = ["count", "startID", "post_type", "status"];

/// HTTP-based export transport.
///
/// Speaks JSON to the source's posts and types endpoints with a bearer
/// token. A 401/403 is an authentication failure, any other non-2xx status
/// a transport failure, and an undecodable or contract-violating body a
/// payload failure.
pub struct HttpTransport<C: HttpClient> {
    posts_url: Url,
    types_url: String,
    token: Zeroizing<String>,
    page_timeout: Duration,
    types_timeout: Duration,
    client: C,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport for the configured endpoint.
    pub fn new(config: &ImportConfig, client: C) -> ImportResult<Self> {
        config.validate()?;
        let posts_url = Url::parse(config.posts_url.trim())
            .map_err(|e| ImportError::Config(format!("invalid posts endpoint URL: {e}")))?;
        Ok(Self {
            posts_url,
            types_url: config.types_url()?,
            token: config.token.clone(),
            page_timeout: config.page_timeout,
            types_timeout: config.types_timeout,
            client,
            last_error: RwLock::new(None),
        })
    }

    /// Returns the types endpoint.
    pub fn types_url(&self) -> &str {
        &self.types_url
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Builds the URL of one page fetch. Query parameters already on the
    /// endpoint are kept unless the request overrides them.
    pub fn page_url(&self, request: &PageRequest) -> String {
        let mut url = self.posts_url.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !PAGE_QUERY_KEYS.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.extend_pairs(kept);
            for (key, value) in request.to_query() {
                query.append_pair(key, &value);
            }
        }
        url.to_string()
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, timeout: Duration) -> ImportResult<T> {
        let reply = self
            .client
            .get(url, Some(self.token.as_str()), timeout)
            .map_err(|e| {
                self.set_error(&e);
                ImportError::transport(e)
            })?;

        if !reply.is_success() {
            let message = error_message(&reply.body)
                .unwrap_or_else(|| format!("HTTP {} from {}", reply.status, url));
            self.set_error(&message);
            return Err(match reply.status {
                401 | 403 => ImportError::Auth(message),
                status => ImportError::status(status, message),
            });
        }

        let decoded = serde_json::from_slice(&reply.body).map_err(|e| {
            let message = format!("failed to decode response from {url}: {e}");
            self.set_error(&message);
            ImportError::Payload(message)
        })?;
        self.clear_error();
        Ok(decoded)
    }

    fn set_error(&self, err: &str) {
        *self.last_error.write() = Some(err.to_string());
    }

    fn clear_error(&self) {
        *self.last_error.write() = None;
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
}

impl<C: HttpClient> ExportTransport for HttpTransport<C> {
    fn fetch_page(&self, request: &PageRequest) -> ImportResult<ExportPage> {
        let url = self.page_url(request);
        debug!(cursor = request.cursor, limit = request.limit, "fetching page");
        let page: ExportPage = self.get_json(&url, self.page_timeout)?;
        request.check_page(&page.records).map_err(|e| {
            self.set_error(&e.to_string());
            ImportError::from(e)
        })?;
        Ok(page)
    }

    fn fetch_types(&self) -> ImportResult<Vec<PostTypeInfo>> {
        let response: PostTypesResponse = self.get_json(&self.types_url, self.types_timeout)?;
        Ok(response.post_types)
    }
}

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer {
    /// Handles a GET request for `path_and_query` with the given
    /// `Authorization` header value.
    fn handle_get(&self, path_and_query: &str, authorization: Option<&str>) -> HttpReply;
}

/// A loopback HTTP client that routes requests directly to an export server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
        _timeout: Duration,
    ) -> Result<HttpReply, String> {
        let parsed = Url::parse(url).map_err(|e| e.to_string())?;
        let path_and_query = match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        };
        let authorization = bearer.map(|token| format!("Bearer {token}"));
        Ok(self
            .server
            .handle_get(&path_and_query, authorization.as_deref()))
    }
}

/// A client answering from a fixed URL table.
///
/// Unknown URLs get a 404; URLs registered with [`StaticClient::unreachable`]
/// fail as if the connection was refused.
#[derive(Debug, Default)]
pub struct StaticClient {
    replies: RwLock<HashMap<String, Result<HttpReply, String>>>,
    hits: RwLock<Vec<String>>,
}

impl StaticClient {
    /// Creates an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with the given content type at `url`.
    pub fn serve(&self, url: &str, content_type: &str, body: impl Into<Vec<u8>>) {
        self.reply(
            url,
            HttpReply {
                status: 200,
                content_type: Some(content_type.to_string()),
                body: body.into(),
            },
        );
    }

    /// Answers `url` with the given reply.
    pub fn reply(&self, url: &str, reply: HttpReply) {
        self.replies.write().insert(url.to_string(), Ok(reply));
    }

    /// Makes requests to `url` fail without a response.
    pub fn unreachable(&self, url: &str) {
        self.replies
            .write()
            .insert(url.to_string(), Err(format!("connection refused: {url}")));
    }

    /// Returns every requested URL, in order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.read().clone()
    }
}

impl HttpClient for StaticClient {
    fn get(
        &self,
        url: &str,
        _bearer: Option<&str>,
        _timeout: Duration,
    ) -> Result<HttpReply, String> {
        self.hits.write().push(url.to_string());
        self.replies.read().get(url).cloned().unwrap_or_else(|| {
            Ok(HttpReply {
                status: 404,
                content_type: None,
                body: Vec::new(),
            })
        })
    }
}
