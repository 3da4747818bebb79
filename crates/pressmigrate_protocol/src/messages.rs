//! Export endpoint messages and the batch step RPC.

use crate::error::{ProtocolError, ProtocolResult};
use crate::lenient;
use crate::page::PageRequest;
use crate::record::ContentRecord;
use crate::sanitize::sanitize_key;
use crate::{DEFAULT_POST_TYPE, DEFAULT_STATUS};
use serde::{Deserialize, Serialize};

/// Raw query parameters of `GET /posts`, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportQuery {
    /// Requested page size.
    #[serde(default)]
    pub count: Option<String>,
    /// Cursor.
    #[serde(rename = "startID", default)]
    pub start_id: Option<String>,
    /// Content type tag.
    #[serde(default)]
    pub post_type: Option<String>,
    /// Status tag.
    #[serde(default)]
    pub status: Option<String>,
}

impl ExportQuery {
    /// Resolves the raw parameters into a page request.
    ///
    /// A missing or non-positive `count` becomes `default_count`; a count
    /// that is not an integer is rejected. A non-numeric `startID` reads
    /// as 0.
    pub fn resolve(&self, default_count: u32) -> ProtocolResult<PageRequest> {
        let count = match self.count.as_deref().map(str::trim) {
            None | Some("") => default_count,
            Some(raw) => {
                let parsed: i64 = raw.parse().map_err(|_| ProtocolError::InvalidParam {
                    name: "count",
                    value: raw.to_string(),
                })?;
                if parsed <= 0 {
                    default_count
                } else {
                    u32::try_from(parsed).unwrap_or(u32::MAX)
                }
            }
        };
        let cursor = self
            .start_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Ok(PageRequest::new(
            self.post_type.as_deref().unwrap_or(DEFAULT_POST_TYPE),
            self.status.as_deref().unwrap_or(DEFAULT_STATUS),
            cursor,
            count,
        ))
    }
}

/// Response body of `GET /posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPage {
    /// Number of records in this page.
    #[serde(default, deserialize_with = "lenient::id_or_zero")]
    pub count: u64,
    /// Cursor the page was served for.
    #[serde(rename = "startID", default, deserialize_with = "lenient::id_or_zero")]
    pub start_id: u64,
    /// Always 0; the source does not compute totals.
    #[serde(default, deserialize_with = "lenient::id_or_zero")]
    pub total: u64,
    /// Records, ascending by id.
    pub records: Vec<ContentRecord>,
    /// Ids of the records, in the same order.
    #[serde(default, deserialize_with = "lenient::id_list")]
    pub ids: Vec<u64>,
}

impl ExportPage {
    /// Builds a page for the given cursor from records already in id order.
    pub fn new(start_id: u64, records: Vec<ContentRecord>) -> Self {
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        Self {
            count: ids.len() as u64,
            start_id,
            total: 0,
            records,
            ids,
        }
    }

    /// Builds the empty page.
    pub fn empty(start_id: u64) -> Self {
        Self::new(start_id, Vec::new())
    }

    /// Returns the highest record id, if any.
    pub fn max_id(&self) -> Option<u64> {
        self.records.iter().map(|r| r.id).max()
    }
}

/// One importable content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypeInfo {
    /// Type tag.
    #[serde(deserialize_with = "lenient::text")]
    pub slug: String,
    /// Human label.
    #[serde(default, deserialize_with = "lenient::text")]
    pub label: String,
}

impl PostTypeInfo {
    /// Creates a type entry.
    pub fn new(slug: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            label: label.into(),
        }
    }
}

/// Response body of `GET /post-types`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypesResponse {
    /// Types, in source order.
    pub post_types: Vec<PostTypeInfo>,
}

fn default_batch_size() -> i64 {
    5
}

/// Request of one batch step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStepRequest {
    /// Page size; values below 1 are raised to 1.
    #[serde(default = "default_batch_size", deserialize_with = "lenient::int")]
    pub batch_size: i64,
    /// Cursor.
    #[serde(rename = "startID", default, deserialize_with = "lenient::id_or_zero")]
    pub start_id: u64,
    /// Content type tag.
    #[serde(default, deserialize_with = "lenient::text")]
    pub post_type: String,
    /// Status tag.
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
}

impl Default for BatchStepRequest {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            start_id: 0,
            post_type: DEFAULT_POST_TYPE.to_string(),
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

impl BatchStepRequest {
    /// Creates a step request.
    pub fn new(post_type: &str, status: &str, start_id: u64, batch_size: i64) -> Self {
        Self {
            batch_size,
            start_id,
            post_type: post_type.to_string(),
            status: status.to_string(),
        }
    }

    /// Returns the page request this step issues.
    pub fn normalized(&self) -> PageRequest {
        let limit = u32::try_from(self.batch_size.max(1)).unwrap_or(u32::MAX);
        PageRequest::new(&self.post_type, &self.status, self.start_id, limit)
    }
}

/// Response of one batch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStepResponse {
    /// Records reconciled in this step.
    pub imported: u64,
    /// Cursor after this step.
    #[serde(rename = "lastID")]
    pub last_id: u64,
    /// True when nothing remains beyond the cursor.
    pub done: bool,
}

/// Status carried in an error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    /// HTTP status code.
    pub status: u16,
}

/// Error body returned by the export endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Status.
    pub data: ErrorData,
}

impl ErrorBody {
    /// Creates an error body.
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: ErrorData { status },
        }
    }

    /// An authentication rejection (403).
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("forbidden", message, 403)
    }

    /// A rejected request parameter (400).
    pub fn invalid_param(name: &str) -> Self {
        Self::new("rest_invalid_param", format!("Invalid parameter(s): {name}"), 400)
    }

    /// An unknown route (404).
    pub fn not_found() -> Self {
        Self::new("rest_no_route", "No route was found matching the URL and request method.", 404)
    }
}

/// Sanitizes a type or status tag, falling back to `default` when empty.
pub(crate) fn tag_or_default(raw: &str, default: &str) -> String {
    let tag = sanitize_key(raw);
    if tag.is_empty() {
        default.to_string()
    } else {
        tag
    }
}
