//! Page request and the pagination contract.

use crate::error::{ProtocolError, ProtocolResult};
use crate::messages::tag_or_default;
use crate::record::ContentRecord;
use crate::{DEFAULT_POST_TYPE, DEFAULT_STATUS};
use serde::{Deserialize, Serialize};

/// One request for a bounded, ordered page of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Content type tag.
    pub post_type: String,
    /// Status tag.
    pub status: String,
    /// Only records with an id strictly greater than this are returned.
    pub cursor: u64,
    /// Maximum number of records; at least 1.
    pub limit: u32,
}

impl PageRequest {
    /// Creates a request. Type and status are sanitized and fall back to
    /// their defaults when empty; a zero limit is raised to 1.
    pub fn new(post_type: &str, status: &str, cursor: u64, limit: u32) -> Self {
        Self {
            post_type: tag_or_default(post_type, DEFAULT_POST_TYPE),
            status: tag_or_default(status, DEFAULT_STATUS),
            cursor,
            limit: limit.max(1),
        }
    }

    /// Returns the query parameters of the export fetch, in wire order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("count", self.limit.to_string()),
            ("startID", self.cursor.to_string()),
            ("post_type", self.post_type.clone()),
            ("status", self.status.clone()),
        ]
    }

    /// Checks a returned page against the contract: at most `limit`
    /// records, every id beyond the cursor, ids strictly ascending.
    pub fn check_page(&self, records: &[ContentRecord]) -> ProtocolResult<()> {
        if records.len() > self.limit as usize {
            return Err(ProtocolError::PageOverflow {
                limit: self.limit,
                len: records.len(),
            });
        }
        let mut previous: Option<u64> = None;
        for record in records {
            if record.id <= self.cursor {
                return Err(ProtocolError::CursorViolation {
                    cursor: self.cursor,
                    id: record.id,
                });
            }
            if let Some(prev) = previous {
                if record.id <= prev {
                    return Err(ProtocolError::OrderViolation {
                        previous: prev,
                        id: record.id,
                    });
                }
            }
            previous = Some(record.id);
        }
        Ok(())
    }

    /// Returns true if a page of `len` records means nothing remains
    /// beyond this cursor.
    pub fn is_final_page(&self, len: usize) -> bool {
        len == 0 || len < self.limit as usize
    }

    /// Returns the request for the page after one whose highest id was
    /// `max_id`. The cursor never moves backwards.
    pub fn advance(&self, max_id: u64) -> Self {
        Self {
            cursor: self.cursor.max(max_id),
            ..self.clone()
        }
    }
}
