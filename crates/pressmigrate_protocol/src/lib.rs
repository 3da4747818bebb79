//! # pressmigrate Protocol
//!
//! Content record model and export wire messages for pressmigrate.
//!
//! This crate provides:
//! - `ContentRecord` and its embedded sub-records (author, terms, media, fields)
//! - `MetaValue`, the tagged shape of a meta entry
//! - Export messages (`ExportPage`, `PostTypesResponse`) and the batch step RPC
//! - `PageRequest`, the client side of the cursor pagination contract
//! - Key, login and slug sanitizers shared by both ends of the wire
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! ## Pagination contract
//!
//! A page request carries `(post_type, status, cursor, limit)`. A valid page
//! holds at most `limit` records, every id is strictly greater than `cursor`,
//! and ids are strictly ascending. An empty page, or one shorter than
//! `limit`, means nothing remains beyond the cursor.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod field;
mod lenient;
mod messages;
mod meta;
mod page;
mod record;
pub mod sanitize;

pub use error::{ProtocolError, ProtocolResult};
pub use field::{FieldKind, FieldRecord, MediaKind, ReturnShape};
pub use lenient::parse_id;
pub use messages::{
    BatchStepRequest, BatchStepResponse, ErrorBody, ErrorData, ExportPage, ExportQuery,
    PostTypeInfo, PostTypesResponse,
};
pub use meta::MetaValue;
pub use page::PageRequest;
pub use record::{AuthorRecord, ContentRecord, DedupeKey, MediaReference, TermRecord, Toggle};

/// Default content type when a request names none.
pub const DEFAULT_POST_TYPE: &str = "post";

/// Default status when a request names none.
pub const DEFAULT_STATUS: &str = "publish";
