//! # pressmigrate Engine
//!
//! Batch import driver and record reconciliation for pressmigrate.
//!
//! This crate provides:
//! - Batch driver state machine (idle → fetching → applying → done)
//! - Per-type watermarks, in memory or in a locked JSON file
//! - Record reconciliation with insert-or-update on the dedupe key
//! - Author, term and attachment resolution
//! - Media sideloading
//! - HTTP transport abstraction
//!
//! ## Architecture
//!
//! The driver pulls one page at a time from an [`ExportTransport`], hands
//! every record to a [`RecordApplier`] in page order and persists the
//! watermark once the page is applied. [`RecordReconciler`] is the applier
//! that writes through a [`ContentStore`].
//!
//! ## Key Invariants
//!
//! - One page in flight, records applied sequentially
//! - A watermark never decreases
//! - Reconciling a record twice yields one destination record
//! - Per-record failures never abort a page

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod driver;
mod error;
mod http;
mod reconciler;
mod resolver;
mod sideload;
mod store;
mod transport;
mod watermark;

pub use config::{ImportConfig, DEFAULT_RESERVED_META};
pub use driver::{BatchDriver, CancelHandle, DriverState, DriverStats, RunOptions, RunReport};
pub use error::{ImportError, ImportResult};
pub use http::{
    HttpClient, HttpReply, HttpTransport, LoopbackClient, LoopbackServer, ReqwestClient,
    StaticClient,
};
pub use reconciler::{RecordApplier, RecordOutcome, RecordReconciler, UpsertAction};
pub use resolver::{generate_credential, AttachmentValue, EntityResolver, FALLBACK_LOGIN};
pub use sideload::{file_name_for, Sideloader, IMAGE_EXTENSIONS};
pub use store::{
    ContentStore, MemoryStore, NewAttachment, NewUser, PostFields, StoreError, StoreResult,
    StoredAttachment, StoredPost, StoredTerm, StoredUser, UserLookup, DEFAULT_UPLOADS_URL,
};
pub use transport::{ExportTransport, MockFailure, MockTransport};
pub use watermark::{FileWatermarks, MemoryWatermarks, RunLock, WatermarkStore};
