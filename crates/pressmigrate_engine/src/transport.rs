//! Transport layer abstraction for export fetches.

use crate::error::{ImportError, ImportResult};
use parking_lot::RwLock;
use pressmigrate_protocol::{ContentRecord, ExportPage, PageRequest, PostTypeInfo};

/// An export transport fetches pages and type listings from the source.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, loopback, mock for testing).
pub trait ExportTransport: Send + Sync {
    /// Fetches one page of records beyond the request's cursor.
    fn fetch_page(&self, request: &PageRequest) -> ImportResult<ExportPage>;

    /// Lists the importable content types.
    fn fetch_types(&self) -> ImportResult<Vec<PostTypeInfo>>;
}

/// A failure the mock transport returns on its next call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Reject the token.
    Auth,
    /// Fail with the given HTTP status.
    Status(u16),
    /// Return a malformed payload.
    Payload,
}

impl MockFailure {
    fn into_error(self) -> ImportError {
        match self {
            MockFailure::Auth => ImportError::Auth("Invalid token".into()),
            MockFailure::Status(status) => ImportError::status(status, format!("HTTP {status}")),
            MockFailure::Payload => ImportError::Payload("response has no records".into()),
        }
    }
}

/// A mock transport serving an in-memory record set.
///
/// Pages are cut from the record set exactly as the source would: filtered
/// by type and status, ids beyond the cursor, ascending, at most `limit`.
#[derive(Debug, Default)]
pub struct MockTransport {
    records: RwLock<Vec<ContentRecord>>,
    types: RwLock<Vec<PostTypeInfo>>,
    failures: RwLock<Vec<(u64, MockFailure)>>,
    requests: RwLock<Vec<PageRequest>>,
}

impl MockTransport {
    /// Creates an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock transport serving the given records.
    pub fn with_records(records: Vec<ContentRecord>) -> Self {
        let transport = Self::new();
        *transport.records.write() = records;
        transport
    }

    /// Adds a record to the served set.
    pub fn push_record(&self, record: ContentRecord) {
        self.records.write().push(record);
    }

    /// Sets the type listing.
    pub fn set_types(&self, types: Vec<PostTypeInfo>) {
        *self.types.write() = types;
    }

    /// Makes the next call fail.
    pub fn fail_next(&self, failure: MockFailure) {
        self.fail_on_call(self.requests.read().len() as u64, failure);
    }

    /// Makes the page fetch with the given zero-based call index fail.
    pub fn fail_on_call(&self, call: u64, failure: MockFailure) {
        self.failures.write().push((call, failure));
    }

    /// Returns every page request received, in order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.read().clone()
    }

    fn take_failure(&self, call: u64) -> Option<MockFailure> {
        let mut failures = self.failures.write();
        let index = failures.iter().position(|(at, _)| *at == call)?;
        Some(failures.remove(index).1)
    }
}

impl ExportTransport for MockTransport {
    fn fetch_page(&self, request: &PageRequest) -> ImportResult<ExportPage> {
        let call = {
            let mut requests = self.requests.write();
            requests.push(request.clone());
            requests.len() as u64 - 1
        };
        if let Some(failure) = self.take_failure(call) {
            return Err(failure.into_error());
        }

        let mut page: Vec<ContentRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| {
                r.post_type == request.post_type
                    && r.status == request.status
                    && r.id > request.cursor
            })
            .cloned()
            .collect();
        page.sort_by_key(|r| r.id);
        page.truncate(request.limit as usize);
        Ok(ExportPage::new(request.cursor, page))
    }

    fn fetch_types(&self) -> ImportResult<Vec<PostTypeInfo>> {
        let call = self.requests.read().len() as u64;
        if let Some(failure) = self.take_failure(call) {
            return Err(failure.into_error());
        }
        Ok(self.types.read().clone())
    }
}
