//! Batch driver state machine.

use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};
use crate::reconciler::RecordApplier;
use crate::transport::ExportTransport;
use crate::watermark::WatermarkStore;
use parking_lot::RwLock;
use pressmigrate_protocol::{BatchStepRequest, BatchStepResponse, PageRequest, PostTypeInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// The current state of the batch driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Not running.
    Idle,
    /// Waiting on a page fetch.
    Fetching,
    /// Reconciling the records of a page.
    Applying,
    /// The source is exhausted for the last partition driven.
    Done,
    /// The last fetch or watermark write failed.
    Failed,
}

impl DriverState {
    /// Returns true while a page is in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, DriverState::Fetching | DriverState::Applying)
    }

    /// Returns true if a new step or run can start.
    pub fn can_start(&self) -> bool {
        !self.is_active()
    }
}

/// Statistics accumulated across steps and runs.
#[derive(Debug, Clone, Default)]
pub struct DriverStats {
    /// Pages fetched.
    pub pages_fetched: u64,
    /// Records received.
    pub records_seen: u64,
    /// Records reconciled.
    pub records_imported: u64,
    /// Records that failed reconciliation.
    pub records_failed: u64,
    /// Runs that reached their end without a run-level error.
    pub runs_completed: u64,
    /// Time of the last completed page.
    pub last_page_time: Option<Instant>,
    /// Last run-level error message.
    pub last_error: Option<String>,
}

/// Parameters of one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Content type.
    pub post_type: String,
    /// Status.
    pub status: String,
    /// Starting cursor. `None` resumes from the stored watermark.
    pub start_cursor: Option<u64>,
    /// Page size. `None` uses the configured size.
    pub page_size: Option<u32>,
    /// Stop once this many records were imported.
    pub target_total: Option<u64>,
}

impl RunOptions {
    /// Options resuming `(post_type, status)` from its watermark until the
    /// source is exhausted.
    pub fn new(post_type: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            post_type: post_type.into(),
            status: status.into(),
            start_cursor: None,
            page_size: None,
            target_total: None,
        }
    }

    /// Starts from an explicit cursor instead of the watermark.
    pub fn with_start_cursor(mut self, cursor: u64) -> Self {
        self.start_cursor = Some(cursor);
        self
    }

    /// Overrides the page size.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Stops once `total` records were imported.
    pub fn with_target_total(mut self, total: u64) -> Self {
        self.target_total = Some(total);
        self
    }
}

/// Result of an import run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identifier of the run, as logged.
    pub run_id: Uuid,
    /// Records reconciled.
    pub records_imported: u64,
    /// Records that failed reconciliation.
    pub records_failed: u64,
    /// Cursor after the last completed page.
    pub final_cursor: u64,
    /// True when the source is exhausted beyond `final_cursor`.
    pub done: bool,
    /// Pages fetched.
    pub pages: u64,
    /// Wall time of the run.
    pub duration: Duration,
}

/// Outcome of one page.
#[derive(Debug, Clone, Copy)]
struct PageOutcome {
    imported: u64,
    failed: u64,
    cursor: u64,
    done: bool,
}

/// Pages through the source and reconciles each record.
///
/// One page is in flight at a time and records are applied in page order.
/// The watermark is written after every completed page.
pub struct BatchDriver<T: ExportTransport, A: RecordApplier, W: WatermarkStore> {
    config: ImportConfig,
    transport: Arc<T>,
    applier: Arc<A>,
    watermarks: Arc<W>,
    state: RwLock<DriverState>,
    stats: RwLock<DriverStats>,
    cancelled: Arc<AtomicBool>,
}

/// Cancels a driver's run from another thread or from inside a page.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Requests cancellation. The run stops before its next page.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl<T: ExportTransport, A: RecordApplier, W: WatermarkStore> BatchDriver<T, A, W> {
    /// Creates a new driver.
    pub fn new(config: ImportConfig, transport: T, applier: A, watermarks: W) -> Self {
        Self::from_shared(
            config,
            Arc::new(transport),
            Arc::new(applier),
            Arc::new(watermarks),
        )
    }

    /// Creates a driver over shared components.
    pub fn from_shared(
        config: ImportConfig,
        transport: Arc<T>,
        applier: Arc<A>,
        watermarks: Arc<W>,
    ) -> Self {
        Self {
            config,
            transport,
            applier,
            watermarks,
            state: RwLock::new(DriverState::Idle),
            stats: RwLock::new(DriverStats::default()),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Gets the current state.
    pub fn state(&self) -> DriverState {
        *self.state.read()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> DriverStats {
        self.stats.read().clone()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Returns the transport.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Returns the record applier.
    pub fn applier(&self) -> &Arc<A> {
        &self.applier
    }

    /// Returns the watermark store.
    pub fn watermarks(&self) -> &Arc<W> {
        &self.watermarks
    }

    /// Requests cancellation. A run stops before its next page.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns a handle that cancels this driver.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    /// Resets the cancelled flag.
    pub fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    fn check_cancelled(&self) -> ImportResult<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            Err(ImportError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn set_state(&self, state: DriverState) {
        *self.state.write() = state;
    }

    fn ensure_can_start(&self, action: &str) -> ImportResult<()> {
        let state = self.state();
        if state.can_start() {
            Ok(())
        } else {
            Err(ImportError::InvalidStateTransition {
                from: format!("{state:?}"),
                to: action.into(),
            })
        }
    }

    /// Lists the importable content types of the source.
    pub fn fetch_types(&self) -> ImportResult<Vec<PostTypeInfo>> {
        self.transport.fetch_types().inspect_err(|e| {
            error!(error = %e, "type listing failed");
            self.stats.write().last_error = Some(e.to_string());
        })
    }

    /// Executes one batch step: fetch one page beyond `startID`, reconcile
    /// it and persist the watermark.
    ///
    /// The watermark store's run lock is held for the step, so a step never
    /// overlaps a run against the same store.
    pub fn step(&self, request: &BatchStepRequest) -> ImportResult<BatchStepResponse> {
        self.ensure_can_start("step")?;
        let _lock = self.watermarks.lock_run().inspect_err(|e| self.handle_error(e))?;
        let page = self.config.page_request(
            &request.post_type,
            &request.status,
            request.start_id,
            request.normalized().limit,
        );
        let outcome = self.process_page(&page)?;
        self.set_state(if outcome.done {
            DriverState::Done
        } else {
            DriverState::Idle
        });
        Ok(BatchStepResponse {
            imported: outcome.imported,
            last_id: outcome.cursor,
            done: outcome.done,
        })
    }

    /// Drives pages until the source is exhausted, the target total is
    /// reached or the run is cancelled.
    ///
    /// The watermark store's run lock is held for the whole run.
    pub fn run(&self, options: &RunOptions) -> ImportResult<RunReport> {
        self.ensure_can_start("run")?;
        self.reset_cancel();
        let start = Instant::now();
        let run_id = Uuid::new_v4();

        let seed = self.config.page_request(
            &options.post_type,
            &options.status,
            0,
            options.page_size.unwrap_or(self.config.page_size),
        );
        let span = info_span!(
            "import_run",
            %run_id,
            post_type = %seed.post_type,
            status = %seed.status
        );
        let _enter = span.enter();

        let _lock = self.watermarks.lock_run().inspect_err(|e| self.handle_error(e))?;
        let cursor = match options.start_cursor {
            Some(cursor) => cursor,
            None => self
                .watermarks
                .load(&seed.post_type)
                .inspect_err(|e| self.handle_error(e))?,
        };
        info!(cursor, page_size = seed.limit, target = ?options.target_total, "import run started");
        self.applier.begin_run();

        let mut report = RunReport {
            run_id,
            records_imported: 0,
            records_failed: 0,
            final_cursor: cursor,
            done: false,
            pages: 0,
            duration: Duration::ZERO,
        };
        let mut request = PageRequest { cursor, ..seed };

        loop {
            let limit = match options.target_total {
                Some(target) => {
                    let remaining = target.saturating_sub(report.records_imported);
                    if remaining == 0 {
                        break;
                    }
                    u32::try_from(remaining).map_or(request.limit, |r| r.min(request.limit))
                }
                None => request.limit,
            };

            if let Err(e) = self.check_cancelled() {
                info!(cursor = report.final_cursor, "import run cancelled");
                self.set_state(DriverState::Idle);
                return Err(e);
            }

            let outcome = self.process_page(&PageRequest {
                limit,
                ..request.clone()
            })?;
            report.pages += 1;
            report.records_imported += outcome.imported;
            report.records_failed += outcome.failed;
            report.final_cursor = outcome.cursor;
            request.cursor = outcome.cursor;

            if outcome.done {
                report.done = true;
                break;
            }
        }

        report.duration = start.elapsed();
        self.set_state(if report.done {
            DriverState::Done
        } else {
            DriverState::Idle
        });
        self.stats.write().runs_completed += 1;
        info!(
            imported = report.records_imported,
            failed = report.records_failed,
            cursor = report.final_cursor,
            done = report.done,
            pages = report.pages,
            "import run finished"
        );
        Ok(report)
    }

    /// Fetches, applies and commits one page.
    fn process_page(&self, request: &PageRequest) -> ImportResult<PageOutcome> {
        self.set_state(DriverState::Fetching);
        debug!(cursor = request.cursor, limit = request.limit, "fetching page");
        let page = self
            .transport
            .fetch_page(request)
            .and_then(|page| {
                request.check_page(&page.records)?;
                Ok(page)
            })
            .inspect_err(|e| self.handle_error(e))?;

        self.set_state(DriverState::Applying);
        let mut imported = 0u64;
        let mut failed = 0u64;
        for record in &page.records {
            match self.applier.apply(record) {
                Ok(outcome) => {
                    imported += 1;
                    if !outcome.is_clean() {
                        debug!(
                            record = record.id,
                            failed_steps = outcome.step_failures.len(),
                            "record imported with failed steps"
                        );
                    }
                }
                Err(e) => {
                    failed += 1;
                    warn!(record = record.id, error = %e, "record not imported");
                }
            }
        }

        let mut cursor = request.cursor;
        if let Some(max_id) = page.max_id() {
            self.applier
                .end_page()
                .inspect_err(|e| self.handle_error(e))?;
            cursor = request.advance(max_id).cursor;
            self.watermarks
                .store(&request.post_type, cursor)
                .inspect_err(|e| self.handle_error(e))?;
        }
        let done = imported == 0 || request.is_final_page(page.records.len());

        {
            let mut stats = self.stats.write();
            stats.pages_fetched += 1;
            stats.records_seen += page.records.len() as u64;
            stats.records_imported += imported;
            stats.records_failed += failed;
            stats.last_page_time = Some(Instant::now());
            stats.last_error = None;
        }
        info!(
            cursor,
            received = page.records.len(),
            imported,
            failed,
            done,
            "page applied"
        );
        Ok(PageOutcome {
            imported,
            failed,
            cursor,
            done,
        })
    }

    /// Handles a run-level error by updating state and stats.
    fn handle_error(&self, error: &ImportError) {
        error!(error = %error, "import failed");
        self.set_state(DriverState::Failed);
        self.stats.write().last_error = Some(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::{RecordOutcome, UpsertAction};
    use crate::transport::{MockFailure, MockTransport};
    use crate::watermark::{FileWatermarks, MemoryWatermarks};
    use pressmigrate_protocol::ContentRecord;
    use std::collections::BTreeSet;

    /// Applier recording ids; rejects the ids it is told to.
    #[derive(Default)]
    struct RecordingApplier {
        applied: RwLock<Vec<u64>>,
        reject: BTreeSet<u64>,
        begun: AtomicBool,
        cancel_on_first: parking_lot::Mutex<Option<CancelHandle>>,
        pages_ended: std::sync::atomic::AtomicU64,
        refuse_commit: bool,
    }

    impl RecordApplier for RecordingApplier {
        fn apply(&self, record: &ContentRecord) -> ImportResult<RecordOutcome> {
            if self.reject.contains(&record.id) {
                return Err(ImportError::Store(crate::store::StoreError::Rejected(
                    "rejected".into(),
                )));
            }
            self.applied.write().push(record.id);
            if let Some(handle) = self.cancel_on_first.lock().take() {
                handle.cancel();
            }
            Ok(RecordOutcome {
                post_id: record.id,
                action: UpsertAction::Created,
                step_failures: Vec::new(),
            })
        }

        fn begin_run(&self) {
            self.begun.store(true, Ordering::SeqCst);
        }

        fn end_page(&self) -> ImportResult<()> {
            if self.refuse_commit {
                return Err(ImportError::Store(crate::store::StoreError::Rejected(
                    "disk full".into(),
                )));
            }
            self.pages_ended.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn source(n: u64) -> MockTransport {
        MockTransport::with_records(
            (1..=n)
                .map(|id| ContentRecord::new(id, "post", format!("post-{id}")))
                .collect(),
        )
    }

    fn driver(
        transport: MockTransport,
        applier: RecordingApplier,
    ) -> BatchDriver<MockTransport, RecordingApplier, MemoryWatermarks> {
        let config = ImportConfig::new("https://src.example.com/posts", "t").with_page_size(5);
        BatchDriver::new(config, transport, applier, MemoryWatermarks::new())
    }

    #[test]
    fn initial_state() {
        let d = driver(source(0), RecordingApplier::default());
        assert_eq!(d.state(), DriverState::Idle);
        assert!(d.state().can_start());
        assert!(!DriverState::Fetching.can_start());
    }

    #[test]
    fn twelve_records_in_three_steps() {
        let d = driver(source(12), RecordingApplier::default());
        let first = d.step(&BatchStepRequest::new("post", "publish", 0, 5)).unwrap();
        assert_eq!((first.imported, first.last_id, first.done), (5, 5, false));
        let second = d.step(&BatchStepRequest::new("post", "publish", 5, 5)).unwrap();
        assert_eq!((second.imported, second.last_id, second.done), (5, 10, false));
        let third = d.step(&BatchStepRequest::new("post", "publish", 10, 5)).unwrap();
        assert_eq!((third.imported, third.last_id, third.done), (2, 12, true));

        assert_eq!(d.watermarks().load("post").unwrap(), 12);
        assert_eq!(d.state(), DriverState::Done);
        assert_eq!(*d.applier().applied.read(), (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn empty_page_is_done() {
        let d = driver(source(3), RecordingApplier::default());
        let response = d.step(&BatchStepRequest::new("post", "publish", 3, 5)).unwrap();
        assert_eq!((response.imported, response.last_id, response.done), (0, 3, true));
        assert_eq!(d.watermarks().load("post").unwrap(), 0);
    }

    #[test]
    fn batch_size_is_clamped() {
        let d = driver(source(3), RecordingApplier::default());
        let response = d.step(&BatchStepRequest::new("post", "publish", 0, -4)).unwrap();
        assert_eq!(response.imported, 1);
        assert_eq!(d.transport().requests()[0].limit, 1);
    }

    #[test]
    fn failed_records_do_not_abort_the_page() {
        let applier = RecordingApplier {
            reject: BTreeSet::from([2, 4]),
            ..RecordingApplier::default()
        };
        let d = driver(source(5), applier);
        let response = d.step(&BatchStepRequest::new("post", "publish", 0, 5)).unwrap();
        assert_eq!(response.imported, 3);
        assert_eq!(response.last_id, 5);
        assert_eq!(d.stats().records_failed, 2);
        assert_eq!(*d.applier().applied.read(), vec![1, 3, 5]);
    }

    #[test]
    fn page_with_nothing_imported_is_done() {
        let applier = RecordingApplier {
            reject: (1..=5).collect(),
            ..RecordingApplier::default()
        };
        let d = driver(source(12), applier);
        let response = d.step(&BatchStepRequest::new("post", "publish", 0, 5)).unwrap();
        assert!(response.done);
        assert_eq!(response.last_id, 5);
    }

    #[test]
    fn fetch_failure_is_terminal_and_leaves_watermark() {
        let transport = source(12);
        transport.fail_on_call(1, MockFailure::Status(500));
        let d = driver(transport, RecordingApplier::default());
        let err = d.run(&RunOptions::new("post", "publish")).unwrap_err();
        assert!(err.is_run_level());
        assert_eq!(d.state(), DriverState::Failed);
        assert_eq!(d.watermarks().load("post").unwrap(), 5);
        assert!(d.stats().last_error.is_some());

        // A fresh run resumes from the watermark.
        let report = d.run(&RunOptions::new("post", "publish")).unwrap();
        assert_eq!(report.records_imported, 7);
        assert_eq!(report.final_cursor, 12);
        assert!(report.done);
    }

    #[test]
    fn auth_failure_surfaces() {
        let transport = source(3);
        transport.fail_next(MockFailure::Auth);
        let d = driver(transport, RecordingApplier::default());
        let err = d.step(&BatchStepRequest::default()).unwrap_err();
        assert!(matches!(err, ImportError::Auth(_)));
        assert!(d.applier().applied.read().is_empty());
    }

    #[test]
    fn run_until_exhausted() {
        let d = driver(source(12), RecordingApplier::default());
        let report = d.run(&RunOptions::new("post", "publish")).unwrap();
        assert_eq!(report.records_imported, 12);
        assert_eq!(report.final_cursor, 12);
        assert_eq!(report.pages, 3);
        assert!(report.done);
        assert!(d.applier().begun.load(Ordering::SeqCst));
        assert_eq!(d.stats().runs_completed, 1);
    }

    #[test]
    fn run_with_target_total_caps_last_page() {
        let d = driver(source(12), RecordingApplier::default());
        let report = d
            .run(&RunOptions::new("post", "publish").with_target_total(7))
            .unwrap();
        assert_eq!(report.records_imported, 7);
        assert_eq!(report.final_cursor, 7);
        assert!(!report.done);
        let limits: Vec<u32> = d.transport().requests().iter().map(|r| r.limit).collect();
        assert_eq!(limits, vec![5, 2]);
        assert_eq!(d.state(), DriverState::Idle);
    }

    #[test]
    fn run_from_explicit_cursor() {
        let d = driver(source(12), RecordingApplier::default());
        d.watermarks().store("post", 3).unwrap();
        let report = d
            .run(
                &RunOptions::new("post", "publish")
                    .with_start_cursor(8)
                    .with_page_size(10),
            )
            .unwrap();
        assert_eq!(report.records_imported, 4);
        assert_eq!(d.transport().requests()[0].cursor, 8);
    }

    #[test]
    fn cancel_between_pages() {
        let config = ImportConfig::new("https://src.example.com/posts", "t").with_page_size(5);
        let applier = Arc::new(RecordingApplier::default());
        let d = BatchDriver::from_shared(
            config,
            Arc::new(source(12)),
            Arc::clone(&applier),
            Arc::new(MemoryWatermarks::new()),
        );
        *applier.cancel_on_first.lock() = Some(d.cancel_handle());

        let err = d.run(&RunOptions::new("post", "publish")).unwrap_err();
        assert!(matches!(err, ImportError::Cancelled));
        // The page in flight completes, the next one is never fetched.
        assert_eq!(applier.applied.read().len(), 5);
        assert_eq!(d.transport().requests().len(), 1);
        assert_eq!(d.watermarks().load("post").unwrap(), 5);
        assert_eq!(d.state(), DriverState::Idle);

        // The next run clears the flag and resumes.
        let report = d.run(&RunOptions::new("post", "publish")).unwrap();
        assert_eq!(report.records_imported, 7);
    }

    #[test]
    fn contract_violation_is_payload() {
        struct Backwards;
        impl ExportTransport for Backwards {
            fn fetch_page(&self, request: &PageRequest) -> ImportResult<pressmigrate_protocol::ExportPage> {
                Ok(pressmigrate_protocol::ExportPage::new(
                    request.cursor,
                    vec![ContentRecord::new(request.cursor, "post", "old")],
                ))
            }
            fn fetch_types(&self) -> ImportResult<Vec<PostTypeInfo>> {
                Ok(Vec::new())
            }
        }
        let config = ImportConfig::new("https://src.example.com/posts", "t");
        let d = BatchDriver::new(
            config,
            Backwards,
            RecordingApplier::default(),
            MemoryWatermarks::new(),
        );
        let err = d.step(&BatchStepRequest::new("post", "publish", 4, 5)).unwrap_err();
        assert!(matches!(err, ImportError::Payload(_)));
        assert!(d.applier().applied.read().is_empty());
    }

    #[test]
    fn every_applied_page_is_committed() {
        let d = driver(source(12), RecordingApplier::default());
        d.run(&RunOptions::new("post", "publish")).unwrap();
        assert_eq!(d.applier().pages_ended.load(Ordering::SeqCst), 3);

        // An empty page has nothing to commit.
        d.step(&BatchStepRequest::new("post", "publish", 12, 5)).unwrap();
        assert_eq!(d.applier().pages_ended.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn failed_commit_keeps_watermark() {
        let applier = RecordingApplier {
            refuse_commit: true,
            ..RecordingApplier::default()
        };
        let d = driver(source(12), applier);
        let err = d.run(&RunOptions::new("post", "publish")).unwrap_err();
        assert!(matches!(err, ImportError::Store(_)));
        assert_eq!(d.state(), DriverState::Failed);
        assert_eq!(d.watermarks().load("post").unwrap(), 0);
        assert_eq!(d.transport().requests().len(), 1);
    }

    #[test]
    fn step_is_refused_while_a_run_holds_the_lock() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("watermarks.json");
        let config = ImportConfig::new("https://src.example.com/posts", "t").with_page_size(5);
        let d = BatchDriver::new(
            config,
            source(12),
            RecordingApplier::default(),
            FileWatermarks::new(&path),
        );

        let other = FileWatermarks::new(&path);
        let held = other.lock_run().unwrap();
        let err = d.step(&BatchStepRequest::new("post", "publish", 0, 5)).unwrap_err();
        assert!(matches!(err, ImportError::Watermark(_)));
        assert!(d.transport().requests().is_empty());
        assert!(d.applier().applied.read().is_empty());

        drop(held);
        let response = d.step(&BatchStepRequest::new("post", "publish", 0, 5)).unwrap();
        assert_eq!(response.last_id, 5);
    }

    #[test]
    fn configured_partition_fills_empty_tags() {
        let transport = MockTransport::with_records(
            (1..=3)
                .map(|id| {
                    let mut record = ContentRecord::new(id, "page", format!("page-{id}"));
                    record.status = "draft".into();
                    record
                })
                .collect(),
        );
        let config = ImportConfig::new("https://src.example.com/posts", "t")
            .with_partition("page", "draft");
        let d = BatchDriver::new(
            config,
            transport,
            RecordingApplier::default(),
            MemoryWatermarks::new(),
        );
        let report = d.run(&RunOptions::new("", "")).unwrap();
        assert_eq!(report.records_imported, 3);
        let request = &d.transport().requests()[0];
        assert_eq!((request.post_type.as_str(), request.status.as_str()), ("page", "draft"));
        assert_eq!(d.watermarks().load("page").unwrap(), 3);
    }

    #[test]
    fn types_passthrough() {
        let transport = source(0);
        transport.set_types(vec![PostTypeInfo::new("page", "Pages")]);
        let d = driver(transport, RecordingApplier::default());
        assert_eq!(d.fetch_types().unwrap()[0].label, "Pages");
    }
}
