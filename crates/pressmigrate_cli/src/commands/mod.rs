//! CLI command implementations.

pub mod import;
pub mod serve;
pub mod step;
pub mod types;
pub mod watermark;

use pressmigrate_engine::{
    BatchDriver, ContentStore, FileWatermarks, HttpTransport, ImportConfig, MemoryStore,
    RecordReconciler, ReqwestClient, RunLock, WatermarkStore, DEFAULT_UPLOADS_URL,
};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Driver wired to a remote source and the local destination.
pub type CliDriver = BatchDriver<
    HttpTransport<ReqwestClient>,
    RecordReconciler<MemoryStore, ReqwestClient>,
    FileWatermarks,
>;

/// Remote export endpoint and its token.
pub struct Source {
    url: String,
    token: String,
}

impl Source {
    /// Takes the endpoint and token from flags or environment.
    pub fn from_args(url: Option<String>, token: Option<String>) -> Result<Self, Box<dyn Error>> {
        let url = url
            .filter(|u| !u.trim().is_empty())
            .ok_or("Source URL required (--url or PRESSMIGRATE_URL)")?;
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or("Source token required (--token or PRESSMIGRATE_TOKEN)")?;
        Ok(Self { url, token })
    }

    /// Builds an import configuration for this source. `None` keeps the
    /// default page size.
    pub fn config(&self, page_size: Option<u32>) -> Result<ImportConfig, Box<dyn Error>> {
        let mut config = ImportConfig::new(self.url.as_str(), self.token.as_str());
        if let Some(size) = page_size {
            config = config.with_page_size(size);
        }
        config.validate()?;
        Ok(config)
    }

    /// Builds a transport for this source.
    pub fn transport(
        &self,
        config: &ImportConfig,
    ) -> Result<HttpTransport<ReqwestClient>, Box<dyn Error>> {
        let client = ReqwestClient::new(&config.user_agent)?;
        Ok(HttpTransport::new(config, client)?)
    }
}

/// Local destination: a store snapshot, the watermark file and uploads.
pub struct Destination {
    dir: PathBuf,
}

impl Destination {
    /// Uses `dir` as the destination directory.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path of the store snapshot.
    pub fn store_path(&self) -> PathBuf {
        self.dir.join("store.json")
    }

    /// Path of the watermark file.
    pub fn watermarks_path(&self) -> PathBuf {
        self.dir.join("watermarks.json")
    }

    /// Directory receiving sideloaded files.
    pub fn uploads_dir(&self) -> PathBuf {
        self.dir.join("uploads")
    }

    /// Returns the watermark store.
    pub fn watermarks(&self) -> FileWatermarks {
        FileWatermarks::new(self.watermarks_path())
    }

    /// Opens the destination store, creating the directory layout. Every
    /// commit writes the store back to its snapshot.
    pub fn open_store(&self) -> Result<MemoryStore, Box<dyn Error>> {
        fs::create_dir_all(self.uploads_dir())?;
        let store = MemoryStore::open(self.store_path())?;
        Ok(store.with_uploads(self.uploads_dir(), DEFAULT_UPLOADS_URL))
    }

    /// Opens a driver importing from `source` into this destination.
    ///
    /// The run lock is taken before the store is loaded and held until the
    /// session is dropped, so two sessions never share a snapshot.
    pub fn session(&self, source: &Source, page_size: Option<u32>) -> Result<Session, Box<dyn Error>> {
        let config = source.config(page_size)?;
        let transport = source.transport(&config)?;
        let watermarks = Arc::new(self.watermarks());
        let lock = watermarks.lock_run()?;
        let store = Arc::new(self.open_store()?);
        let reconciler = RecordReconciler::new(
            Arc::clone(&store),
            &config,
            ReqwestClient::new(&config.user_agent)?,
        );
        let driver = BatchDriver::from_shared(
            config,
            Arc::new(transport),
            Arc::new(reconciler),
            watermarks,
        );
        Ok(Session {
            driver,
            store,
            _lock: lock,
        })
    }
}

/// An open import session.
pub struct Session {
    /// The driver.
    pub driver: CliDriver,
    store: Arc<MemoryStore>,
    _lock: RunLock,
}

impl Session {
    /// Writes the destination snapshot, including records applied on a page
    /// that did not complete.
    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        self.store.commit()?;
        Ok(())
    }

    /// Returns the snapshot path.
    pub fn store_path(&self) -> Option<&Path> {
        self.store.snapshot_path()
    }
}
