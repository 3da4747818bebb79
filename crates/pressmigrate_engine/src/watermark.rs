//! Persisted per-type watermarks.
//!
//! A watermark is the highest source id whose page was fully applied. Stores
//! only ever raise a watermark; lowering one requires an explicit reset.

use crate::error::{ImportError, ImportResult};
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use pressmigrate_protocol::{parse_id, sanitize::sanitize_key, DEFAULT_POST_TYPE};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Durable storage of one watermark per content type.
pub trait WatermarkStore: Send + Sync {
    /// Returns the watermark of a type, 0 when none was stored.
    fn load(&self, post_type: &str) -> ImportResult<u64>;

    /// Raises the watermark of a type and returns the persisted value,
    /// `max(stored, cursor)`.
    fn store(&self, post_type: &str, cursor: u64) -> ImportResult<u64>;

    /// Removes the watermark of a type.
    fn reset(&self, post_type: &str) -> ImportResult<()>;

    /// Returns every stored watermark.
    fn all(&self) -> ImportResult<BTreeMap<String, u64>>;

    /// Takes the lock that serializes import runs against this store.
    ///
    /// The lock is held until the returned guard is dropped.
    fn lock_run(&self) -> ImportResult<RunLock> {
        Ok(RunLock::unlocked())
    }
}

/// Guard for an exclusive import run.
///
/// Guards handed out by the same store share one file lock, which is
/// released when the last of them is dropped.
#[derive(Debug)]
pub struct RunLock {
    file: Option<Arc<File>>,
}

impl RunLock {
    /// A guard that holds nothing.
    pub fn unlocked() -> Self {
        Self { file: None }
    }

    /// Returns true if a file lock is held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        if let Ok(file) = Arc::try_unwrap(file) {
            if let Err(e) = FileExt::unlock(&file) {
                warn!(error = %e, "failed to release watermark lock");
            }
        }
    }
}

fn key_for(post_type: &str) -> String {
    let key = sanitize_key(post_type);
    if key.is_empty() {
        DEFAULT_POST_TYPE.to_string()
    } else {
        key
    }
}

/// Watermarks kept in memory.
#[derive(Debug, Default)]
pub struct MemoryWatermarks {
    marks: RwLock<BTreeMap<String, u64>>,
}

impl MemoryWatermarks {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatermarkStore for MemoryWatermarks {
    fn load(&self, post_type: &str) -> ImportResult<u64> {
        Ok(self.marks.read().get(&key_for(post_type)).copied().unwrap_or(0))
    }

    fn store(&self, post_type: &str, cursor: u64) -> ImportResult<u64> {
        let mut marks = self.marks.write();
        let entry = marks.entry(key_for(post_type)).or_insert(0);
        *entry = (*entry).max(cursor);
        Ok(*entry)
    }

    fn reset(&self, post_type: &str) -> ImportResult<()> {
        self.marks.write().remove(&key_for(post_type));
        Ok(())
    }

    fn all(&self) -> ImportResult<BTreeMap<String, u64>> {
        Ok(self.marks.read().clone())
    }
}

/// Watermarks persisted as a JSON object `{type: id}`.
///
/// A file holding a bare integer is read as the watermark of `post`. Every
/// write replaces the file atomically.
#[derive(Debug)]
pub struct FileWatermarks {
    path: PathBuf,
    held: Mutex<Weak<File>>,
}

impl FileWatermarks {
    /// Creates a store backed by `path`. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            held: Mutex::new(Weak::new()),
        }
    }

    /// Returns the state file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn read_map(&self) -> ImportResult<BTreeMap<String, u64>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(ImportError::Watermark(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            ImportError::Watermark(format!("cannot parse {}: {e}", self.path.display()))
        })?;
        match value {
            Value::Object(entries) => Ok(entries
                .into_iter()
                .filter_map(|(k, v)| parse_id(&v).map(|id| (key_for(&k), id)))
                .collect()),
            legacy @ (Value::Number(_) | Value::String(_)) => {
                let id = parse_id(&legacy).ok_or_else(|| {
                    ImportError::Watermark(format!("invalid legacy watermark {legacy}"))
                })?;
                debug!(id, "read legacy single-value watermark");
                Ok(BTreeMap::from([(DEFAULT_POST_TYPE.to_string(), id)]))
            }
            other => Err(ImportError::Watermark(format!(
                "unexpected watermark document {other}"
            ))),
        }
    }

    fn write_map(&self, marks: &BTreeMap<String, u64>) -> ImportResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let fail = |e: &dyn std::fmt::Display| {
            ImportError::Watermark(format!("cannot write {}: {e}", self.path.display()))
        };
        fs::create_dir_all(&dir).map_err(|e| fail(&e))?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| fail(&e))?;
        serde_json::to_writer_pretty(&mut tmp, marks).map_err(|e| fail(&e))?;
        tmp.write_all(b"\n").map_err(|e| fail(&e))?;
        tmp.as_file().sync_all().map_err(|e| fail(&e))?;
        tmp.persist(&self.path).map_err(|e| fail(&e.error))?;
        Ok(())
    }
}

impl WatermarkStore for FileWatermarks {
    fn load(&self, post_type: &str) -> ImportResult<u64> {
        Ok(self.read_map()?.get(&key_for(post_type)).copied().unwrap_or(0))
    }

    fn store(&self, post_type: &str, cursor: u64) -> ImportResult<u64> {
        let mut marks = self.read_map()?;
        let key = key_for(post_type);
        let stored = marks.get(&key).copied().unwrap_or(0);
        let next = stored.max(cursor);
        if next != stored || !marks.contains_key(&key) {
            marks.insert(key, next);
            self.write_map(&marks)?;
        }
        Ok(next)
    }

    fn reset(&self, post_type: &str) -> ImportResult<()> {
        let mut marks = self.read_map()?;
        if marks.remove(&key_for(post_type)).is_some() {
            self.write_map(&marks)?;
        }
        Ok(())
    }

    fn all(&self) -> ImportResult<BTreeMap<String, u64>> {
        self.read_map()
    }

    /// Takes the exclusive lock on a sibling `.lock` file. While a guard
    /// from this store is alive, further calls share its lock; another
    /// store or process is refused.
    fn lock_run(&self) -> ImportResult<RunLock> {
        let mut held = self.held.lock();
        if let Some(file) = held.upgrade() {
            return Ok(RunLock { file: Some(file) });
        }
        let lock_path = self.lock_path();
        if let Some(dir) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                ImportError::Watermark(format!("cannot create {}: {e}", dir.display()))
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                ImportError::Watermark(format!("cannot open {}: {e}", lock_path.display()))
            })?;
        file.try_lock_exclusive().map_err(|_| {
            ImportError::Watermark(format!(
                "another import run holds {}",
                lock_path.display()
            ))
        })?;
        let file = Arc::new(file);
        *held = Arc::downgrade(&file);
        Ok(RunLock { file: Some(file) })
    }
}
