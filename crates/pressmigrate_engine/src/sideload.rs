//! Media sideloading.
//!
//! Fetches a remote media URL into a temporary file and registers it as a
//! destination attachment. Every failure yields `None`; callers treat that as
//! "attachment not set".

use crate::http::HttpClient;
use crate::store::{ContentStore, NewAttachment};
use pressmigrate_protocol::MediaKind;
use reqwest::Url;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Extensions accepted for image-kind sideloads.
pub const IMAGE_EXTENSIONS: [&str; 12] = [
    "jpg", "jpeg", "jpe", "gif", "png", "webp", "avif", "bmp", "tif", "tiff", "ico", "heic",
];

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    Some(match ext {
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return None,
    })
}

/// Returns the file name a URL is stored under: the last path segment with
/// anything outside `A-Z a-z 0-9 . _ -` replaced by `-`.
pub fn file_name_for(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let name: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' })
        .collect();
    let name = name.trim_matches(|c| c == '-' || c == '.').to_string();
    (!name.is_empty()).then_some(name)
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Fetches remote media and registers it with a [`ContentStore`].
pub struct Sideloader<C: HttpClient> {
    client: C,
    timeout: Duration,
    temp_dir: Option<PathBuf>,
}

impl<C: HttpClient> Sideloader<C> {
    /// Creates a sideloader downloading through `client`.
    pub fn new(client: C, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            temp_dir: None,
        }
    }

    /// Downloads into `dir` instead of the system temporary directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    fn temp_file(&self) -> std::io::Result<NamedTempFile> {
        match &self.temp_dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Sideloads `url` as an attachment of `parent`.
    ///
    /// A URL that already produced an attachment is reused. Image kind only
    /// accepts known image extensions and records `alt`.
    pub fn sideload<S: ContentStore + ?Sized>(
        &self,
        store: &S,
        url: &str,
        parent: u64,
        alt: &str,
        kind: MediaKind,
    ) -> Option<u64> {
        let url = url.trim();
        let parsed = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            _ => {
                warn!(url, "not a fetchable media URL");
                return None;
            }
        };

        match store.find_attachment_by_source(url) {
            Ok(Some(existing)) => {
                debug!(url, attachment = existing, "reusing sideloaded attachment");
                self.apply_alt(store, existing, alt, kind);
                return Some(existing);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(url, error = %e, "attachment lookup failed");
                return None;
            }
        }

        let Some(file_name) = file_name_for(&parsed) else {
            warn!(url, "media URL has no file name");
            return None;
        };
        let extension = extension_of(&file_name);
        if kind == MediaKind::Image
            && !extension
                .as_deref()
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
        {
            warn!(url, "not an image file type");
            return None;
        }

        // Removed on drop, on every path below.
        let mut tmp = match self.temp_file() {
            Ok(tmp) => tmp,
            Err(e) => {
                warn!(error = %e, "cannot create temporary file");
                return None;
            }
        };
        let reply = match self.client.download(url, self.timeout, &mut tmp) {
            Ok(reply) if reply.is_success() => reply,
            Ok(reply) => {
                warn!(url, status = reply.status, "media download failed");
                return None;
            }
            Err(e) => {
                warn!(url, error = %e, "media download failed");
                return None;
            }
        };
        if let Err(e) = tmp.flush() {
            warn!(url, error = %e, "cannot write temporary file");
            return None;
        }

        let mime_type = reply
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map(str::to_string)
            .or_else(|| extension.as_deref().and_then(mime_for_extension).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let title = Path::new(&file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&file_name)
            .to_string();

        let attachment = NewAttachment {
            parent,
            file_name,
            title,
            mime_type,
            source_url: url.to_string(),
        };
        let id = match store.insert_attachment(&attachment, tmp.path()) {
            Ok(id) => id,
            Err(e) => {
                warn!(url, error = %e, "cannot register attachment");
                return None;
            }
        };
        debug!(url, attachment = id, kind = kind.as_str(), "sideloaded media");
        self.apply_alt(store, id, alt, kind);
        Some(id)
    }

    fn apply_alt<S: ContentStore + ?Sized>(&self, store: &S, id: u64, alt: &str, kind: MediaKind) {
        let alt = alt.trim();
        if kind != MediaKind::Image || alt.is_empty() {
            return;
        }
        if let Err(e) = store.set_attachment_alt(id, alt) {
            warn!(attachment = id, error = %e, "cannot set alt text");
        }
    }
}
