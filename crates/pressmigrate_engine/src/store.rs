//! Destination content store.
//!
//! The reconciler writes through [`ContentStore`], which models the handful
//! of destination operations an import needs: posts keyed by dedupe key,
//! taxonomy terms, meta entries, users and media attachments.
//! [`MemoryStore`] is the in-process implementation used by the CLI (as a
//! JSON snapshot) and by tests.

use parking_lot::RwLock;
use pressmigrate_protocol::{ContentRecord, DedupeKey, Toggle};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use zeroize::Zeroizing;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a destination store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced entity does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind.
        kind: &'static str,
        /// Entity id.
        id: u64,
    },

    /// The store refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encoding failure.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Base fields of a destination post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostFields {
    /// Content type tag.
    pub post_type: String,
    /// Title.
    pub title: String,
    /// URL-safe name.
    pub slug: String,
    /// Body.
    pub body: String,
    /// Excerpt.
    pub excerpt: String,
    /// Status tag.
    pub status: String,
    /// Local timestamp.
    pub date: String,
    /// UTC timestamp.
    pub date_gmt: String,
    /// Destination author id.
    pub author_id: u64,
    /// Ordering field.
    pub menu_order: i64,
    /// Comments flag.
    pub comments_open: bool,
    /// Pings flag.
    pub pings_open: bool,
}

impl PostFields {
    /// Copies the base fields of a record, attributed to `author_id`.
    pub fn from_record(record: &ContentRecord, author_id: u64) -> Self {
        Self {
            post_type: record.post_type.clone(),
            title: record.title.clone(),
            slug: record.slug.clone(),
            body: record.body.clone(),
            excerpt: record.excerpt.clone(),
            status: record.status.clone(),
            date: record.date.clone(),
            date_gmt: record.date_gmt.clone(),
            author_id,
            menu_order: record.menu_order,
            comments_open: record.comment_status == Toggle::Open,
            pings_open: record.ping_status == Toggle::Open,
        }
    }

    /// Returns the dedupe key of these fields.
    pub fn dedupe_key(&self) -> DedupeKey {
        DedupeKey {
            post_type: self.post_type.clone(),
            slug: self.slug.clone(),
            date_gmt: self.date_gmt.clone(),
        }
    }
}

/// A destination post with everything attached to it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoredPost {
    /// Destination id.
    pub id: u64,
    /// Base fields.
    pub fields: PostFields,
    /// Term ids by taxonomy.
    pub terms: BTreeMap<String, Vec<u64>>,
    /// Meta entries by key, in insertion order.
    pub meta: BTreeMap<String, Vec<Value>>,
    /// Primary media attachment.
    pub featured_media: Option<u64>,
}

impl StoredPost {
    /// Returns the first stored entry for a meta key.
    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta.get(key).and_then(|entries| entries.first())
    }
}

/// A destination taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTerm {
    /// Destination id.
    pub id: u64,
    /// Taxonomy name.
    pub taxonomy: String,
    /// Display name.
    pub name: String,
    /// URL-safe name.
    pub slug: String,
    /// Description.
    pub description: String,
}

/// Lookup key for an existing destination user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup<'a> {
    /// By email address.
    Email(&'a str),
    /// By login handle.
    Login(&'a str),
    /// By URL-safe name.
    Slug(&'a str),
}

/// A user to create at the destination.
#[derive(Clone, Default)]
pub struct NewUser {
    /// Unique login handle.
    pub login: String,
    /// Email address (may be empty).
    pub email: String,
    /// URL-safe name (empty derives it from the login).
    pub slug: String,
    /// Display name.
    pub display_name: String,
    /// Profile URL.
    pub url: String,
    /// Registration timestamp (may be empty).
    pub registered: String,
    /// Role slug.
    pub role: Option<String>,
    /// Generated credential; only its digest is stored.
    pub credential: Zeroizing<String>,
}

/// A destination user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredUser {
    /// Destination id.
    pub id: u64,
    /// Login handle.
    pub login: String,
    /// Email address.
    pub email: String,
    /// URL-safe name.
    pub slug: String,
    /// Display name.
    pub display_name: String,
    /// Profile URL.
    pub url: String,
    /// Registration timestamp.
    pub registered: String,
    /// Role slug.
    pub role: Option<String>,
    /// Hex SHA-256 of the generated credential.
    pub credential_digest: String,
    /// Profile meta.
    pub meta: BTreeMap<String, String>,
}

/// A media attachment to register at the destination.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewAttachment {
    /// Post the attachment belongs to.
    pub parent: u64,
    /// File name to store under.
    pub file_name: String,
    /// Title.
    pub title: String,
    /// MIME type.
    pub mime_type: String,
    /// URL the file was fetched from.
    pub source_url: String,
}

/// A destination media attachment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredAttachment {
    /// Destination id.
    pub id: u64,
    /// Owning post.
    pub parent: u64,
    /// Stored file name.
    pub file_name: String,
    /// Destination-local URL.
    pub url: String,
    /// Title.
    pub title: String,
    /// MIME type.
    pub mime_type: String,
    /// Alternative text.
    pub alt: String,
    /// URL the file was fetched from.
    pub source_url: String,
}

/// Destination operations used by the reconciler.
pub trait ContentStore: Send + Sync {
    /// Finds a post by exact dedupe key.
    fn find_post(&self, key: &DedupeKey) -> StoreResult<Option<u64>>;

    /// Inserts a post and returns its id.
    fn insert_post(&self, fields: &PostFields) -> StoreResult<u64>;

    /// Replaces the base fields of an existing post.
    fn update_post(&self, id: u64, fields: &PostFields) -> StoreResult<()>;

    /// Returns true if the taxonomy is registered.
    fn taxonomy_exists(&self, taxonomy: &str) -> bool;

    /// Finds a term by slug within a taxonomy.
    fn find_term(&self, taxonomy: &str, slug: &str) -> StoreResult<Option<u64>>;

    /// Creates a term and returns its id.
    fn insert_term(&self, taxonomy: &str, name: &str, slug: &str, description: &str)
        -> StoreResult<u64>;

    /// Replaces the post's terms in one taxonomy.
    fn set_post_terms(&self, post_id: u64, taxonomy: &str, term_ids: &[u64]) -> StoreResult<()>;

    /// Removes every entry of a meta key.
    fn delete_meta(&self, post_id: u64, key: &str) -> StoreResult<()>;

    /// Appends one entry to a meta key.
    fn add_meta(&self, post_id: u64, key: &str, value: Value) -> StoreResult<()>;

    /// Finds a user.
    fn find_user(&self, lookup: UserLookup<'_>) -> StoreResult<Option<u64>>;

    /// Creates a user and returns its id.
    fn insert_user(&self, user: &NewUser) -> StoreResult<u64>;

    /// Sets one profile meta value.
    fn set_user_meta(&self, user_id: u64, key: &str, value: &str) -> StoreResult<()>;

    /// Returns an attachment by id.
    fn attachment(&self, id: u64) -> StoreResult<Option<StoredAttachment>>;

    /// Finds an attachment previously fetched from `source_url`.
    fn find_attachment_by_source(&self, source_url: &str) -> StoreResult<Option<u64>>;

    /// Registers an attachment, taking its content from `file`.
    fn insert_attachment(&self, attachment: &NewAttachment, file: &Path) -> StoreResult<u64>;

    /// Sets an attachment's alternative text.
    fn set_attachment_alt(&self, id: u64, alt: &str) -> StoreResult<()>;

    /// Sets a post's primary media.
    fn set_featured_media(&self, post_id: u64, attachment_id: u64) -> StoreResult<()>;

    /// Stores a custom field value plus its field-key reference.
    fn set_field(&self, post_id: u64, name: &str, key: &str, value: Value) -> StoreResult<()> {
        self.delete_meta(post_id, name)?;
        self.add_meta(post_id, name, value)?;
        if !key.is_empty() {
            let reference = format!("_{name}");
            self.delete_meta(post_id, &reference)?;
            self.add_meta(post_id, &reference, Value::String(key.to_string()))?;
        }
        Ok(())
    }

    /// Returns true if `id` names an existing attachment.
    fn attachment_exists(&self, id: u64) -> StoreResult<bool> {
        Ok(self.attachment(id)?.is_some())
    }

    /// Makes every write so far durable. Called once per applied page,
    /// before the page's watermark is persisted.
    fn commit(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Serializable state of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    next_post_id: u64,
    next_term_id: u64,
    next_user_id: u64,
    taxonomies: BTreeSet<String>,
    posts: BTreeMap<u64, StoredPost>,
    attachments: BTreeMap<u64, StoredAttachment>,
    terms: BTreeMap<u64, StoredTerm>,
    users: BTreeMap<u64, StoredUser>,
}

impl StoreState {
    fn with_default_taxonomies() -> Self {
        Self {
            next_post_id: 1,
            next_term_id: 1,
            next_user_id: 1,
            taxonomies: ["category", "post_tag"].iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    fn allocate_post_id(&mut self) -> u64 {
        let id = self.next_post_id.max(1);
        self.next_post_id = id + 1;
        id
    }

    fn post_mut(&mut self, id: u64) -> StoreResult<&mut StoredPost> {
        self.posts
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: "post", id })
    }
}

/// Default base URL of stored uploads.
pub const DEFAULT_UPLOADS_URL: &str = "http://localhost/wp-content/uploads";

/// An in-memory destination store.
///
/// Posts and attachments share one id sequence. Uploaded files are copied
/// into an uploads directory when one is configured.
pub struct MemoryStore {
    state: RwLock<StoreState>,
    uploads_dir: Option<PathBuf>,
    uploads_url: String,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// Creates an empty store with the `category` and `post_tag` taxonomies.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::with_default_taxonomies()),
            uploads_dir: None,
            uploads_url: DEFAULT_UPLOADS_URL.to_string(),
            snapshot: None,
        }
    }

    /// Loads a store from a JSON snapshot. A missing file yields an empty store.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let store = Self::new();
        if path.exists() {
            let bytes = fs::read(path)?;
            *store.state.write() = serde_json::from_slice(&bytes)?;
        }
        Ok(store)
    }

    /// Loads a store from `path` and writes it back there on every
    /// [`ContentStore::commit`].
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let mut store = Self::load(&path)?;
        store.snapshot = Some(path);
        Ok(store)
    }

    /// Returns the snapshot path commits are written to, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Writes a JSON snapshot of the store. The file is replaced atomically.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, &*self.state.read())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Copies uploaded files into `dir`, served under `base_url`.
    pub fn with_uploads(mut self, dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        self.uploads_dir = Some(dir.into());
        self.uploads_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Registers a taxonomy.
    pub fn register_taxonomy(&self, taxonomy: &str) {
        self.state.write().taxonomies.insert(taxonomy.to_string());
    }

    /// Returns a post by id.
    pub fn post(&self, id: u64) -> Option<StoredPost> {
        self.state.read().posts.get(&id).cloned()
    }

    /// Returns all posts in id order.
    pub fn posts(&self) -> Vec<StoredPost> {
        self.state.read().posts.values().cloned().collect()
    }

    /// Returns the number of posts.
    pub fn post_count(&self) -> usize {
        self.state.read().posts.len()
    }

    /// Returns a user by id.
    pub fn user(&self, id: u64) -> Option<StoredUser> {
        self.state.read().users.get(&id).cloned()
    }

    /// Returns the number of users.
    pub fn user_count(&self) -> usize {
        self.state.read().users.len()
    }

    /// Returns all terms of a taxonomy in id order.
    pub fn terms(&self, taxonomy: &str) -> Vec<StoredTerm> {
        self.state
            .read()
            .terms
            .values()
            .filter(|t| t.taxonomy == taxonomy)
            .cloned()
            .collect()
    }

    /// Returns all attachments in id order.
    pub fn attachments(&self) -> Vec<StoredAttachment> {
        self.state.read().attachments.values().cloned().collect()
    }

    fn unique_file_name(state: &StoreState, file_name: &str) -> String {
        let taken = |name: &str| state.attachments.values().any(|a| a.file_name == name);
        if !taken(file_name) {
            return file_name.to_string();
        }
        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (file_name, None),
        };
        (1u64..)
            .map(|n| match ext {
                Some(ext) => format!("{stem}-{n}.{ext}"),
                None => format!("{stem}-{n}"),
            })
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| file_name.to_string())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for MemoryStore {
    fn find_post(&self, key: &DedupeKey) -> StoreResult<Option<u64>> {
        Ok(self
            .state
            .read()
            .posts
            .values()
            .find(|p| {
                p.fields.post_type == key.post_type
                    && p.fields.slug == key.slug
                    && p.fields.date_gmt == key.date_gmt
            })
            .map(|p| p.id))
    }

    fn insert_post(&self, fields: &PostFields) -> StoreResult<u64> {
        if fields.post_type.is_empty() {
            return Err(StoreError::Rejected("post type is empty".into()));
        }
        let mut state = self.state.write();
        let id = state.allocate_post_id();
        state.posts.insert(
            id,
            StoredPost {
                id,
                fields: fields.clone(),
                ..StoredPost::default()
            },
        );
        Ok(id)
    }

    fn update_post(&self, id: u64, fields: &PostFields) -> StoreResult<()> {
        let mut state = self.state.write();
        state.post_mut(id)?.fields = fields.clone();
        Ok(())
    }

    fn taxonomy_exists(&self, taxonomy: &str) -> bool {
        self.state.read().taxonomies.contains(taxonomy)
    }

    fn find_term(&self, taxonomy: &str, slug: &str) -> StoreResult<Option<u64>> {
        Ok(self
            .state
            .read()
            .terms
            .values()
            .find(|t| t.taxonomy == taxonomy && t.slug == slug)
            .map(|t| t.id))
    }

    fn insert_term(
        &self,
        taxonomy: &str,
        name: &str,
        slug: &str,
        description: &str,
    ) -> StoreResult<u64> {
        let mut state = self.state.write();
        if !state.taxonomies.contains(taxonomy) {
            return Err(StoreError::Rejected(format!("unknown taxonomy {taxonomy}")));
        }
        if name.trim().is_empty() {
            return Err(StoreError::Rejected("term name is empty".into()));
        }
        let slug = if slug.is_empty() {
            pressmigrate_protocol::sanitize::sanitize_title(name)
        } else {
            slug.to_string()
        };
        if state
            .terms
            .values()
            .any(|t| t.taxonomy == taxonomy && t.slug == slug)
        {
            return Err(StoreError::Rejected(format!("term {slug} exists in {taxonomy}")));
        }
        let id = state.next_term_id.max(1);
        state.next_term_id = id + 1;
        state.terms.insert(
            id,
            StoredTerm {
                id,
                taxonomy: taxonomy.to_string(),
                name: name.to_string(),
                slug,
                description: description.to_string(),
            },
        );
        Ok(id)
    }

    fn set_post_terms(&self, post_id: u64, taxonomy: &str, term_ids: &[u64]) -> StoreResult<()> {
        let mut state = self.state.write();
        state
            .post_mut(post_id)?
            .terms
            .insert(taxonomy.to_string(), term_ids.to_vec());
        Ok(())
    }

    fn delete_meta(&self, post_id: u64, key: &str) -> StoreResult<()> {
        let mut state = self.state.write();
        state.post_mut(post_id)?.meta.remove(key);
        Ok(())
    }

    fn add_meta(&self, post_id: u64, key: &str, value: Value) -> StoreResult<()> {
        let mut state = self.state.write();
        state
            .post_mut(post_id)?
            .meta
            .entry(key.to_string())
            .or_default()
            .push(value);
        Ok(())
    }

    fn find_user(&self, lookup: UserLookup<'_>) -> StoreResult<Option<u64>> {
        let state = self.state.read();
        let found = state.users.values().find(|u| match lookup {
            UserLookup::Email(email) => !email.is_empty() && u.email.eq_ignore_ascii_case(email),
            UserLookup::Login(login) => !login.is_empty() && u.login == login,
            UserLookup::Slug(slug) => !slug.is_empty() && u.slug == slug,
        });
        Ok(found.map(|u| u.id))
    }

    fn insert_user(&self, user: &NewUser) -> StoreResult<u64> {
        let mut state = self.state.write();
        if user.login.is_empty() {
            return Err(StoreError::Rejected("login is empty".into()));
        }
        if state.users.values().any(|u| u.login == user.login) {
            return Err(StoreError::Rejected(format!("login {} exists", user.login)));
        }
        if !user.email.is_empty()
            && state
                .users
                .values()
                .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Rejected(format!("email {} exists", user.email)));
        }
        let digest = Sha256::digest(user.credential.as_bytes());
        let id = state.next_user_id.max(1);
        state.next_user_id = id + 1;
        state.users.insert(
            id,
            StoredUser {
                id,
                login: user.login.clone(),
                email: user.email.clone(),
                slug: if user.slug.is_empty() {
                    pressmigrate_protocol::sanitize::sanitize_title(&user.login)
                } else {
                    user.slug.clone()
                },
                display_name: user.display_name.clone(),
                url: user.url.clone(),
                registered: user.registered.clone(),
                role: user.role.clone(),
                credential_digest: digest.iter().map(|b| format!("{b:02x}")).collect(),
                meta: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    fn set_user_meta(&self, user_id: u64, key: &str, value: &str) -> StoreResult<()> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound { kind: "user", id: user_id })?;
        user.meta.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn attachment(&self, id: u64) -> StoreResult<Option<StoredAttachment>> {
        Ok(self.state.read().attachments.get(&id).cloned())
    }

    fn find_attachment_by_source(&self, source_url: &str) -> StoreResult<Option<u64>> {
        Ok(self
            .state
            .read()
            .attachments
            .values()
            .find(|a| !source_url.is_empty() && a.source_url == source_url)
            .map(|a| a.id))
    }

    fn insert_attachment(&self, attachment: &NewAttachment, file: &Path) -> StoreResult<u64> {
        if attachment.file_name.is_empty() {
            return Err(StoreError::Rejected("attachment file name is empty".into()));
        }
        let mut state = self.state.write();
        let file_name = Self::unique_file_name(&state, &attachment.file_name);
        if let Some(dir) = &self.uploads_dir {
            fs::create_dir_all(dir)?;
            fs::copy(file, dir.join(&file_name))?;
        } else if !file.exists() {
            return Err(StoreError::Rejected(format!(
                "upload source {} is missing",
                file.display()
            )));
        }
        let id = state.allocate_post_id();
        state.attachments.insert(
            id,
            StoredAttachment {
                id,
                parent: attachment.parent,
                url: format!("{}/{}", self.uploads_url, file_name),
                file_name,
                title: attachment.title.clone(),
                mime_type: attachment.mime_type.clone(),
                alt: String::new(),
                source_url: attachment.source_url.clone(),
            },
        );
        Ok(id)
    }

    fn commit(&self) -> StoreResult<()> {
        match &self.snapshot {
            Some(path) => self.save(path),
            None => Ok(()),
        }
    }

    fn set_attachment_alt(&self, id: u64, alt: &str) -> StoreResult<()> {
        let mut state = self.state.write();
        let attachment = state
            .attachments
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: "attachment", id })?;
        attachment.alt = alt.to_string();
        Ok(())
    }

    fn set_featured_media(&self, post_id: u64, attachment_id: u64) -> StoreResult<()> {
        let mut state = self.state.write();
        if !state.attachments.contains_key(&attachment_id) {
            return Err(StoreError::NotFound {
                kind: "attachment",
                id: attachment_id,
            });
        }
        state.post_mut(post_id)?.featured_media = Some(attachment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fields(slug: &str, date_gmt: &str) -> PostFields {
        PostFields {
            post_type: "post".into(),
            slug: slug.into(),
            date_gmt: date_gmt.into(),
            ..PostFields::default()
        }
    }

    fn upload(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"bytes").unwrap();
        path
    }

    #[test]
    fn find_post_is_exact() {
        let store = MemoryStore::new();
        let id = store.insert_post(&fields("a", "2024-01-01 00:00:00")).unwrap();
        let key = fields("a", "2024-01-01 00:00:00").dedupe_key();
        assert_eq!(store.find_post(&key).unwrap(), Some(id));
        let other = fields("a", "2024-01-01 00:00:01").dedupe_key();
        assert_eq!(store.find_post(&other).unwrap(), None);
    }

    #[test]
    fn meta_add_and_delete() {
        let store = MemoryStore::new();
        let id = store.insert_post(&fields("a", "")).unwrap();
        store.add_meta(id, "k", json!(1)).unwrap();
        store.add_meta(id, "k", json!(2)).unwrap();
        assert_eq!(store.post(id).unwrap().meta["k"], vec![json!(1), json!(2)]);
        store.delete_meta(id, "k").unwrap();
        assert!(store.post(id).unwrap().meta.get("k").is_none());
    }

    #[test]
    fn set_field_writes_reference() {
        let store = MemoryStore::new();
        let id = store.insert_post(&fields("a", "")).unwrap();
        store.set_field(id, "hero", "field_1", json!(5)).unwrap();
        store.set_field(id, "hero", "field_1", json!(6)).unwrap();
        let post = store.post(id).unwrap();
        assert_eq!(post.meta["hero"], vec![json!(6)]);
        assert_eq!(post.meta_value("_hero"), Some(&json!("field_1")));
    }

    #[test]
    fn terms_unique_per_taxonomy() {
        let store = MemoryStore::new();
        let id = store.insert_term("category", "News", "news", "").unwrap();
        assert_eq!(store.find_term("category", "news").unwrap(), Some(id));
        assert!(store.insert_term("category", "News", "news", "").is_err());
        assert!(store.insert_term("genre", "Rock", "rock", "").is_err());
        assert_eq!(store.find_term("post_tag", "news").unwrap(), None);
    }

    #[test]
    fn users_by_lookup() {
        let store = MemoryStore::new();
        let id = store
            .insert_user(&NewUser {
                login: "jdoe".into(),
                email: "jdoe@example.com".into(),
                credential: Zeroizing::new("secret".into()),
                ..NewUser::default()
            })
            .unwrap();
        assert_eq!(store.find_user(UserLookup::Email("JDOE@example.com")).unwrap(), Some(id));
        assert_eq!(store.find_user(UserLookup::Login("jdoe")).unwrap(), Some(id));
        assert_eq!(store.find_user(UserLookup::Slug("jdoe")).unwrap(), Some(id));
        assert_eq!(store.find_user(UserLookup::Login("")).unwrap(), None);
        let user = store.user(id).unwrap();
        assert_eq!(user.credential_digest.len(), 64);
        assert!(!user.credential_digest.contains("secret"));
    }

    #[test]
    fn attachments_share_post_ids() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let post = store.insert_post(&fields("a", "")).unwrap();
        let attachment = NewAttachment {
            parent: post,
            file_name: "photo.png".into(),
            source_url: "https://src.example.com/photo.png".into(),
            ..NewAttachment::default()
        };
        let first = store.insert_attachment(&attachment, &upload(&dir, "a.tmp")).unwrap();
        let second = store.insert_attachment(&attachment, &upload(&dir, "b.tmp")).unwrap();
        assert_eq!(first, post + 1);
        assert!(store.attachment_exists(first).unwrap());
        assert!(!store.attachment_exists(post).unwrap());
        assert_eq!(store.attachment(second).unwrap().unwrap().file_name, "photo-1.png");
        assert_eq!(
            store.find_attachment_by_source("https://src.example.com/photo.png").unwrap(),
            Some(first)
        );
    }

    #[test]
    fn uploads_are_copied() {
        let dir = TempDir::new().unwrap();
        let uploads = dir.path().join("uploads");
        let store = MemoryStore::new().with_uploads(&uploads, "https://dest.example.com/uploads/");
        let id = store
            .insert_attachment(
                &NewAttachment {
                    file_name: "doc.pdf".into(),
                    ..NewAttachment::default()
                },
                &upload(&dir, "doc.tmp"),
            )
            .unwrap();
        assert!(uploads.join("doc.pdf").exists());
        assert_eq!(
            store.attachment(id).unwrap().unwrap().url,
            "https://dest.example.com/uploads/doc.pdf"
        );
    }

    #[test]
    fn featured_media_requires_attachment() {
        let store = MemoryStore::new();
        let post = store.insert_post(&fields("a", "")).unwrap();
        assert!(matches!(
            store.set_featured_media(post, 99),
            Err(StoreError::NotFound { kind: "attachment", .. })
        ));
    }

    #[test]
    fn snapshot_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = MemoryStore::new();
        store.register_taxonomy("genre");
        let id = store.insert_post(&fields("a", "2024-01-01 00:00:00")).unwrap();
        store.save(&path).unwrap();

        let loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded.post_count(), 1);
        assert!(loaded.taxonomy_exists("genre"));
        assert_eq!(loaded.insert_post(&fields("b", "")).unwrap(), id + 1);

        let missing = MemoryStore::load(&dir.path().join("none.json")).unwrap();
        assert_eq!(missing.post_count(), 0);
        assert!(missing.taxonomy_exists("category"));
    }

    #[test]
    fn commit_writes_opened_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dest").join("store.json");
        let store = MemoryStore::open(&path).unwrap();
        assert_eq!(store.snapshot_path(), Some(path.as_path()));
        store.insert_post(&fields("a", "2024-01-01 00:00:00")).unwrap();
        assert!(!path.exists());

        store.commit().unwrap();
        assert_eq!(MemoryStore::load(&path).unwrap().post_count(), 1);

        // Without a snapshot path a commit writes nothing.
        let detached = MemoryStore::new();
        detached.insert_post(&fields("b", "")).unwrap();
        detached.commit().unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
