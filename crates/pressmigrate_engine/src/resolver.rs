//! Entity resolution.
//!
//! Maps embedded sub-records (authors, taxonomy terms, attachment
//! references) to destination identifiers, creating them when absent.
//! Author and term results are cached for the lifetime of one resolver,
//! which the driver scopes to one run.

use crate::http::HttpClient;
use crate::sideload::Sideloader;
use crate::store::{ContentStore, NewUser, StoreResult, UserLookup};
use parking_lot::RwLock;
use pressmigrate_protocol::sanitize::{is_email, sanitize_key, sanitize_title, sanitize_user};
use pressmigrate_protocol::{
    parse_id, AuthorRecord, FieldKind, FieldRecord, MediaKind, MediaReference, ReturnShape,
    TermRecord,
};
use rand::Rng;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Login used when an author carries no usable identifier.
pub const FALLBACK_LOGIN: &str = "imported_author";

const CREDENTIAL_LEN: usize = 24;
const CREDENTIAL_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()";

/// Generates a random credential for a new identity.
pub fn generate_credential() -> Zeroizing<String> {
    let mut rng = rand::thread_rng();
    Zeroizing::new(
        (0..CREDENTIAL_LEN)
            .map(|_| CREDENTIAL_CHARSET[rng.gen_range(0..CREDENTIAL_CHARSET.len())] as char)
            .collect(),
    )
}

/// A raw attachment value, classified once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentValue {
    /// Null, empty, zero or false.
    Empty,
    /// A candidate destination attachment id.
    Numeric(u64),
    /// A structured reference.
    Reference {
        /// Candidate destination id (`ID` wins over `id`).
        candidate: Option<u64>,
        /// Source URL to sideload when the candidate does not exist.
        url: Option<String>,
        /// Alternative text.
        alt: String,
    },
    /// A bare URL.
    Url(String),
    /// Anything else.
    Unusable,
}

impl AttachmentValue {
    /// Classifies a raw field value.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => AttachmentValue::Empty,
            Value::Number(_) => match parse_id(value) {
                Some(0) => AttachmentValue::Empty,
                Some(id) => AttachmentValue::Numeric(id),
                None => AttachmentValue::Unusable,
            },
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() || s == "0" {
                    AttachmentValue::Empty
                } else if let Some(id) = parse_id(value) {
                    AttachmentValue::Numeric(id)
                } else if is_url(s) {
                    AttachmentValue::Url(s.to_string())
                } else {
                    AttachmentValue::Unusable
                }
            }
            Value::Array(items) if items.is_empty() => AttachmentValue::Empty,
            Value::Object(map) if map.is_empty() => AttachmentValue::Empty,
            Value::Object(map) => {
                let id_of = |key: &str| map.get(key).and_then(parse_id).filter(|id| *id > 0);
                let text_of = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };
                AttachmentValue::Reference {
                    candidate: id_of("ID").or_else(|| id_of("id")),
                    url: text_of("url"),
                    alt: text_of("alt").unwrap_or_default(),
                }
            }
            _ => AttachmentValue::Unusable,
        }
    }
}

fn is_url(s: &str) -> bool {
    reqwest::Url::parse(s)
        .map(|u| u.has_host() && !s.chars().any(char::is_whitespace))
        .unwrap_or(false)
}

/// Resolves authors, terms and attachments against a destination store.
#[derive(Debug, Default)]
pub struct EntityResolver {
    authors: RwLock<HashMap<String, u64>>,
    terms: RwLock<HashMap<(String, String), u64>>,
}

impl EntityResolver {
    /// Creates a resolver with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every cached resolution.
    pub fn clear(&self) {
        self.authors.write().clear();
        self.terms.write().clear();
    }

    fn lookup_author<S: ContentStore + ?Sized>(
        &self,
        store: &S,
        lookup: UserLookup<'_>,
    ) -> StoreResult<Option<u64>> {
        let key = author_cache_key(lookup);
        if let Some(id) = self.authors.read().get(&key) {
            return Ok(Some(*id));
        }
        let found = store.find_user(lookup)?;
        if let Some(id) = found {
            self.authors.write().insert(key, id);
        }
        Ok(found)
    }

    /// Resolves an author: by email, then login, then URL-safe name, first
    /// hit wins. Creates a new identity when none match.
    pub fn resolve_author<S: ContentStore + ?Sized>(
        &self,
        store: &S,
        author: &AuthorRecord,
    ) -> StoreResult<Option<u64>> {
        let email = author.email.trim();
        let email = if is_email(email) { email } else { "" };
        let login = sanitize_user(&author.login);
        let slug = sanitize_title(&author.slug);

        if !email.is_empty() {
            if let Some(id) = self.lookup_author(store, UserLookup::Email(email))? {
                debug!(user = id, "author matched by email");
                return Ok(Some(id));
            }
        }
        if !login.is_empty() {
            if let Some(id) = self.lookup_author(store, UserLookup::Login(&login))? {
                debug!(user = id, "author matched by login");
                return Ok(Some(id));
            }
        }
        if !slug.is_empty() {
            if let Some(id) = self.lookup_author(store, UserLookup::Slug(&slug))? {
                debug!(user = id, "author matched by slug");
                return Ok(Some(id));
            }
        }

        self.create_author(store, author, email, &login, &slug).map(Some)
    }

    fn create_author<S: ContentStore + ?Sized>(
        &self,
        store: &S,
        author: &AuthorRecord,
        email: &str,
        login: &str,
        slug: &str,
    ) -> StoreResult<u64> {
        let raw_email = author.email.trim();
        let base = if !login.is_empty() {
            login.to_string()
        } else if let Some((local, _)) = raw_email.split_once('@') {
            sanitize_user(local)
        } else if !author.display_name.trim().is_empty() {
            sanitize_user(&author.display_name)
        } else {
            String::new()
        };
        let base = if base.is_empty() {
            FALLBACK_LOGIN.to_string()
        } else {
            base
        };

        let mut candidate = base.clone();
        let mut suffix = 1u64;
        while store.find_user(UserLookup::Login(&candidate))?.is_some() {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }

        let display_name = match author.display_name.trim() {
            "" => candidate.clone(),
            name => name.to_string(),
        };
        let user = NewUser {
            login: candidate.clone(),
            email: email.to_string(),
            slug: slug.to_string(),
            display_name,
            url: author.url.trim().to_string(),
            registered: author.registered.trim().to_string(),
            role: author.primary_role().map(sanitize_key).filter(|r| !r.is_empty()),
            credential: generate_credential(),
        };
        let id = store.insert_user(&user)?;
        debug!(user = id, login = %candidate, "created author");

        for (key, value) in author.profile_fields() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if let Err(e) = store.set_user_meta(id, key, value) {
                warn!(user = id, key, error = %e, "cannot copy profile field");
            }
        }

        let mut cache = self.authors.write();
        cache.insert(author_cache_key(UserLookup::Login(&candidate)), id);
        if !email.is_empty() {
            cache.insert(author_cache_key(UserLookup::Email(email)), id);
        }
        if !slug.is_empty() {
            cache.insert(author_cache_key(UserLookup::Slug(slug)), id);
        }
        Ok(id)
    }

    /// Resolves a term by `(taxonomy, slug)`, creating it when absent.
    pub fn resolve_term<S: ContentStore + ?Sized>(
        &self,
        store: &S,
        taxonomy: &str,
        term: &TermRecord,
    ) -> StoreResult<u64> {
        let slug = match term.slug.trim() {
            "" => sanitize_title(&term.name),
            slug => slug.to_string(),
        };
        let key = (taxonomy.to_string(), slug.clone());
        if let Some(id) = self.terms.read().get(&key) {
            return Ok(*id);
        }

        let id = match store.find_term(taxonomy, &slug)? {
            Some(id) => id,
            None => match store.insert_term(taxonomy, &term.name, &slug, &term.description) {
                Ok(id) => {
                    debug!(taxonomy, slug = %slug, term = id, "created term");
                    id
                }
                Err(e) => match store.find_term(taxonomy, &slug)? {
                    Some(id) => id,
                    None => return Err(e),
                },
            },
        };
        self.terms.write().insert(key, id);
        Ok(id)
    }

    /// Resolves a raw attachment value to a destination attachment id.
    pub fn resolve_attachment<S, C>(
        &self,
        store: &S,
        sideloader: &Sideloader<C>,
        value: &Value,
        parent: u64,
        kind: MediaKind,
    ) -> Option<u64>
    where
        S: ContentStore + ?Sized,
        C: HttpClient,
    {
        match AttachmentValue::classify(value) {
            AttachmentValue::Numeric(id) => existing_attachment(store, id),
            AttachmentValue::Reference {
                candidate,
                url,
                alt,
            } => candidate
                .and_then(|id| existing_attachment(store, id))
                .or_else(|| {
                    url.and_then(|url| sideloader.sideload(store, &url, parent, &alt, kind))
                }),
            AttachmentValue::Url(url) => sideloader.sideload(store, &url, parent, "", kind),
            AttachmentValue::Empty | AttachmentValue::Unusable => None,
        }
    }

    /// Resolves a featured media reference: an existing attachment id is
    /// used as is, otherwise the URL is sideloaded as an image.
    pub fn resolve_media<S, C>(
        &self,
        store: &S,
        sideloader: &Sideloader<C>,
        media: &MediaReference,
        parent: u64,
    ) -> Option<u64>
    where
        S: ContentStore + ?Sized,
        C: HttpClient,
    {
        media
            .id
            .and_then(|id| existing_attachment(store, id))
            .or_else(|| {
                let url = media.url.trim();
                if url.is_empty() {
                    None
                } else {
                    sideloader.sideload(store, url, parent, &media.alt, MediaKind::Image)
                }
            })
    }

    /// Prepares a custom field value for storage.
    ///
    /// Plain fields pass through. Attachment fields resolve their reference
    /// and store it in the declared return shape; an unresolvable value is
    /// stored unchanged. Attachment lists resolve each item as an image and
    /// drop the ones that do not resolve; an empty list is stored unchanged.
    pub fn prepare_field<S, C>(
        &self,
        store: &S,
        sideloader: &Sideloader<C>,
        field: &FieldRecord,
        parent: u64,
    ) -> Value
    where
        S: ContentStore + ?Sized,
        C: HttpClient,
    {
        let shape = field.return_shape();
        match field.kind() {
            FieldKind::Plain => field.value.clone(),
            FieldKind::Attachment(kind) => {
                match self.resolve_attachment(store, sideloader, &field.value, parent, kind) {
                    Some(id) => shaped_value(store, id, shape, kind),
                    None => field.value.clone(),
                }
            }
            FieldKind::AttachmentList => {
                if matches!(AttachmentValue::classify(&field.value), AttachmentValue::Empty) {
                    return field.value.clone();
                }
                let items: Vec<Value> = match &field.value {
                    Value::Array(items) => items.clone(),
                    Value::Object(map) => map.values().cloned().collect(),
                    _ => Vec::new(),
                };
                Value::Array(
                    items
                        .iter()
                        .filter_map(|item| {
                            self.resolve_attachment(store, sideloader, item, parent, MediaKind::Image)
                        })
                        .map(|id| shaped_value(store, id, shape, MediaKind::Image))
                        .collect(),
                )
            }
        }
    }
}

fn author_cache_key(lookup: UserLookup<'_>) -> String {
    match lookup {
        UserLookup::Email(email) => format!("email:{}", email.to_ascii_lowercase()),
        UserLookup::Login(login) => format!("login:{login}"),
        UserLookup::Slug(slug) => format!("slug:{slug}"),
    }
}

fn existing_attachment<S: ContentStore + ?Sized>(store: &S, id: u64) -> Option<u64> {
    match store.attachment_exists(id) {
        Ok(true) => Some(id),
        Ok(false) => {
            debug!(attachment = id, "candidate attachment does not exist");
            None
        }
        Err(e) => {
            warn!(attachment = id, error = %e, "attachment lookup failed");
            None
        }
    }
}

/// Renders a resolved attachment in the given return shape.
fn shaped_value<S: ContentStore + ?Sized>(
    store: &S,
    id: u64,
    shape: ReturnShape,
    kind: MediaKind,
) -> Value {
    let attachment = match store.attachment(id) {
        Ok(Some(attachment)) => attachment,
        Ok(None) => return json!(id),
        Err(e) => {
            warn!(attachment = id, error = %e, "attachment lookup failed");
            return json!(id);
        }
    };
    match shape {
        ReturnShape::Id => json!(id),
        ReturnShape::Url => Value::String(attachment.url),
        ReturnShape::Structured => {
            let mut map = Map::new();
            map.insert("ID".into(), json!(id));
            map.insert("id".into(), json!(id));
            map.insert("url".into(), Value::String(attachment.url));
            map.insert("title".into(), Value::String(attachment.title));
            map.insert("mime_type".into(), Value::String(attachment.mime_type));
            if kind == MediaKind::Image {
                map.insert("alt".into(), Value::String(attachment.alt));
            }
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StaticClient;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn sideloader() -> Sideloader<StaticClient> {
        Sideloader::new(StaticClient::new(), Duration::from_secs(5))
    }

    fn author(email: &str, login: &str, slug: &str) -> AuthorRecord {
        AuthorRecord {
            email: email.into(),
            login: login.into(),
            slug: slug.into(),
            ..AuthorRecord::default()
        }
    }

    fn existing_user(store: &MemoryStore, login: &str, email: &str) -> u64 {
        store
            .insert_user(&NewUser {
                login: login.into(),
                email: email.into(),
                credential: generate_credential(),
                ..NewUser::default()
            })
            .unwrap()
    }

    #[test]
    fn credential_shape() {
        let a = generate_credential();
        let b = generate_credential();
        assert_eq!(a.len(), 24);
        assert_ne!(*a, *b);
    }

    #[test]
    fn classify_values() {
        use AttachmentValue::*;
        assert_eq!(AttachmentValue::classify(&json!(null)), Empty);
        assert_eq!(AttachmentValue::classify(&json!("")), Empty);
        assert_eq!(AttachmentValue::classify(&json!(0)), Empty);
        assert_eq!(AttachmentValue::classify(&json!([])), Empty);
        assert_eq!(AttachmentValue::classify(&json!(12)), Numeric(12));
        assert_eq!(AttachmentValue::classify(&json!("12")), Numeric(12));
        assert_eq!(
            AttachmentValue::classify(&json!("https://x.example.com/a.png")),
            Url("https://x.example.com/a.png".into())
        );
        assert_eq!(AttachmentValue::classify(&json!("hello")), Unusable);
        assert_eq!(
            AttachmentValue::classify(&json!({"id": 3, "ID": "4", "url": "u", "alt": "a"})),
            Reference {
                candidate: Some(4),
                url: Some("u".into()),
                alt: "a".into()
            }
        );
    }

    #[test]
    fn author_email_wins_over_login() {
        let store = MemoryStore::new();
        let by_email = existing_user(&store, "someone", "jdoe@example.com");
        let by_login = existing_user(&store, "jdoe", "other@example.com");
        let resolver = EntityResolver::new();
        let id = resolver
            .resolve_author(&store, &author("jdoe@example.com", "jdoe", "jdoe"))
            .unwrap();
        assert_eq!(id, Some(by_email));
        assert_ne!(id, Some(by_login));
        assert_eq!(store.user_count(), 2);
    }

    #[test]
    fn author_login_then_slug() {
        let store = MemoryStore::new();
        let jdoe = existing_user(&store, "jdoe", "");
        let resolver = EntityResolver::new();
        assert_eq!(
            resolver.resolve_author(&store, &author("", "jdoe", "")).unwrap(),
            Some(jdoe)
        );
        assert_eq!(
            resolver.resolve_author(&store, &author("", "", "JDoe")).unwrap(),
            Some(jdoe)
        );
    }

    #[test]
    fn author_creation() {
        let store = MemoryStore::new();
        let resolver = EntityResolver::new();
        let record = AuthorRecord {
            email: "new@example.com".into(),
            login: "newbie".into(),
            display_name: "New Bie".into(),
            registered: "2020-05-01 12:00:00".into(),
            roles: vec!["Editor".into()],
            first_name: "New".into(),
            description: "Bio".into(),
            ..AuthorRecord::default()
        };
        let id = resolver.resolve_author(&store, &record).unwrap().unwrap();
        let user = store.user(id).unwrap();
        assert_eq!(user.login, "newbie");
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.display_name, "New Bie");
        assert_eq!(user.role.as_deref(), Some("editor"));
        assert_eq!(user.registered, "2020-05-01 12:00:00");
        assert_eq!(user.meta["first_name"], "New");
        assert_eq!(user.meta["description"], "Bio");
        assert!(!user.meta.contains_key("last_name"));

        // Same author again resolves to the same identity.
        assert_eq!(resolver.resolve_author(&store, &record).unwrap(), Some(id));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn author_login_derivation() {
        let store = MemoryStore::new();
        existing_user(&store, "jane", "");
        existing_user(&store, "jane_1", "");
        let resolver = EntityResolver::new();

        // Email local part, disambiguated.
        let id = resolver
            .resolve_author(&store, &author("jane@example.org", "", ""))
            .unwrap()
            .unwrap();
        assert_eq!(store.user(id).unwrap().login, "jane_2");
        assert_eq!(store.user(id).unwrap().display_name, "jane_2");

        // Display name.
        let named = AuthorRecord {
            display_name: "Mary Ann".into(),
            ..AuthorRecord::default()
        };
        let id = resolver.resolve_author(&store, &named).unwrap().unwrap();
        assert_eq!(store.user(id).unwrap().login, "Mary Ann");

        // Nothing usable.
        let id = resolver
            .resolve_author(&store, &AuthorRecord::default())
            .unwrap()
            .unwrap();
        assert_eq!(store.user(id).unwrap().login, FALLBACK_LOGIN);
    }

    #[test]
    fn invalid_email_is_not_used() {
        let store = MemoryStore::new();
        let resolver = EntityResolver::new();
        let id = resolver
            .resolve_author(&store, &author("not-an-email", "x", ""))
            .unwrap()
            .unwrap();
        assert_eq!(store.user(id).unwrap().email, "");
    }

    #[test]
    fn terms_are_found_or_created_once() {
        let store = MemoryStore::new();
        let resolver = EntityResolver::new();
        let news = TermRecord::new("News", "news");
        let a = resolver.resolve_term(&store, "category", &news).unwrap();
        let b = resolver.resolve_term(&store, "category", &news).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.terms("category").len(), 1);

        let existing = store.insert_term("post_tag", "Rust", "rust", "").unwrap();
        let tag = resolver
            .resolve_term(&store, "post_tag", &TermRecord::new("Rust", "rust"))
            .unwrap();
        assert_eq!(tag, existing);
    }

    #[test]
    fn term_without_slug_uses_name() {
        let store = MemoryStore::new();
        let resolver = EntityResolver::new();
        let id = resolver
            .resolve_term(&store, "category", &TermRecord::new("Big News", ""))
            .unwrap();
        assert_eq!(store.find_term("category", "big-news").unwrap(), Some(id));
    }

    #[test]
    fn numeric_attachment_requires_existence() {
        let store = MemoryStore::new();
        let loader = sideloader();
        let resolver = EntityResolver::new();
        assert_eq!(
            resolver.resolve_attachment(&store, &loader, &json!(42), 1, MediaKind::Image),
            None
        );
    }

    #[test]
    fn reference_falls_through_to_url() {
        let store = MemoryStore::new();
        let loader = sideloader();
        let url = "https://src.example.com/img.png";
        loader.client().serve(url, "image/png", b"img".to_vec());
        let resolver = EntityResolver::new();
        let value = json!({"id": 999, "url": url, "alt": "Alt"});
        let id = resolver
            .resolve_attachment(&store, &loader, &value, 1, MediaKind::Image)
            .unwrap();
        assert_eq!(store.attachment(id).unwrap().unwrap().alt, "Alt");

        // Now the candidate id exists and is used directly.
        let again = resolver
            .resolve_attachment(&store, &loader, &json!({"id": id}), 1, MediaKind::Image)
            .unwrap();
        assert_eq!(again, id);
    }

    #[test]
    fn image_field_url_shape_stores_local_url() {
        let store = MemoryStore::new();
        let loader = sideloader();
        let remote = "https://x/img.png";
        loader.client().serve(remote, "image/png", b"img".to_vec());
        let resolver = EntityResolver::new();
        let field = FieldRecord::new("field_1", "hero", "image", "url", json!({"url": remote}));
        let value = resolver.prepare_field(&store, &loader, &field, 1);
        let local = value.as_str().unwrap();
        assert_ne!(local, remote);
        assert!(local.starts_with(crate::store::DEFAULT_UPLOADS_URL));
    }

    #[test]
    fn structured_shape() {
        let store = MemoryStore::new();
        let loader = sideloader();
        let url = "https://src.example.com/manual.pdf";
        loader.client().serve(url, "application/pdf", b"%PDF".to_vec());
        let resolver = EntityResolver::new();
        let field = FieldRecord::new("field_2", "manual", "file", "array", json!(url));
        let value = resolver.prepare_field(&store, &loader, &field, 1);
        assert_eq!(value["ID"], value["id"]);
        assert_eq!(value["mime_type"], "application/pdf");
        assert_eq!(value["title"], "manual");
        assert!(value.get("alt").is_none());
    }

    #[test]
    fn unresolved_value_is_kept() {
        let store = MemoryStore::new();
        let loader = sideloader();
        let resolver = EntityResolver::new();
        let field = FieldRecord::new("field_3", "hero", "image", "id", json!(77));
        assert_eq!(resolver.prepare_field(&store, &loader, &field, 1), json!(77));
    }

    #[test]
    fn gallery_resolution() {
        let store = MemoryStore::new();
        let loader = sideloader();
        let a = "https://src.example.com/a.png";
        let b = "https://src.example.com/b.jpg";
        loader.client().serve(a, "image/png", b"a".to_vec());
        loader.client().serve(b, "image/jpeg", b"b".to_vec());
        let resolver = EntityResolver::new();

        let field = FieldRecord::new(
            "field_4",
            "gallery",
            "gallery",
            "id",
            json!([{"url": a}, b, "not a url", 12345]),
        );
        let value = resolver.prepare_field(&store, &loader, &field, 1);
        assert_eq!(value.as_array().unwrap().len(), 2);

        let empty = FieldRecord::new("field_4", "gallery", "gallery", "id", json!([]));
        assert_eq!(resolver.prepare_field(&store, &loader, &empty, 1), json!([]));

        let urls = FieldRecord::new("field_4", "gallery", "gallery", "url", json!([a]));
        let value = resolver.prepare_field(&store, &loader, &urls, 1);
        assert!(value[0].as_str().unwrap().ends_with("/a.png"));
    }

    #[test]
    fn plain_field_passthrough() {
        let store = MemoryStore::new();
        let loader = sideloader();
        let resolver = EntityResolver::new();
        let field = FieldRecord::new("field_5", "subtitle", "text", "", json!("Hello"));
        assert_eq!(resolver.prepare_field(&store, &loader, &field, 1), json!("Hello"));
    }

    #[test]
    fn featured_media_prefers_existing() {
        let store = MemoryStore::new();
        let loader = sideloader();
        let url = "https://src.example.com/cover.webp";
        loader.client().serve(url, "image/webp", b"w".to_vec());
        let resolver = EntityResolver::new();
        let mut media = MediaReference::url(url);
        media.alt = "Cover".into();
        let id = resolver.resolve_media(&store, &loader, &media, 1).unwrap();

        let by_id = MediaReference {
            id: Some(id),
            url: "https://elsewhere.example.com/x.png".into(),
            ..MediaReference::default()
        };
        assert_eq!(resolver.resolve_media(&store, &loader, &by_id, 1), Some(id));
        assert_eq!(loader.client().hits().len(), 1);
        assert_eq!(resolver.resolve_media(&store, &loader, &MediaReference::default(), 1), None);
    }
}
