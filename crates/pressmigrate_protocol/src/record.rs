//! Content records and their embedded sub-records.

use crate::field::{self, FieldRecord};
use crate::lenient;
use crate::meta::MetaValue;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// A binary open/closed status flag (comments, pings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Toggle {
    /// Enabled.
    Open,
    /// Disabled.
    #[default]
    Closed,
}

impl Toggle {
    /// Returns the wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Toggle::Open => "open",
            Toggle::Closed => "closed",
        }
    }

    /// Returns true if the flag is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Toggle::Open)
    }
}

impl Serialize for Toggle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Toggle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient::text(deserializer)?;
        Ok(if raw.eq_ignore_ascii_case("open") {
            Toggle::Open
        } else {
            Toggle::Closed
        })
    }
}

fn default_post_type() -> String {
    crate::DEFAULT_POST_TYPE.to_string()
}

fn default_status() -> String {
    crate::DEFAULT_STATUS.to_string()
}

/// One exported content record.
///
/// Ids are source-side and strictly increasing within a
/// `(post_type, status)` partition. They are never reused at the
/// destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Source identifier.
    #[serde(rename = "ID", deserialize_with = "lenient::id")]
    pub id: u64,
    /// Content type tag.
    #[serde(default = "default_post_type", deserialize_with = "lenient::text")]
    pub post_type: String,
    /// Title.
    #[serde(rename = "post_title", default, deserialize_with = "lenient::text")]
    pub title: String,
    /// URL-safe name; part of the dedupe key.
    #[serde(rename = "post_name", default, deserialize_with = "lenient::text")]
    pub slug: String,
    /// Body.
    #[serde(rename = "post_content", default, deserialize_with = "lenient::text")]
    pub body: String,
    /// Excerpt.
    #[serde(rename = "post_excerpt", default, deserialize_with = "lenient::text")]
    pub excerpt: String,
    /// Status tag.
    #[serde(rename = "post_status", default = "default_status", deserialize_with = "lenient::text")]
    pub status: String,
    /// Local timestamp, `YYYY-MM-DD HH:MM:SS`.
    #[serde(rename = "post_date", default, deserialize_with = "lenient::text")]
    pub date: String,
    /// UTC timestamp, `YYYY-MM-DD HH:MM:SS`; part of the dedupe key.
    #[serde(rename = "post_date_gmt", default, deserialize_with = "lenient::text")]
    pub date_gmt: String,
    /// Source-side author id (informational only).
    #[serde(rename = "post_author", default, deserialize_with = "lenient::id_or_zero")]
    pub source_author_id: u64,
    /// Ordering field.
    #[serde(default, deserialize_with = "lenient::int")]
    pub menu_order: i64,
    /// Comments flag.
    #[serde(default)]
    pub comment_status: Toggle,
    /// Pings flag.
    #[serde(default)]
    pub ping_status: Toggle,
    /// Meta entries keyed by meta key.
    #[serde(default, deserialize_with = "lenient::map")]
    pub meta: BTreeMap<String, MetaValue>,
    /// Ordered terms keyed by taxonomy name.
    #[serde(default, deserialize_with = "lenient::map")]
    pub taxonomies: BTreeMap<String, Vec<TermRecord>>,
    /// Custom fields keyed by field name.
    #[serde(rename = "acf", default, with = "field::envelope")]
    pub fields: BTreeMap<String, FieldRecord>,
    /// Primary media reference.
    #[serde(rename = "featured_image", default)]
    pub featured_media: Option<MediaReference>,
    /// Embedded author.
    #[serde(default)]
    pub author: Option<AuthorRecord>,
}

impl ContentRecord {
    /// Creates a record with the given identity and empty content.
    pub fn new(id: u64, post_type: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            post_type: post_type.into(),
            title: String::new(),
            slug: slug.into(),
            body: String::new(),
            excerpt: String::new(),
            status: default_status(),
            date: String::new(),
            date_gmt: String::new(),
            source_author_id: 0,
            menu_order: 0,
            comment_status: Toggle::Closed,
            ping_status: Toggle::Closed,
            meta: BTreeMap::new(),
            taxonomies: BTreeMap::new(),
            fields: BTreeMap::new(),
            featured_media: None,
            author: None,
        }
    }

    /// Returns the key used to decide insert versus update.
    pub fn dedupe_key(&self) -> DedupeKey {
        DedupeKey {
            post_type: self.post_type.clone(),
            slug: self.slug.clone(),
            date_gmt: self.date_gmt.clone(),
        }
    }
}

/// The `(type, slug, UTC timestamp)` tuple matched by exact equality.
///
/// Two distinct source records sharing all three components collapse into
/// one destination record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DedupeKey {
    /// Content type tag.
    pub post_type: String,
    /// URL-safe name.
    pub slug: String,
    /// UTC timestamp string, compared byte-for-byte.
    pub date_gmt: String,
}

/// An embedded author.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthorRecord {
    /// Source-side user id.
    #[serde(rename = "ID", default, deserialize_with = "lenient::id_or_zero")]
    pub source_id: u64,
    /// Login handle.
    #[serde(rename = "user_login", default, deserialize_with = "lenient::text")]
    pub login: String,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub display_name: String,
    /// URL-safe name.
    #[serde(rename = "user_nicename", default, deserialize_with = "lenient::text")]
    pub slug: String,
    /// Email address.
    #[serde(rename = "user_email", default, deserialize_with = "lenient::text")]
    pub email: String,
    /// Profile URL.
    #[serde(rename = "user_url", default, deserialize_with = "lenient::text")]
    pub url: String,
    /// Registration timestamp.
    #[serde(rename = "user_registered", default, deserialize_with = "lenient::text")]
    pub registered: String,
    /// Role list; the first entry is used when creating an identity.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub roles: Vec<String>,
    /// Given name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: String,
    /// Family name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: String,
    /// Nickname.
    #[serde(default, deserialize_with = "lenient::text")]
    pub nickname: String,
    /// Biography.
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
}

impl AuthorRecord {
    /// Returns the free-text profile fields as `(meta key, value)` pairs.
    pub fn profile_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
            ("nickname", self.nickname.as_str()),
            ("description", self.description.as_str()),
        ]
    }

    /// Returns the first listed role, if any.
    pub fn primary_role(&self) -> Option<&str> {
        self.roles.first().map(String::as_str).filter(|r| !r.is_empty())
    }
}

/// An embedded taxonomy term.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TermRecord {
    /// Source-side term id; not reused at the destination.
    #[serde(rename = "term_id", default, deserialize_with = "lenient::id_or_zero")]
    pub source_id: u64,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// URL-safe name; the match key within a taxonomy.
    #[serde(default, deserialize_with = "lenient::text")]
    pub slug: String,
    /// Description.
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    /// Source-side parent term id (0 for none).
    #[serde(default, deserialize_with = "lenient::id_or_zero")]
    pub parent: u64,
}

impl TermRecord {
    /// Creates a term with the given name and slug.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            ..Self::default()
        }
    }
}

/// A reference to a media item (featured media or an attachment value).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaReference {
    /// Source URL of the file.
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: String,
    /// Alternative text.
    #[serde(default, deserialize_with = "lenient::text")]
    pub alt: String,
    /// Title.
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    /// MIME type.
    #[serde(default, deserialize_with = "lenient::text")]
    pub mime_type: String,
    /// Candidate destination attachment id.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_id")]
    pub id: Option<u64>,
}

impl MediaReference {
    /// Creates a reference to a URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exported_record() -> serde_json::Value {
        json!({
            "ID": 12,
            "post_type": "post",
            "post_title": "Hello",
            "post_name": "hello",
            "post_content": "<p>Body</p>",
            "post_excerpt": "",
            "post_status": "publish",
            "post_date": "2024-03-01 10:00:00",
            "post_date_gmt": "2024-03-01 09:00:00",
            "post_author": "3",
            "menu_order": 0,
            "comment_status": "open",
            "ping_status": "closed",
            "meta": {"_thumbnail_id": "77", "views": ["1", "2"]},
            "taxonomies": {"category": [{"term_id": 4, "name": "News", "slug": "news", "description": "", "parent": 0}]},
            "acf": [],
            "featured_image": null,
            "author": {
                "ID": 3,
                "user_login": "jdoe",
                "display_name": "J Doe",
                "user_nicename": "jdoe",
                "user_email": "jdoe@example.com",
                "user_url": "",
                "user_registered": "2020-01-01 00:00:00",
                "roles": ["editor"],
                "first_name": "J",
                "last_name": "Doe",
                "nickname": "jd",
                "description": ""
            }
        })
    }

    #[test]
    fn decode_exported_record() {
        let record: ContentRecord = serde_json::from_value(exported_record()).unwrap();
        assert_eq!(record.id, 12);
        assert_eq!(record.slug, "hello");
        assert_eq!(record.source_author_id, 3);
        assert!(record.comment_status.is_open());
        assert!(!record.ping_status.is_open());
        assert!(record.meta["views"].is_list());
        assert_eq!(record.taxonomies["category"][0].slug, "news");
        assert!(record.fields.is_empty());
        assert!(record.featured_media.is_none());
        let author = record.author.unwrap();
        assert_eq!(author.primary_role(), Some("editor"));
        assert_eq!(author.profile_fields()[0], ("first_name", "J"));
    }

    #[test]
    fn empty_collections_as_lists() {
        let record: ContentRecord = serde_json::from_value(json!({
            "ID": "5",
            "meta": [],
            "taxonomies": [],
            "acf": []
        }))
        .unwrap();
        assert_eq!(record.id, 5);
        assert_eq!(record.post_type, "post");
        assert_eq!(record.status, "publish");
        assert!(record.meta.is_empty());
        assert!(record.taxonomies.is_empty());
    }

    #[test]
    fn missing_id_rejected() {
        let result: Result<ContentRecord, _> = serde_json::from_value(json!({"post_title": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn dedupe_key_components() {
        let mut record = ContentRecord::new(1, "page", "about");
        record.date_gmt = "2024-01-01 00:00:00".into();
        let key = record.dedupe_key();
        assert_eq!(key.post_type, "page");
        assert_eq!(key.slug, "about");
        assert_eq!(key.date_gmt, "2024-01-01 00:00:00");
    }

    #[test]
    fn media_reference_zero_id_is_absent() {
        let media: MediaReference =
            serde_json::from_value(json!({"url": "https://x/a.png", "id": 0})).unwrap();
        assert_eq!(media.id, None);
        let media: MediaReference =
            serde_json::from_value(json!({"url": "https://x/a.png", "id": "9"})).unwrap();
        assert_eq!(media.id, Some(9));
    }

    #[test]
    fn toggle_roundtrip_spelling() {
        assert_eq!(serde_json::to_value(Toggle::Open).unwrap(), json!("open"));
        let t: Toggle = serde_json::from_value(json!("anything")).unwrap();
        assert_eq!(t, Toggle::Closed);
    }
}
