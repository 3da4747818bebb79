//! Canned records and entities for tests.

use crate::builder::RecordBuilder;
use pressmigrate_protocol::{AuthorRecord, ContentRecord, FieldRecord, MediaReference, TermRecord};
use serde_json::json;

/// An author with every identifying attribute set.
pub fn author_jane() -> AuthorRecord {
    AuthorRecord {
        source_id: 7,
        login: "jane".into(),
        display_name: "Jane Doe".into(),
        slug: "jane-doe".into(),
        email: "jane@example.com".into(),
        url: "https://jane.example.com".into(),
        registered: "2020-05-01 09:30:00".into(),
        roles: vec!["editor".into()],
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        nickname: "jd".into(),
        description: "Writes things.".into(),
    }
}

/// An author known only by display name.
pub fn author_anonymous(display_name: &str) -> AuthorRecord {
    AuthorRecord {
        display_name: display_name.into(),
        ..AuthorRecord::default()
    }
}

/// A term whose slug is derived from `name`.
pub fn term(name: &str) -> TermRecord {
    let slug = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    TermRecord::new(name, slug)
}

/// A single-image field returning `format`.
pub fn image_field(name: &str, format: &str, value: serde_json::Value) -> FieldRecord {
    FieldRecord::new(format!("field_{name}"), name, "image", format, value)
}

/// A gallery field of image URLs.
pub fn gallery_field(name: &str, urls: &[&str]) -> FieldRecord {
    FieldRecord::new(format!("field_{name}"), name, "gallery", "array", json!(urls))
}

/// A plain text field.
pub fn text_field(name: &str, value: &str) -> FieldRecord {
    FieldRecord::new(format!("field_{name}"), name, "text", "", json!(value))
}

/// An image reference under `https://source.example`.
pub fn remote_image(name: &str) -> MediaReference {
    MediaReference {
        url: format!("https://source.example/uploads/{name}"),
        alt: format!("{name} alt"),
        title: name.to_string(),
        mime_type: "image/jpeg".into(),
        id: None,
    }
}

/// Published posts with ids `1..=n`.
pub fn records(n: u64) -> Vec<ContentRecord> {
    (1..=n).map(|id| RecordBuilder::new(id).build()).collect()
}

/// Published posts with ids `1..=n`, each carrying an author, terms,
/// meta and a text field.
pub fn rich_records(n: u64) -> Vec<ContentRecord> {
    (1..=n)
        .map(|id| {
            RecordBuilder::new(id)
                .author(author_jane())
                .term("category", term("News"))
                .term("post_tag", term(&format!("Tag {}", id % 3)))
                .meta("views", json!(id * 10))
                .field(text_field("subtitle", &format!("Subtitle {id}")))
                .build()
        })
        .collect()
}

/// Bytes of a minimal JPEG, enough for content sniffing.
pub fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_slug() {
        assert_eq!(term("Big News").slug, "big-news");
    }

    #[test]
    fn rich_records_are_distinct() {
        let rs = rich_records(4);
        assert_eq!(rs.len(), 4);
        assert_ne!(rs[0].dedupe_key(), rs[1].dedupe_key());
        assert_eq!(rs[2].taxonomies["post_tag"][0].slug, "tag-0");
    }
}
