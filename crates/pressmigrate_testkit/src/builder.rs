//! Builder for exported content records.

use pressmigrate_protocol::{
    AuthorRecord, ContentRecord, FieldRecord, MediaReference, MetaValue, TermRecord, Toggle,
};

/// Timestamp given to built records unless overridden.
pub const DEFAULT_DATE_GMT: &str = "2024-01-01 00:00:00";

/// Builds a [`ContentRecord`] with sensible defaults.
///
/// Defaults: type `post`, status `publish`, slug `post-{id}`, title
/// `Post {id}` and a fixed UTC timestamp, so records built from distinct
/// ids never share a dedupe key.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: ContentRecord,
}

impl RecordBuilder {
    /// Starts a record with source id `id`.
    pub fn new(id: u64) -> Self {
        let mut record = ContentRecord::new(id, "post", format!("post-{id}"));
        record.title = format!("Post {id}");
        record.body = format!("<p>Body of post {id}.</p>");
        record.date = DEFAULT_DATE_GMT.to_string();
        record.date_gmt = DEFAULT_DATE_GMT.to_string();
        Self { record }
    }

    /// Sets the content type.
    pub fn post_type(mut self, post_type: &str) -> Self {
        self.record.post_type = post_type.to_string();
        self
    }

    /// Sets the status.
    pub fn status(mut self, status: &str) -> Self {
        self.record.status = status.to_string();
        self
    }

    /// Sets the slug.
    pub fn slug(mut self, slug: &str) -> Self {
        self.record.slug = slug.to_string();
        self
    }

    /// Sets the title.
    pub fn title(mut self, title: &str) -> Self {
        self.record.title = title.to_string();
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: &str) -> Self {
        self.record.body = body.to_string();
        self
    }

    /// Sets both the local and UTC timestamps.
    pub fn date_gmt(mut self, date: &str) -> Self {
        self.record.date = date.to_string();
        self.record.date_gmt = date.to_string();
        self
    }

    /// Opens comments and pings.
    pub fn open_discussion(mut self) -> Self {
        self.record.comment_status = Toggle::Open;
        self.record.ping_status = Toggle::Open;
        self
    }

    /// Attaches an author.
    pub fn author(mut self, author: AuthorRecord) -> Self {
        self.record.source_author_id = author.source_id;
        self.record.author = Some(author);
        self
    }

    /// Adds a term under `taxonomy`.
    pub fn term(mut self, taxonomy: &str, term: TermRecord) -> Self {
        self.record
            .taxonomies
            .entry(taxonomy.to_string())
            .or_default()
            .push(term);
        self
    }

    /// Declares `taxonomy` with no terms.
    pub fn empty_taxonomy(mut self, taxonomy: &str) -> Self {
        self.record.taxonomies.entry(taxonomy.to_string()).or_default();
        self
    }

    /// Sets a meta entry.
    pub fn meta(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.record.meta.insert(key.to_string(), value.into());
        self
    }

    /// Adds a custom field, keyed by its name.
    pub fn field(mut self, field: FieldRecord) -> Self {
        self.record.fields.insert(field.name.clone(), field);
        self
    }

    /// Sets the featured image.
    pub fn featured_media(mut self, media: MediaReference) -> Self {
        self.record.featured_media = Some(media);
        self
    }

    /// Finishes the record.
    pub fn build(self) -> ContentRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let r = RecordBuilder::new(3).build();
        assert_eq!(r.post_type, "post");
        assert_eq!(r.status, "publish");
        assert_eq!(r.slug, "post-3");
        assert_eq!(r.date_gmt, DEFAULT_DATE_GMT);
        assert!(r.author.is_none());
    }

    #[test]
    fn terms_accumulate_per_taxonomy() {
        let r = RecordBuilder::new(1)
            .term("category", TermRecord::new("A", "a"))
            .term("category", TermRecord::new("B", "b"))
            .empty_taxonomy("post_tag")
            .build();
        assert_eq!(r.taxonomies["category"].len(), 2);
        assert!(r.taxonomies["post_tag"].is_empty());
    }

    #[test]
    fn author_sets_source_id() {
        let author = AuthorRecord {
            source_id: 42,
            login: "jane".into(),
            ..AuthorRecord::default()
        };
        let r = RecordBuilder::new(1).author(author).build();
        assert_eq!(r.source_author_id, 42);
    }
}
