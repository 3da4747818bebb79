//! Record source behind the export endpoints.

use crate::error::{ServerError, ServerResult};
use parking_lot::RwLock;
use pressmigrate_protocol::{ContentRecord, PostTypeInfo};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Read access to the exportable records.
///
/// Selection is two-step: first the ordered id list of a page, then the
/// records for exactly those ids.
pub trait SourceStore: Send + Sync {
    /// Ids of `(post_type, status)` records with `id > cursor`, ascending,
    /// at most `limit`.
    fn ids_after(&self, post_type: &str, status: &str, cursor: u64, limit: u32)
        -> ServerResult<Vec<u64>>;

    /// Records for `ids`, in the given order. Unknown ids are skipped.
    fn records(&self, ids: &[u64]) -> ServerResult<Vec<ContentRecord>>;

    /// Public content types.
    fn post_types(&self) -> ServerResult<Vec<PostTypeInfo>>;
}

/// An in-memory record source.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: RwLock<BTreeMap<u64, ContentRecord>>,
    types: RwLock<Vec<PostTypeInfo>>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source holding `records`. A later record with the same id
    /// replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = ContentRecord>) -> Self {
        let source = Self::new();
        for record in records {
            source.insert(record);
        }
        source
    }

    /// Loads records from a JSON file holding an array of records or an
    /// export page.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let bytes = fs::read(path)?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        let records = match value {
            serde_json::Value::Object(mut page) if page.contains_key("records") => {
                page.remove("records").unwrap_or_default()
            }
            other => other,
        };
        let records: Vec<ContentRecord> = serde_json::from_value(records)?;
        Ok(Self::from_records(records))
    }

    /// Adds or replaces a record.
    pub fn insert(&self, record: ContentRecord) {
        self.records.write().insert(record.id, record);
    }

    /// Registers a public content type.
    pub fn register_type(&self, slug: impl Into<String>, label: impl Into<String>) {
        self.types.write().push(PostTypeInfo::new(slug, label));
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if the source holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl SourceStore for MemorySource {
    fn ids_after(
        &self,
        post_type: &str,
        status: &str,
        cursor: u64,
        limit: u32,
    ) -> ServerResult<Vec<u64>> {
        let start = cursor.checked_add(1).ok_or_else(|| {
            ServerError::Source(format!("cursor {cursor} is past the last id"))
        })?;
        Ok(self
            .records
            .read()
            .range(start..)
            .filter(|(_, r)| r.post_type == post_type && r.status == status)
            .map(|(id, _)| *id)
            .take(limit as usize)
            .collect())
    }

    fn records(&self, ids: &[u64]) -> ServerResult<Vec<ContentRecord>> {
        let records = self.records.read();
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    /// Registered types, or one entry per distinct record type when none
    /// were registered.
    fn post_types(&self) -> ServerResult<Vec<PostTypeInfo>> {
        let registered = self.types.read();
        if !registered.is_empty() {
            return Ok(registered.clone());
        }
        let mut seen: Vec<String> = Vec::new();
        for record in self.records.read().values() {
            if !seen.contains(&record.post_type) {
                seen.push(record.post_type.clone());
            }
        }
        Ok(seen
            .into_iter()
            .map(|slug| PostTypeInfo::new(slug.clone(), slug))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressmigrate_testkit::RecordBuilder;
    use tempfile::TempDir;

    fn source() -> MemorySource {
        MemorySource::from_records([
            RecordBuilder::new(3).build(),
            RecordBuilder::new(1).build(),
            RecordBuilder::new(7).status("draft").build(),
            RecordBuilder::new(9).post_type("page").build(),
            RecordBuilder::new(12).build(),
        ])
    }

    #[test]
    fn ids_are_ascending_and_partitioned() {
        let s = source();
        assert_eq!(s.ids_after("post", "publish", 0, 10).unwrap(), vec![1, 3, 12]);
        assert_eq!(s.ids_after("post", "publish", 1, 1).unwrap(), vec![3]);
        assert_eq!(s.ids_after("post", "draft", 0, 10).unwrap(), vec![7]);
        assert!(s.ids_after("post", "publish", 12, 10).unwrap().is_empty());
        assert!(s.ids_after("post", "publish", u64::MAX, 10).is_err());
    }

    #[test]
    fn records_follow_id_order() {
        let s = source();
        let ids: Vec<u64> = s.records(&[12, 3, 99]).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![12, 3]);
    }

    #[test]
    fn types_listing() {
        let s = source();
        let slugs: Vec<String> = s.post_types().unwrap().into_iter().map(|t| t.slug).collect();
        assert_eq!(slugs, vec!["post", "page"]);

        s.register_type("post", "Posts");
        assert_eq!(s.post_types().unwrap(), vec![PostTypeInfo::new("post", "Posts")]);
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("records.json");
        let records = vec![RecordBuilder::new(1).build(), RecordBuilder::new(2).build()];
        fs::write(&list, serde_json::to_vec(&records).unwrap()).unwrap();
        assert_eq!(MemorySource::load(&list).unwrap().len(), 2);

        let page = dir.path().join("page.json");
        fs::write(
            &page,
            serde_json::to_vec(&pressmigrate_protocol::ExportPage::new(0, records)).unwrap(),
        )
        .unwrap();
        assert_eq!(MemorySource::load(&page).unwrap().len(), 2);

        assert!(MemorySource::load(&dir.path().join("missing.json")).is_err());
    }
}
