//! Property-based test generators using proptest.
//!
//! Provides strategies for generating exported records that keep the
//! invariants a source guarantees: unique ids and unique dedupe keys.

use crate::builder::RecordBuilder;
use pressmigrate_protocol::{ContentRecord, TermRecord};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Strategy for generating slugs.
pub fn slug_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,23}").expect("Invalid regex")
}

/// Strategy for generating terms.
pub fn term_strategy() -> impl Strategy<Value = TermRecord> {
    ("[A-Z][a-z]{1,10}", slug_strategy()).prop_map(|(name, slug)| TermRecord::new(name, slug))
}

/// Strategy for generating a single record with source id `id`.
pub fn record_strategy(id: u64) -> impl Strategy<Value = ContentRecord> {
    (
        "[A-Za-z ]{0,40}",
        prop::collection::vec(term_strategy(), 0..3),
        any::<u16>(),
    )
        .prop_map(move |(title, terms, views)| {
            let mut builder = RecordBuilder::new(id)
                .title(&title)
                .meta("views", serde_json::json!(views));
            for t in terms {
                builder = builder.term("category", t);
            }
            builder.build()
        })
}

/// Strategy for generating source ids: ascending, unique, with gaps.
pub fn id_set_strategy(max_len: usize) -> impl Strategy<Value = Vec<u64>> {
    prop::collection::btree_set(1u64..10_000, 0..=max_len)
        .prop_map(|ids: BTreeSet<u64>| ids.into_iter().collect())
}

/// Strategy for generating a record set with unique ids and slugs.
pub fn record_set_strategy(max_len: usize) -> impl Strategy<Value = Vec<ContentRecord>> {
    id_set_strategy(max_len).prop_flat_map(|ids| {
        ids.into_iter()
            .map(record_strategy)
            .collect::<Vec<_>>()
    })
}
