//! Benchmark utilities.

#![warn(missing_docs)]

use pressmigrate_engine::{
    HttpReply, ImportConfig, LoopbackServer, MemoryStore, RecordReconciler, StaticClient,
};
use pressmigrate_protocol::ContentRecord;
use pressmigrate_server::{ExportServer, MemorySource, ServerConfig};
use pressmigrate_testkit::{author_anonymous, author_jane, term, text_field, RecordBuilder};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;
use std::sync::Arc;

/// Token accepted by benchmark servers.
pub const BENCH_TOKEN: &str = "bench-token";

/// Generate `count` records with ascending, gapped ids and randomized
/// authors, terms, meta and fields.
pub fn generate_records(count: usize) -> Vec<ContentRecord> {
    let mut rng = rand::thread_rng();
    let tags = ["Rust", "Sync", "Batch", "Media", "Import", "Notes"];
    let mut id = 0u64;
    (0..count)
        .map(|i| {
            id += rng.gen_range(1..4);
            let author = if rng.gen_bool(0.8) {
                author_jane()
            } else {
                author_anonymous(&format!("Guest {}", i % 7))
            };
            let mut builder = RecordBuilder::new(id)
                .author(author)
                .term("category", term("News"))
                .meta("views", json!(rng.gen_range(0..10_000)))
                .meta("_edit_lock", json!("1700000000:1"))
                .field(text_field("subtitle", &format!("Subtitle {i}")));
            for tag in tags.choose_multiple(&mut rng, 2) {
                builder = builder.term("post_tag", term(tag));
            }
            builder.build()
        })
        .collect()
}

/// Build an export server over `records`.
pub fn export_server(records: Vec<ContentRecord>) -> ExportServer<MemorySource> {
    let config = ServerConfig::default().with_token(BENCH_TOKEN);
    ExportServer::new(config, MemorySource::from_records(records))
        .expect("Failed to build export server")
}

/// Build a reconciler writing into a fresh in-memory store.
pub fn reconciler() -> RecordReconciler<MemoryStore, StaticClient> {
    let config = ImportConfig::new("http://source.bench/posts", BENCH_TOKEN);
    RecordReconciler::new(Arc::new(MemoryStore::new()), &config, StaticClient::new())
}

/// Loopback adapter answering from an in-process export server.
pub struct InProcessSource(pub Arc<ExportServer<MemorySource>>);

impl LoopbackServer for InProcessSource {
    fn handle_get(&self, path_and_query: &str, authorization: Option<&str>) -> HttpReply {
        let reply = self.0.handle_get(path_and_query, authorization);
        HttpReply::json(reply.status, reply.body)
    }
}
