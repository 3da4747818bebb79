//! Record reconciliation.
//!
//! Applies one [`ContentRecord`] to the destination: author, base fields,
//! taxonomies, meta, custom fields and featured media, in that order. Only
//! the base upsert is load-bearing; every other step fails in isolation.

use crate::config::ImportConfig;
use crate::error::ImportResult;
use crate::http::HttpClient;
use crate::resolver::EntityResolver;
use crate::sideload::Sideloader;
use crate::store::{ContentStore, PostFields};
use pressmigrate_protocol::ContentRecord;
use std::sync::Arc;
use tracing::{debug, warn};

/// Whether the base upsert created or updated the destination record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    /// No record matched the dedupe key.
    Created,
    /// A record matched the dedupe key and was updated in place.
    Updated,
}

/// Result of reconciling one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Destination record id.
    pub post_id: u64,
    /// Insert or update.
    pub action: UpsertAction,
    /// Steps after the upsert that failed, one message each.
    pub step_failures: Vec<String>,
}

impl RecordOutcome {
    /// Returns true if every step succeeded.
    pub fn is_clean(&self) -> bool {
        self.step_failures.is_empty()
    }
}

/// Applies source records to the destination.
///
/// An `Err` means the record was not imported. The driver counts it and
/// moves on to the next record.
pub trait RecordApplier: Send + Sync {
    /// Reconciles one record.
    fn apply(&self, record: &ContentRecord) -> ImportResult<RecordOutcome>;

    /// Called once before a run starts.
    fn begin_run(&self) {}

    /// Called after every record of a page was applied and before the
    /// page's watermark is persisted. An `Err` fails the page.
    fn end_page(&self) -> ImportResult<()> {
        Ok(())
    }
}

/// Reconciles records against a [`ContentStore`].
pub struct RecordReconciler<S: ContentStore, C: HttpClient> {
    store: Arc<S>,
    config: ImportConfig,
    resolver: EntityResolver,
    sideloader: Sideloader<C>,
}

impl<S: ContentStore, C: HttpClient> RecordReconciler<S, C> {
    /// Creates a reconciler writing to `store` and downloading media
    /// through `client`.
    pub fn new(store: Arc<S>, config: &ImportConfig, client: C) -> Self {
        Self {
            store,
            config: config.clone(),
            resolver: EntityResolver::new(),
            sideloader: Sideloader::new(client, config.media_timeout),
        }
    }

    /// Returns the destination store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the entity resolver.
    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    /// Returns the media sideloader.
    pub fn sideloader(&self) -> &Sideloader<C> {
        &self.sideloader
    }

    fn resolve_author(&self, record: &ContentRecord, failures: &mut Vec<String>) -> u64 {
        let Some(author) = &record.author else {
            return self.config.default_author;
        };
        match self.resolver.resolve_author(self.store.as_ref(), author) {
            Ok(Some(id)) => id,
            Ok(None) => self.config.default_author,
            Err(e) => {
                warn!(record = record.id, error = %e, "author resolution failed");
                failures.push(format!("author: {e}"));
                self.config.default_author
            }
        }
    }

    fn upsert(&self, record: &ContentRecord, author_id: u64) -> ImportResult<(u64, UpsertAction)> {
        let fields = PostFields::from_record(record, author_id);
        match self.store.find_post(&fields.dedupe_key())? {
            Some(id) => {
                self.store.update_post(id, &fields)?;
                Ok((id, UpsertAction::Updated))
            }
            None => Ok((self.store.insert_post(&fields)?, UpsertAction::Created)),
        }
    }

    fn apply_taxonomies(&self, record: &ContentRecord, post_id: u64, failures: &mut Vec<String>) {
        for (taxonomy, terms) in &record.taxonomies {
            if !self.store.taxonomy_exists(taxonomy) {
                debug!(record = record.id, taxonomy = %taxonomy, "skipping unknown taxonomy");
                continue;
            }
            let mut term_ids: Vec<u64> = Vec::with_capacity(terms.len());
            for term in terms {
                match self.resolver.resolve_term(self.store.as_ref(), taxonomy, term) {
                    Ok(id) if !term_ids.contains(&id) => term_ids.push(id),
                    Ok(_) => {}
                    Err(e) => {
                        warn!(record = record.id, taxonomy = %taxonomy, slug = %term.slug, error = %e, "term resolution failed");
                        failures.push(format!("term {taxonomy}/{}: {e}", term.slug));
                    }
                }
            }
            if term_ids.is_empty() {
                continue;
            }
            if let Err(e) = self.store.set_post_terms(post_id, taxonomy, &term_ids) {
                warn!(record = record.id, taxonomy = %taxonomy, error = %e, "cannot set terms");
                failures.push(format!("terms {taxonomy}: {e}"));
            }
        }
    }

    fn apply_meta(&self, record: &ContentRecord, post_id: u64, failures: &mut Vec<String>) {
        for (key, value) in &record.meta {
            if self.config.is_reserved_meta(key) {
                continue;
            }
            let written = self.store.delete_meta(post_id, key).and_then(|()| {
                value
                    .stored_entries()
                    .into_iter()
                    .try_for_each(|entry| self.store.add_meta(post_id, key, entry))
            });
            if let Err(e) = written {
                warn!(record = record.id, key = %key, error = %e, "cannot write meta");
                failures.push(format!("meta {key}: {e}"));
            }
        }
    }

    fn apply_fields(&self, record: &ContentRecord, post_id: u64, failures: &mut Vec<String>) {
        for field in record.fields.values() {
            if field.name.is_empty() {
                continue;
            }
            let value =
                self.resolver
                    .prepare_field(self.store.as_ref(), &self.sideloader, field, post_id);
            if let Err(e) = self.store.set_field(post_id, &field.name, &field.key, value) {
                warn!(record = record.id, field = %field.name, error = %e, "cannot store field");
                failures.push(format!("field {}: {e}", field.name));
            }
        }
    }

    fn apply_featured_media(
        &self,
        record: &ContentRecord,
        post_id: u64,
        failures: &mut Vec<String>,
    ) {
        let Some(media) = &record.featured_media else {
            return;
        };
        if media.id.is_none() && media.url.trim().is_empty() {
            return;
        }
        let Some(attachment) =
            self.resolver
                .resolve_media(self.store.as_ref(), &self.sideloader, media, post_id)
        else {
            debug!(record = record.id, url = %media.url, "featured media not set");
            return;
        };
        if let Err(e) = self.store.set_featured_media(post_id, attachment) {
            warn!(record = record.id, attachment, error = %e, "cannot set featured media");
            failures.push(format!("featured media: {e}"));
        }
    }
}

impl<S: ContentStore, C: HttpClient> RecordApplier for RecordReconciler<S, C> {
    fn apply(&self, record: &ContentRecord) -> ImportResult<RecordOutcome> {
        let mut failures = Vec::new();
        let author_id = self.resolve_author(record, &mut failures);
        let (post_id, action) = self.upsert(record, author_id)?;

        self.apply_taxonomies(record, post_id, &mut failures);
        self.apply_meta(record, post_id, &mut failures);
        self.apply_fields(record, post_id, &mut failures);
        self.apply_featured_media(record, post_id, &mut failures);

        debug!(
            record = record.id,
            post = post_id,
            ?action,
            failed_steps = failures.len(),
            "reconciled record"
        );
        Ok(RecordOutcome {
            post_id,
            action,
            step_failures: failures,
        })
    }

    fn begin_run(&self) {
        self.resolver.clear();
    }

    fn end_page(&self) -> ImportResult<()> {
        self.store.commit()?;
        Ok(())
    }
}
