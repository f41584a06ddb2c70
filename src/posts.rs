//! Post assembly: provider fetch → normalize → extract → filter → sort.
//!
//! [`PostService`] orchestrates the whole content pipeline against a
//! [`ContentProvider`]. The provider is a seam: production code talks to
//! the hosted workspace API, the CLI and tests talk to a
//! [`SnapshotProvider`] reading record-map JSON files from disk.
//!
//! ## Degradation contract
//!
//! `list_posts` never fails. A build must survive a misconfigured root
//! or a flaky provider, so every root-level problem degrades to an empty
//! listing with a `warn!` diagnostic naming the cause:
//!
//! - root id missing or malformed → "misconfigured"
//! - fetch failed → "transient"
//! - root resolves to something that is not a database → "misconfigured"
//!
//! Per-page problems degrade per page: an id whose record is missing is
//! dropped from the listing, never aborting the batch.
//!
//! `get_blocks` is the opposite: a detail page has no meaningful empty
//! fallback, so its errors propagate to the caller.
//!
//! ## Parallel extraction
//!
//! Property extraction is independent per page (read-only tables, fresh
//! output per page), so the page-id walk fans out on the rayon pool.
//! `par_iter` over the id list keeps the collection view's order in the
//! collected result; ordering decisions stay with the filter/sort step.

use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use crate::collection;
use crate::config::SiteConfig;
use crate::filter::{self, Post};
use crate::properties::{self, Schema};
use crate::record::{self, CollectionQuery, RecordMap};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("page not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The provider's inbound fetch surface.
///
/// Both calls may fail with a transport error; callers treat failures as
/// catchable and non-fatal at the listing boundary.
pub trait ContentProvider {
    /// Fetch the full record graph for the page tree rooted at `id`.
    fn get_page(&self, id: &str) -> Result<RecordMap, ProviderError>;

    /// Fetch one view's query results for a collection directly. Used
    /// when a page response carries no query results of its own.
    fn get_page_table(
        &self,
        collection_id: &str,
        view_id: &str,
    ) -> Result<CollectionQuery, ProviderError>;
}

/// Orchestrates the content pipeline for one configured site.
///
/// Configuration is injected here rather than read from ambient process
/// state, so the service is testable without environment mocking.
pub struct PostService<P> {
    provider: P,
    config: SiteConfig,
}

impl<P: ContentProvider> PostService<P> {
    pub fn new(provider: P, config: SiteConfig) -> Self {
        PostService { provider, config }
    }

    /// All publishable posts, filtered and ordered.
    ///
    /// `include_pages`: false lists posts only; true also lists
    /// standalone pages (the front page and navigation want both).
    pub fn list_posts(&self, include_pages: bool) -> Vec<Post> {
        let Some(root_id) = record::canonical_id(&self.config.root_page_id) else {
            warn!(
                root_page_id = %self.config.root_page_id,
                "root page id is missing or malformed; listing nothing"
            );
            return Vec::new();
        };

        let response = match self.provider.get_page(&root_id) {
            Ok(raw) => record::normalize_map(&raw),
            Err(error) => {
                warn!(%root_id, %error, "root page fetch failed; listing nothing");
                return Vec::new();
            }
        };

        // The root must resolve to a single collection/query/schema
        // triple. Some setups point at a page that merely *contains* a
        // database — that is a configuration problem, not a crash.
        let Some((collection_id, schema)) = first_collection(&response) else {
            warn!(%root_id, "root page is not a database; listing nothing");
            return Vec::new();
        };
        let query = match self.resolve_query(&response, &collection_id) {
            Some(query) => query,
            None => {
                warn!(%root_id, "root database has no query results; listing nothing");
                return Vec::new();
            }
        };

        let page_ids = collection::page_ids(&query);
        let entries: Vec<_> = page_ids
            .par_iter()
            .filter_map(|id| properties::extract(id, &response.block, &schema))
            .collect();

        let mut posts = filter::filter_posts(entries, include_pages);
        if self.config.sort_by_date {
            filter::sort_posts_by_date(&mut posts);
        }
        posts
    }

    /// The normalized block map for one page, ready for the renderer.
    /// Transport errors propagate: a detail page either renders or 404s.
    pub fn get_blocks(&self, page_id: &str) -> Result<RecordMap, ProviderError> {
        let id = record::canonical_id(page_id).unwrap_or_else(|| page_id.to_string());
        let raw = self.provider.get_page(&id)?;
        Ok(record::normalize_map(&raw))
    }

    /// Query results for the root collection: from the page response when
    /// present, else fetched per-view from the provider.
    fn resolve_query(&self, response: &RecordMap, collection_id: &str) -> Option<CollectionQuery> {
        if !response.collection_query.is_empty() {
            return Some(response.collection_query.clone());
        }
        let view_id = response.collection_view.keys().next()?;
        match self.provider.get_page_table(collection_id, view_id) {
            Ok(query) => Some(query),
            Err(error) => {
                warn!(%collection_id, %error, "collection query fetch failed");
                None
            }
        }
    }
}

/// Look up a post by slug. The front-end templates resolve their one
/// required root page this way and show not-found when it is absent.
pub fn find_post<'a>(posts: &'a [Post], slug: &str) -> Option<&'a Post> {
    posts.iter().find(|post| post.slug() == Some(slug))
}

/// First collection in the response, with its parsed schema.
fn first_collection(response: &RecordMap) -> Option<(String, Schema)> {
    let (id, record) = response.collection.iter().next()?;
    let schema_value = record.value.get("schema")?;
    let schema: Schema = serde_json::from_value(schema_value.clone()).ok()?;
    if schema.is_empty() {
        return None;
    }
    Some((id.clone(), schema))
}

// ============================================================================
// Snapshot provider
// ============================================================================

/// File-backed [`ContentProvider`]: one `<id>.json` record map per page,
/// plus optional `<collection-id>.<view-id>.table.json` query files.
///
/// The filesystem is the data source, as everywhere in this crate —
/// snapshots are exported once and builds run offline and reproducible.
pub struct SnapshotProvider {
    dir: PathBuf,
}

impl SnapshotProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotProvider { dir: dir.into() }
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T, ProviderError> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(ProviderError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ContentProvider for SnapshotProvider {
    fn get_page(&self, id: &str) -> Result<RecordMap, ProviderError> {
        self.read_json(&format!("{id}.json"))
    }

    fn get_page_table(
        &self,
        collection_id: &str,
        view_id: &str,
    ) -> Result<CollectionQuery, ProviderError> {
        self.read_json(&format!("{collection_id}.{view_id}.table.json"))
    }
}
