//! # Notefold
//!
//! A minimal static blog generator for pages hosted in a workspace
//! document service. The workspace is the data source: one database page
//! holds the posts, its schema names their properties, and its views
//! decide their order. Notefold fetches the record graph, repairs and
//! decodes it, and hands a clean block map to an external HTML renderer.
//!
//! # Architecture: Content Pipeline
//!
//! ```text
//! provider response
//!   → record    normalize the raw record tables into one uniform shape
//!   → collection  walk the query views into an ordered page-id list
//!   → properties  decode each page against the collection schema
//!   → filter    drop unpublished entries, order the survivors
//!   → posts     orchestrate the above; the provider seam lives here
//!   → regroup   re-derive card grids from the rendered block run
//! ```
//!
//! Every stage hand-off is a serde-serializable value, so each stage can
//! be exercised from a JSON file on disk — the pipeline builds offline
//! from exported snapshots and every intermediate is inspectable.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`record`] | Provider record model, wrapper repair, id canonicalization |
//! | [`collection`] | Query-view walking into an ordered, deduplicated page-id list |
//! | [`properties`] | Schema-driven decoding of raw page properties into typed values |
//! | [`filter`] | Publication filtering and stable date ordering |
//! | [`posts`] | Assembly service, provider trait, snapshot provider |
//! | [`regroup`] | Post-render card-grid reconstruction over the element tree |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI output formatting — information-first post listings |
//!
//! # Design Decisions
//!
//! ## One Repair Pass, Not Scattered Null-Checks
//!
//! The provider emits records in two shapes (plain and double-wrapped).
//! [`record::normalize_map`] repairs everything once, up front, so the
//! extractor and walker consume exactly one shape. No downstream code
//! ever looks for a nested `value.value`.
//!
//! ## Degrade, Don't Crash
//!
//! A static build must survive a misconfigured root id and a flaky
//! provider. Root-level problems degrade the listing to empty with a
//! logged diagnostic; a problem with one page drops that page only; a
//! malformed field decodes to null. The only propagating error surface
//! is the single-page block fetch, where an empty fallback would be
//! meaningless.
//!
//! ## The Renderer Is a Collaborator, Not a Dependency
//!
//! HTML rendering belongs to an external renderer. Notefold only touches
//! its *output*, and only in one place: the regrouping pass, which is
//! written against a small predicate set over class/tag names so the
//! renderer's vocabulary can change without touching the scan algorithm.

pub mod collection;
pub mod config;
pub mod filter;
pub mod output;
pub mod posts;
pub mod properties;
pub mod record;
pub mod regroup;

#[cfg(test)]
pub(crate) mod test_helpers;
