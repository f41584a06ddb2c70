//! Collection query walking.
//!
//! A collection query response holds one or more named views; each view
//! carries its page ids either as a flat ordered list (table and list
//! views) or split across groups (board views). The walker flattens the
//! first view that holds any ids into one ordered sequence — flat list
//! first, then each group in order — deduplicating ids that appear in
//! more than one group while keeping their first-seen position.
//!
//! An empty or viewless query yields an empty sequence, not an error:
//! a freshly created collection simply has no posts yet.

use std::collections::HashSet;

use crate::record::{CollectionQuery, ViewResult};

/// Every page id referenced by the query, in view order, deduplicated.
pub fn page_ids(query: &CollectionQuery) -> Vec<String> {
    let Some(views) = query.values().next() else {
        return Vec::new();
    };

    views
        .values()
        .map(flatten_view)
        .find(|ids| !ids.is_empty())
        .unwrap_or_default()
}

/// Flatten one view's ordering: flat ids first, then groups in order,
/// first occurrence wins.
fn flatten_view(view: &ViewResult) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    let all = view
        .block_ids
        .iter()
        .chain(view.groups.iter().flat_map(|group| group.block_ids.iter()));
    for id in all {
        if seen.insert(id.as_str()) {
            ids.push(id.clone());
        }
    }
    ids
}
