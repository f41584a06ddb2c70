//! Publication filtering and post ordering.
//!
//! Extracted page properties are not all publishable: drafts, pages with
//! missing titles or slugs, and standalone pages (when the caller wants
//! posts only) are dropped here. The surviving entries are *posts*.
//!
//! Ordering: with the site's `sort_by_date` setting on, posts are sorted
//! newest-first; ties keep the collection view's order (the sort is
//! stable). With it off, the view's order is preserved as-is.

use crate::properties::PageProperties;

/// A page that passed the publication filter.
pub type Post = PageProperties;

/// Entry kinds a collection row can declare via its `type` property.
const TYPE_POST: &str = "Post";
const TYPE_PAGE: &str = "Page";

const STATUS_PUBLISHED: &str = "Published";

/// Keep only publishable entries.
///
/// An entry survives when its status is `Published`, its title and slug
/// are present, and its type is `Post` — or `Page` too, when
/// `include_pages` is set.
pub fn filter_posts(entries: Vec<PageProperties>, include_pages: bool) -> Vec<Post> {
    entries
        .into_iter()
        .filter(|entry| {
            let kind = entry.text("type");
            let kind_ok = if include_pages {
                matches!(kind, Some(TYPE_POST) | Some(TYPE_PAGE))
            } else {
                kind == Some(TYPE_POST)
            };
            kind_ok
                && entry.title().is_some()
                && entry.slug().is_some()
                && entry.text("status") == Some(STATUS_PUBLISHED)
        })
        .collect()
}

/// Sort posts by date, newest first.
///
/// Sorts the owned vector in place; call sites hand over the filter
/// output and never reuse the pre-sort order. `sort_by` is stable, so
/// equal dates keep their collection-view order.
pub fn sort_posts_by_date(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}
