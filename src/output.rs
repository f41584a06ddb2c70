//! CLI output formatting.
//!
//! Information-first display: the primary line for every post is its
//! positional index and title, with slug, date, and tags as indented
//! context lines.
//!
//! ```text
//! Posts
//! 001 Borrowing the Borrow Checker (2026-03-16)
//!     Slug: borrowing-the-borrow-checker
//!     Tags: Rust, compilers
//! 002 Hello World (2026-01-02)
//!     Slug: hello-world
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use chrono::DateTime;

use crate::config::SiteConfig;
use crate::filter::Post;
use crate::record;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Epoch milliseconds → `YYYY-MM-DD` (UTC). Out-of-range values render
/// as `?` rather than panicking on hostile snapshot data.
fn format_date(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Format the post listing.
pub fn format_posts(posts: &[Post]) -> Vec<String> {
    let mut lines = vec!["Posts".to_string()];
    if posts.is_empty() {
        lines.push("    (none)".to_string());
        return lines;
    }

    for (i, post) in posts.iter().enumerate() {
        let title = post.title().unwrap_or("(untitled)");
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            title,
            format_date(post.date)
        ));
        if let Some(slug) = post.slug() {
            lines.push(format!("    Slug: {slug}"));
        }
        let tags = post.tags("tags");
        if !tags.is_empty() {
            lines.push(format!("    Tags: {}", tags.join(", ")));
        }
        if post.full_width {
            lines.push("    Layout: full-width".to_string());
        }
    }
    lines
}

pub fn print_posts(posts: &[Post]) {
    for line in format_posts(posts) {
        println!("{line}");
    }
}

/// Format the configuration summary for `check`.
pub fn format_check(config: &SiteConfig) -> Vec<String> {
    let mut lines = vec!["Config".to_string()];

    let root = if config.root_page_id.is_empty() {
        "(unset — listings will be empty)".to_string()
    } else {
        match record::canonical_id(&config.root_page_id) {
            Some(id) => id,
            None => format!("{} (malformed)", config.root_page_id),
        }
    };
    lines.push(format!("    Root page: {root}"));
    lines.push(format!(
        "    Order: {}",
        if config.sort_by_date {
            "newest first"
        } else {
            "collection view"
        }
    ));
    if !config.title.is_empty() {
        lines.push(format!("    Title: {}", config.title));
    }

    if config.grids.is_empty() {
        lines.push("    Grids: (none)".to_string());
    } else {
        lines.push("    Grids".to_string());
        for (i, rule) in config.grids.iter().enumerate() {
            lines.push(format!(
                "    {} {} → \"{}\"",
                format_index(i + 1),
                rule.page,
                rule.section
            ));
        }
    }
    lines
}

pub fn print_check(config: &SiteConfig) {
    for line in format_check(config) {
        println!("{line}");
    }
}
