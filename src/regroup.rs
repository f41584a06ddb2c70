//! Post-render structural regrouping.
//!
//! The external renderer turns a block map into a flat run of sibling
//! elements — headings, text blocks, figures — with no structural
//! grouping. Two of the site's page templates want card grids instead:
//! a "people" section authored as alternating sub-heading/portrait
//! blocks should render as a grid of cards, not a vertical list.
//!
//! This pass re-derives that structure from the rendered tree. Starting
//! right after a known section heading, it consumes the longest
//! contiguous run of siblings matching a card pattern, re-parents each
//! match into a card `div`, collects the cards into a grid `div`, and
//! inserts the grid immediately after the heading:
//!
//! ```text
//! h3.doc-heading "Residents & Alumni"        h3.doc-heading "Residents & Alumni"
//! h4.doc-subheading "Ada"                    div.portrait-grid
//! figure.doc-image                     →       div.portrait-card
//! h4.doc-subheading "Grace"                      h4.doc-subheading "Ada"
//! figure.doc-image                               figure.doc-image
//! p.doc-text "(unrelated)"                     div.portrait-card
//!                                                h4.doc-subheading "Grace"
//!                                                figure.doc-image
//!                                            p.doc-text "(unrelated)"
//! ```
//!
//! Two card patterns exist (see [`CardPattern`]). Both scan sibling
//! adjacency only — a gap or a non-matching node ends the run, and the
//! pass never recurses into nested containers while scanning.
//!
//! The grid's class doubles as the idempotence marker: once a grid for a
//! pattern exists anywhere under the page root, re-invoking the pass is
//! a no-op. There is no separate "already ran" flag to keep in sync.
//!
//! The matching rules are inherently coupled to the renderer's class and
//! tag vocabulary, so they live in one predicate set at the top of this
//! module; the scan/assemble algorithm below never mentions a class name.

use serde::{Deserialize, Serialize};

// ============================================================================
// Rendered element model
// ============================================================================

/// A rendered block element: the subset of a DOM node this pass needs.
///
/// Trees cross the CLI boundary as JSON (renderer output in, regrouped
/// tree out), like every other stage hand-off in this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name, lowercase (`"h3"`, `"figure"`, `"div"`).
    pub tag: String,
    /// Class set, order-insensitive.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// Own text, before any children's text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_string(),
            classes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add a class.
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Builder: set own text.
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Builder: append a child.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Own text plus all descendants' text, in document order.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    /// Whether any element in this subtree (self included) has `class`.
    pub fn subtree_has_class(&self, class: &str) -> bool {
        self.has_class(class) || self.children.iter().any(|c| c.subtree_has_class(class))
    }
}

// ============================================================================
// Renderer vocabulary — the full coupling surface to the external renderer
// ============================================================================

/// Class of the container holding the page's rendered block run.
pub const PAGE_CLASS: &str = "doc-page";

const SECTION_HEADING_TAG: &str = "h3";
const SECTION_HEADING_CLASS: &str = "doc-heading";
const CARD_HEADING_TAG: &str = "h4";
const CARD_HEADING_CLASS: &str = "doc-subheading";
const TEXT_CLASS: &str = "doc-text";
const IMAGE_TAG: &str = "figure";
const IMAGE_CLASS: &str = "doc-image";

fn is_section_heading(el: &Element) -> bool {
    el.tag == SECTION_HEADING_TAG && el.has_class(SECTION_HEADING_CLASS)
}

fn is_card_heading(el: &Element) -> bool {
    el.tag == CARD_HEADING_TAG && el.has_class(CARD_HEADING_CLASS)
}

fn is_text_block(el: &Element) -> bool {
    el.has_class(TEXT_CLASS)
}

fn is_image_block(el: &Element) -> bool {
    el.tag == IMAGE_TAG && el.has_class(IMAGE_CLASS)
}

// ============================================================================
// Card patterns and rules
// ============================================================================

/// The sibling run shape that forms one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardPattern {
    /// Strict pairs: sub-heading directly followed by an image. The run
    /// ends at the first sibling pair that does not match.
    NameImage,
    /// Sub-heading, then optionally one adjacent text block (subtitle),
    /// then optionally one adjacent image. One optional intro text block
    /// directly after the section heading is skipped (left in place).
    /// The run ends at the first non-sub-heading where a card would start.
    NameSubtitleImage,
}

impl CardPattern {
    /// Grid container class — also the idempotence marker.
    pub fn grid_class(self) -> &'static str {
        match self {
            CardPattern::NameImage => "portrait-grid",
            CardPattern::NameSubtitleImage => "profile-grid",
        }
    }

    pub fn card_class(self) -> &'static str {
        match self {
            CardPattern::NameImage => "portrait-card",
            CardPattern::NameSubtitleImage => "profile-card",
        }
    }
}

/// One configured regrouping: on `page`, the run following the section
/// heading whose text equals `section` becomes a grid of `pattern` cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridRule {
    /// Slug of the post/page this rule applies to.
    pub page: String,
    /// Exact (trimmed) text of the section heading to anchor on.
    pub section: String,
    pub pattern: CardPattern,
}

// ============================================================================
// The pass
// ============================================================================

/// Apply one regrouping rule to a rendered page tree.
///
/// Returns the number of cards created; 0 means the tree was left
/// untouched (marker grid already present, heading not found, or no
/// matching run). Safe to invoke repeatedly on the same root.
pub fn regroup(root: &mut Element, rule: &GridRule) -> usize {
    let grid_class = rule.pattern.grid_class();
    if root.subtree_has_class(grid_class) {
        return 0;
    }

    let Some(container) = find_page_container(root) else {
        return 0;
    };
    let Some(heading_idx) = container
        .children
        .iter()
        .position(|el| is_section_heading(el) && el.text_content().trim() == rule.section)
    else {
        return 0;
    };

    let run = &container.children[heading_idx + 1..];
    let (intro_skip, card_sizes) = match rule.pattern {
        CardPattern::NameImage => (0, scan_name_image(run)),
        CardPattern::NameSubtitleImage => scan_name_subtitle_image(run),
    };
    if card_sizes.is_empty() {
        return 0;
    }

    // Detach the matched run, leaving any skipped intro in place, then
    // re-parent it into cards inside one grid right after the heading.
    let start = heading_idx + 1 + intro_skip;
    let consumed: usize = card_sizes.iter().sum();
    let removed: Vec<Element> = container.children.drain(start..start + consumed).collect();

    let mut grid = Element::new("div").class(grid_class);
    let mut rest = removed.into_iter();
    for size in &card_sizes {
        let mut card = Element::new("div").class(rule.pattern.card_class());
        card.children.extend(rest.by_ref().take(*size));
        grid.children.push(card);
    }

    let cards = grid.children.len();
    container.children.insert(heading_idx + 1, grid);
    cards
}

/// Apply every rule configured for `slug`. Returns total cards created.
pub fn regroup_page(root: &mut Element, rules: &[GridRule], slug: &str) -> usize {
    rules
        .iter()
        .filter(|rule| rule.page == slug)
        .map(|rule| regroup(root, rule))
        .sum()
}

/// First element in the tree (root included) carrying [`PAGE_CLASS`].
fn find_page_container(root: &mut Element) -> Option<&mut Element> {
    if root.has_class(PAGE_CLASS) {
        return Some(root);
    }
    for child in &mut root.children {
        if let Some(found) = find_page_container(child) {
            return Some(found);
        }
    }
    None
}

/// Card sizes for a strict (sub-heading, image) pair run.
fn scan_name_image(siblings: &[Element]) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut i = 0;
    while i + 1 < siblings.len()
        && is_card_heading(&siblings[i])
        && is_image_block(&siblings[i + 1])
    {
        sizes.push(2);
        i += 2;
    }
    sizes
}

/// Intro-skip count and card sizes for a sub-heading [text] [image] run.
fn scan_name_subtitle_image(siblings: &[Element]) -> (usize, Vec<usize>) {
    let mut i = 0;
    let intro_skip = if siblings.first().is_some_and(is_text_block) {
        i = 1;
        1
    } else {
        0
    };

    let mut sizes = Vec::new();
    while i < siblings.len() && is_card_heading(&siblings[i]) {
        let mut size = 1;
        i += 1;
        if i < siblings.len() && is_text_block(&siblings[i]) {
            size += 1;
            i += 1;
        }
        if i < siblings.len() && is_image_block(&siblings[i]) {
            size += 1;
            i += 1;
        }
        sizes.push(size);
    }
    (intro_skip, sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{card_heading, image_block, page_tree, section_heading, text_block};

    fn portrait_rule() -> GridRule {
        GridRule {
            page: "about".into(),
            section: "Residents & Alumni".into(),
            pattern: CardPattern::NameImage,
        }
    }

    fn profile_rule() -> GridRule {
        GridRule {
            page: "home".into(),
            section: "Guest Speakers".into(),
            pattern: CardPattern::NameSubtitleImage,
        }
    }

    fn container(root: &Element) -> &Element {
        &root.children[0]
    }

    // =========================================================================
    // Variant A — name → image pairs
    // =========================================================================

    #[test]
    fn pairs_become_one_grid_with_cards() {
        let mut root = page_tree(vec![
            section_heading("Residents & Alumni"),
            card_heading("Ada"),
            image_block(),
            card_heading("Grace"),
            image_block(),
            card_heading("Edsger"),
            image_block(),
            text_block("unrelated trailing text"),
        ]);

        assert_eq!(regroup(&mut root, &portrait_rule()), 3);

        let children = &container(&root).children;
        assert_eq!(children.len(), 3); // heading, grid, trailing text
        let grid = &children[1];
        assert!(grid.has_class("portrait-grid"));
        assert_eq!(grid.children.len(), 3);
        for card in &grid.children {
            assert!(card.has_class("portrait-card"));
            assert_eq!(card.children.len(), 2);
            assert!(is_card_heading(&card.children[0]));
            assert!(is_image_block(&card.children[1]));
        }
        // The non-matching node is untouched, in place after the grid
        assert!(is_text_block(&children[2]));
    }

    #[test]
    fn run_stops_at_first_non_matching_pair() {
        let mut root = page_tree(vec![
            section_heading("Residents & Alumni"),
            card_heading("Ada"),
            image_block(),
            card_heading("Grace"),
            text_block("not an image — breaks the pair"),
            image_block(),
        ]);

        assert_eq!(regroup(&mut root, &portrait_rule()), 1);

        let children = &container(&root).children;
        let grid = &children[1];
        assert_eq!(grid.children.len(), 1);
        // Grace's heading and the stray nodes stay siblings
        assert!(is_card_heading(&children[2]));
        assert!(is_text_block(&children[3]));
    }

    #[test]
    fn no_matching_run_inserts_no_grid() {
        let mut root = page_tree(vec![
            section_heading("Residents & Alumni"),
            text_block("no cards here"),
        ]);

        assert_eq!(regroup(&mut root, &portrait_rule()), 0);
        assert!(!root.subtree_has_class("portrait-grid"));
        assert_eq!(container(&root).children.len(), 2);
    }

    #[test]
    fn missing_heading_is_a_no_op() {
        let mut root = page_tree(vec![card_heading("Ada"), image_block()]);
        let before = root.clone();
        assert_eq!(regroup(&mut root, &portrait_rule()), 0);
        assert_eq!(root, before);
    }

    #[test]
    fn heading_matched_by_trimmed_text() {
        let mut root = page_tree(vec![
            section_heading("  Residents & Alumni  "),
            card_heading("Ada"),
            image_block(),
        ]);
        assert_eq!(regroup(&mut root, &portrait_rule()), 1);
    }

    // =========================================================================
    // Variant B — name → optional subtitle → optional image
    // =========================================================================

    #[test]
    fn intro_text_is_skipped_and_optional_parts_assemble() {
        let mut root = page_tree(vec![
            section_heading("Guest Speakers"),
            text_block("Speakers this season:"),
            card_heading("Barbara"),
            text_block("Systems"),
            image_block(),
            card_heading("Donald"),
        ]);

        assert_eq!(regroup(&mut root, &profile_rule()), 2);

        let children = &container(&root).children;
        // heading, grid, intro — the grid sits directly after the heading,
        // the skipped intro text stays in place behind it
        assert_eq!(children.len(), 3);
        assert!(is_section_heading(&children[0]));
        assert!(children[1].has_class("profile-grid"));
        assert!(is_text_block(&children[2]));

        let grid = &children[1];
        assert_eq!(grid.children.len(), 2);
        // Barbara: sub-heading + subtitle + image
        assert_eq!(grid.children[0].children.len(), 3);
        // Donald: bare sub-heading
        assert_eq!(grid.children[1].children.len(), 1);
        assert!(is_card_heading(&grid.children[1].children[0]));
    }

    #[test]
    fn adjacent_text_after_last_heading_becomes_its_subtitle() {
        let mut root = page_tree(vec![
            section_heading("Guest Speakers"),
            card_heading("Donald"),
            text_block("All questions answered"),
        ]);

        assert_eq!(regroup(&mut root, &profile_rule()), 1);
        let grid = &container(&root).children[1];
        assert_eq!(grid.children[0].children.len(), 2);
    }

    #[test]
    fn profile_run_without_intro_starts_immediately() {
        let mut root = page_tree(vec![
            section_heading("Guest Speakers"),
            card_heading("Barbara"),
            image_block(),
        ]);
        assert_eq!(regroup(&mut root, &profile_rule()), 1);
        let grid = &container(&root).children[1];
        assert_eq!(grid.children[0].children.len(), 2);
    }

    #[test]
    fn profile_run_stops_at_non_subheading() {
        let mut root = page_tree(vec![
            section_heading("Guest Speakers"),
            card_heading("Barbara"),
            text_block("Systems"),
            image_block(),
            image_block(), // second image cannot start a card
            card_heading("Unreached"),
        ]);
        assert_eq!(regroup(&mut root, &profile_rule()), 1);
        let children = &container(&root).children;
        assert!(is_image_block(&children[2]));
        assert!(is_card_heading(&children[3]));
    }

    // =========================================================================
    // Idempotence
    // =========================================================================

    #[test]
    fn rerun_on_grouped_tree_is_a_no_op() {
        let mut root = page_tree(vec![
            section_heading("Residents & Alumni"),
            card_heading("Ada"),
            image_block(),
        ]);
        assert_eq!(regroup(&mut root, &portrait_rule()), 1);
        let after_first = root.clone();

        assert_eq!(regroup(&mut root, &portrait_rule()), 0);
        assert_eq!(root, after_first);
    }

    #[test]
    fn marker_anywhere_under_root_blocks_the_pass() {
        // The guard checks the page root, not just the container the
        // grid would land in.
        let mut root = page_tree(vec![
            section_heading("Residents & Alumni"),
            card_heading("Ada"),
            image_block(),
        ]);
        root.children
            .push(Element::new("aside").child(Element::new("div").class("portrait-grid")));

        assert_eq!(regroup(&mut root, &portrait_rule()), 0);
    }

    #[test]
    fn patterns_guard_independently() {
        // A portrait grid on the page must not block a profile rule.
        let mut root = page_tree(vec![
            section_heading("Residents & Alumni"),
            card_heading("Ada"),
            image_block(),
            section_heading("Guest Speakers"),
            card_heading("Barbara"),
            image_block(),
        ]);
        assert_eq!(regroup(&mut root, &portrait_rule()), 1);
        let mut profile = profile_rule();
        profile.page = "about".into();
        assert_eq!(regroup(&mut root, &profile), 1);
    }

    // =========================================================================
    // regroup_page
    // =========================================================================

    #[test]
    fn rules_apply_only_to_their_page() {
        let mut root = page_tree(vec![
            section_heading("Residents & Alumni"),
            card_heading("Ada"),
            image_block(),
        ]);
        let rules = vec![portrait_rule(), profile_rule()];

        assert_eq!(regroup_page(&mut root, &rules, "home"), 0);
        assert_eq!(regroup_page(&mut root, &rules, "about"), 1);
    }
}
