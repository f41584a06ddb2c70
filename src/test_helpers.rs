//! Shared test utilities for the notefold test suite.
//!
//! Builders for the three fixture families the tests need:
//!
//! - raw provider records (`page_record`, `schema_entry`)
//! - whole blog record maps (`blog_record_map` + `post_page` specs),
//!   shaped like a normalized provider response for a database page
//! - rendered element trees (`page_tree`, `section_heading`, ...) in the
//!   renderer's class vocabulary, for the regrouping pass

use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::properties::{PropertyDescriptor, PropertyKind};
use crate::record::{Record, RecordMap, ViewResult};
use crate::regroup::{Element, PAGE_CLASS};

// =========================================================================
// Record fixtures
// =========================================================================

/// A page block record with the given raw `properties` table.
pub fn page_record(properties: Value) -> Record {
    Record {
        role: Some("reader".into()),
        value: json!({
            "id": "p1",
            "type": "page",
            "properties": properties,
            "created_time": 0
        }),
    }
}

pub fn schema_entry(name: &str, kind: PropertyKind) -> PropertyDescriptor {
    PropertyDescriptor {
        name: name.to_string(),
        kind,
    }
}

/// Spec for one page in a [`blog_record_map`] fixture.
pub struct PageSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub slug: &'static str,
    pub kind: &'static str,
    pub status: &'static str,
    pub created: i64,
}

pub fn post_page(
    id: &'static str,
    title: &'static str,
    slug: &'static str,
    kind: &'static str,
    status: &'static str,
    created: i64,
) -> PageSpec {
    PageSpec {
        id,
        title,
        slug,
        kind,
        status,
        created,
    }
}

/// A complete record map for a database page: one collection (with the
/// blog schema), one table view listing the pages in spec order, and a
/// block per page. Pages carry no date property, so their `created`
/// timestamp is the effective date.
pub fn blog_record_map(pages: &[PageSpec]) -> RecordMap {
    let mut map = RecordMap::default();

    map.collection.insert(
        "c1".into(),
        Record {
            role: Some("reader".into()),
            value: json!({
                "id": "c1",
                "schema": {
                    "title": { "name": "title", "type": "title" },
                    "s1": { "name": "slug", "type": "text" },
                    "s2": { "name": "type", "type": "select" },
                    "s3": { "name": "status", "type": "select" },
                    "s4": { "name": "date", "type": "date" },
                    "s5": { "name": "tags", "type": "multi_select" }
                }
            }),
        },
    );

    let mut view = ViewResult::default();
    for spec in pages {
        view.block_ids.push(spec.id.to_string());
        map.block.insert(
            spec.id.to_string(),
            Record {
                role: Some("reader".into()),
                value: json!({
                    "id": spec.id,
                    "type": "page",
                    "created_time": spec.created,
                    "properties": {
                        "title": [[spec.title]],
                        "s1": [[spec.slug]],
                        "s2": [[spec.kind]],
                        "s3": [[spec.status]]
                    }
                }),
            },
        );
    }

    let mut views = BTreeMap::new();
    views.insert("v1".to_string(), view);
    map.collection_query.insert("c1".into(), views);
    map
}

/// Extracted properties for filter/sort/output tests, bypassing the
/// record decode path.
pub fn post_props(
    id: &str,
    kind: &str,
    status: &str,
    date: i64,
) -> crate::properties::PageProperties {
    use crate::properties::{PageProperties, PropertyValue};

    let mut props = BTreeMap::new();
    props.insert("title".into(), PropertyValue::Text(format!("Title {id}")));
    props.insert("slug".into(), PropertyValue::Text(format!("slug-{id}")));
    props.insert("type".into(), PropertyValue::Text(kind.to_string()));
    props.insert("status".into(), PropertyValue::Text(status.to_string()));
    PageProperties {
        id: id.to_string(),
        date,
        full_width: false,
        props,
    }
}

// =========================================================================
// Rendered element fixtures
// =========================================================================

/// A rendered page: wrapper root containing the page container with the
/// given block run as its children.
pub fn page_tree(children: Vec<Element>) -> Element {
    let mut container = Element::new("div").class(PAGE_CLASS);
    container.children = children;
    Element::new("main").child(container)
}

pub fn section_heading(text: &str) -> Element {
    Element::new("h3").class("doc-heading").text(text)
}

pub fn card_heading(text: &str) -> Element {
    Element::new("h4").class("doc-subheading").text(text)
}

pub fn text_block(text: &str) -> Element {
    Element::new("p").class("doc-text").text(text)
}

pub fn image_block() -> Element {
    Element::new("figure")
        .class("doc-image")
        .child(Element::new("img"))
}
