//! Provider record model and normalization.
//!
//! The workspace provider answers a page fetch with a *record map*: five
//! tables of `{ role, value }` records keyed by id, plus the query results
//! for any collection the page contains. Depending on which API surface
//! produced the response, records arrive in one of two shapes:
//!
//! ```text
//! { "role": "reader", "value": { "id": "...", "type": "page", ... } }
//! { "value": { "role": "reader", "value": { "id": "...", ... } } }   # wrapped
//! ```
//!
//! The second form nests a full record inside `value`, and may carry the
//! role at either level. [`normalize_map`] repairs every table into the
//! first form in a single pass, so downstream consumers (property
//! extraction, the collection walker) work against one uniform shape
//! instead of null-checking both.
//!
//! ## Invariants after normalization
//!
//! - `value` is never itself a wrapper record.
//! - `role` is present if it existed at either nesting level.
//! - Records without a nested wrapper pass through untouched, including
//!   malformed ones — normalization is total and never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A generic provider entity: access role plus an opaque value payload.
///
/// Block, collection, view, user, and space values all have different
/// shapes, so the payload stays a raw [`Value`]; typed decoding happens
/// at the point of use ([`crate::properties`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Access role granted on this record (`"reader"`, `"editor"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// The entity payload. After normalization, never a wrapper record.
    #[serde(default)]
    pub value: Value,
}

/// Record table: id → record. Order is irrelevant (lookup by id only);
/// BTreeMap keeps serialized snapshots deterministic.
pub type RecordTable = BTreeMap<String, Record>;

/// Query results for one grouped view section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupResult {
    /// Page ids in this group, in view order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_ids: Vec<String>,
}

/// Query results for one named view: either a flat ordered id list
/// (table/list views) or a grouped structure of such lists (board views).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewResult {
    /// Flat page id list, in view order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_ids: Vec<String>,
    /// Grouped page id lists, in group order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupResult>,
}

/// Collection query results: collection id → view id → result set.
pub type CollectionQuery = BTreeMap<String, BTreeMap<String, ViewResult>>;

/// The full record graph for one page fetch.
///
/// This is both the raw provider response and — after [`normalize_map`] —
/// the `BlockMap` handed opaquely to the external renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordMap {
    pub block: RecordTable,
    pub collection: RecordTable,
    pub collection_view: RecordTable,
    pub user: RecordTable,
    pub space: RecordTable,
    /// Query results for collections contained in the page. Not a record
    /// table; never wrapped, so normalization passes it through.
    #[serde(skip_serializing_if = "CollectionQuery::is_empty")]
    pub collection_query: CollectionQuery,
}

/// Repair a single record.
///
/// If the payload nests a full record (`value.value` present), unwrap it
/// and reconcile the role: the outer role wins, the inner role is the
/// fallback. Anything else passes through unchanged.
pub fn normalize_record(record: &Record) -> Record {
    let Some(nested) = record.value.get("value") else {
        return record.clone();
    };

    let role = record.role.clone().or_else(|| {
        record
            .value
            .get("role")
            .and_then(Value::as_str)
            .map(String::from)
    });

    Record {
        role,
        value: nested.clone(),
    }
}

fn normalize_table(table: &RecordTable) -> RecordTable {
    table
        .iter()
        .map(|(id, record)| (id.clone(), normalize_record(record)))
        .collect()
}

/// Repair all five record tables of a raw provider response.
///
/// Pure: the input map is not mutated. Idempotent: normalizing an
/// already-normalized map yields an identical result.
pub fn normalize_map(raw: &RecordMap) -> RecordMap {
    RecordMap {
        block: normalize_table(&raw.block),
        collection: normalize_table(&raw.collection),
        collection_view: normalize_table(&raw.collection_view),
        user: normalize_table(&raw.user),
        space: normalize_table(&raw.space),
        collection_query: raw.collection_query.clone(),
    }
}

/// Canonicalize a page id into the provider's hyphenated form.
///
/// Ids are 32 hex digits; the provider accepts them bare or hyphenated
/// (8-4-4-4-12) and users paste either. Returns `None` when the input
/// is not a 32-hex-digit id under any spelling.
///
/// ```text
/// "0a1B2c3d4e5f60718293a4b5c6d7e8f9"
///   → "0a1b2c3d-4e5f-6071-8293-a4b5c6d7e8f9"
/// ```
pub fn canonical_id(raw: &str) -> Option<String> {
    let hex: String = raw
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    Some(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}
