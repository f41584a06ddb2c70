//! Schema-driven page property extraction.
//!
//! A collection owns a *schema*: property id → `{ name, type }`. Each page
//! record stores its property values raw, keyed by property id, in the
//! provider's rich-text segment encoding:
//!
//! ```text
//! "properties": {
//!   "title": [["Hello "], ["world", [["b"]]]],          # styled text
//!   "a`af":  [["Post"]],                                # select
//!   "j$f1":  [["Rust,systems"]],                        # multi_select
//!   "x;p2":  [["‣", [["d", { "type": "date",
//!                            "start_date": "2021-03-16",
//!                            "start_time": "12:00",
//!                            "time_zone": "Asia/Tokyo" }]]]]
//! }
//! ```
//!
//! [`extract`] decodes every schema entry into a typed [`PropertyValue`]
//! keyed by the property's human name, then attaches the derived fields
//! (`id`, `date`, `full_width`). Decoding is per-field best-effort: an
//! unknown property type or a malformed date degrades that one field to
//! [`PropertyValue::Null`], never the whole page. The only `None` return
//! is a page id with no record in the block table — callers skip that
//! page.
//!
//! ## Date resolution
//!
//! The page's `date` is the first date-typed schema property that decoded
//! successfully, converted to epoch milliseconds in its own timezone (UTC
//! when unspecified). Pages without a date property fall back to the
//! record's creation timestamp, so every page sorts somewhere sensible.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::record::RecordTable;

/// Declared type of a collection property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Title,
    Text,
    Date,
    Select,
    MultiSelect,
    Status,
    Checkbox,
    Person,
    /// Any type this pipeline does not decode. Extracts to `Null`.
    #[serde(other)]
    Unknown,
}

/// One schema entry: the property's display name and declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
}

/// Collection schema: property id → descriptor. Read-only here.
pub type Schema = BTreeMap<String, PropertyDescriptor>;

/// A decoded property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Plain text: titles, text properties, single select/status options.
    Text(String),
    /// Epoch milliseconds.
    Date(i64),
    /// Ordered option names from a multi-select property.
    Tags(Vec<String>),
    /// Checkbox state.
    Flag(bool),
    /// Absent, unsupported, or undecodable. Serializes as JSON null.
    Null,
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

/// Typed properties of one page, keyed by human property name, plus the
/// derived fields. Constructed once by [`extract`]; immutable afterward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageProperties {
    /// The page's own record id.
    pub id: String,
    /// Publication timestamp in epoch milliseconds: the first date-typed
    /// property when present, else the record's creation time.
    pub date: i64,
    /// Whether the page opts into full-width layout.
    pub full_width: bool,
    /// Decoded named properties.
    pub props: BTreeMap<String, PropertyValue>,
}

impl PageProperties {
    /// Text value of a named property, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.props.get(name) {
            Some(PropertyValue::Text(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Tag list of a named property; empty when absent or not a tag list.
    pub fn tags(&self, name: &str) -> &[String] {
        match self.props.get(name) {
            Some(PropertyValue::Tags(tags)) => tags,
            _ => &[],
        }
    }

    /// Checkbox state of a named property; false when absent.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.props.get(name), Some(PropertyValue::Flag(true)))
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn slug(&self) -> Option<&str> {
        self.text("slug")
    }
}

/// Extract typed properties for the page at `page_id`.
///
/// Returns `None` only when the block table has no record for the page;
/// every decode failure degrades to `Null` for that field alone.
pub fn extract(page_id: &str, block: &RecordTable, schema: &Schema) -> Option<PageProperties> {
    let page = block.get(page_id)?;
    let value = &page.value;
    let raw_props = value.get("properties").and_then(Value::as_object);

    let mut props = BTreeMap::new();
    for (prop_id, descriptor) in schema {
        let decoded = match raw_props.and_then(|map| map.get(prop_id)) {
            Some(raw) => decode(descriptor.kind, raw),
            None => PropertyValue::Null,
        };
        props.insert(descriptor.name.clone(), decoded);
    }

    let date = schema
        .values()
        .filter(|d| d.kind == PropertyKind::Date)
        .find_map(|d| match props.get(&d.name) {
            Some(PropertyValue::Date(millis)) => Some(*millis),
            _ => None,
        })
        .unwrap_or_else(|| created_time(value));

    let full_width = value
        .get("format")
        .and_then(|format| format.get("page_full_width"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(PageProperties {
        id: page_id.to_string(),
        date,
        full_width,
        props,
    })
}

fn created_time(value: &Value) -> i64 {
    value
        .get("created_time")
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

/// Decode one raw property value according to its declared type.
fn decode(kind: PropertyKind, raw: &Value) -> PropertyValue {
    match kind {
        PropertyKind::Title | PropertyKind::Text => PropertyValue::Text(text_content(raw)),
        PropertyKind::Select | PropertyKind::Status => {
            let name = text_content(raw);
            if name.is_empty() {
                PropertyValue::Null
            } else {
                PropertyValue::Text(name)
            }
        }
        PropertyKind::MultiSelect => {
            let tags: Vec<String> = text_content(raw)
                .split(',')
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect();
            if tags.is_empty() {
                PropertyValue::Null
            } else {
                PropertyValue::Tags(tags)
            }
        }
        PropertyKind::Checkbox => PropertyValue::Flag(text_content(raw) == "Yes"),
        PropertyKind::Date => match decode_date(raw) {
            Some(millis) => PropertyValue::Date(millis),
            None => PropertyValue::Null,
        },
        PropertyKind::Person | PropertyKind::Unknown => PropertyValue::Null,
    }
}

/// Concatenate the plain-text parts of a rich-text segment list.
///
/// Each segment is `[text, decorations?]`; decorations are ignored.
fn text_content(raw: &Value) -> String {
    let Some(segments) = raw.as_array() else {
        return String::new();
    };
    segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect()
}

/// Decode a date property to epoch milliseconds.
///
/// The date payload rides in a `d` decoration:
/// `[["‣", [["d", { start_date, start_time?, time_zone? }]]]]`.
fn decode_date(raw: &Value) -> Option<i64> {
    let spec = find_date_spec(raw)?;

    let start_date = spec.get("start_date").and_then(Value::as_str)?;
    let date = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").ok()?;
    let time = spec
        .get("start_time")
        .and_then(Value::as_str)
        .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
        .unwrap_or(NaiveTime::MIN);
    let naive = date.and_time(time);

    match spec.get("time_zone").and_then(Value::as_str) {
        Some(zone) => {
            let tz: Tz = zone.parse().ok()?;
            Some(
                tz.from_local_datetime(&naive)
                    .earliest()?
                    .timestamp_millis(),
            )
        }
        None => Some(naive.and_utc().timestamp_millis()),
    }
}

/// Find the first `d`-tagged decoration object in a segment list.
fn find_date_spec(raw: &Value) -> Option<&serde_json::Map<String, Value>> {
    let segments = raw.as_array()?;
    for segment in segments {
        let Some(decorations) = segment.get(1).and_then(Value::as_array) else {
            continue;
        };
        for decoration in decorations {
            if decoration.get(0).and_then(Value::as_str) == Some("d")
                && let Some(spec) = decoration.get(1).and_then(Value::as_object)
            {
                return Some(spec);
            }
        }
    }
    None
}
