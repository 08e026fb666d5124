//! Key-performance attribute bag: specification parsing, the persisted
//! JSON encoding, and the two-tier list rendering.
//!
//! The bag is schema-less: its valid attribute names come from the
//! `specification` text of the device's device type, not from any table
//! schema. Values are always strings.

use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Name -> value map for one device. BTreeMap keeps display and encoding
/// order deterministic.
pub type Bag = BTreeMap<String, String>;

/// Entries shown in the collapsed listing cell before the rest is folded
/// behind a "(+N more)" marker.
const COLLAPSED_ENTRIES: usize = 3;

/// Parse a device type's specification text into attribute names.
/// Comma-separated, trimmed, empty entries discarded. The resulting order
/// drives form-field order.
pub fn parse_specification(specification: &str) -> Vec<String> {
    specification
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode a persisted key-performance value. Absent, empty and malformed
/// input all decode to the empty bag: the column predates the feature on
/// old rows and tolerating junk beats refusing to render the table.
pub fn decode(persisted: Option<&str>) -> Bag {
    let Some(text) = persisted else {
        return Bag::new();
    };
    match serde_json::from_str::<Json>(text) {
        Ok(Json::Object(map)) => map
            .into_iter()
            .filter_map(|(k, v)| match v {
                Json::String(s) => Some((k, s)),
                Json::Null => None,
                other => Some((k, other.to_string())),
            })
            .collect(),
        _ => Bag::new(),
    }
}

/// Encode a bag for persistence. Only non-empty values are kept; a bag
/// with nothing to keep encodes as None (stored as SQL NULL), never "{}".
pub fn encode(bag: &Bag) -> Option<String> {
    let kept: serde_json::Map<String, Json> = bag
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.clone(), Json::String(v.clone())))
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(Json::Object(kept).to_string())
    }
}

/// Collapsed and expanded renderings of a bag for the listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KpDisplay {
    pub collapsed: String,
    pub expanded: String,
    /// Entries hidden in the collapsed form
    pub hidden: usize,
}

impl KpDisplay {
    pub fn has_more(&self) -> bool {
        self.hidden > 0
    }
}

/// Render a bag as `name: value` lines. With more than three entries the
/// collapsed form shows the first three plus a marker for the rest.
pub fn render_for_display(bag: &Bag) -> KpDisplay {
    let lines: Vec<String> = bag
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect();

    if lines.len() <= COLLAPSED_ENTRIES {
        let text = lines.join("\n");
        KpDisplay {
            collapsed: text.clone(),
            expanded: text,
            hidden: 0,
        }
    } else {
        let hidden = lines.len() - COLLAPSED_ENTRIES;
        let mut collapsed = lines[..COLLAPSED_ENTRIES].join("\n");
        collapsed.push_str(&format!("\n(+{} more)", hidden));
        KpDisplay {
            collapsed,
            expanded: lines.join("\n"),
            hidden,
        }
    }
}
