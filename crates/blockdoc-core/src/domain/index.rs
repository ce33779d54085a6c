//! Alphabetical object indices

use std::collections::BTreeMap;

use serde::Serialize;

use super::registry::{ObjectKind, Registry};

/// One line of an index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub display_name: String,
    pub docname: String,
    pub anchor: String,
    /// Extra qualifier shown next to the name (the database for tables)
    pub extra: String,
    pub kind: ObjectKind,
}

/// Buckets keyed by lowercase first letter, in ascending key order
pub type IndexContent = Vec<(String, Vec<IndexEntry>)>;

/// An index over one object kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectIndex {
    /// Registration name, also the page name
    pub name: &'static str,
    /// Page title
    pub localname: &'static str,
    /// Short label for navigation
    pub shortname: &'static str,
    pub kind: ObjectKind,
}

impl ObjectIndex {
    pub const EVENTS: ObjectIndex = ObjectIndex {
        name: "eventindex",
        localname: "Events Index",
        shortname: "events",
        kind: ObjectKind::Event,
    };

    pub const DB_TABLES: ObjectIndex = ObjectIndex {
        name: "dbtableindex",
        localname: "Database Table Index",
        shortname: "db tables",
        kind: ObjectKind::DbTable,
    };

    pub const MODULE_SETTINGS: ObjectIndex = ObjectIndex {
        name: "modsettingindex",
        localname: "Module Settings Index",
        shortname: "module settings",
        kind: ObjectKind::ModSetting,
    };

    /// Build the index content.
    ///
    /// Objects are sorted by qualified name, then grouped by the lowercase
    /// first character of their display name. The flag is always `true`: the
    /// index is generated even when empty.
    pub fn generate(&self, registry: &Registry) -> (IndexContent, bool) {
        let mut objects: Vec<_> = registry.of_kind(self.kind).collect();
        objects.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

        let mut content: BTreeMap<String, Vec<IndexEntry>> = BTreeMap::new();
        for object in objects {
            let Some(first) = object.display_name.chars().next() else {
                continue;
            };
            let extra = match self.kind {
                ObjectKind::DbTable => object.segment_from_end(1).unwrap_or_default().to_string(),
                _ => String::new(),
            };
            content
                .entry(first.to_lowercase().collect())
                .or_default()
                .push(IndexEntry {
                    display_name: object.display_name.clone(),
                    docname: object.docname.clone(),
                    anchor: object.anchor.clone(),
                    extra,
                    kind: object.kind,
                });
        }

        (content.into_iter().collect(), true)
    }
}
