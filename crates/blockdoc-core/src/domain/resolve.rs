//! Cross-reference resolution
//!
//! Resolves `kind:target` references against the registry. Database tables
//! are addressed by a dotted `database.table` path; every other kind is
//! addressed by its bare signature. When several objects match, the first
//! one registered wins.

use super::registry::{ObjectKind, RegisteredObject, Registry};

/// Where a reference points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub docname: &'a str,
    pub anchor: &'a str,
}

/// Read-only resolver over a finished registry
pub struct Resolver<'a> {
    registry: &'a Registry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Resolve a reference, or `None` when nothing matches
    pub fn resolve(&self, kind: ObjectKind, target: &str) -> Option<Resolved<'a>> {
        self.find(kind, target).map(|object| Resolved {
            docname: &object.docname,
            anchor: &object.anchor,
        })
    }

    /// The object a reference points to
    pub fn find(&self, kind: ObjectKind, target: &str) -> Option<&'a RegisteredObject> {
        let target = target.trim();
        if target.is_empty() {
            return None;
        }

        let registry: &'a Registry = self.registry;
        let mut candidates = registry.of_kind(kind);
        match kind {
            ObjectKind::DbTable => {
                let (database, table) = split_table_target(target);
                candidates.find(|o| {
                    o.segment_from_end(1) == Some(database) && o.segment_from_end(0) == Some(table)
                })
            }
            _ => candidates.find(|o| o.display_name == target),
        }
    }
}

/// Split `database.table` at the last dot; a bare name has an empty database
pub fn split_table_target(target: &str) -> (&str, &str) {
    target.rsplit_once('.').unwrap_or(("", target))
}

/// Link from one page to an anchor on another page.
///
/// Pages live at `<docname>.md`; links are relative to the referring page.
pub fn relative_link(from_docname: &str, to_docname: &str, anchor: &str) -> String {
    if from_docname == to_docname {
        return format!("#{}", anchor);
    }

    let depth = from_docname.matches('/').count();
    let mut link = "../".repeat(depth);
    link.push_str(to_docname);
    link.push_str(".md#");
    link.push_str(anchor);
    link
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::RegisteredObject;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        for (db, table, doc) in [
            ("mydb", "players", "src/db"),
            ("gw2static", "specializations", "src/static"),
            ("otherdb", "items", "src/other"),
            ("mydb", "items", "src/db"),
        ] {
            registry
                .add(RegisteredObject::new(
                    format!("overlay.dbtable.{}.{}", db, table),
                    table,
                    ObjectKind::DbTable,
                    doc,
                    format!("overlay-dbtable-{}-{}", db, table),
                ))
                .unwrap();
        }
        for (module, doc) in [("net", "src/net"), ("none", "src/misc")] {
            registry
                .add(RegisteredObject::new(
                    format!("overlay.modsetting.{}.timeout", module),
                    "timeout",
                    ObjectKind::ModSetting,
                    doc,
                    format!("overlay-modsetting-{}-timeout", module),
                ))
                .unwrap();
        }
        registry
            .add(RegisteredObject::new(
                "overlay.event.startup",
                "startup",
                ObjectKind::Event,
                "src/lua-manager",
                "overlay-event-startup",
            ))
            .unwrap();
        registry
    }

    #[test]
    fn test_resolve_db_table_by_path() {
        let registry = registry();
        let resolver = Resolver::new(&registry);

        let found = resolver.resolve(ObjectKind::DbTable, "mydb.players").unwrap();
        assert_eq!(found.docname, "src/db");
        assert_eq!(found.anchor, "overlay-dbtable-mydb-players");

        assert_eq!(resolver.resolve(ObjectKind::DbTable, "otherdb.players"), None);
    }

    #[test]
    fn test_same_table_name_in_different_databases() {
        let registry = registry();
        let resolver = Resolver::new(&registry);

        let mine = resolver.resolve(ObjectKind::DbTable, "mydb.items").unwrap();
        let other = resolver.resolve(ObjectKind::DbTable, "otherdb.items").unwrap();
        assert_eq!(mine.anchor, "overlay-dbtable-mydb-items");
        assert_eq!(other.anchor, "overlay-dbtable-otherdb-items");
    }

    #[test]
    fn test_bare_table_name_does_not_resolve() {
        let registry = registry();
        let resolver = Resolver::new(&registry);
        assert_eq!(resolver.resolve(ObjectKind::DbTable, "players"), None);
    }

    #[test]
    fn test_first_registered_wins() {
        let registry = registry();
        let resolver = Resolver::new(&registry);

        let found = resolver.resolve(ObjectKind::ModSetting, "timeout").unwrap();
        assert_eq!(found.docname, "src/net");
    }

    #[test]
    fn test_kind_must_match() {
        let registry = registry();
        let resolver = Resolver::new(&registry);

        assert!(resolver.resolve(ObjectKind::Event, "startup").is_some());
        assert_eq!(resolver.resolve(ObjectKind::ModSetting, "startup"), None);
        assert_eq!(resolver.resolve(ObjectKind::Event, "timeout"), None);
    }

    #[test]
    fn test_empty_target_unresolved() {
        let registry = registry();
        let resolver = Resolver::new(&registry);
        assert_eq!(resolver.resolve(ObjectKind::Event, ""), None);
        assert_eq!(resolver.resolve(ObjectKind::DbTable, "  "), None);
    }

    #[test]
    fn test_split_table_target() {
        assert_eq!(split_table_target("mydb.players"), ("mydb", "players"));
        assert_eq!(split_table_target("a.b.c"), ("a.b", "c"));
        assert_eq!(split_table_target("players"), ("", "players"));
    }

    #[test]
    fn test_relative_link() {
        assert_eq!(relative_link("src/db", "src/db", "x"), "#x");
        assert_eq!(relative_link("index", "src/db", "x"), "src/db.md#x");
        assert_eq!(relative_link("src/ui/menu", "index", "x"), "../../index.md#x");
    }
}
