//! Integration tests for full project builds over a mixed-language tree

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use blockdoc_core::domain::{ObjectIndex, Resolver};
use blockdoc_core::{Config, ObjectKind, Project};

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small overlay-like source tree
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();

    write(
        dir.path(),
        "index.rst",
        "\
Overlay Documentation
=====================

Start with :overlay:event:`startup`, then read about
:overlay:dbtable:`the players table <mydb.players>`.
",
    );

    write(
        dir.path(),
        "src/lua-manager.c",
        "\
#include \"lua-manager.h\"

/*** RST
Events
------

.. overlay:event:: startup

    Sent once, before the first :overlay:event:`update`.

.. overlay:event:: update

    Sent every frame.
*/
void lua_manager_init(void) {
}

/*** RST
.. overlay:event:: shutdown
*/
",
    );

    write(
        dir.path(),
        "src/db.c",
        "\
/*** RST
.. overlay:database:: mydb

.. overlay:dbtable:: players

    One row per character.

.. overlay:dbtable:: items
    :database: otherdb
*/\r
int db_open(void);\r
",
    );

    write(
        dir.path(),
        "modules/net.lua",
        "\
--[[ RST
.. overlay:module:: net

.. overlay:modsetting:: timeout

    Request timeout in seconds.

    .. settingsvalues::
        :default: 30

.. overlay:module:: None

.. overlay:modsetting:: retries
]]--
local M = {}
return M
",
    );

    write(
        dir.path(),
        "src/render.rs",
        "\
/*** RST
.. overlay:modsetting:: vsync
    :module: render
*/
pub fn draw() {}
",
    );

    write(dir.path(), "src/plain.c", "int nothing_documented;\n");

    dir
}

#[test]
fn test_registry_contents() {
    let dir = fixture();
    let project = Project::new(dir.path(), Config::default()).unwrap();
    let (registry, diagnostics) = project.collect().unwrap();

    assert!(diagnostics.is_empty(), "{:?}", diagnostics);

    let names: Vec<_> = registry.objects().map(|o| o.qualified_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "overlay.modsetting.net.timeout",
            "overlay.modsetting.none.retries",
            "overlay.dbtable.mydb.players",
            "overlay.dbtable.otherdb.items",
            "overlay.event.startup",
            "overlay.event.update",
            "overlay.event.shutdown",
            "overlay.modsetting.render.vsync",
        ]
    );

    let players = registry
        .get(ObjectKind::DbTable, "overlay.dbtable.mydb.players")
        .unwrap();
    assert_eq!(players.docname, "src/db");
    assert_eq!(players.anchor, "overlay-dbtable-mydb-players");
}

#[test]
fn test_resolution_across_documents() {
    let dir = fixture();
    let project = Project::new(dir.path(), Config::default()).unwrap();
    let (registry, _) = project.collect().unwrap();
    let resolver = Resolver::new(&registry);

    let found = resolver.resolve(ObjectKind::Event, "startup").unwrap();
    assert_eq!(found.docname, "src/lua-manager");
    assert_eq!(found.anchor, "overlay-event-startup");

    assert!(resolver.resolve(ObjectKind::DbTable, "otherdb.items").is_some());
    assert!(resolver.resolve(ObjectKind::DbTable, "mydb.items").is_none());
    assert!(resolver.resolve(ObjectKind::ModSetting, "retries").is_some());
    assert!(resolver.resolve(ObjectKind::Event, "players").is_none());
}

#[test]
fn test_indices() {
    let dir = fixture();
    let project = Project::new(dir.path(), Config::default()).unwrap();
    let (registry, _) = project.collect().unwrap();

    let (events, collapse) = ObjectIndex::EVENTS.generate(&registry);
    assert!(collapse);
    let keys: Vec<_> = events.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["s", "u"]);
    let s: Vec<_> = events[0].1.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(s, vec!["shutdown", "startup"]);

    let (tables, _) = ObjectIndex::DB_TABLES.generate(&registry);
    let extras: Vec<_> = tables
        .iter()
        .flat_map(|(_, entries)| entries)
        .map(|e| (e.display_name.as_str(), e.extra.as_str()))
        .collect();
    assert_eq!(extras, vec![("items", "otherdb"), ("players", "mydb")]);
}

#[test]
fn test_parallel_and_sequential_reads_agree() {
    let dir = fixture();

    let mut sequential = Config::default();
    sequential.build.parallel = false;
    let (a, _) = Project::new(dir.path(), sequential).unwrap().collect().unwrap();
    let (b, _) = Project::new(dir.path(), Config::default())
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn test_full_build_output() {
    let dir = fixture();
    let project = Project::new(dir.path(), Config::default()).unwrap();
    let output = project.build().unwrap();

    let index = &output.pages[Path::new("index.md")];
    assert!(index.contains(
        "Start with [startup](src/lua-manager.md#overlay-event-startup), then read about"
    ));
    assert!(index.contains("[the players table](src/db.md#overlay-dbtable-mydb-players)."));

    let manager = &output.pages[Path::new("src/lua-manager.md")];
    assert!(manager.contains("Sent once, before the first [update](#overlay-event-update)."));
    assert!(!manager.contains("lua_manager_init"));

    let net = &output.pages[Path::new("modules/net.md")];
    assert!(net.contains("**`timeout`** *Module Setting* in `net`"));
    assert!(net.contains("| default | 30 |"));

    assert!(!output.pages.contains_key(Path::new("src/plain.md")));

    let settings = &output.pages[Path::new("modsettingindex.md")];
    assert!(settings.starts_with("# Module Settings Index\n"));
    assert!(settings.contains("- [vsync](src/render.md#overlay-modsetting-render-vsync)"));

    let out = dir.path().join("_build");
    output.write_to(&out).unwrap();
    assert!(out.join("modules/net.md").is_file());
    assert!(out.join("objects.json").is_file());

    // a second build ignores the output directory
    let again = project.build().unwrap();
    assert_eq!(again.pages.len(), output.pages.len());
}

#[test]
fn test_custom_namespace_and_adapter() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "blockdoc.toml",
        "\
[project]
namespace = \"tool\"

[[adapter]]
suffix = \".py\"
alias = \"pyrstcomments\"
open = '\"\"\"'
close = '\"\"\"'
",
    );
    write(
        dir.path(),
        "plugin.py",
        "\"\"\" RST\n.. tool:event:: loaded\n\n.. overlay:event:: ignored\n\"\"\"\ndef main():\n    pass\n",
    );

    let project = Project::load(dir.path()).unwrap();
    let (registry, _) = project.collect().unwrap();
    let names: Vec<_> = registry.objects().map(|o| o.qualified_name.as_str()).collect();
    assert_eq!(names, vec!["tool.event.loaded"]);
    assert_eq!(registry.objects().next().unwrap().anchor, "tool-event-loaded");
}
