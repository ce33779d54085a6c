//! Document object registry
//!
//! Every entity declared by a directive ends up here as a
//! [`RegisteredObject`]. The registry is an append-only list: insertion
//! order is meaningful because cross-reference resolution returns the first
//! match, while lookups by qualified name return the last registration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DocError, DocResult};

/// Kind of a documentation object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Event,
    DbTable,
    Database,
    Module,
    ModSetting,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Event,
        ObjectKind::DbTable,
        ObjectKind::Database,
        ObjectKind::Module,
        ObjectKind::ModSetting,
    ];

    /// Keyword used in qualified names, anchors, directives and roles
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Event => "event",
            ObjectKind::DbTable => "dbtable",
            ObjectKind::Database => "database",
            ObjectKind::Module => "module",
            ObjectKind::ModSetting => "modsetting",
        }
    }

    /// Human-facing label
    pub fn display_name(&self) -> &'static str {
        match self {
            ObjectKind::Event => "Event",
            ObjectKind::DbTable => "Database Table",
            ObjectKind::Database => "Database",
            ObjectKind::Module => "Module",
            ObjectKind::ModSetting => "Module Setting",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown object kind '{}'", s))
    }
}

/// An entity discovered while processing a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredObject {
    /// Dot-joined hierarchical name, unique per kind by contract
    pub qualified_name: String,
    /// Short human-facing name (the directive signature)
    pub display_name: String,
    pub kind: ObjectKind,
    /// Document that declared the object
    pub docname: String,
    /// Fragment identifier inside `docname`
    pub anchor: String,
    pub priority: i32,
}

impl RegisteredObject {
    pub fn new(
        qualified_name: impl Into<String>,
        display_name: impl Into<String>,
        kind: ObjectKind,
        docname: impl Into<String>,
        anchor: impl Into<String>,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            display_name: display_name.into(),
            kind,
            docname: docname.into(),
            anchor: anchor.into(),
            priority: 0,
        }
    }

    /// Dot segment of the qualified name counted from the end (0 = last)
    pub fn segment_from_end(&self, n: usize) -> Option<&str> {
        self.qualified_name.rsplit('.').nth(n)
    }
}

/// What to do when a qualified name is registered twice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep both entries and log a warning
    #[default]
    Keep,
    /// Refuse the later registration
    Reject,
}

/// Build-scoped store of documentation objects
#[derive(Debug, Clone, Default)]
pub struct Registry {
    objects: Vec<RegisteredObject>,
    policy: DuplicatePolicy,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            objects: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Append an object, applying the duplicate policy
    pub fn add(&mut self, object: RegisteredObject) -> DocResult<()> {
        if let Some(existing) = self.get(object.kind, &object.qualified_name) {
            match self.policy {
                DuplicatePolicy::Keep => {
                    tracing::warn!(
                        kind = %object.kind,
                        name = %object.qualified_name,
                        first = %existing.docname,
                        second = %object.docname,
                        "duplicate object description"
                    );
                }
                DuplicatePolicy::Reject => {
                    return Err(DocError::DuplicateObject {
                        kind: object.kind,
                        qualified_name: object.qualified_name,
                        first_docname: existing.docname.clone(),
                    });
                }
            }
        }

        tracing::debug!(
            kind = %object.kind,
            name = %object.qualified_name,
            docname = %object.docname,
            "registered object"
        );
        self.objects.push(object);
        Ok(())
    }

    /// All objects in insertion order
    pub fn objects(&self) -> impl Iterator<Item = &RegisteredObject> {
        self.objects.iter()
    }

    pub fn of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &RegisteredObject> {
        self.objects.iter().filter(move |o| o.kind == kind)
    }

    /// Look up by qualified name; the latest registration shadows earlier ones
    pub fn get(&self, kind: ObjectKind, qualified_name: &str) -> Option<&RegisteredObject> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.kind == kind && o.qualified_name == qualified_name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drop every object declared by `docname`
    pub fn clear_document(&mut self, docname: &str) {
        self.objects.retain(|o| o.docname != docname);
    }

    /// Append the objects of another registry in order.
    ///
    /// Objects refused by the duplicate policy are skipped and returned as
    /// errors so the caller can report them.
    pub fn merge(&mut self, other: Registry) -> Vec<DocError> {
        let mut rejected = Vec::new();
        for object in other.objects {
            if let Err(err) = self.add(object) {
                rejected.push(err);
            }
        }
        rejected
    }

    /// Pretty JSON inventory of all objects
    pub fn to_json(&self) -> DocResult<String> {
        Ok(serde_json::to_string_pretty(&self.objects)?)
    }
}
