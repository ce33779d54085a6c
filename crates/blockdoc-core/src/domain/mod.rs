//! Documentation object domain
//!
//! A [`Domain`] is the explicit table that ties directive keywords to their
//! handlers, reference roles to object kinds, and index names to index
//! generators, all under one namespace (`overlay` by default).

mod directives;
mod index;
mod registry;
mod resolve;
mod scope;

use std::collections::BTreeMap;

pub use directives::{Directive, DirectiveCall, EntityDirective, NestedParse, ScopeMarker};
pub use index::{IndexContent, IndexEntry, ObjectIndex};
pub use registry::{DuplicatePolicy, ObjectKind, RegisteredObject, Registry};
pub use resolve::{relative_link, split_table_target, Resolved, Resolver};
pub use scope::{ScopeContext, ScopeType, CLEAR_SCOPE, DEFAULT_SCOPE};

use crate::error::{Diagnostic, DocError};

/// Mutable state of one document's processing pass.
///
/// Owns its scope context and a document-local registry, so passes over
/// different documents never share mutable state.
#[derive(Debug)]
pub struct DocumentPass {
    docname: String,
    pub scope: ScopeContext,
    pub registry: Registry,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentPass {
    pub fn new(docname: impl Into<String>, policy: DuplicatePolicy) -> Self {
        Self {
            docname: docname.into(),
            scope: ScopeContext::new(),
            registry: Registry::with_policy(policy),
            diagnostics: Vec::new(),
        }
    }

    pub fn docname(&self) -> &str {
        &self.docname
    }

    /// Record a non-fatal problem
    pub fn report(&mut self, line: Option<usize>, error: &DocError) {
        tracing::warn!(docname = %self.docname, line, "{}", error);
        self.diagnostics
            .push(Diagnostic::new(self.docname.clone(), line, error.to_string()));
    }

    /// End the pass; the scope context is discarded
    pub fn finish(self) -> (Registry, Vec<Diagnostic>) {
        (self.registry, self.diagnostics)
    }
}

/// Directives, roles and indices of one namespace
pub struct Domain {
    namespace: String,
    label: String,
    directives: BTreeMap<&'static str, Box<dyn Directive>>,
    roles: BTreeMap<&'static str, ObjectKind>,
    indices: Vec<ObjectIndex>,
}

impl Domain {
    pub fn new(namespace: impl Into<String>, label: impl Into<String>) -> Self {
        let namespace = namespace.into();

        let handlers: Vec<Box<dyn Directive>> = vec![
            Box::new(EntityDirective::event(&namespace)),
            Box::new(EntityDirective::db_table(&namespace)),
            Box::new(ScopeMarker::database()),
            Box::new(ScopeMarker::module()),
            Box::new(EntityDirective::module_setting(&namespace)),
        ];
        let directives = handlers.into_iter().map(|d| (d.keyword(), d)).collect();

        let roles = [ObjectKind::Event, ObjectKind::DbTable, ObjectKind::ModSetting]
            .into_iter()
            .map(|kind| (kind.as_str(), kind))
            .collect();

        Self {
            namespace,
            label: label.into(),
            directives,
            roles,
            indices: vec![
                ObjectIndex::EVENTS,
                ObjectIndex::DB_TABLES,
                ObjectIndex::MODULE_SETTINGS,
            ],
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Handler for a directive keyword (without the namespace prefix)
    pub fn directive(&self, keyword: &str) -> Option<&dyn Directive> {
        self.directives.get(keyword).map(|d| d.as_ref())
    }

    pub fn directive_keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.directives.keys().copied()
    }

    /// Object kind a reference role points at
    pub fn role(&self, name: &str) -> Option<ObjectKind> {
        self.roles.get(name).copied()
    }

    pub fn indices(&self) -> &[ObjectIndex] {
        &self.indices
    }

    pub fn index(&self, name: &str) -> Option<&ObjectIndex> {
        self.indices.iter().find(|i| i.name == name)
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::new("overlay", "EG-Overlay")
    }
}
