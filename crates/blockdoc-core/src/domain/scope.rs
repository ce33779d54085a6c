//! Scope context - ambient module/database names of one document pass

use std::fmt;

/// Marker argument that clears a scope instead of setting it
pub const CLEAR_SCOPE: &str = "None";

/// Scope name used when neither an explicit nor an ambient scope exists
pub const DEFAULT_SCOPE: &str = "none";

/// Kind of ambient scope a marker directive controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeType {
    Module,
    Database,
}

impl ScopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeType::Module => "module",
            ScopeType::Database => "database",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currently active scope names.
///
/// One context exists per document pass; it starts empty and is dropped
/// with the pass, so nothing leaks from one document into the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    module: Option<String>,
    database: Option<String>,
}

impl ScopeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or, with `None`, clear a scope
    pub fn set(&mut self, scope: ScopeType, name: Option<String>) {
        *self.slot(scope) = name;
    }

    pub fn get(&self, scope: ScopeType) -> Option<&str> {
        match scope {
            ScopeType::Module => self.module.as_deref(),
            ScopeType::Database => self.database.as_deref(),
        }
    }

    /// Apply a scope-marker argument; the literal `None` clears the scope
    pub fn apply_marker(&mut self, scope: ScopeType, argument: &str) {
        let name = argument.trim();
        if name == CLEAR_SCOPE {
            self.set(scope, None);
        } else {
            self.set(scope, Some(name.to_string()));
        }
    }

    /// Owning scope of a declaration: explicit override, then the ambient
    /// value, then [`DEFAULT_SCOPE`]
    pub fn resolve(&self, scope: ScopeType, explicit: Option<&str>) -> String {
        explicit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| self.get(scope))
            .unwrap_or(DEFAULT_SCOPE)
            .to_string()
    }

    fn slot(&mut self, scope: ScopeType) -> &mut Option<String> {
        match scope {
            ScopeType::Module => &mut self.module,
            ScopeType::Database => &mut self.database,
        }
    }
}
