//! Source adapter table - which comment syntax a file suffix uses

use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::extractor::{extract, BlockPattern};
use crate::config::Config;
use crate::error::DocResult;

/// Logical kind of a documentation source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Lua,
    C,
    Rust,
    /// Plain structured text, read as-is
    Text,
    /// A language declared in the configuration file
    Custom,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Lua => "lua",
            SourceKind::C => "c",
            SourceKind::Rust => "rust",
            SourceKind::Text => "text",
            SourceKind::Custom => "custom",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the adapter table
#[derive(Debug, Clone)]
pub struct SourceAdapter {
    /// File suffix including the leading dot
    pub suffix: String,
    /// Registration alias, e.g. `luarstcomments`
    pub alias: String,
    pub kind: SourceKind,
    /// `None` for passthrough sources
    pattern: Option<BlockPattern>,
}

impl SourceAdapter {
    /// An adapter that extracts tagged comment blocks
    pub fn comment_blocks(
        kind: SourceKind,
        suffix: &str,
        alias: &str,
        open: &str,
        close: &str,
    ) -> DocResult<Self> {
        Ok(Self {
            suffix: suffix.to_string(),
            alias: alias.to_string(),
            kind,
            pattern: Some(BlockPattern::new(open, close)?),
        })
    }

    /// An adapter whose files are structured text already
    pub fn passthrough(suffix: &str, alias: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            alias: alias.to_string(),
            kind: SourceKind::Text,
            pattern: None,
        }
    }

    pub fn pattern(&self) -> Option<&BlockPattern> {
        self.pattern.as_ref()
    }

    /// Turn raw file content into structured text, or `None` if the file
    /// carries no documentation
    pub fn read(&self, raw: &str) -> Option<String> {
        match &self.pattern {
            Some(pattern) => extract(raw, pattern),
            None if raw.trim().is_empty() => None,
            None => Some(raw.to_string()),
        }
    }

    fn handles(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.len() > self.suffix.len() && name.ends_with(&self.suffix))
            .unwrap_or(false)
    }
}

/// Fixed mapping from file suffix to adapter, built once per build
#[derive(Debug, Clone, Default)]
pub struct AdapterTable {
    adapters: Vec<SourceAdapter>,
}

impl AdapterTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in Lua, C, Rust and plain-text adapters
    pub fn builtin() -> DocResult<Self> {
        let mut table = Self::new();
        table.register(SourceAdapter::comment_blocks(
            SourceKind::Lua,
            ".lua",
            "luarstcomments",
            "--[[",
            "]]--",
        )?);
        table.register(SourceAdapter::comment_blocks(
            SourceKind::C,
            ".c",
            "crstcomments",
            "/***",
            "*/",
        )?);
        table.register(SourceAdapter::comment_blocks(
            SourceKind::Rust,
            ".rs",
            "rustrstcomments",
            "/***",
            "*/",
        )?);
        table.register(SourceAdapter::passthrough(".rst", "restructuredtext"));
        Ok(table)
    }

    /// Built-in adapters plus every `[[adapter]]` of the configuration
    pub fn from_config(config: &Config) -> DocResult<Self> {
        let mut table = Self::builtin()?;
        for spec in &config.adapters {
            table.register(SourceAdapter::comment_blocks(
                SourceKind::Custom,
                &spec.suffix,
                &spec.alias,
                &spec.open,
                &spec.close,
            )?);
        }
        Ok(table)
    }

    /// Add an adapter; it replaces any earlier adapter with the same suffix
    pub fn register(&mut self, adapter: SourceAdapter) {
        if let Some(existing) = self.adapters.iter_mut().find(|a| a.suffix == adapter.suffix) {
            tracing::debug!(
                suffix = %adapter.suffix,
                old = %existing.alias,
                new = %adapter.alias,
                "replacing source adapter"
            );
            *existing = adapter;
        } else {
            self.adapters.push(adapter);
        }
    }

    /// Adapter for a file, chosen by the longest matching suffix
    pub fn for_path(&self, path: &Path) -> Option<&SourceAdapter> {
        self.adapters
            .iter()
            .filter(|a| a.handles(path))
            .max_by_key(|a| a.suffix.len())
    }

    pub fn by_alias(&self, alias: &str) -> Option<&SourceAdapter> {
        self.adapters.iter().find(|a| a.alias == alias)
    }

    /// Strip the adapter suffix from a file name, if one applies
    pub fn strip_suffix<'p>(&self, name: &'p str) -> Option<&'p str> {
        self.for_path(Path::new(name))
            .and_then(|a| name.strip_suffix(a.suffix.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceAdapter> {
        self.adapters.iter()
    }
}
