//! Project configuration (`blockdoc.toml`) parsing and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "blockdoc.toml";

/// Errors that can occur when loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// The complete `blockdoc.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project metadata and domain naming.
    #[serde(default)]
    pub project: ProjectSection,

    /// Source discovery and build behavior.
    #[serde(default)]
    pub build: BuildSection,

    /// Extra comment-block adapters for explicitly configured languages.
    #[serde(default, rename = "adapter")]
    pub adapters: Vec<AdapterSpec>,
}

/// `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSection {
    /// Human-facing project name, used for index page titles.
    pub name: String,

    /// Prefix of qualified names, anchors and directive/role markers.
    pub namespace: String,

    /// Display label of the domain.
    pub label: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: "Documentation".to_string(),
            namespace: "overlay".to_string(),
            label: "EG-Overlay".to_string(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Directory that docnames are computed relative to.
    pub source_dir: PathBuf,

    /// Glob patterns (relative to `source_dir`) of files to read.
    pub include: Vec<String>,

    /// Glob patterns (relative to `source_dir`) of files to skip.
    pub exclude: Vec<String>,

    /// Where generated pages are written.
    pub output_dir: PathBuf,

    /// Warn about every unresolved cross-reference.
    pub nitpicky: bool,

    /// Reject a second declaration of the same qualified name.
    pub strict_duplicates: bool,

    /// Read documents on a thread pool.
    pub parallel: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            include: vec!["**/*".to_string()],
            exclude: vec!["_build/**".to_string(), "target/**".to_string()],
            output_dir: PathBuf::from("_build"),
            nitpicky: false,
            strict_duplicates: false,
            parallel: true,
        }
    }
}

/// A `[[adapter]]` entry: one more language whose comments carry documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterSpec {
    /// File suffix including the leading dot, e.g. `.py`.
    pub suffix: String,

    /// Registration alias of the adapter.
    pub alias: String,

    /// Comment-open token; the block tag is appended to it.
    pub open: String,

    /// Comment-close token.
    pub close: String,
}

impl Config {
    /// Parse and validate configuration from TOML text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Load `blockdoc.toml` from `root`, falling back to defaults when absent.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading configuration");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check values that the TOML schema alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ns = &self.project.namespace;
        if ns.is_empty() || !ns.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Invalid {
                field: "project.namespace",
                reason: format!("'{}' must be a non-empty identifier", ns),
            });
        }

        for adapter in &self.adapters {
            if !adapter.suffix.starts_with('.') || adapter.suffix.len() < 2 {
                return Err(ConfigError::Invalid {
                    field: "adapter.suffix",
                    reason: format!("'{}' must start with '.'", adapter.suffix),
                });
            }
            if adapter.open.trim().is_empty() || adapter.close.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "adapter.open",
                    reason: format!("adapter '{}' needs both open and close tokens", adapter.alias),
                });
            }
        }

        Ok(())
    }
}
