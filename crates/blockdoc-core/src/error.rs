//! Error types for extraction, directives and builds

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::ObjectKind;

/// Result type for blockdoc operations
pub type DocResult<T> = Result<T, DocError>;

/// Errors that can occur while extracting, registering or building
#[derive(Error, Debug)]
pub enum DocError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid block pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("directive '{directive}' requires a single-line argument")]
    MissingArgument { directive: String },

    #[error("directive '{directive}' does not accept option '{option}'")]
    UnknownOption { directive: String, option: String },

    #[error("duplicate {kind} '{qualified_name}' (already declared in '{first_docname}')")]
    DuplicateObject {
        kind: ObjectKind,
        qualified_name: String,
        first_docname: String,
    },

    #[error("failed to serialize object inventory: {0}")]
    Json(#[from] serde_json::Error),
}

/// A non-fatal problem found while processing one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Document the problem was found in
    pub docname: String,
    /// 1-based line in the normalized structured text, if known
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(docname: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            docname: docname.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.docname, line, self.message),
            None => write!(f, "{}: {}", self.docname, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DocError::MissingArgument {
            directive: "overlay:event".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "directive 'overlay:event' requires a single-line argument"
        );

        let err = DocError::DuplicateObject {
            kind: ObjectKind::DbTable,
            qualified_name: "overlay.dbtable.mydb.players".to_string(),
            first_docname: "src/db".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate dbtable 'overlay.dbtable.mydb.players' (already declared in 'src/db')"
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new("src/lua-manager", Some(12), "unknown option");
        assert_eq!(diag.to_string(), "src/lua-manager:12: unknown option");

        let diag = Diagnostic::new("index", None, "empty document");
        assert_eq!(diag.to_string(), "index: empty document");
    }
}
