//! blockdoc core - documentation embedded in source comments
//!
//! This crate provides the core functionality:
//! - Source: comment-block extraction and the per-language adapter table
//! - Domain: entity directives, scope context, object registry, indices and
//!   cross-reference resolution
//! - Host: a minimal structured-text pipeline (directive scanning, role
//!   rewriting, Markdown pages)
//! - Project: file discovery and the read / merge / write build phases

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file handling (`blockdoc.toml`)
pub mod config;

/// Error types shared by the whole crate
pub mod error;

/// Comment-block extraction and source adapters
pub mod source;

/// Documentation objects: directives, scopes, registry, indices, resolution
pub mod domain;

/// Minimal host pipeline around the domain
pub mod host;

/// Project-level build orchestration
pub mod project;

pub use config::{Config, ConfigError, CONFIG_FILE};
pub use domain::{
    Domain, DocumentPass, ObjectIndex, ObjectKind, RegisteredObject, Registry, Resolver,
    ScopeContext, ScopeType,
};
pub use error::{Diagnostic, DocError, DocResult};
pub use host::{Host, Node};
pub use project::{BuildOutput, Project, SourceDocument, SourceRead};
pub use source::{extract, AdapterTable, BlockPattern, SourceAdapter, SourceKind};
