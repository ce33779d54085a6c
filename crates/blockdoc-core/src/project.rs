//! Project-wide builds
//!
//! A build runs in three phases:
//! - read: every source document is extracted and scanned with its own
//!   scope context and document-local registry (optionally on rayon's pool)
//! - merge: document registries are appended to the build registry in
//!   docname order, so "first registered wins" does not depend on scheduling
//! - write: pages are rendered against the merged, now read-only registry

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::Config;
use crate::domain::{Domain, DuplicatePolicy, Registry};
use crate::error::{Diagnostic, DocError, DocResult};
use crate::host::{Host, MarkdownWriter, Node, ReadDocument};
use crate::source::AdapterTable;

/// File name of the object inventory written next to the pages
pub const INVENTORY_FILE: &str = "objects.json";

/// A source file selected for the build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path relative to the source directory, `/`-separated, without suffix
    pub docname: String,
    pub path: PathBuf,
    /// Alias of the adapter that reads this file
    pub alias: String,
}

/// Result of the read phase for one source file
#[derive(Debug, Clone, Default)]
pub struct SourceRead {
    /// `None` when the file carries no documentation
    pub document: Option<ReadDocument>,
    /// Problems with the file itself, reported even when it has no blocks
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything a build produces, before it is written to disk
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Page contents keyed by path relative to the output directory
    pub pages: BTreeMap<PathBuf, String>,
    pub registry: Registry,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutput {
    /// Write every page below `dir`, creating directories as needed
    pub fn write_to(&self, dir: &Path) -> DocResult<()> {
        for (relative, content) in &self.pages {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| DocError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&path, content).map_err(|source| DocError::Write {
                path: path.clone(),
                source,
            })?;
        }

        tracing::info!(dir = %dir.display(), pages = self.pages.len(), "wrote output");
        Ok(())
    }
}

/// A documentation project rooted at a directory
pub struct Project {
    root: PathBuf,
    config: Config,
    adapters: AdapterTable,
    host: Host,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> DocResult<Self> {
        config.validate()?;
        let adapters = AdapterTable::from_config(&config)?;
        let domain = Domain::new(&config.project.namespace, &config.project.label);
        let policy = if config.build.strict_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Keep
        };

        Ok(Self {
            root: root.into(),
            host: Host::new(domain, policy)?,
            adapters,
            config,
        })
    }

    /// Open a project, reading `blockdoc.toml` from `root` when present
    pub fn load(root: impl Into<PathBuf>) -> DocResult<Self> {
        let root = root.into();
        let config = Config::discover(&root)?;
        Self::new(root, config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn adapters(&self) -> &AdapterTable {
        &self.adapters
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.config.build.source_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.build.output_dir)
    }

    /// Source documents matched by the include/exclude globs, sorted by docname.
    ///
    /// Files without an adapter are skipped. When two files map to the same
    /// docname, the first path in sorted order is kept.
    pub fn discover(&self) -> DocResult<Vec<SourceDocument>> {
        let source_dir = self.source_dir();
        let exclude = self
            .config
            .build
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut paths = Vec::new();
        for include in &self.config.build.include {
            let pattern = source_dir.join(include);
            for entry in glob::glob(&pattern.to_string_lossy())? {
                let path = entry.map_err(|err| DocError::Read {
                    path: err.path().to_path_buf(),
                    source: err.into_error(),
                })?;
                if path.is_file() {
                    paths.push(path);
                }
            }
        }
        paths.sort();
        paths.dedup();

        let mut documents: BTreeMap<String, SourceDocument> = BTreeMap::new();
        for path in paths {
            let Ok(relative) = path.strip_prefix(&source_dir) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if exclude.iter().any(|p| p.matches(&relative)) {
                tracing::trace!(path = %relative, "excluded");
                continue;
            }
            let Some(adapter) = self.adapters.for_path(&path) else {
                tracing::debug!(path = %relative, "no source adapter, skipping");
                continue;
            };
            let Some(docname) = relative.strip_suffix(adapter.suffix.as_str()) else {
                continue;
            };

            if let Some(existing) = documents.get(docname) {
                tracing::warn!(
                    docname,
                    kept = %existing.path.display(),
                    skipped = %path.display(),
                    "two sources map to the same document"
                );
                continue;
            }
            documents.insert(
                docname.to_string(),
                SourceDocument {
                    docname: docname.to_string(),
                    alias: adapter.alias.clone(),
                    path,
                },
            );
        }

        Ok(documents.into_values().collect())
    }

    /// Read phase for one document.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD and reported
    /// as a diagnostic; the rest of the file is still read.
    pub fn read_document(&self, document: &SourceDocument) -> DocResult<SourceRead> {
        let bytes = std::fs::read(&document.path).map_err(|source| DocError::Read {
            path: document.path.clone(),
            source,
        })?;

        let mut read = SourceRead::default();
        let raw = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = raw {
            tracing::warn!(path = %document.path.display(), "file is not valid UTF-8");
            read.diagnostics.push(Diagnostic::new(
                &document.docname,
                None,
                "file is not valid UTF-8; undecodable bytes were replaced",
            ));
        }

        let Some(adapter) = self.adapters.by_alias(&document.alias) else {
            return Ok(read);
        };
        let Some(text) = adapter.read(&raw) else {
            tracing::debug!(docname = %document.docname, "no documentation blocks");
            return Ok(read);
        };

        read.document = Some(self.host.read(&document.docname, &text));
        Ok(read)
    }

    /// Run the read phase over `documents`, preserving their order.
    ///
    /// Returns the documents that carry documentation plus file-level
    /// diagnostics.
    pub fn read_all(
        &self,
        documents: &[SourceDocument],
    ) -> DocResult<(Vec<ReadDocument>, Vec<Diagnostic>)> {
        let read: Vec<SourceRead> = if self.config.build.parallel {
            documents
                .par_iter()
                .map(|d| self.read_document(d))
                .collect::<DocResult<_>>()?
        } else {
            documents
                .iter()
                .map(|d| self.read_document(d))
                .collect::<DocResult<_>>()?
        };

        let mut diagnostics = Vec::new();
        let mut read_documents = Vec::with_capacity(read.len());
        for source in read {
            diagnostics.extend(source.diagnostics);
            read_documents.extend(source.document);
        }
        Ok((read_documents, diagnostics))
    }

    /// Read and merge, without rendering any pages
    pub fn collect(&self) -> DocResult<(Registry, Vec<Diagnostic>)> {
        let documents = self.discover()?;
        let (read, mut diagnostics) = self.read_all(&documents)?;
        let (registry, merged, _) = self.merge(read);
        diagnostics.extend(merged);
        Ok((registry, diagnostics))
    }

    /// Full build: read, merge, then render every page
    pub fn build(&self) -> DocResult<BuildOutput> {
        let documents = self.discover()?;
        tracing::info!(
            project = %self.config.project.name,
            documents = documents.len(),
            parallel = self.config.build.parallel,
            "building"
        );

        let (read, mut diagnostics) = self.read_all(&documents)?;
        let (registry, merged, trees) = self.merge(read);
        diagnostics.extend(merged);

        let nitpicky = self.config.build.nitpicky;
        let mut pages = BTreeMap::new();
        for (docname, nodes) in &trees {
            let mut roles = self.host.role_rewriter(&registry, docname, nitpicky);
            let page = MarkdownWriter::page(nodes, &mut roles);
            diagnostics.extend(roles.into_unresolved());
            pages.insert(PathBuf::from(format!("{}.md", docname)), page);
        }

        for index in self.host.domain().indices() {
            let (content, _) = index.generate(&registry);
            pages.insert(
                PathBuf::from(format!("{}.md", index.name)),
                MarkdownWriter::index_page(index, &content),
            );
        }
        pages.insert(PathBuf::from(INVENTORY_FILE), registry.to_json()?);

        tracing::info!(
            objects = registry.len(),
            pages = pages.len(),
            diagnostics = diagnostics.len(),
            "build finished"
        );
        Ok(BuildOutput {
            pages,
            registry,
            diagnostics,
        })
    }

    /// Merge document registries in order into the build registry
    fn merge(
        &self,
        read: Vec<ReadDocument>,
    ) -> (Registry, Vec<Diagnostic>, Vec<(String, Vec<Node>)>) {
        let mut registry = Registry::with_policy(self.host.policy());
        let mut diagnostics = Vec::new();
        let mut trees = Vec::with_capacity(read.len());

        for document in read {
            diagnostics.extend(document.diagnostics);
            for err in registry.merge(document.registry) {
                tracing::warn!(docname = %document.docname, "{}", err);
                diagnostics.push(Diagnostic::new(&document.docname, None, err.to_string()));
            }
            trees.push((document.docname, document.nodes));
        }

        (registry, diagnostics, trees)
    }
}
