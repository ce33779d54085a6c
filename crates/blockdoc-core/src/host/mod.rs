//! Minimal host pipeline
//!
//! The host reads normalized structured text, recognizes directive markers
//! (`.. name:: argument`, followed by indented options and content), hands
//! them to the registered directives and keeps every other line as text.
//! It does not parse the rest of the markup.

mod markdown;
mod node;
mod roles;
mod tables;

use std::collections::BTreeMap;

use regex::Regex;

pub use markdown::MarkdownWriter;
pub use node::{Description, Node, Table};
pub use roles::RoleRewriter;
pub use tables::OptionTableDirective;

use crate::domain::{
    Directive, DirectiveCall, DocumentPass, Domain, DuplicatePolicy, NestedParse, Registry,
};
use crate::error::{Diagnostic, DocResult};

/// A document after its read pass
#[derive(Debug, Clone)]
pub struct ReadDocument {
    pub docname: String,
    pub nodes: Vec<Node>,
    /// Objects declared by this document, in declaration order
    pub registry: Registry,
    pub diagnostics: Vec<Diagnostic>,
}

/// Directive dispatcher for one domain plus the generic directives
pub struct Host {
    domain: Domain,
    generic: BTreeMap<&'static str, Box<dyn Directive>>,
    policy: DuplicatePolicy,
    marker: Regex,
    option: Regex,
    role: Regex,
}

impl Host {
    pub fn new(domain: Domain, policy: DuplicatePolicy) -> DocResult<Self> {
        let tables: Vec<Box<dyn Directive>> = vec![
            Box::new(OptionTableDirective::version_history()?),
            Box::new(OptionTableDirective::lua_table_fields()?),
            Box::new(OptionTableDirective::settings_values()?),
        ];

        Ok(Self {
            domain,
            generic: tables.into_iter().map(|d| (d.keyword(), d)).collect(),
            policy,
            marker: Regex::new(
                r"^(?P<indent>[ \t]*)\.\.[ \t]+(?P<name>[A-Za-z0-9_-]+(?::[A-Za-z0-9_-]+)?)::(?:[ \t]+(?P<argument>.*?))?[ \t]*$",
            )?,
            option: Regex::new(r"^[ \t]*:(?P<key>[^:\s][^:]*):(?:[ \t]+(?P<value>.*?))?[ \t]*$")?,
            role: Regex::new(
                r":(?P<domain>[A-Za-z0-9_]+):(?P<role>[A-Za-z0-9_-]+):`(?P<text>[^`]+)`",
            )?,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Directive registered under a marker name (`ns:keyword` or a bare name)
    pub fn lookup(&self, name: &str) -> Option<&dyn Directive> {
        match name.split_once(':') {
            Some((namespace, keyword)) if namespace == self.domain.namespace() => {
                self.domain.directive(keyword)
            }
            Some(_) => None,
            None => self.generic.get(name).map(|d| d.as_ref()),
        }
    }

    /// Run the read pass over one document with a fresh scope context
    pub fn read(&self, docname: &str, text: &str) -> ReadDocument {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let mut pass = DocumentPass::new(docname, self.policy);
        let nodes = self.scan(&lines, 1, &mut pass);
        let (registry, diagnostics) = pass.finish();

        tracing::debug!(docname, objects = registry.len(), "read document");
        ReadDocument {
            docname: docname.to_string(),
            nodes,
            registry,
            diagnostics,
        }
    }

    /// Role rewriter for rendering one document against a finished registry
    pub fn role_rewriter<'a>(
        &'a self,
        registry: &'a Registry,
        docname: &'a str,
        nitpicky: bool,
    ) -> RoleRewriter<'a> {
        RoleRewriter::new(&self.role, &self.domain, registry, docname, nitpicky)
    }

    fn scan(&self, lines: &[String], first_line: usize, pass: &mut DocumentPass) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];
            let Some(caps) = self.marker.captures(line) else {
                nodes.push(Node::Text(line.clone()));
                i += 1;
                continue;
            };

            let name = &caps["name"];
            let Some(directive) = self.lookup(name) else {
                tracing::trace!(name, docname = pass.docname(), "unhandled directive");
                nodes.push(Node::Text(line.clone()));
                i += 1;
                continue;
            };

            let end = block_end(lines, i + 1, caps["indent"].len());
            let block = &lines[i + 1..end];

            let (options, consumed) = if directive.option_names().is_empty() {
                (BTreeMap::new(), 0)
            } else {
                self.parse_options(block)
            };
            let body = &block[consumed..];
            let leading_blank = body.iter().take_while(|l| l.trim().is_empty()).count();

            let call = DirectiveCall {
                name: name.to_string(),
                argument: caps.name("argument").map_or("", |m| m.as_str()).to_string(),
                options,
                content: dedent(&body[leading_blank..]),
                line: first_line + i,
                content_line: first_line + i + 1 + consumed + leading_blank,
            };

            match directive.run(&call, pass, self) {
                Ok(output) => nodes.extend(output),
                Err(err) => pass.report(Some(call.line), &err),
            }
            i = end;
        }

        nodes
    }

    /// Leading `:key: value` lines of a directive block
    fn parse_options(&self, block: &[String]) -> (BTreeMap<String, String>, usize) {
        let mut options = BTreeMap::new();
        let mut consumed = 0;
        for line in block {
            let Some(caps) = self.option.captures(line) else {
                break;
            };
            let value = caps.name("value").map_or("", |m| m.as_str());
            options.insert(caps["key"].trim().to_string(), value.to_string());
            consumed += 1;
        }
        (options, consumed)
    }
}

impl NestedParse for Host {
    fn nested_parse(&self, lines: &[String], first_line: usize, pass: &mut DocumentPass) -> Vec<Node> {
        self.scan(lines, first_line, pass)
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// End (exclusive) of the block indented deeper than `indent` starting at
/// `start`; trailing blank lines are left outside the block
fn block_end(lines: &[String], start: usize, indent: usize) -> usize {
    let mut end = start;
    let mut i = start;
    while i < lines.len() {
        let line = &lines[i];
        if line.trim().is_empty() {
            i += 1;
        } else if indentation(line) > indent {
            i += 1;
            end = i;
        } else {
            break;
        }
    }
    end
}

/// Remove the common leading indentation; blank lines become empty
fn dedent(lines: &[String]) -> Vec<String> {
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indentation(l))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                l[common..].trim_end().to_string()
            }
        })
        .collect()
}
