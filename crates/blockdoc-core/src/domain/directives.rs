//! Entity directives and scope markers
//!
//! Each directive keyword maps to one handler implementing [`Directive`].
//! Entity handlers share a single implementation parameterized by object
//! kind and by the scope (if any) that qualifies their names.

use std::collections::BTreeMap;

use super::registry::{ObjectKind, RegisteredObject};
use super::scope::{ScopeContext, ScopeType};
use super::DocumentPass;
use crate::error::{DocError, DocResult};
use crate::host::{Description, Node};

/// Options that suppress registration of an entity
const NOINDEX_OPTIONS: [&str; 2] = ["noindex", "no-index"];

/// One directive occurrence found in structured text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveCall {
    /// Directive name as written, e.g. `overlay:event`
    pub name: String,
    /// Raw argument text following `::`
    pub argument: String,
    pub options: BTreeMap<String, String>,
    /// Content lines, dedented
    pub content: Vec<String>,
    /// 1-based line of the directive marker
    pub line: usize,
    /// 1-based line of the first content line
    pub content_line: usize,
}

/// Parses directive content as structured text in the current pass
pub trait NestedParse {
    fn nested_parse(&self, lines: &[String], first_line: usize, pass: &mut DocumentPass) -> Vec<Node>;
}

/// A directive handler invoked by the host for each matching marker
pub trait Directive: Send + Sync {
    /// Keyword the directive is registered under
    fn keyword(&self) -> &'static str;

    /// Accepted option names; when empty, option-like lines are content
    fn option_names(&self) -> &[&'static str] {
        &[]
    }

    fn run(
        &self,
        call: &DirectiveCall,
        pass: &mut DocumentPass,
        parser: &dyn NestedParse,
    ) -> DocResult<Vec<Node>>;
}

/// Reject options the directive does not declare
fn check_options(directive: &dyn Directive, call: &DirectiveCall) -> DocResult<()> {
    match call
        .options
        .keys()
        .find(|key| !directive.option_names().contains(&key.as_str()))
    {
        Some(option) => Err(DocError::UnknownOption {
            directive: call.name.clone(),
            option: option.clone(),
        }),
        None => Ok(()),
    }
}

/// The single-line argument of a directive, trimmed
fn required_argument(call: &DirectiveCall) -> DocResult<String> {
    let argument = call.argument.trim();
    if argument.is_empty() || argument.contains('\n') {
        return Err(DocError::MissingArgument {
            directive: call.name.clone(),
        });
    }
    Ok(argument.to_string())
}

/// Scope that qualifies an entity's name, with its override option
#[derive(Debug, Clone, Copy)]
struct Scoping {
    scope: ScopeType,
    option: &'static str,
}

/// Declares a documentation object and registers it
#[derive(Debug, Clone)]
pub struct EntityDirective {
    namespace: String,
    kind: ObjectKind,
    scoping: Option<Scoping>,
    options: Vec<&'static str>,
}

impl EntityDirective {
    fn new(namespace: &str, kind: ObjectKind, scoping: Option<Scoping>) -> Self {
        let mut options: Vec<&'static str> = NOINDEX_OPTIONS.to_vec();
        if let Some(scoping) = scoping {
            options.push(scoping.option);
        }
        Self {
            namespace: namespace.to_string(),
            kind,
            scoping,
            options,
        }
    }

    /// `event` - unscoped
    pub fn event(namespace: &str) -> Self {
        Self::new(namespace, ObjectKind::Event, None)
    }

    /// `dbtable` - scoped by database, override with `:database:`
    pub fn db_table(namespace: &str) -> Self {
        Self::new(
            namespace,
            ObjectKind::DbTable,
            Some(Scoping {
                scope: ScopeType::Database,
                option: "database",
            }),
        )
    }

    /// `modsetting` - scoped by module, override with `:module:`
    pub fn module_setting(namespace: &str) -> Self {
        Self::new(
            namespace,
            ObjectKind::ModSetting,
            Some(Scoping {
                scope: ScopeType::Module,
                option: "module",
            }),
        )
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn parse_signature(&self, call: &DirectiveCall) -> DocResult<String> {
        required_argument(call)
    }

    /// Owning scope name, or `None` for unscoped kinds
    pub fn owning_scope(&self, call: &DirectiveCall, context: &ScopeContext) -> Option<String> {
        self.scoping.map(|scoping| {
            let explicit = call.options.get(scoping.option).map(String::as_str);
            context.resolve(scoping.scope, explicit)
        })
    }

    /// `<ns>.<kind>[.<scope>].<signature>`
    pub fn qualified_name(&self, scope: Option<&str>, signature: &str) -> String {
        self.parts(scope, signature).join(".")
    }

    /// `<ns>-<kind>[-<scope>]-<signature>`
    pub fn anchor(&self, scope: Option<&str>, signature: &str) -> String {
        self.parts(scope, signature).join("-")
    }

    fn parts<'a>(&'a self, scope: Option<&'a str>, signature: &'a str) -> Vec<&'a str> {
        let mut parts = vec![self.namespace.as_str(), self.kind.as_str()];
        parts.extend(scope);
        parts.push(signature);
        parts
    }
}

impl Directive for EntityDirective {
    fn keyword(&self) -> &'static str {
        self.kind.as_str()
    }

    fn option_names(&self) -> &[&'static str] {
        &self.options
    }

    fn run(
        &self,
        call: &DirectiveCall,
        pass: &mut DocumentPass,
        parser: &dyn NestedParse,
    ) -> DocResult<Vec<Node>> {
        check_options(self, call)?;
        let signature = self.parse_signature(call)?;
        let scope = self.owning_scope(call, &pass.scope);
        let noindex = NOINDEX_OPTIONS.iter().any(|o| call.options.contains_key(*o));

        let anchor = if noindex {
            None
        } else {
            let anchor = self.anchor(scope.as_deref(), &signature);
            let object = RegisteredObject::new(
                self.qualified_name(scope.as_deref(), &signature),
                signature.clone(),
                self.kind,
                pass.docname(),
                anchor.clone(),
            );
            // a rejected duplicate is still described, without an anchor
            match pass.registry.add(object) {
                Ok(()) => Some(anchor),
                Err(err) => {
                    pass.report(Some(call.line), &err);
                    None
                }
            }
        };

        let body = parser.nested_parse(&call.content, call.content_line, pass);

        Ok(vec![Node::Description(Description {
            kind: self.kind,
            anchor,
            signature,
            scope,
            body,
        })])
    }
}

/// Sets or clears the ambient module/database; renders nothing
#[derive(Debug, Clone, Copy)]
pub struct ScopeMarker {
    keyword: &'static str,
    scope: ScopeType,
}

impl ScopeMarker {
    /// `module` marker
    pub fn module() -> Self {
        Self {
            keyword: ObjectKind::Module.as_str(),
            scope: ScopeType::Module,
        }
    }

    /// `database` marker
    pub fn database() -> Self {
        Self {
            keyword: ObjectKind::Database.as_str(),
            scope: ScopeType::Database,
        }
    }
}

impl Directive for ScopeMarker {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn run(
        &self,
        call: &DirectiveCall,
        pass: &mut DocumentPass,
        _parser: &dyn NestedParse,
    ) -> DocResult<Vec<Node>> {
        let name = required_argument(call)?;
        tracing::trace!(scope = %self.scope, name = %name, docname = pass.docname(), "scope marker");
        pass.scope.apply_marker(self.scope, &name);
        Ok(Vec::new())
    }
}
