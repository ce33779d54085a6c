//! Reference roles - ``:ns:kind:`target` `` rewritten to links

use regex::Regex;

use crate::domain::{relative_link, Domain, Resolver, Registry};
use crate::error::Diagnostic;

/// Rewrites the reference roles of one document during the write phase
pub struct RoleRewriter<'a> {
    pattern: &'a Regex,
    domain: &'a Domain,
    resolver: Resolver<'a>,
    docname: &'a str,
    nitpicky: bool,
    unresolved: Vec<Diagnostic>,
}

impl<'a> RoleRewriter<'a> {
    pub(crate) fn new(
        pattern: &'a Regex,
        domain: &'a Domain,
        registry: &'a Registry,
        docname: &'a str,
        nitpicky: bool,
    ) -> Self {
        Self {
            pattern,
            domain,
            resolver: Resolver::new(registry),
            docname,
            nitpicky,
            unresolved: Vec::new(),
        }
    }

    /// Replace every role of this domain in `text`.
    ///
    /// Resolved references become Markdown links relative to the current
    /// document; unresolved ones become inline literals. Roles of other
    /// domains are left untouched.
    pub fn rewrite(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let pattern = self.pattern;

        for caps in pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            last = whole.end();

            let kind = if &caps["domain"] == self.domain.namespace() {
                self.domain.role(&caps["role"])
            } else {
                None
            };
            let Some(kind) = kind else {
                out.push_str(whole.as_str());
                continue;
            };

            let text = collapse_whitespace(&caps["text"]);
            let (title, target) = split_title(&text);
            match self.resolver.resolve(kind, target) {
                Some(found) => {
                    let link = relative_link(self.docname, found.docname, found.anchor);
                    out.push_str(&format!("[{}]({})", title, link));
                }
                None => {
                    if self.nitpicky {
                        tracing::warn!(docname = self.docname, %kind, target, "unresolved reference");
                        self.unresolved.push(Diagnostic::new(
                            self.docname,
                            None,
                            format!("{} reference target not found: {}", kind, target),
                        ));
                    } else {
                        tracing::debug!(docname = self.docname, %kind, target, "unresolved reference");
                    }
                    out.push_str(&format!("`{}`", title));
                }
            }
        }

        out.push_str(&text[last..]);
        out
    }

    /// Unresolved references reported in nitpicky mode
    pub fn into_unresolved(self) -> Vec<Diagnostic> {
        self.unresolved
    }
}

/// Split `title <target>`; a plain target is its own title
fn split_title(text: &str) -> (&str, &str) {
    let text = text.trim();
    if let Some(inner) = text.strip_suffix('>') {
        if let Some((title, target)) = inner.rsplit_once(" <") {
            return (title.trim(), target.trim());
        }
    }
    (text, text)
}

/// Role text may wrap across lines; runs of whitespace become one space
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
