//! Option-table directives (`versionhistory`, `luatablefields`, `settingsvalues`)
//!
//! Content lines of the form `:name: value` become table rows; any other
//! line is ignored.

use regex::Regex;

use super::node::{Node, Table};
use crate::domain::{Directive, DirectiveCall, DocumentPass, NestedParse};
use crate::error::DocResult;

/// A directive rendering `:name: value` lines as a two-column table
#[derive(Debug, Clone)]
pub struct OptionTableDirective {
    keyword: &'static str,
    name_header: &'static str,
    value_header: &'static str,
    caption: Option<&'static str>,
    row: Regex,
}

impl OptionTableDirective {
    fn new(
        keyword: &'static str,
        name_header: &'static str,
        value_header: &'static str,
        caption: Option<&'static str>,
    ) -> DocResult<Self> {
        Ok(Self {
            keyword,
            name_header,
            value_header,
            caption,
            row: Regex::new(r"^:(?P<name>[^:]+): (?P<value>.*)")?,
        })
    }

    pub fn version_history() -> DocResult<Self> {
        Self::new("versionhistory", "Version", "Notes", Some("Version History"))
    }

    pub fn lua_table_fields() -> DocResult<Self> {
        Self::new("luatablefields", "Field", "Description", None)
    }

    pub fn settings_values() -> DocResult<Self> {
        Self::new("settingsvalues", "Key", "Description", None)
    }

    /// Build the table node for a set of content lines
    pub fn table(&self, content: &[String]) -> Table {
        let rows = content
            .iter()
            .filter_map(|line| self.row.captures(line))
            .map(|caps| [caps["name"].to_string(), caps["value"].to_string()])
            .collect();

        Table {
            caption: self.caption.map(str::to_string),
            headers: [self.name_header.to_string(), self.value_header.to_string()],
            rows,
        }
    }
}

impl Directive for OptionTableDirective {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn run(
        &self,
        call: &DirectiveCall,
        _pass: &mut DocumentPass,
        _parser: &dyn NestedParse,
    ) -> DocResult<Vec<Node>> {
        Ok(vec![Node::Table(self.table(&call.content))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_version_history_rows() {
        let directive = OptionTableDirective::version_history().unwrap();
        let table = directive.table(&lines(":0.0.1: Added\n:0.1.0: Renamed ``foo``\n"));

        assert_eq!(table.caption.as_deref(), Some("Version History"));
        assert_eq!(table.headers, ["Version".to_string(), "Notes".to_string()]);
        assert_eq!(
            table.rows,
            vec![
                ["0.0.1".to_string(), "Added".to_string()],
                ["0.1.0".to_string(), "Renamed ``foo``".to_string()],
            ]
        );
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let directive = OptionTableDirective::lua_table_fields().unwrap();
        let table = directive.table(&lines("plain text\n:x:no space\n\n:name: The name\n"));

        assert_eq!(table.caption, None);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], "name");
    }

    #[test]
    fn test_settings_values_headers() {
        let directive = OptionTableDirective::settings_values().unwrap();
        let table = directive.table(&[]);
        assert_eq!(table.headers[0], "Key");
        assert!(table.rows.is_empty());
    }
}
