//! Markdown writer for processed documents and object indices

use super::node::{Description, Node, Table};
use super::roles::RoleRewriter;
use crate::domain::{relative_link, IndexContent, ObjectIndex};

/// Renders document trees and index content as Markdown pages
pub struct MarkdownWriter;

impl MarkdownWriter {
    /// Render a document, rewriting reference roles as links
    pub fn page(nodes: &[Node], roles: &mut RoleRewriter<'_>) -> String {
        let mut output = String::new();
        Self::write_nodes(&mut output, nodes, roles);
        output
    }

    /// Render an index page; links are relative to the index page itself
    pub fn index_page(index: &ObjectIndex, content: &IndexContent) -> String {
        let mut output = String::new();
        line(&mut output, &format!("# {}", index.localname));
        line(&mut output, "");

        if content.is_empty() {
            line(&mut output, "*No entries.*");
            return output;
        }

        for (letter, entries) in content {
            line(&mut output, &format!("## {}", letter));
            line(&mut output, "");
            for entry in entries {
                let link = relative_link(index.name, &entry.docname, &entry.anchor);
                let mut item = format!("- [{}]({})", entry.display_name, link);
                if !entry.extra.is_empty() {
                    item.push_str(&format!(" *({})*", entry.extra));
                }
                line(&mut output, &item);
            }
            line(&mut output, "");
        }

        output
    }

    /// Consecutive non-blank text lines form a paragraph and are rewritten
    /// together, so a role may wrap onto the next line.
    fn write_nodes(output: &mut String, nodes: &[Node], roles: &mut RoleRewriter<'_>) {
        let mut paragraph: Vec<&str> = Vec::new();

        for node in nodes {
            if let Node::Text(text) = node {
                if !text.trim().is_empty() {
                    paragraph.push(text);
                    continue;
                }
            }

            Self::flush_paragraph(output, &mut paragraph, roles);
            match node {
                Node::Text(_) => line(output, ""),
                Node::Description(description) => Self::write_description(output, description, roles),
                Node::Table(table) => Self::write_table(output, table, roles),
            }
        }

        Self::flush_paragraph(output, &mut paragraph, roles);
    }

    fn flush_paragraph(output: &mut String, paragraph: &mut Vec<&str>, roles: &mut RoleRewriter<'_>) {
        if paragraph.is_empty() {
            return;
        }
        line(output, &roles.rewrite(&paragraph.join("\n")));
        paragraph.clear();
    }

    fn write_description(output: &mut String, description: &Description, roles: &mut RoleRewriter<'_>) {
        if let Some(anchor) = &description.anchor {
            line(output, &format!("<a id=\"{}\"></a>", attribute(anchor)));
        }

        let mut heading = format!(
            "**`{}`** *{}*",
            description.signature,
            description.kind.display_name()
        );
        if let Some(scope) = &description.scope {
            heading.push_str(&format!(" in `{}`", scope));
        }
        line(output, &heading);
        line(output, "");

        Self::write_nodes(output, &description.body, roles);
        line(output, "");
    }

    fn write_table(output: &mut String, table: &Table, roles: &mut RoleRewriter<'_>) {
        if let Some(caption) = &table.caption {
            line(output, &format!("**{}**", caption));
            line(output, "");
        }

        line(
            output,
            &format!("| {} | {} |", cell(&table.headers[0]), cell(&table.headers[1])),
        );
        line(output, "| --- | --- |");
        for [name, value] in &table.rows {
            let name = cell(&roles.rewrite(name));
            let value = cell(&roles.rewrite(value));
            line(output, &format!("| {} | {} |", name, value));
        }
        line(output, "");
    }
}

fn line(output: &mut String, text: &str) {
    output.push_str(text);
    output.push('\n');
}

/// Escape a value for a double-quoted HTML attribute
fn attribute(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape pipes so a value stays inside its table cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, DuplicatePolicy, Registry};
    use crate::host::Host;

    fn render(text: &str) -> String {
        let host = Host::new(Domain::default(), DuplicatePolicy::Keep).unwrap();
        let doc = host.read("src/lua-manager", text);
        let mut roles = host.role_rewriter(&doc.registry, "src/lua-manager", false);
        MarkdownWriter::page(&doc.nodes, &mut roles)
    }

    #[test]
    fn test_description_rendering() {
        let markdown = render(
            "\
.. overlay:event:: update

    Fires every frame, after :overlay:event:`update`.

    .. versionhistory::
        :0.0.1: Added
        :0.1.0: Handles ``a|b``
",
        );

        assert!(markdown.contains("<a id=\"overlay-event-update\"></a>\n**`update`** *Event*\n"));
        assert!(markdown.contains("Fires every frame, after [update](#overlay-event-update)."));
        assert!(markdown.contains("**Version History**\n\n| Version | Notes |\n| --- | --- |\n"));
        assert!(markdown.contains("| 0.1.0 | Handles ``a\\|b`` |"));
    }

    #[test]
    fn test_scoped_heading_and_noindex() {
        let markdown = render(
            "\
.. overlay:dbtable:: players
    :database: mydb

.. overlay:modsetting:: speed
    :noindex:
",
        );

        assert!(markdown.contains("**`players`** *Database Table* in `mydb`"));
        assert!(markdown.contains("**`speed`** *Module Setting* in `none`"));
        assert_eq!(markdown.matches("<a id=").count(), 1);
    }

    #[test]
    fn test_role_wrapped_inside_paragraph() {
        let markdown = render(
            "\
.. overlay:database:: mydb

.. overlay:dbtable:: players

See :overlay:dbtable:`the players
table <mydb.players>` for rows.

Next paragraph.
",
        );

        assert!(markdown.contains(
            "See [the players table](#overlay-dbtable-mydb-players) for rows.\n\nNext paragraph.\n"
        ));
    }

    #[test]
    fn test_anchor_attribute_escaped() {
        let markdown = render(".. overlay:event:: a\"b<c>&d\n");
        assert!(markdown.contains("<a id=\"overlay-event-a&quot;b&lt;c&gt;&amp;d\"></a>"));
    }

    #[test]
    fn test_index_page() {
        let host = Host::new(Domain::default(), DuplicatePolicy::Keep).unwrap();
        let doc = host.read(
            "src/db",
            ".. overlay:database:: mydb\n\n.. overlay:dbtable:: players\n\n.. overlay:dbtable:: items\n",
        );

        let (content, _) = ObjectIndex::DB_TABLES.generate(&doc.registry);
        let markdown = MarkdownWriter::index_page(&ObjectIndex::DB_TABLES, &content);
        assert_eq!(
            markdown,
            "\
# Database Table Index

## i

- [items](src/db.md#overlay-dbtable-mydb-items) *(mydb)*

## p

- [players](src/db.md#overlay-dbtable-mydb-players) *(mydb)*

"
        );
    }

    #[test]
    fn test_empty_index_page() {
        let (content, _) = ObjectIndex::EVENTS.generate(&Registry::new());
        let markdown = MarkdownWriter::index_page(&ObjectIndex::EVENTS, &content);
        assert_eq!(markdown, "# Events Index\n\n*No entries.*\n");
    }
}
