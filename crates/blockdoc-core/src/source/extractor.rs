//! Block extractor - pulls tagged comment blocks out of raw source text

use regex::Regex;

use crate::error::DocResult;

/// Tag that must follow the comment-open token on an opening marker line
pub const BLOCK_TAG: &str = "RST";

/// Delimiter pair of one comment syntax, compiled into a block regex.
///
/// The opening marker is `<open> RST` and the closing marker is `<close>`;
/// each must sit alone on its line (surrounding spaces and tabs are allowed
/// and never captured). Content is matched lazily up to the first closing
/// marker, so blocks never overlap.
#[derive(Debug, Clone)]
pub struct BlockPattern {
    open: String,
    close: String,
    regex: Regex,
}

impl BlockPattern {
    /// Build a pattern from a comment-open and a comment-close token
    pub fn new(open: &str, close: &str) -> DocResult<Self> {
        // `R` makes `^`/`$` treat "\r\n" as a line terminator.
        let source = format!(
            r"(?msR)^[ \t]*{open} {tag}[ \t]*\r?\n(?:(?P<content>.*?)\r?\n)??[ \t]*{close}[ \t]*$",
            open = regex::escape(open),
            tag = BLOCK_TAG,
            close = regex::escape(close),
        );
        Ok(Self {
            open: open.to_string(),
            close: close.to_string(),
            regex: Regex::new(&source)?,
        })
    }

    /// Comment-open token
    pub fn open(&self) -> &str {
        &self.open
    }

    /// Comment-close token
    pub fn close(&self) -> &str {
        &self.close
    }

    /// Interior text of every block, in source order
    pub fn blocks<'t>(&self, raw: &'t str) -> Vec<&'t str> {
        self.regex
            .captures_iter(raw)
            .map(|caps| caps.name("content").map_or("", |m| m.as_str()))
            .collect()
    }
}

/// Extract every documentation block of `raw` into one structured-text buffer.
///
/// Each block's lines are emitted in order followed by one blank line. The
/// result ends with a single newline. Returns `None` when the text holds no
/// block at all, in which case there is nothing for the host to parse.
pub fn extract(raw: &str, pattern: &BlockPattern) -> Option<String> {
    let mut lines: Vec<&str> = Vec::new();

    for block in pattern.blocks(raw) {
        lines.extend(block.lines());
        lines.push("");
    }

    if lines.is_empty() {
        return None;
    }

    let mut text = lines.join("\n");
    text.push('\n');
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_pattern() -> BlockPattern {
        BlockPattern::new("/***", "*/").unwrap()
    }

    fn lua_pattern() -> BlockPattern {
        BlockPattern::new("--[[", "]]--").unwrap()
    }

    #[test]
    fn test_no_blocks() {
        let source = "int main(void) {\n    /* plain comment */\n    return 0;\n}\n";
        assert_eq!(extract(source, &c_pattern()), None);
        assert_eq!(extract("", &c_pattern()), None);
    }

    #[test]
    fn test_single_block_round_trip() {
        let source = "/*** RST\nEvents\n======\n*/\nint x;\n";
        assert_eq!(
            extract(source, &c_pattern()),
            Some("Events\n======\n\n".to_string())
        );
    }

    #[test]
    fn test_blocks_in_order_with_separator() {
        let source = "/*** RST\nfirst\n*/\n/*** RST\nsecond\n  indented\n*/\nvoid f();\n/*** RST\nthird\n*/";
        let text = extract(source, &c_pattern()).unwrap();
        assert_eq!(text, "first\n\nsecond\n  indented\n\nthird\n\n");
    }

    #[test]
    fn test_blank_lines_inside_block_kept() {
        let source = "/*** RST\na\n\nb\n*/\n";
        assert_eq!(extract(source, &c_pattern()), Some("a\n\nb\n\n".to_string()));
    }

    #[test]
    fn test_crlf_line_endings() {
        let source = "--[[ RST\r\nline one\r\nline two\r\n]]--\r\nlocal x = 1\r\n";
        assert_eq!(
            extract(source, &lua_pattern()),
            Some("line one\nline two\n\n".to_string())
        );
    }

    #[test]
    fn test_marker_whitespace_not_captured() {
        let source = "  /*** RST  \ncontent\n   */\t\n";
        assert_eq!(extract(source, &c_pattern()), Some("content\n\n".to_string()));
    }

    #[test]
    fn test_markers_must_own_their_line() {
        let source = "x = 1; /*** RST\nnot docs\n*/\n/*** RST\nhidden */\n";
        assert_eq!(extract(source, &c_pattern()), None);
    }

    #[test]
    fn test_empty_block_does_not_swallow_code() {
        let source = "/*** RST\n*/\nint secret;\n/*** RST\nreal\n*/\n";
        let pattern = c_pattern();
        assert_eq!(pattern.blocks(source), vec!["", "real"]);
        assert_eq!(extract(source, &pattern), Some("\nreal\n\n".to_string()));
    }

    #[test]
    fn test_unterminated_block_ignored() {
        let source = "/*** RST\nnever closed\nint x;\n";
        assert_eq!(extract(source, &c_pattern()), None);
    }

    #[test]
    fn test_no_cross_contamination() {
        let lua = "--[[ RST\nlua docs\n]]--\n";
        let c = "/*** RST\nc docs\n*/\n";
        assert_eq!(extract(lua, &c_pattern()), None);
        assert_eq!(extract(c, &lua_pattern()), None);
        assert_eq!(extract(lua, &lua_pattern()), Some("lua docs\n\n".to_string()));
    }

    #[test]
    fn test_tag_required() {
        let source = "/***\nno tag\n*/\n/*** MD\nwrong tag\n*/\n";
        assert_eq!(extract(source, &c_pattern()), None);
    }
}
