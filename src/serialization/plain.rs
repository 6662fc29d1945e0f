//! Plain-text import
//!
//! Every line becomes a paragraph. Lines made only of three or more `-`,
//! `*` or `_` characters become horizontal rules.

use crate::document::{Block, Document};
use crate::error::Result;
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

fn rule_pattern() -> &'static Regex {
    static RULE: OnceLock<Regex> = OnceLock::new();
    RULE.get_or_init(|| {
        Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").expect("Rule pattern should always compile")
    })
}

/// Whether `line` is a horizontal-rule marker.
pub fn is_rule_line(line: &str) -> bool {
    rule_pattern().is_match(line)
}

/// Build a document from plain text.
pub fn import_plain_text(input: &str) -> Result<Document> {
    let mut document = Document::new();
    for line in input.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let id = document.generate_block_id();
        let block = if is_rule_line(line) {
            Block::horizontal_rule(id)
        } else {
            Block::paragraph(id, line)
        };
        document.push(block)?;
    }
    debug!("Imported {} block(s) from plain text", document.len());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_lines() {
        assert!(is_rule_line("---"));
        assert!(is_rule_line("  *****  "));
        assert!(is_rule_line("___"));
        assert!(!is_rule_line("--"));
        assert!(!is_rule_line("-*-"));
        assert!(!is_rule_line("--- text"));
        assert!(!is_rule_line(""));
    }

    #[test]
    fn test_import_lines() {
        let document = import_plain_text("Chapter One\r\n***\nIt was dark.").unwrap();
        assert_eq!(document.len(), 3);
        assert_eq!(document.block_at(0).and_then(|b| b.text()).map(|t| t.text()), Some("Chapter One"));
        assert!(!document.block_at(1).unwrap().is_text());
        assert_eq!(document.plain_text(), "Chapter One\n---\nIt was dark.");
    }

    #[test]
    fn test_import_empty_input() {
        let document = import_plain_text("").unwrap();
        assert_eq!(document.len(), 1);
        assert!(document.block_at(0).unwrap().text().unwrap().is_empty());
    }
}
