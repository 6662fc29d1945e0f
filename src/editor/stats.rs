//! Text statistics
//!
//! Counts words, characters, paragraphs, headings and horizontal rules,
//! either from raw text or from a block document.

use crate::document::{Block, BlockContent, Document};
use crate::serialization::is_rule_line;

// ─────────────────────────────────────────────────────────────────────────────
// TextStats
// ─────────────────────────────────────────────────────────────────────────────

/// Text statistics for a document.
///
/// # Example
///
/// ```ignore
/// let stats = TextStats::from_text("Hello, World!\n\nNew paragraph.");
/// assert_eq!(stats.words, 4);
/// assert_eq!(stats.paragraphs, 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    /// Number of words (sequences of non-whitespace characters)
    pub words: usize,
    /// Number of characters including whitespace
    pub characters: usize,
    /// Number of characters excluding whitespace
    pub characters_no_spaces: usize,
    /// Number of lines (one per block for documents)
    pub lines: usize,
    /// Number of paragraphs with visible content
    pub paragraphs: usize,
    /// Number of heading blocks
    pub headings: usize,
    /// Number of horizontal rules
    pub horizontal_rules: usize,
}

impl TextStats {
    /// Create a new empty TextStats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate statistics from raw text.
    ///
    /// Paragraphs are runs of non-blank lines separated by blank lines or
    /// rule lines. Rule lines count towards `characters` only.
    pub fn from_text(text: &str) -> Self {
        let mut stats = Self::new();
        let mut in_paragraph = false;

        for (index, line) in text.split('\n').enumerate() {
            stats.lines += 1;
            stats.characters += line.chars().count();
            if index > 0 {
                // The newline that ended the previous line
                stats.characters += 1;
            }

            if is_rule_line(line) {
                stats.horizontal_rules += 1;
                in_paragraph = false;
                continue;
            }

            let has_content = stats.count_words(line);
            if !has_content {
                in_paragraph = false;
            } else if !in_paragraph {
                in_paragraph = true;
                stats.paragraphs += 1;
            }
        }

        stats
    }

    /// Calculate statistics from a document, block by block.
    pub fn from_document(document: &Document) -> Self {
        let mut stats = Self::new();
        stats.lines = document.len().max(1);

        for block in document.iter() {
            stats.add_block(block);
        }
        stats
    }

    fn add_block(&mut self, block: &Block) {
        match &block.content {
            BlockContent::HorizontalRule => self.horizontal_rules += 1,
            BlockContent::Paragraph { text, metadata } => {
                self.characters += text.len();
                let has_content = self.count_words(text.text());
                if metadata.heading.is_some() {
                    self.headings += 1;
                } else if has_content {
                    self.paragraphs += 1;
                }
            }
        }
    }

    /// Add the words and non-whitespace characters of `text`.
    ///
    /// Returns `true` if `text` has any non-whitespace character.
    fn count_words(&mut self, text: &str) -> bool {
        let mut in_word = false;
        let mut has_content = false;
        for ch in text.chars() {
            if ch.is_whitespace() {
                in_word = false;
            } else {
                self.characters_no_spaces += 1;
                has_content = true;
                if !in_word {
                    in_word = true;
                    self.words += 1;
                }
            }
        }
        has_content
    }

    /// Format the statistics on one line.
    ///
    /// Returns a compact string like "150 words | 892 chars | 5 paragraphs"
    pub fn format_compact(&self) -> String {
        format!(
            "{} words | {} chars | {} paragraphs",
            self.words, self.characters, self.paragraphs
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
