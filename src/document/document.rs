//! The block-structured document
//!
//! A [`Document`] is an ordered list of blocks with unique ids. Besides
//! block bookkeeping it provides the structural text edits used by the
//! editor: inserting text (newlines split paragraphs), deleting a selection
//! (merging the blocks at either end), and inserting horizontal rules.

use super::{Block, BlockContent, BlockId, DocumentPosition, DocumentSelection};
use crate::attribution::{Attribution, BlockMetadata};
use crate::error::{Error, Result};
use crate::text::{AttributedText, SpanRange};
use log::debug;
use std::collections::HashSet;

/// Marker written for horizontal rules in plain-text output.
pub const PLAIN_TEXT_RULE: &str = "---";

/// Ordered blocks with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Document {
    blocks: Vec<Block>,
    next_id: u64,
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // The id counter is bookkeeping, not content
        self.blocks == other.blocks
    }
}

impl Eq for Document {}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document, rejecting duplicate block ids.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(blocks.len());
        for block in &blocks {
            if !seen.insert(block.id.clone()) {
                return Err(Error::DuplicateBlockId(block.id.to_string()));
            }
        }
        Ok(Self { blocks, next_id: 0 })
    }

    /// A document holding one unformatted paragraph.
    pub fn with_paragraph(text: &str) -> Self {
        let mut document = Self::new();
        let id = document.generate_block_id();
        document.blocks.push(Block::paragraph(id, text));
        document
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| &block.id == id)
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| &block.id == id)
    }

    pub fn get_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| &block.id == id)
    }

    pub fn block_at(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn require(&self, id: &BlockId) -> Result<&Block> {
        self.get(id)
            .ok_or_else(|| Error::BlockNotFound(id.to_string()))
    }

    pub fn require_mut(&mut self, id: &BlockId) -> Result<&mut Block> {
        self.get_mut(id)
            .ok_or_else(|| Error::BlockNotFound(id.to_string()))
    }

    /// The text of a paragraph block.
    pub fn text(&self, id: &BlockId) -> Result<&AttributedText> {
        self.require(id)?
            .text()
            .ok_or_else(|| Error::NotATextBlock(id.to_string()))
    }

    pub fn text_mut(&mut self, id: &BlockId) -> Result<&mut AttributedText> {
        self.require_mut(id)?
            .text_mut()
            .ok_or_else(|| Error::NotATextBlock(id.to_string()))
    }

    pub fn metadata_mut(&mut self, id: &BlockId) -> Result<&mut BlockMetadata> {
        self.require_mut(id)?
            .metadata_mut()
            .ok_or_else(|| Error::NotATextBlock(id.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block Bookkeeping
    // ─────────────────────────────────────────────────────────────────────────

    /// A fresh id not used by any block.
    pub fn generate_block_id(&mut self) -> BlockId {
        loop {
            self.next_id += 1;
            let candidate = BlockId::new(format!("block-{}", self.next_id));
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Insert `block` at `index` (clamped to the end).
    pub fn insert_block(&mut self, index: usize, block: Block) -> Result<()> {
        if self.contains(&block.id) {
            return Err(Error::DuplicateBlockId(block.id.to_string()));
        }
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        Ok(())
    }

    pub fn insert_after(&mut self, id: &BlockId, block: Block) -> Result<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Error::BlockNotFound(id.to_string()))?;
        self.insert_block(index + 1, block)
    }

    pub fn push(&mut self, block: Block) -> Result<()> {
        let end = self.blocks.len();
        self.insert_block(end, block)
    }

    pub fn remove_block(&mut self, id: &BlockId) -> Result<Block> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Error::BlockNotFound(id.to_string()))?;
        Ok(self.blocks.remove(index))
    }

    /// Split a paragraph at `offset`, moving the tail into a new block after it.
    ///
    /// The new block keeps list, quote and alignment metadata; a heading is
    /// followed by a plain paragraph. Returns the new block's id.
    pub fn split_paragraph(&mut self, id: &BlockId, offset: usize) -> Result<BlockId> {
        let new_id = self.generate_block_id();
        let block = self.require_mut(id)?;
        let BlockContent::Paragraph { text, metadata } = &mut block.content else {
            return Err(Error::NotATextBlock(id.to_string()));
        };

        let (head, tail) = text.split_at(offset)?;
        *text = head;
        let mut tail_metadata = *metadata;
        tail_metadata.heading = None;

        self.insert_after(id, Block::paragraph_with(new_id.clone(), tail, tail_metadata))?;
        debug!("Split block '{}' at {} into '{}'", id, offset, new_id);
        Ok(new_id)
    }

    /// Merge the block after `id` into it.
    ///
    /// A following horizontal rule is simply removed. Returns `false` when
    /// `id` is the last block.
    pub fn merge_with_next(&mut self, id: &BlockId) -> Result<bool> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Error::BlockNotFound(id.to_string()))?;
        if !self.blocks[index].is_text() {
            return Err(Error::NotATextBlock(id.to_string()));
        }
        if index + 1 >= self.blocks.len() {
            return Ok(false);
        }

        let next = self.blocks.remove(index + 1);
        if let BlockContent::Paragraph { text: tail, .. } = next.content {
            if let Some(text) = self.blocks[index].text_mut() {
                text.append(tail);
            }
        }
        debug!("Merged block '{}' into '{}'", next.id, id);
        Ok(true)
    }

    /// Text of every block, one line per block.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match &block.content {
                BlockContent::Paragraph { text, .. } => text.text(),
                BlockContent::HorizontalRule => PLAIN_TEXT_RULE,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structural Text Edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert `text` at `position`; each `\n` starts a new paragraph.
    ///
    /// Inserted characters carry exactly `styles`. Returns the caret after
    /// the inserted text.
    pub fn insert_text(
        &mut self,
        position: &DocumentPosition,
        text: &str,
        styles: &[Attribution],
    ) -> Result<DocumentPosition> {
        let mut caret = position.clone();
        for (line_index, line) in text.split('\n').enumerate() {
            if line_index > 0 {
                let new_id = self.split_paragraph(&caret.block_id, caret.offset)?;
                caret = DocumentPosition::new(new_id, 0);
            }
            let target = self.text_mut(&caret.block_id)?;
            target.insert_text(caret.offset, line, styles)?;
            caret.offset += line.chars().count();
        }
        Ok(caret)
    }

    /// Delete the selected content, merging the first and last blocks.
    ///
    /// Returns the caret where the selection collapsed to.
    pub fn delete_selection(&mut self, selection: &DocumentSelection) -> Result<DocumentPosition> {
        let normalized = self.normalize_selection(selection)?;
        if normalized.is_collapsed() {
            return Ok(normalized.start);
        }

        let start = normalized.start;
        let end = normalized.end;

        if normalized.start_index == normalized.end_index {
            let index = normalized.start_index;
            if let Some(text) = self.blocks[index].text_mut() {
                if let Some(range) = SpanRange::from_exclusive(start.offset, end.offset) {
                    text.delete_range(range)?;
                }
                return Ok(start);
            }
            self.blocks.remove(index);
            return Ok(self.caret_at_index(index));
        }

        // Tail block: drop its selected head.
        let end_survives = match &mut self.blocks[normalized.end_index].content {
            BlockContent::Paragraph { text, .. } => {
                if let Some(range) = SpanRange::from_exclusive(0, end.offset) {
                    text.delete_range(range)?;
                }
                true
            }
            BlockContent::HorizontalRule => end.offset == 0,
        };
        if !end_survives {
            self.blocks.remove(normalized.end_index);
        }

        // Everything strictly between the endpoints goes.
        self.blocks
            .drain(normalized.start_index + 1..normalized.end_index);

        // Head block: drop its selected tail.
        let head_index = normalized.start_index;
        let head_is_text = match &mut self.blocks[head_index].content {
            BlockContent::Paragraph { text, .. } => {
                let len = text.len();
                if let Some(range) = SpanRange::from_exclusive(start.offset, len) {
                    text.delete_range(range)?;
                }
                true
            }
            BlockContent::HorizontalRule => false,
        };

        if head_is_text {
            if end_survives && self.blocks.get(head_index + 1).map_or(false, Block::is_text) {
                self.merge_with_next(&start.block_id)?;
            }
            return Ok(start);
        }

        // The head is a rule: fully selected when the selection began before it.
        if start.offset == 0 {
            self.blocks.remove(head_index);
            Ok(self.caret_at_index(head_index))
        } else {
            Ok(self.caret_at_index(head_index + 1))
        }
    }

    /// Insert a horizontal rule at `position`, splitting a paragraph if needed.
    ///
    /// Returns the caret after the rule.
    pub fn insert_horizontal_rule(&mut self, position: &DocumentPosition) -> Result<DocumentPosition> {
        let index = self
            .index_of(&position.block_id)
            .ok_or_else(|| Error::BlockNotFound(position.block_id.to_string()))?;
        let rule_id = self.generate_block_id();

        let text_len = self.blocks[index].text().map(AttributedText::len);
        let rule_index = match text_len {
            None => index + 1,
            Some(len) if position.offset > len => {
                return Err(Error::InvalidSelection(format!(
                    "offset {} is past the end of block '{}'",
                    position.offset, position.block_id
                )));
            }
            Some(_) if position.offset == 0 => index,
            Some(len) if position.offset == len => index + 1,
            Some(_) => {
                self.split_paragraph(&position.block_id, position.offset)?;
                index + 1
            }
        };

        self.insert_block(rule_index, Block::horizontal_rule(rule_id))?;
        Ok(self.caret_at_index(rule_index + 1))
    }

    /// Caret at the start of the block at `index`, appending an empty
    /// paragraph when the index is past the end.
    fn caret_at_index(&mut self, index: usize) -> DocumentPosition {
        if let Some(block) = self.blocks.get(index) {
            return DocumentPosition::new(block.id.clone(), 0);
        }
        let id = self.generate_block_id();
        self.blocks.push(Block::paragraph(id.clone(), ""));
        DocumentPosition::new(id, 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::{BlockType, EntityKind, EntityRef, HeadingLevel, ListKind};

    fn doc(blocks: Vec<Block>) -> Document {
        Document::from_blocks(blocks).unwrap()
    }

    fn id(value: &str) -> BlockId {
        BlockId::from(value)
    }

    fn texts(document: &Document) -> Vec<String> {
        document
            .iter()
            .map(|block| match block.text() {
                Some(text) => text.text().to_string(),
                None => PLAIN_TEXT_RULE.to_string(),
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bookkeeping Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_from_blocks_rejects_duplicates() {
        let result = Document::from_blocks(vec![
            Block::paragraph("a", "one"),
            Block::paragraph("a", "two"),
        ]);
        assert!(matches!(result, Err(Error::DuplicateBlockId(dup)) if dup == "a"));
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut document = doc(vec![Block::paragraph("a", "one")]);
        assert!(document.push(Block::paragraph("a", "again")).is_err());
        assert_eq!(document.len(), 1);
    }

    #[test]
    fn test_generate_block_id_skips_existing() {
        let mut document = doc(vec![Block::paragraph("block-1", "taken")]);
        let fresh = document.generate_block_id();
        assert_eq!(fresh, id("block-2"));
    }

    #[test]
    fn test_insert_after_and_remove() {
        let mut document = doc(vec![Block::paragraph("a", "one"), Block::paragraph("c", "three")]);
        document.insert_after(&id("a"), Block::paragraph("b", "two")).unwrap();
        assert_eq!(texts(&document), vec!["one", "two", "three"]);

        let removed = document.remove_block(&id("a")).unwrap();
        assert_eq!(removed.id, id("a"));
        assert!(document.remove_block(&id("a")).is_err());
    }

    #[test]
    fn test_text_of_rule_is_error() {
        let document = doc(vec![Block::horizontal_rule("hr")]);
        assert!(matches!(document.text(&id("hr")), Err(Error::NotATextBlock(_))));
    }

    #[test]
    fn test_plain_text() {
        let document = doc(vec![
            Block::paragraph("a", "one"),
            Block::horizontal_rule("hr"),
            Block::paragraph("b", "two"),
        ]);
        assert_eq!(document.plain_text(), "one\n---\ntwo");
    }

    #[test]
    fn test_equality_ignores_id_counter() {
        let mut left = doc(vec![Block::paragraph("a", "one")]);
        let right = left.clone();
        left.generate_block_id();
        assert_eq!(left, right);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Split / Merge Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_split_heading_yields_paragraph() {
        let metadata = BlockMetadata::for_type(BlockType::Heading(HeadingLevel::H1));
        let mut document = doc(vec![Block::paragraph_with("a", "Title rest", metadata)]);
        let new_id = document.split_paragraph(&id("a"), 5).unwrap();

        assert_eq!(texts(&document), vec!["Title", " rest"]);
        let tail = document.get(&new_id).unwrap();
        assert_eq!(tail.metadata().unwrap().block_type(), BlockType::Paragraph);
    }

    #[test]
    fn test_split_list_item_keeps_list() {
        let metadata = BlockMetadata::for_type(BlockType::ListItem(ListKind::Ordered));
        let mut document = doc(vec![Block::paragraph_with("a", "onetwo", metadata)]);
        let new_id = document.split_paragraph(&id("a"), 3).unwrap();
        assert_eq!(
            document.get(&new_id).unwrap().metadata().unwrap().block_type(),
            BlockType::ListItem(ListKind::Ordered)
        );
    }

    #[test]
    fn test_merge_with_next() {
        let mut document = doc(vec![Block::paragraph("a", "Hello "), Block::paragraph("b", "world")]);
        assert!(document.merge_with_next(&id("a")).unwrap());
        assert_eq!(texts(&document), vec!["Hello world"]);
        assert!(!document.merge_with_next(&id("a")).unwrap());
    }

    #[test]
    fn test_merge_removes_following_rule() {
        let mut document = doc(vec![Block::paragraph("a", "x"), Block::horizontal_rule("hr")]);
        assert!(document.merge_with_next(&id("a")).unwrap());
        assert_eq!(document.len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text Edit Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_insert_text_with_newlines() {
        let mut document = doc(vec![Block::paragraph("a", "startend")]);
        let caret = document
            .insert_text(&DocumentPosition::new("a", 5), "-one\ntwo\n", &[])
            .unwrap();

        assert_eq!(texts(&document), vec!["start-one", "two", "end"]);
        assert_eq!(caret.offset, 0);
        assert_eq!(document.text(&caret.block_id).unwrap().text(), "end");
    }

    #[test]
    fn test_insert_text_into_rule_fails() {
        let mut document = doc(vec![Block::horizontal_rule("hr")]);
        let result = document.insert_text(&DocumentPosition::new("hr", 0), "x", &[]);
        assert!(matches!(result, Err(Error::NotATextBlock(_))));
    }

    #[test]
    fn test_delete_within_block() {
        let mut document = doc(vec![Block::paragraph("a", "Hello world")]);
        let caret = document
            .delete_selection(&DocumentSelection::within_block("a", 5, 11))
            .unwrap();
        assert_eq!(texts(&document), vec!["Hello"]);
        assert_eq!(caret, DocumentPosition::new("a", 5));
    }

    #[test]
    fn test_delete_across_blocks_merges() {
        let mut document = doc(vec![
            Block::paragraph("a", "Keep this"),
            Block::horizontal_rule("hr"),
            Block::paragraph("b", "gone"),
            Block::paragraph("c", "cut here"),
        ]);
        let selection = DocumentSelection::new(
            DocumentPosition::new("a", 5),
            DocumentPosition::new("c", 4),
        );
        let caret = document.delete_selection(&selection).unwrap();

        assert_eq!(texts(&document), vec!["Keep here"]);
        assert_eq!(caret, DocumentPosition::new("a", 5));
    }

    #[test]
    fn test_delete_across_blocks_preserves_entities_outside_selection() {
        let mut tail = AttributedText::new("Jon waits");
        tail.add_entity(EntityRef::new("jon", EntityKind::Character), SpanRange::new(0, 2))
            .unwrap();
        let mut document = doc(vec![Block::paragraph("a", "Mara and "), Block::paragraph("b", tail)]);

        let selection = DocumentSelection::new(
            DocumentPosition::new("a", 9),
            DocumentPosition::new("b", 0),
        );
        document.delete_selection(&selection).unwrap();

        let merged = document.text(&id("a")).unwrap();
        assert_eq!(merged.text(), "Mara and Jon waits");
        let span = merged.entity_spans().next().unwrap();
        assert_eq!((span.start, span.end), (9, 11));
    }

    #[test]
    fn test_delete_selected_rule() {
        let mut document = doc(vec![Block::paragraph("a", "x"), Block::horizontal_rule("hr")]);
        let selection = DocumentSelection::new(
            DocumentPosition::new("hr", 0),
            DocumentPosition::new("hr", 1),
        );
        let caret = document.delete_selection(&selection).unwrap();

        assert_eq!(document.len(), 2);
        assert!(document.block_at(1).unwrap().is_text());
        assert_eq!(caret.offset, 0);
    }

    #[test]
    fn test_insert_horizontal_rule_mid_paragraph() {
        let mut document = doc(vec![Block::paragraph("a", "beforeafter")]);
        let caret = document
            .insert_horizontal_rule(&DocumentPosition::new("a", 6))
            .unwrap();

        assert_eq!(texts(&document), vec!["before", "---", "after"]);
        assert_eq!(document.text(&caret.block_id).unwrap().text(), "after");
    }

    #[test]
    fn test_insert_horizontal_rule_at_end_adds_paragraph() {
        let mut document = doc(vec![Block::paragraph("a", "end")]);
        let caret = document
            .insert_horizontal_rule(&DocumentPosition::new("a", 3))
            .unwrap();

        assert_eq!(texts(&document), vec!["end", "---", ""]);
        assert_eq!(caret.offset, 0);
    }
}
