//! Document blocks
//!
//! A block is one paragraph-level unit: a text paragraph carrying its own
//! [`BlockMetadata`], or a horizontal rule.

use crate::attribution::BlockMetadata;
use crate::text::AttributedText;
use std::fmt;

/// Identifier of a block, unique within its document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        BlockId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        BlockId::new(id)
    }
}

/// What a block holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    Paragraph {
        text: AttributedText,
        metadata: BlockMetadata,
    },
    HorizontalRule,
}

/// A block in a [`Document`](super::Document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub content: BlockContent,
}

impl Block {
    pub fn paragraph(id: impl Into<BlockId>, text: impl Into<AttributedText>) -> Self {
        Self::paragraph_with(id, text, BlockMetadata::default())
    }

    pub fn paragraph_with(
        id: impl Into<BlockId>,
        text: impl Into<AttributedText>,
        metadata: BlockMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            content: BlockContent::Paragraph {
                text: text.into(),
                metadata,
            },
        }
    }

    pub fn horizontal_rule(id: impl Into<BlockId>) -> Self {
        Self {
            id: id.into(),
            content: BlockContent::HorizontalRule,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.content, BlockContent::Paragraph { .. })
    }

    pub fn text(&self) -> Option<&AttributedText> {
        match &self.content {
            BlockContent::Paragraph { text, .. } => Some(text),
            BlockContent::HorizontalRule => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut AttributedText> {
        match &mut self.content {
            BlockContent::Paragraph { text, .. } => Some(text),
            BlockContent::HorizontalRule => None,
        }
    }

    pub fn metadata(&self) -> Option<&BlockMetadata> {
        match &self.content {
            BlockContent::Paragraph { metadata, .. } => Some(metadata),
            BlockContent::HorizontalRule => None,
        }
    }

    pub fn metadata_mut(&mut self) -> Option<&mut BlockMetadata> {
        match &mut self.content {
            BlockContent::Paragraph { metadata, .. } => Some(metadata),
            BlockContent::HorizontalRule => None,
        }
    }

    /// Number of caret stops inside the block, minus one.
    ///
    /// Text blocks accept offsets `0..=len`; a horizontal rule accepts 0
    /// (before) and 1 (after).
    pub fn max_offset(&self) -> usize {
        match &self.content {
            BlockContent::Paragraph { text, .. } => text.len(),
            BlockContent::HorizontalRule => 1,
        }
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        BlockId(id)
    }
}
