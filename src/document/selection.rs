//! Document positions and selections
//!
//! A [`DocumentPosition`] is a caret *before* the character at `offset`
//! inside a block. A [`DocumentSelection`] runs from `base` to `extent`
//! in either direction; [`Document::normalize_selection`] orders it.

use super::{BlockId, Document};
use crate::error::{Error, Result};
use crate::text::SpanRange;

/// A caret position inside one block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPosition {
    pub block_id: BlockId,
    pub offset: usize,
}

impl DocumentPosition {
    pub fn new(block_id: impl Into<BlockId>, offset: usize) -> Self {
        Self {
            block_id: block_id.into(),
            offset,
        }
    }
}

/// A possibly-collapsed, possibly-backwards selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentSelection {
    pub base: DocumentPosition,
    pub extent: DocumentPosition,
}

impl DocumentSelection {
    pub fn new(base: DocumentPosition, extent: DocumentPosition) -> Self {
        Self { base, extent }
    }

    pub fn collapsed(position: DocumentPosition) -> Self {
        Self {
            base: position.clone(),
            extent: position,
        }
    }

    /// Select characters `[start, end)` of one block.
    pub fn within_block(block_id: impl Into<BlockId>, start: usize, end: usize) -> Self {
        let block_id = block_id.into();
        Self {
            base: DocumentPosition::new(block_id.clone(), start),
            extent: DocumentPosition::new(block_id, end),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.base == self.extent
    }
}

/// A selection resolved against a document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSelection {
    pub start: DocumentPosition,
    pub end: DocumentPosition,
    pub start_index: usize,
    pub end_index: usize,
}

impl NormalizedSelection {
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The part of one text block covered by a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedBlock {
    pub block_id: BlockId,
    /// `None` when the selection touches the block without covering a character
    pub range: Option<SpanRange>,
}

impl Document {
    fn resolve_position(&self, position: &DocumentPosition) -> Result<usize> {
        let index = self
            .index_of(&position.block_id)
            .ok_or_else(|| Error::BlockNotFound(position.block_id.to_string()))?;
        let max = self.blocks()[index].max_offset();
        if position.offset > max {
            return Err(Error::InvalidSelection(format!(
                "offset {} is past the end of block '{}' (max {})",
                position.offset, position.block_id, max
            )));
        }
        Ok(index)
    }

    /// Resolve `selection` and order its endpoints.
    pub fn normalize_selection(&self, selection: &DocumentSelection) -> Result<NormalizedSelection> {
        let base_index = self.resolve_position(&selection.base)?;
        let extent_index = self.resolve_position(&selection.extent)?;

        let base_first = (base_index, selection.base.offset) <= (extent_index, selection.extent.offset);
        let normalized = if base_first {
            NormalizedSelection {
                start: selection.base.clone(),
                end: selection.extent.clone(),
                start_index: base_index,
                end_index: extent_index,
            }
        } else {
            NormalizedSelection {
                start: selection.extent.clone(),
                end: selection.base.clone(),
                start_index: extent_index,
                end_index: base_index,
            }
        };
        Ok(normalized)
    }

    /// The character range selected in each text block the selection touches.
    ///
    /// Horizontal rules are skipped.
    pub fn selected_ranges(&self, selection: &DocumentSelection) -> Result<Vec<SelectedBlock>> {
        let normalized = self.normalize_selection(selection)?;
        let mut selected = Vec::new();

        for index in normalized.start_index..=normalized.end_index {
            let block = &self.blocks()[index];
            let Some(text) = block.text() else {
                continue;
            };
            let from = if index == normalized.start_index {
                normalized.start.offset
            } else {
                0
            };
            let to = if index == normalized.end_index {
                normalized.end.offset
            } else {
                text.len()
            };
            selected.push(SelectedBlock {
                block_id: block.id.clone(),
                range: SpanRange::from_exclusive(from, to),
            });
        }

        Ok(selected)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
