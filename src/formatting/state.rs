//! Formatting state at a selection
//!
//! Answers "what does the toolbar show" for a selection: which toggles are
//! active, which parameterized values are uniform, and the block settings
//! of the block the selection starts in.

use crate::attribution::{
    Attribution, AttributionFamily, BlockType, Color, InlineStyle, TextAlignment,
};
use crate::document::{Document, DocumentSelection};
use crate::error::Result;
use crate::text::{AttributedText, SpanRange};

/// Formatting state of the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattingState {
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    pub is_strikethrough: bool,
    /// Colour shared by every selected character, if any
    pub text_color: Option<Color>,
    pub background: Option<Color>,
    pub font_size: Option<u16>,
    /// Block settings of the first selected text block
    pub block_type: Option<BlockType>,
    pub alignment: Option<TextAlignment>,
    pub is_block_quote: bool,
    pub list_indent: Option<u8>,
}

impl FormattingState {
    /// Compute the formatting state for `selection`.
    ///
    /// For an expanded selection a toggle is active only when every selected
    /// character carries it. For a caret, the character before the caret is
    /// probed; a caret at offset 0 reports no inline formatting.
    pub fn at_selection(document: &Document, selection: &DocumentSelection) -> Result<Self> {
        let touched = document.selected_ranges(selection)?;
        let mut state = FormattingState::default();

        let mut probes: Vec<(&AttributedText, SpanRange)> = Vec::new();
        for selected in &touched {
            if let Some(range) = selected.range {
                probes.push((document.text(&selected.block_id)?, range));
            }
        }

        if probes.is_empty() {
            let caret = document.normalize_selection(selection)?.start;
            if let Some(text) = document.get(&caret.block_id).and_then(|block| block.text()) {
                if caret.offset > 0 {
                    probes.push((text, SpanRange::single(caret.offset - 1)));
                }
            }
        }

        if !probes.is_empty() {
            let active = |style: InlineStyle| {
                let attribution = style.attribution();
                probes
                    .iter()
                    .all(|(text, range)| text.has_attribution_throughout(&attribution, *range))
            };
            state.is_bold = active(InlineStyle::Bold);
            state.is_italic = active(InlineStyle::Italic);
            state.is_underline = active(InlineStyle::Underline);
            state.is_strikethrough = active(InlineStyle::Strikethrough);

            state.text_color = match uniform(&probes, AttributionFamily::TextColor) {
                Some(Attribution::TextColor(color)) => Some(color),
                _ => None,
            };
            state.background = match uniform(&probes, AttributionFamily::Background) {
                Some(Attribution::Background(color)) => Some(color),
                _ => None,
            };
            state.font_size = match uniform(&probes, AttributionFamily::FontSize) {
                Some(Attribution::FontSize(size)) => Some(size),
                _ => None,
            };
        }

        let first_metadata = touched
            .first()
            .and_then(|selected| document.get(&selected.block_id))
            .and_then(|block| block.metadata());
        if let Some(metadata) = first_metadata {
            state.block_type = Some(metadata.block_type());
            state.alignment = Some(metadata.effective_alignment());
            state.is_block_quote = metadata.block_quote;
            state.list_indent = metadata.list.map(|list| list.indent);
        }

        Ok(state)
    }

    /// Whether `style` is active.
    pub fn has_style(&self, style: InlineStyle) -> bool {
        match style {
            InlineStyle::Bold => self.is_bold,
            InlineStyle::Italic => self.is_italic,
            InlineStyle::Underline => self.is_underline,
            InlineStyle::Strikethrough => self.is_strikethrough,
        }
    }
}

/// The value of `family` shared by every probed range.
fn uniform(probes: &[(&AttributedText, SpanRange)], family: AttributionFamily) -> Option<Attribution> {
    let mut shared: Option<&Attribution> = None;
    for (text, range) in probes {
        let value = text.uniform_value(family, *range)?;
        match shared {
            Some(existing) if existing != value => return None,
            _ => shared = Some(value),
        }
    }
    shared.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::{BlockMetadata, HeadingLevel, ListKind, ListMembership};
    use crate::document::{Block, DocumentPosition};

    fn sample() -> Document {
        let mut first = AttributedText::new("Night fell fast.");
        first.add_attribution(Attribution::Bold, SpanRange::new(0, 9)).unwrap();
        first
            .add_attribution(Attribution::FontSize(18), SpanRange::new(0, 15))
            .unwrap();
        let mut second = AttributedText::new("Dawn came.");
        second.add_attribution(Attribution::Bold, SpanRange::new(0, 9)).unwrap();
        second
            .add_attribution(Attribution::FontSize(14), SpanRange::new(0, 9))
            .unwrap();

        let heading = BlockMetadata::for_type(BlockType::Heading(HeadingLevel::H2));
        let list = BlockMetadata {
            list: Some(ListMembership::new(ListKind::Ordered, 1)),
            ..BlockMetadata::default()
        };
        Document::from_blocks(vec![
            Block::paragraph_with("a", first, heading),
            Block::paragraph_with("b", second, list),
        ])
        .unwrap()
    }

    #[test]
    fn test_state_within_bold_range() {
        let document = sample();
        let state =
            FormattingState::at_selection(&document, &DocumentSelection::within_block("a", 0, 5)).unwrap();
        assert!(state.is_bold);
        assert!(!state.is_italic);
        assert_eq!(state.font_size, Some(18));
        assert_eq!(state.block_type, Some(BlockType::Heading(HeadingLevel::H2)));
        assert_eq!(state.alignment, Some(TextAlignment::Left));
    }

    #[test]
    fn test_partially_bold_is_not_bold() {
        let document = sample();
        let state =
            FormattingState::at_selection(&document, &DocumentSelection::within_block("a", 5, 16)).unwrap();
        assert!(!state.is_bold);
        assert_eq!(state.font_size, Some(18));
    }

    #[test]
    fn test_mixed_values_across_blocks() {
        let document = sample();
        let selection =
            DocumentSelection::new(DocumentPosition::new("a", 0), DocumentPosition::new("b", 4));
        let state = FormattingState::at_selection(&document, &selection).unwrap();
        assert!(!state.is_bold);
        assert_eq!(state.font_size, None);

        let bold_only = DocumentSelection::new(DocumentPosition::new("a", 2), DocumentPosition::new("a", 9));
        assert!(FormattingState::at_selection(&document, &bold_only).unwrap().is_bold);
        assert_eq!(state.block_type, Some(BlockType::Heading(HeadingLevel::H2)));
    }

    #[test]
    fn test_caret_probes_previous_character() {
        let document = sample();
        let inside = DocumentSelection::collapsed(DocumentPosition::new("a", 3));
        assert!(FormattingState::at_selection(&document, &inside).unwrap().is_bold);

        let after = DocumentSelection::collapsed(DocumentPosition::new("a", 11));
        let state = FormattingState::at_selection(&document, &after).unwrap();
        assert!(!state.has_style(InlineStyle::Bold));
        assert_eq!(state.font_size, Some(18));
    }

    #[test]
    fn test_caret_at_block_start_has_no_inline_state() {
        let document = sample();
        let caret = DocumentSelection::collapsed(DocumentPosition::new("b", 0));
        let state = FormattingState::at_selection(&document, &caret).unwrap();
        assert!(!state.is_bold);
        assert_eq!(state.font_size, None);
        assert_eq!(state.block_type, Some(BlockType::ListItem(ListKind::Ordered)));
        assert_eq!(state.list_indent, Some(1));
    }

    #[test]
    fn test_unknown_block_is_error() {
        let document = sample();
        let caret = DocumentSelection::collapsed(DocumentPosition::new("zzz", 0));
        assert!(FormattingState::at_selection(&document, &caret).is_err());
    }
}
