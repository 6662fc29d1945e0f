//! Formatting Commands
//!
//! Stateless formatting requests applied to a [`Document`] over a
//! [`DocumentSelection`].
//!
//! # Supported Formatting Commands
//! - **Inline**: Bold, Italic, Underline, Strikethrough (toggled)
//! - **Parameterized inline**: text colour, background, font size
//! - **Blocks**: block type, lists (toggle/indent/outdent), alignment,
//!   block quote
//! - **Clear formatting**
//!
//! Commands only ever add or remove *style* attributions. Entity markers
//! belong to the recognition layer and pass through every command untouched.
//!
//! # Usage
//! ```ignore
//! let selection = DocumentSelection::within_block("b1", 0, 5);
//! let result = apply_format(
//!     &mut document,
//!     &selection,
//!     &FormatCommand::ToggleInlineStyle(InlineStyle::Bold),
//!     &settings,
//! )?;
//! assert!(result.applied);
//! ```

use crate::attribution::{
    Attribution, AttributionFamily, BlockMetadata, BlockType, Color, HeadingLevel, InlineStyle,
    ListKind, ListMembership, TextAlignment,
};
use crate::config::Settings;
use crate::document::{BlockId, Document, DocumentSelection, SelectedBlock};
use crate::error::Result;
use crate::text::SpanRange;
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Format Command Enum
// ─────────────────────────────────────────────────────────────────────────────

/// Formatting commands that can be applied to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    /// Toggle a parameterless inline style
    ToggleInlineStyle(InlineStyle),
    /// Set (or with `None`, remove) the text colour
    SetTextColor(Option<Color>),
    /// Set (or with `None`, remove) the background colour
    SetBackground(Option<Color>),
    /// Set (or with `None`, remove) the font size in points
    SetFontSize(Option<u16>),
    /// Replace block metadata with that of a block type
    ChangeBlockType(BlockType),
    /// Toggle list membership of the given kind
    ToggleList(ListKind),
    /// Nest list items one level deeper
    IndentListItem,
    /// Un-nest list items; top-level items become paragraphs
    OutdentListItem,
    /// Set block alignment
    SetAlignment(TextAlignment),
    /// Toggle the block-quote flag
    ToggleBlockQuote,
    /// Remove inline styles and reset block metadata
    ClearFormatting,
}

impl FormatCommand {
    /// Get the keyboard shortcut label for this command.
    pub fn shortcut_label(&self) -> &'static str {
        match self {
            Self::ToggleInlineStyle(InlineStyle::Bold) => "Ctrl+B",
            Self::ToggleInlineStyle(InlineStyle::Italic) => "Ctrl+I",
            Self::ToggleInlineStyle(InlineStyle::Underline) => "Ctrl+U",
            Self::ToggleInlineStyle(InlineStyle::Strikethrough) => "Ctrl+Shift+S",
            Self::ChangeBlockType(BlockType::Heading(HeadingLevel::H1)) => "Ctrl+1",
            Self::ChangeBlockType(BlockType::Heading(HeadingLevel::H2)) => "Ctrl+2",
            Self::ChangeBlockType(BlockType::Heading(HeadingLevel::H3)) => "Ctrl+3",
            Self::ChangeBlockType(BlockType::Paragraph) => "Ctrl+0",
            Self::ToggleList(ListKind::Unordered) => "Ctrl+Shift+B",
            Self::ToggleList(ListKind::Ordered) => "Ctrl+Shift+N",
            Self::IndentListItem => "Tab",
            Self::OutdentListItem => "Shift+Tab",
            Self::SetAlignment(TextAlignment::Left) => "Ctrl+Shift+L",
            Self::SetAlignment(TextAlignment::Center) => "Ctrl+Shift+E",
            Self::SetAlignment(TextAlignment::Right) => "Ctrl+Shift+R",
            Self::SetAlignment(TextAlignment::Justify) => "Ctrl+Shift+J",
            Self::ToggleBlockQuote => "Ctrl+Q",
            Self::ClearFormatting => "Ctrl+\\",
            _ => "",
        }
    }

    /// Human-readable name of the command.
    pub fn label(&self) -> String {
        match self {
            Self::ToggleInlineStyle(InlineStyle::Bold) => "Bold".to_string(),
            Self::ToggleInlineStyle(InlineStyle::Italic) => "Italic".to_string(),
            Self::ToggleInlineStyle(InlineStyle::Underline) => "Underline".to_string(),
            Self::ToggleInlineStyle(InlineStyle::Strikethrough) => "Strikethrough".to_string(),
            Self::SetTextColor(Some(color)) => format!("Text Color {}", color),
            Self::SetTextColor(None) => "Remove Text Color".to_string(),
            Self::SetBackground(Some(color)) => format!("Highlight {}", color),
            Self::SetBackground(None) => "Remove Highlight".to_string(),
            Self::SetFontSize(Some(size)) => format!("Font Size {}pt", size),
            Self::SetFontSize(None) => "Default Font Size".to_string(),
            Self::ChangeBlockType(block_type) => block_type.label(),
            Self::ToggleList(ListKind::Unordered) => "Bullet List".to_string(),
            Self::ToggleList(ListKind::Ordered) => "Numbered List".to_string(),
            Self::IndentListItem => "Indent".to_string(),
            Self::OutdentListItem => "Outdent".to_string(),
            Self::SetAlignment(alignment) => format!("Align {}", alignment.as_str()),
            Self::ToggleBlockQuote => "Block Quote".to_string(),
            Self::ClearFormatting => "Clear Formatting".to_string(),
        }
    }

    /// Get the tooltip text for this command.
    pub fn tooltip(&self) -> String {
        let shortcut = self.shortcut_label();
        if shortcut.is_empty() {
            self.label()
        } else {
            format!("{} ({})", self.label(), shortcut)
        }
    }

    /// Parse a command name such as `bold`, `heading2`, `color=#FF0000`,
    /// `size=18` or `align=center`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let (key, value) = match name.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), Some(value.trim().to_string())),
            None => (name, None),
        };

        let command = match (key.as_str(), value.as_deref()) {
            ("bold", None) => Self::ToggleInlineStyle(InlineStyle::Bold),
            ("italic", None) => Self::ToggleInlineStyle(InlineStyle::Italic),
            ("underline", None) => Self::ToggleInlineStyle(InlineStyle::Underline),
            ("strikethrough", None) => Self::ToggleInlineStyle(InlineStyle::Strikethrough),
            ("color", None) => Self::SetTextColor(None),
            ("color", Some(hex)) => Self::SetTextColor(Some(Color::parse_hex(hex)?)),
            ("background", None) => Self::SetBackground(None),
            ("background", Some(hex)) => Self::SetBackground(Some(Color::parse_hex(hex)?)),
            ("size", None) => Self::SetFontSize(None),
            ("size", Some(points)) => Self::SetFontSize(Some(points.parse().ok()?)),
            ("paragraph", None) => Self::ChangeBlockType(BlockType::Paragraph),
            ("bullets", None) => Self::ToggleList(ListKind::Unordered),
            ("numbers", None) => Self::ToggleList(ListKind::Ordered),
            ("indent", None) => Self::IndentListItem,
            ("outdent", None) => Self::OutdentListItem,
            ("align", Some(alignment)) => Self::SetAlignment(TextAlignment::parse(alignment)?),
            ("quote", None) => Self::ToggleBlockQuote,
            ("clear", None) => Self::ClearFormatting,
            (heading, None) if heading.starts_with("heading") => {
                let level = heading.trim_start_matches("heading").parse().ok()?;
                Self::ChangeBlockType(BlockType::Heading(HeadingLevel::from_level(level)?))
            }
            _ => return None,
        };
        Some(command)
    }

    /// True for commands that act on character ranges rather than blocks.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::ToggleInlineStyle(_)
                | Self::SetTextColor(_)
                | Self::SetBackground(_)
                | Self::SetFontSize(_)
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Format Result
// ─────────────────────────────────────────────────────────────────────────────

/// Result of applying a formatting command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatResult {
    /// Whether the document changed
    pub applied: bool,
    /// Whether the command removed formatting rather than adding it
    pub toggled_off: bool,
    /// Blocks whose spans or metadata changed
    pub changed_blocks: Vec<BlockId>,
}

impl FormatResult {
    fn with_changes(changed_blocks: Vec<BlockId>) -> Self {
        Self {
            applied: !changed_blocks.is_empty(),
            toggled_off: false,
            changed_blocks,
        }
    }

    /// Mark that formatting was removed rather than applied.
    fn toggled_off(mut self) -> Self {
        self.toggled_off = true;
        self
    }

    /// Nothing was applied (e.g., no characters selected).
    pub fn not_applied() -> Self {
        Self::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command Application
// ─────────────────────────────────────────────────────────────────────────────

/// Apply `command` to the blocks touched by `selection`.
///
/// Inline commands on a collapsed selection are not applied here; the
/// editor routes them to its composer styles instead.
pub fn apply_format(
    document: &mut Document,
    selection: &DocumentSelection,
    command: &FormatCommand,
    settings: &Settings,
) -> Result<FormatResult> {
    let touched = document.selected_ranges(selection)?;
    debug!(
        "Applying {:?} to {} block(s)",
        command,
        touched.len()
    );

    match *command {
        FormatCommand::ToggleInlineStyle(style) => {
            toggle_inline(document, &touched, &style.attribution())
        }
        FormatCommand::SetTextColor(color) => set_family(
            document,
            &touched,
            AttributionFamily::TextColor,
            color.map(Attribution::TextColor),
        ),
        FormatCommand::SetBackground(color) => set_family(
            document,
            &touched,
            AttributionFamily::Background,
            color.map(Attribution::Background),
        ),
        FormatCommand::SetFontSize(size) => set_family(
            document,
            &touched,
            AttributionFamily::FontSize,
            size.map(|points| Attribution::FontSize(settings.clamp_font_size(points))),
        ),
        FormatCommand::ChangeBlockType(block_type) => update_metadata(document, &touched, |_| {
            BlockMetadata::for_type(block_type)
        }),
        FormatCommand::ToggleList(kind) => toggle_list(document, &touched, kind),
        FormatCommand::IndentListItem => {
            let max_indent = settings.max_list_indent;
            update_metadata(document, &touched, |metadata| {
                let mut next = *metadata;
                if let Some(list) = next.list.as_mut() {
                    if list.indent < max_indent {
                        list.indent += 1;
                    }
                }
                next
            })
        }
        FormatCommand::OutdentListItem => update_metadata(document, &touched, |metadata| {
            let mut next = *metadata;
            match next.list {
                Some(list) if list.indent > 0 => {
                    next.list = Some(ListMembership::new(list.kind, list.indent - 1))
                }
                Some(_) => next.list = None,
                None => {}
            }
            next
        }),
        FormatCommand::SetAlignment(alignment) => update_metadata(document, &touched, |metadata| {
            BlockMetadata {
                alignment: Some(alignment),
                ..*metadata
            }
        }),
        FormatCommand::ToggleBlockQuote => toggle_block_quote(document, &touched),
        FormatCommand::ClearFormatting => {
            clear_formatting(document, &touched, selection.is_collapsed())
        }
    }
}

/// Selected blocks that contribute at least one character.
fn covered_ranges(touched: &[SelectedBlock]) -> Vec<(&BlockId, SpanRange)> {
    touched
        .iter()
        .filter_map(|selected| selected.range.map(|range| (&selected.block_id, range)))
        .collect()
}

fn toggle_inline(
    document: &mut Document,
    touched: &[SelectedBlock],
    attribution: &Attribution,
) -> Result<FormatResult> {
    let covered = covered_ranges(touched);
    if covered.is_empty() {
        return Ok(FormatResult::not_applied());
    }

    let mut already_applied = true;
    for (block_id, range) in &covered {
        if !document
            .text(block_id)?
            .has_attribution_throughout(attribution, *range)
        {
            already_applied = false;
            break;
        }
    }

    let mut changed = Vec::with_capacity(covered.len());
    for (block_id, range) in covered {
        let text = document.text_mut(block_id)?;
        if already_applied {
            text.remove_attribution(attribution, range)?;
        } else {
            text.add_attribution(attribution.clone(), range)?;
        }
        changed.push(block_id.clone());
    }

    let result = FormatResult::with_changes(changed);
    Ok(if already_applied {
        result.toggled_off()
    } else {
        result
    })
}

fn set_family(
    document: &mut Document,
    touched: &[SelectedBlock],
    family: AttributionFamily,
    value: Option<Attribution>,
) -> Result<FormatResult> {
    let covered = covered_ranges(touched);
    let mut changed = Vec::with_capacity(covered.len());

    for (block_id, range) in covered {
        let text = document.text_mut(block_id)?;
        let before = text.clone();
        match &value {
            Some(attribution) => text.add_attribution(attribution.clone(), range)?,
            None => {
                text.remove_family(family, range)?;
            }
        }
        if *text != before {
            changed.push(block_id.clone());
        }
    }

    let result = FormatResult::with_changes(changed);
    Ok(if value.is_none() && result.applied {
        result.toggled_off()
    } else {
        result
    })
}

fn update_metadata<F>(
    document: &mut Document,
    touched: &[SelectedBlock],
    update: F,
) -> Result<FormatResult>
where
    F: Fn(&BlockMetadata) -> BlockMetadata,
{
    let mut changed = Vec::new();
    for selected in touched {
        let metadata = document.metadata_mut(&selected.block_id)?;
        let next = update(metadata);
        if next != *metadata {
            *metadata = next;
            changed.push(selected.block_id.clone());
        }
    }
    Ok(FormatResult::with_changes(changed))
}

fn all_blocks<F>(document: &Document, touched: &[SelectedBlock], predicate: F) -> bool
where
    F: Fn(&BlockMetadata) -> bool,
{
    !touched.is_empty()
        && touched.iter().all(|selected| {
            document
                .get(&selected.block_id)
                .and_then(|block| block.metadata())
                .map_or(false, &predicate)
        })
}

fn toggle_list(
    document: &mut Document,
    touched: &[SelectedBlock],
    kind: ListKind,
) -> Result<FormatResult> {
    let all_in_list = all_blocks(document, touched, |metadata| {
        metadata.list.map(|list| list.kind) == Some(kind)
    });

    if all_in_list {
        let result = update_metadata(document, touched, |metadata| BlockMetadata {
            list: None,
            ..*metadata
        })?;
        return Ok(result.toggled_off());
    }

    update_metadata(document, touched, |metadata| {
        let indent = metadata.list.map_or(0, |list| list.indent);
        BlockMetadata {
            heading: None,
            list: Some(ListMembership::new(kind, indent)),
            ..*metadata
        }
    })
}

fn toggle_block_quote(document: &mut Document, touched: &[SelectedBlock]) -> Result<FormatResult> {
    let all_quoted = all_blocks(document, touched, |metadata| metadata.block_quote);

    if all_quoted {
        let result = update_metadata(document, touched, |metadata| BlockMetadata {
            block_quote: false,
            ..*metadata
        })?;
        return Ok(result.toggled_off());
    }

    update_metadata(document, touched, |metadata| BlockMetadata {
        heading: None,
        list: None,
        block_quote: true,
        ..*metadata
    })
}

fn clear_formatting(
    document: &mut Document,
    touched: &[SelectedBlock],
    whole_blocks: bool,
) -> Result<FormatResult> {
    let mut changed = Vec::new();

    for selected in touched {
        let mut block_changed = false;
        let text = document.text_mut(&selected.block_id)?;
        let range = if whole_blocks {
            text.full_range()
        } else {
            selected.range
        };
        if let Some(range) = range {
            block_changed |= text.remove_styles(range)?;
        }

        let metadata = document.metadata_mut(&selected.block_id)?;
        if !metadata.is_default() {
            *metadata = BlockMetadata::default();
            block_changed = true;
        }

        if block_changed {
            changed.push(selected.block_id.clone());
        }
    }

    Ok(FormatResult::with_changes(changed).toggled_off())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
