//! Transactional document editor
//!
//! [`DocumentEditor`] owns the document and routes every change through
//! [`DocumentEditor::execute`], which makes each request atomic and
//! undoable. It also keeps the composer styles used for the next typed
//! text and a revision counter that guards entity results against races.

use super::History;
use crate::attribution::{Attribution, AttributionFamily};
use crate::config::Settings;
use crate::document::{Document, DocumentPosition, DocumentSelection};
use crate::entities::{replace_entity_spans, EntityHighlights, EntityRequest};
use crate::error::{Error, Result};
use crate::formatting::{apply_format, FormatCommand, FormatResult, FormattingState};
use crate::serialization::{decode_document_with_report, encode_document, DecodeWarning, EncodeOptions};
use log::{debug, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Requests and Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// One editing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRequest {
    /// Apply a formatting command
    Format(FormatCommand),
    /// Type text at the selection, replacing it if expanded
    InsertText(String),
    /// Delete the selected content
    DeleteSelection,
    /// Split the paragraph at the caret (Enter)
    SplitParagraph,
    /// Insert a horizontal rule at the caret
    InsertHorizontalRule,
}

/// Result of [`DocumentEditor::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Whether the document changed
    pub changed: bool,
    /// Where the selection ends up
    pub selection: DocumentSelection,
    /// Details of a formatting request
    pub format: Option<FormatResult>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor
// ─────────────────────────────────────────────────────────────────────────────

/// A document with undo history, composer styles and a revision counter.
#[derive(Debug, Clone)]
pub struct DocumentEditor {
    document: Document,
    history: History,
    settings: Settings,
    /// Explicit styles for the next inserted text; `None` inherits from
    /// the character before the caret
    composer_styles: Option<Vec<Attribution>>,
    revision: u64,
}

impl DocumentEditor {
    /// Create an editor for `document`. The settings are sanitized first.
    pub fn new(document: Document, mut settings: Settings) -> Self {
        settings.sanitize();
        Self {
            document,
            history: History::new(settings.max_undo_depth),
            settings,
            composer_styles: None,
            revision: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, mut settings: Settings) {
        settings.sanitize();
        self.history.set_max_depth(settings.max_undo_depth);
        self.settings = settings;
    }

    /// Incremented on every document change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Composer Styles
    // ─────────────────────────────────────────────────────────────────────────

    /// Styles the next text inserted at `caret` will carry.
    pub fn composer_styles(&self, caret: &DocumentPosition) -> Vec<Attribution> {
        if let Some(styles) = &self.composer_styles {
            return styles.clone();
        }
        match self.document.text(&caret.block_id) {
            Ok(text) if caret.offset > 0 && caret.offset <= text.len() => {
                text.styles_at(caret.offset - 1)
            }
            _ => Vec::new(),
        }
    }

    /// Apply an inline command to the composer instead of the document.
    fn update_composer(&mut self, caret: &DocumentPosition, command: &FormatCommand) -> FormatResult {
        let mut styles = self.composer_styles(caret);
        let mut toggled_off = false;

        match *command {
            FormatCommand::ToggleInlineStyle(style) => {
                let attribution = style.attribution();
                if styles.contains(&attribution) {
                    styles.retain(|existing| *existing != attribution);
                    toggled_off = true;
                } else {
                    styles.push(attribution);
                }
            }
            FormatCommand::SetTextColor(color) => {
                replace_family(&mut styles, AttributionFamily::TextColor, color.map(Attribution::TextColor));
                toggled_off = color.is_none();
            }
            FormatCommand::SetBackground(color) => {
                replace_family(&mut styles, AttributionFamily::Background, color.map(Attribution::Background));
                toggled_off = color.is_none();
            }
            FormatCommand::SetFontSize(size) => {
                let size = size.map(|points| Attribution::FontSize(self.settings.clamp_font_size(points)));
                toggled_off = size.is_none();
                replace_family(&mut styles, AttributionFamily::FontSize, size);
            }
            _ => return FormatResult::not_applied(),
        }

        styles.sort();
        debug!("Composer styles now {:?}", styles);
        self.composer_styles = Some(styles);
        FormatResult {
            applied: true,
            toggled_off,
            changed_blocks: Vec::new(),
        }
    }

    /// Formatting state of `selection`, with the composer styles for a caret.
    pub fn formatting_state(&self, selection: &DocumentSelection) -> Result<FormattingState> {
        let mut state = FormattingState::at_selection(&self.document, selection)?;
        if selection.is_collapsed() && self.composer_styles.is_some() {
            let styles = self.composer_styles(&selection.base);
            state.is_bold = styles.contains(&Attribution::Bold);
            state.is_italic = styles.contains(&Attribution::Italic);
            state.is_underline = styles.contains(&Attribution::Underline);
            state.is_strikethrough = styles.contains(&Attribution::Strikethrough);
            state.text_color = None;
            state.background = None;
            state.font_size = None;
            for style in &styles {
                match style {
                    Attribution::TextColor(color) => state.text_color = Some(*color),
                    Attribution::Background(color) => state.background = Some(*color),
                    Attribution::FontSize(size) => state.font_size = Some(*size),
                    _ => {}
                }
            }
        }
        Ok(state)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `request` against `selection` as one atomic, undoable step.
    ///
    /// On error the document is left exactly as it was.
    pub fn execute(&mut self, request: EditRequest, selection: &DocumentSelection) -> Result<EditOutcome> {
        let snapshot = self.document.clone();

        let outcome = match self.apply(request, selection) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("Edit failed, rolling back: {}", e);
                self.document = snapshot;
                return Err(e);
            }
        };

        let changed = self.document != snapshot;
        if changed {
            self.history.record(snapshot);
            self.revision += 1;
        }

        Ok(EditOutcome { changed, ..outcome })
    }

    fn apply(&mut self, request: EditRequest, selection: &DocumentSelection) -> Result<EditOutcome> {
        let unchanged = |selection: &DocumentSelection| EditOutcome {
            changed: false,
            selection: selection.clone(),
            format: None,
        };

        match request {
            EditRequest::Format(command) => {
                let result = if command.is_inline() && selection.is_collapsed() {
                    // Validate the caret before touching the composer
                    self.document.normalize_selection(selection)?;
                    self.update_composer(&selection.base, &command)
                } else {
                    let result = apply_format(&mut self.document, selection, &command, &self.settings)?;
                    if command == FormatCommand::ClearFormatting {
                        self.composer_styles = Some(Vec::new());
                    }
                    result
                };
                Ok(EditOutcome {
                    format: Some(result),
                    ..unchanged(selection)
                })
            }
            EditRequest::InsertText(text) => {
                let styles = if selection.is_collapsed() {
                    self.composer_styles(&selection.base)
                } else {
                    let start = self.document.normalize_selection(selection)?.start;
                    self.composer_styles
                        .clone()
                        .unwrap_or_else(|| self.inherited_styles_after(&start))
                };
                let caret = self.document.delete_selection(selection)?;
                let caret = self.document.insert_text(&caret, &text, &styles)?;
                self.composer_styles = None;
                Ok(unchanged(&DocumentSelection::collapsed(caret)))
            }
            EditRequest::DeleteSelection => {
                let caret = self.document.delete_selection(selection)?;
                self.composer_styles = None;
                Ok(unchanged(&DocumentSelection::collapsed(caret)))
            }
            EditRequest::SplitParagraph => {
                let caret = self.document.delete_selection(selection)?;
                let new_id = self.document.split_paragraph(&caret.block_id, caret.offset)?;
                self.composer_styles = None;
                Ok(unchanged(&DocumentSelection::collapsed(DocumentPosition::new(new_id, 0))))
            }
            EditRequest::InsertHorizontalRule => {
                let caret = self.document.delete_selection(selection)?;
                let caret = self.document.insert_horizontal_rule(&caret)?;
                self.composer_styles = None;
                Ok(unchanged(&DocumentSelection::collapsed(caret)))
            }
        }
    }

    /// Styles of the first selected character, used when typing over a
    /// selection.
    fn inherited_styles_after(&self, start: &DocumentPosition) -> Vec<Attribution> {
        match self.document.text(&start.block_id) {
            Ok(text) if start.offset < text.len() => text.styles_at(start.offset),
            _ => Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Undo / Redo
    // ─────────────────────────────────────────────────────────────────────────

    /// Undo the last transaction.
    ///
    /// Blocks whose text is unchanged keep their current entity spans.
    pub fn undo(&mut self) -> Result<()> {
        let previous = self
            .history
            .undo(&self.document)
            .ok_or(Error::NothingToUndo)?;
        self.restore(previous);
        Ok(())
    }

    /// Redo the last undone transaction.
    pub fn redo(&mut self) -> Result<()> {
        let next = self
            .history
            .redo(&self.document)
            .ok_or(Error::NothingToRedo)?;
        self.restore(next);
        Ok(())
    }

    fn restore(&mut self, mut restored: Document) {
        let ids: Vec<_> = restored.iter().map(|block| block.id.clone()).collect();
        for id in &ids {
            let Ok(current) = self.document.text(id) else {
                continue;
            };
            if let Ok(text) = restored.text_mut(id) {
                if text.text() == current.text() {
                    text.copy_entities_from(current);
                }
            }
        }

        self.document = restored;
        self.composer_styles = None;
        self.revision += 1;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entity Highlights
    // ─────────────────────────────────────────────────────────────────────────

    /// Cut a recognition request for the current revision.
    pub fn entity_request(&self) -> EntityRequest {
        EntityRequest {
            revision: self.revision,
            document: self.document.clone(),
        }
    }

    /// Replace the document's entity spans with `highlights`.
    ///
    /// Returns `Ok(false)` and leaves the document alone if the highlights
    /// were computed for another revision. Applying highlights is not an
    /// undoable edit and does not change the revision.
    pub fn apply_entity_highlights(&mut self, highlights: &EntityHighlights) -> Result<bool> {
        if highlights.revision != self.revision {
            warn!(
                "Discarding stale entity highlights (revision {}, current {})",
                highlights.revision, self.revision
            );
            return Ok(false);
        }
        replace_entity_spans(&mut self.document, &highlights.spans);
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize the document.
    pub fn save_json(&self, options: &EncodeOptions) -> Result<String> {
        encode_document(&self.document, options)
    }

    /// Replace the document with one decoded from `input`.
    ///
    /// History is cleared. Returns the decode warnings.
    pub fn load_json(&mut self, input: &str) -> Result<Vec<DecodeWarning>> {
        let report = decode_document_with_report(input)?;
        self.document = report.document;
        self.history.clear();
        self.composer_styles = None;
        self.revision += 1;
        info!(
            "Loaded document with {} block(s), {} warning(s)",
            self.document.len(),
            report.warnings.len()
        );
        Ok(report.warnings)
    }
}

impl Default for DocumentEditor {
    fn default() -> Self {
        Self::new(Document::with_paragraph(""), Settings::default())
    }
}

fn replace_family(styles: &mut Vec<Attribution>, family: AttributionFamily, value: Option<Attribution>) {
    styles.retain(|style| style.family() != family);
    if let Some(value) = value {
        styles.push(value);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::{Color, EntityKind, EntityRef, InlineStyle};
    use crate::document::{Block, BlockId};
    use crate::entities::{EntitySpan, NameIndexRecognizer};
    use crate::text::SpanRange;

    fn id(value: &str) -> BlockId {
        BlockId::from(value)
    }

    fn editor() -> DocumentEditor {
        let document = Document::from_blocks(vec![
            Block::paragraph("a", "Ilsa rode out."),
            Block::paragraph("b", "Rain followed."),
        ])
        .unwrap();
        DocumentEditor::new(document, Settings::default())
    }

    fn caret(block: &str, offset: usize) -> DocumentSelection {
        DocumentSelection::collapsed(DocumentPosition::new(block, offset))
    }

    fn bold() -> EditRequest {
        EditRequest::Format(FormatCommand::ToggleInlineStyle(InlineStyle::Bold))
    }

    fn text_of(editor: &DocumentEditor, block: &str) -> String {
        editor.document().text(&id(block)).unwrap().text().to_string()
    }

    fn ilsa() -> EntityRef {
        EntityRef::new("ilsa", EntityKind::Character)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transaction Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_format_records_history_and_revision() {
        let mut editor = editor();
        let outcome = editor
            .execute(bold(), &DocumentSelection::within_block("a", 0, 4))
            .unwrap();

        assert!(outcome.changed);
        assert!(outcome.format.unwrap().applied);
        assert_eq!(editor.revision(), 1);
        assert!(editor.can_undo());
    }

    #[test]
    fn test_failed_request_rolls_back() {
        let mut editor = editor();
        let before = editor.document().clone();

        let result = editor.execute(EditRequest::InsertText("x".to_string()), &caret("missing", 0));
        assert!(matches!(result, Err(Error::BlockNotFound(_))));
        let result = editor.execute(EditRequest::SplitParagraph, &caret("a", 99));
        assert!(matches!(result, Err(Error::InvalidSelection(_))));

        assert_eq!(editor.document(), &before);
        assert_eq!(editor.revision(), 0);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_delete_across_blocks_merges() {
        let mut editor = editor();
        let selection = DocumentSelection::new(DocumentPosition::new("a", 2), DocumentPosition::new("b", 3));
        let outcome = editor.execute(EditRequest::DeleteSelection, &selection).unwrap();
        assert_eq!(editor.document().len(), 1);
        assert_eq!(text_of(&editor, "a"), "Iln followed.");
        assert_eq!(outcome.selection, caret("a", 2));
    }

    #[test]
    fn test_rule_caret_rolls_back_insert() {
        let mut editor = DocumentEditor::new(
            Document::from_blocks(vec![Block::paragraph("a", "x"), Block::horizontal_rule("hr")]).unwrap(),
            Settings::default(),
        );
        let before = editor.document().clone();
        let result = editor.execute(EditRequest::InsertText("y".to_string()), &caret("hr", 0));
        assert!(matches!(result, Err(Error::NotATextBlock(_))));
        assert_eq!(editor.document(), &before);
    }

    #[test]
    fn test_noop_request_not_recorded() {
        let mut editor = editor();
        let outcome = editor
            .execute(EditRequest::DeleteSelection, &caret("a", 3))
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(editor.revision(), 0);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let mut editor = editor();
        let outcome = editor
            .execute(
                EditRequest::InsertText("Mara".to_string()),
                &DocumentSelection::within_block("a", 0, 4),
            )
            .unwrap();
        assert_eq!(text_of(&editor, "a"), "Mara rode out.");
        assert_eq!(outcome.selection, caret("a", 4));
    }

    #[test]
    fn test_insert_multiline_text() {
        let mut editor = editor();
        editor
            .execute(EditRequest::InsertText(" Then\nmore".to_string()), &caret("a", 14))
            .unwrap();
        assert_eq!(editor.document().len(), 3);
        assert_eq!(editor.document().plain_text(), "Ilsa rode out. Then\nmore\nRain followed.");
    }

    #[test]
    fn test_split_and_rule() {
        let mut editor = editor();
        let outcome = editor.execute(EditRequest::SplitParagraph, &caret("a", 4)).unwrap();
        let new_block = outcome.selection.base.block_id.clone();
        assert_eq!(text_of(&editor, "a"), "Ilsa");
        assert_eq!(editor.document().text(&new_block).unwrap().text(), " rode out.");

        editor
            .execute(EditRequest::InsertHorizontalRule, &caret("b", 0))
            .unwrap();
        assert_eq!(editor.document().plain_text(), "Ilsa\n rode out.\n---\nRain followed.");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Composer Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_collapsed_bold_toggles_composer() {
        let mut editor = editor();
        let at_end = caret("a", 14);
        let outcome = editor.execute(bold(), &at_end).unwrap();

        assert!(!outcome.changed);
        assert!(outcome.format.unwrap().applied);
        assert!(editor.formatting_state(&at_end).unwrap().is_bold);
        assert_eq!(editor.revision(), 0);

        editor
            .execute(EditRequest::InsertText(" Fast.".to_string()), &at_end)
            .unwrap();
        let text = editor.document().text(&id("a")).unwrap();
        assert!(text.has_attribution_throughout(&Attribution::Bold, SpanRange::new(14, 19)));
        assert!(!text.has_attribution_at(&Attribution::Bold, 13));
    }

    #[test]
    fn test_typing_inherits_previous_styles() {
        let mut editor = editor();
        editor
            .execute(bold(), &DocumentSelection::within_block("a", 0, 4))
            .unwrap();
        editor
            .execute(EditRequest::InsertText("!".to_string()), &caret("a", 4))
            .unwrap();
        let text = editor.document().text(&id("a")).unwrap();
        assert_eq!(text.text(), "Ilsa! rode out.");
        assert!(text.has_attribution_at(&Attribution::Bold, 4));
        assert!(!text.has_attribution_at(&Attribution::Bold, 5));
    }

    #[test]
    fn test_composer_toggle_off_inherited_style() {
        let mut editor = editor();
        editor
            .execute(bold(), &DocumentSelection::within_block("a", 0, 4))
            .unwrap();
        let outcome = editor.execute(bold(), &caret("a", 4)).unwrap();
        assert!(outcome.format.unwrap().toggled_off);

        editor
            .execute(EditRequest::InsertText("?".to_string()), &caret("a", 4))
            .unwrap();
        assert!(!editor
            .document()
            .text(&id("a"))
            .unwrap()
            .has_attribution_at(&Attribution::Bold, 4));
    }

    #[test]
    fn test_composer_color_and_size() {
        let mut editor = editor();
        let at = caret("b", 0);
        let red = Color::from_rgb(200, 0, 0);
        editor
            .execute(EditRequest::Format(FormatCommand::SetTextColor(Some(red))), &at)
            .unwrap();
        editor
            .execute(EditRequest::Format(FormatCommand::SetFontSize(Some(2))), &at)
            .unwrap();

        let state = editor.formatting_state(&at).unwrap();
        assert_eq!(state.text_color, Some(red));
        assert_eq!(state.font_size, Some(6));
    }

    #[test]
    fn test_clear_formatting_empties_composer() {
        let mut editor = editor();
        editor
            .execute(bold(), &DocumentSelection::within_block("a", 0, 4))
            .unwrap();
        editor
            .execute(EditRequest::Format(FormatCommand::ClearFormatting), &caret("a", 4))
            .unwrap();
        assert_eq!(editor.composer_styles(&DocumentPosition::new("a", 4)), Vec::new());
        assert!(editor.document().text(&id("a")).unwrap().spans().is_empty());
    }

    #[test]
    fn test_composer_rejects_unknown_block() {
        let mut editor = editor();
        assert!(editor.execute(bold(), &caret("nope", 0)).is_err());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Undo / Redo Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_undo_redo() {
        let mut editor = editor();
        editor
            .execute(EditRequest::InsertText("Grey ".to_string()), &caret("b", 0))
            .unwrap();
        assert_eq!(text_of(&editor, "b"), "Grey Rain followed.");

        editor.undo().unwrap();
        assert_eq!(text_of(&editor, "b"), "Rain followed.");
        assert_eq!(editor.revision(), 2);

        editor.redo().unwrap();
        assert_eq!(text_of(&editor, "b"), "Grey Rain followed.");
        assert_eq!(editor.revision(), 3);
    }

    #[test]
    fn test_undo_empty_is_error() {
        let mut editor = editor();
        assert!(matches!(editor.undo(), Err(Error::NothingToUndo)));
        assert!(matches!(editor.redo(), Err(Error::NothingToRedo)));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut editor = editor();
        editor.execute(bold(), &DocumentSelection::within_block("a", 0, 4)).unwrap();
        editor.undo().unwrap();
        assert!(editor.can_redo());
        editor.execute(bold(), &DocumentSelection::within_block("b", 0, 4)).unwrap();
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_undo_depth_is_bounded() {
        let settings = Settings {
            max_undo_depth: 2,
            ..Settings::default()
        };
        let mut editor = DocumentEditor::new(Document::with_paragraph(""), settings);
        let block = editor.document().block_at(0).unwrap().id.clone();
        for offset in 0..4 {
            editor
                .execute(
                    EditRequest::InsertText("x".to_string()),
                    &DocumentSelection::collapsed(DocumentPosition::new(block.clone(), offset)),
                )
                .unwrap();
        }
        editor.undo().unwrap();
        editor.undo().unwrap();
        assert!(editor.undo().is_err());
        assert_eq!(editor.document().plain_text(), "xx");
    }

    #[test]
    fn test_settings_are_sanitized() {
        let inverted = Settings {
            min_font_size: 40,
            max_font_size: 10,
            max_undo_depth: 0,
            ..Settings::default()
        };
        let mut editor = DocumentEditor::new(Document::with_paragraph("Storm"), inverted.clone());
        assert_eq!(editor.settings().min_font_size, 10);
        assert_eq!(editor.settings().max_font_size, 40);
        assert_eq!(editor.history().max_depth(), Settings::MIN_UNDO_DEPTH);

        let block = editor.document().block_at(0).unwrap().id.clone();
        let selection = DocumentSelection::within_block(block.clone(), 0, 5);
        editor
            .execute(EditRequest::Format(FormatCommand::SetFontSize(Some(80))), &selection)
            .unwrap();
        let text = editor.document().text(&block).unwrap();
        assert!(text.has_attribution_at(&Attribution::FontSize(40), 0));

        editor.set_settings(Settings {
            max_list_indent: 200,
            ..inverted
        });
        assert_eq!(editor.settings().max_list_indent, Settings::MAX_LIST_INDENT);
        assert_eq!(editor.settings().max_font_size, 40);
    }

    #[test]
    fn test_undo_formatting_keeps_current_entities() {
        let mut editor = editor();
        editor.execute(bold(), &DocumentSelection::within_block("a", 0, 14)).unwrap();

        let highlights = EntityHighlights {
            revision: editor.revision(),
            spans: vec![EntitySpan::new("a", SpanRange::new(0, 3), ilsa())],
        };
        assert!(editor.apply_entity_highlights(&highlights).unwrap());

        editor.undo().unwrap();
        let text = editor.document().text(&id("a")).unwrap();
        assert!(!text.has_attribution_at(&Attribution::Bold, 0));
        assert!(text.has_attribution_throughout(&Attribution::Entity(ilsa()), SpanRange::new(0, 3)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entity Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_entity_round_trip_through_recognizer() {
        let mut editor = editor();
        let mut recognizer = NameIndexRecognizer::new();
        recognizer.add_entity(ilsa(), &["Ilsa"]).unwrap();

        let request = editor.entity_request();
        let highlights = request.fulfill(&recognizer);
        assert!(editor.apply_entity_highlights(&highlights).unwrap());
        assert_eq!(editor.revision(), request.revision);
        assert!(!editor.can_undo());

        let text = editor.document().text(&id("a")).unwrap();
        assert!(text.has_attribution_at(&Attribution::Entity(ilsa()), 3));
    }

    #[test]
    fn test_stale_highlights_discarded() {
        let mut editor = editor();
        let request = editor.entity_request();
        editor
            .execute(EditRequest::InsertText("Old ".to_string()), &caret("a", 0))
            .unwrap();

        let highlights = EntityHighlights {
            revision: request.revision,
            spans: vec![EntitySpan::new("a", SpanRange::new(0, 3), ilsa())],
        };
        let before = editor.document().clone();
        assert!(!editor.apply_entity_highlights(&highlights).unwrap());
        assert_eq!(editor.document(), &before);
    }

    #[test]
    fn test_formatting_never_removes_entities() {
        let mut editor = editor();
        let highlights = EntityHighlights {
            revision: 0,
            spans: vec![EntitySpan::new("a", SpanRange::new(0, 3), ilsa())],
        };
        editor.apply_entity_highlights(&highlights).unwrap();

        let all = DocumentSelection::new(DocumentPosition::new("a", 0), DocumentPosition::new("b", 14));
        for command in [
            FormatCommand::ToggleInlineStyle(InlineStyle::Italic),
            FormatCommand::SetBackground(Some(Color::WHITE)),
            FormatCommand::ClearFormatting,
        ] {
            editor.execute(EditRequest::Format(command), &all).unwrap();
        }
        let text = editor.document().text(&id("a")).unwrap();
        assert!(text.has_attribution_throughout(&Attribution::Entity(ilsa()), SpanRange::new(0, 3)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_save_and_load_json() {
        let mut editor = editor();
        editor.execute(bold(), &DocumentSelection::within_block("a", 0, 4)).unwrap();
        let json = editor.save_json(&EncodeOptions::default()).unwrap();

        let mut other = DocumentEditor::default();
        let warnings = other.load_json(&json).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(other.document(), editor.document());
        assert!(!other.can_undo());
    }

    #[test]
    fn test_load_invalid_json_keeps_document() {
        let mut editor = editor();
        let before = editor.document().clone();
        assert!(editor.load_json("{ broken").is_err());
        assert_eq!(editor.document(), &before);
    }
}
