//! Attributed text
//!
//! A string paired with its [`AttributedSpans`]. Every offset is a character
//! offset and every range is validated against the text length, so spans
//! always satisfy `start <= end < len`.

use super::spans::{AttributedSpans, AttributionRun, AttributionSpan, SpanRange};
use crate::attribution::{Attribution, AttributionFamily, EntityRef};
use crate::error::{Error, Result};
use crate::string_utils::{char_len, char_slice, insert_at_char, remove_char_range};

/// Text with inline attributions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributedText {
    text: String,
    len: usize,
    spans: AttributedSpans,
}

impl AttributedText {
    /// Plain text with no attributions.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = char_len(&text);
        Self {
            text,
            len,
            spans: AttributedSpans::new(),
        }
    }

    /// Text with spans; every span must fit inside the text.
    ///
    /// A span with `start > end` is rejected rather than reordered.
    pub fn from_parts(
        text: impl Into<String>,
        spans: impl IntoIterator<Item = AttributionSpan>,
    ) -> Result<Self> {
        let mut attributed = Self::new(text);
        for span in spans {
            if span.start > span.end {
                return Err(Error::InvalidRange {
                    start: span.start,
                    end: span.end,
                    len: attributed.len,
                });
            }
            let range = span.range();
            attributed.add_attribution(span.attribution, range)?;
        }
        Ok(attributed)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn spans(&self) -> &AttributedSpans {
        &self.spans
    }

    /// The whole text as a range, or `None` when empty.
    pub fn full_range(&self) -> Option<SpanRange> {
        SpanRange::from_exclusive(0, self.len)
    }

    fn check_range(&self, range: SpanRange) -> Result<()> {
        if range.end < self.len {
            Ok(())
        } else {
            Err(Error::InvalidRange {
                start: range.start,
                end: range.end,
                len: self.len,
            })
        }
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset <= self.len {
            Ok(())
        } else {
            Err(Error::InvalidRange {
                start: offset,
                end: offset,
                len: self.len,
            })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attributions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add_attribution(&mut self, attribution: Attribution, range: SpanRange) -> Result<()> {
        self.check_range(range)?;
        self.spans.add(attribution, range);
        Ok(())
    }

    /// Returns `true` if any character lost the attribution.
    pub fn remove_attribution(&mut self, attribution: &Attribution, range: SpanRange) -> Result<bool> {
        self.check_range(range)?;
        Ok(self.spans.remove(attribution, range))
    }

    pub fn remove_family(&mut self, family: AttributionFamily, range: SpanRange) -> Result<bool> {
        self.check_range(range)?;
        Ok(self.spans.remove_family(family, range))
    }

    /// Remove every style attribution from `range`. Entity markers stay.
    pub fn remove_styles(&mut self, range: SpanRange) -> Result<bool> {
        self.check_range(range)?;
        Ok(self.spans.remove_matching(Attribution::is_style, range))
    }

    pub fn has_attribution_at(&self, attribution: &Attribution, offset: usize) -> bool {
        self.spans.has_at(attribution, offset)
    }

    pub fn has_attribution_throughout(&self, attribution: &Attribution, range: SpanRange) -> bool {
        range.end < self.len && self.spans.covers(attribution, range)
    }

    pub fn attributions_at(&self, offset: usize) -> Vec<&Attribution> {
        self.spans.attributions_at(offset)
    }

    /// Style attributions (no entities) at `offset`.
    pub fn styles_at(&self, offset: usize) -> Vec<Attribution> {
        self.spans
            .attributions_at(offset)
            .into_iter()
            .filter(|attribution| attribution.is_style())
            .cloned()
            .collect()
    }

    /// The single value of `family` shared by every character of `range`.
    pub fn uniform_value(&self, family: AttributionFamily, range: SpanRange) -> Option<&Attribution> {
        let first = self.spans.family_at(family, range.start)?;
        if self.spans.covers(first, range) {
            Some(first)
        } else {
            None
        }
    }

    /// Runs covering the whole text.
    pub fn runs(&self) -> Vec<AttributionRun> {
        self.spans.collapse(self.len)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entity Layer
    // ─────────────────────────────────────────────────────────────────────────

    pub fn entity_spans(&self) -> impl Iterator<Item = &AttributionSpan> {
        self.spans.iter().filter(|span| span.attribution.is_entity())
    }

    /// Remove every entity marker. Returns `true` if any existed.
    pub fn clear_entities(&mut self) -> bool {
        self.spans.retain(|span| !span.attribution.is_entity())
    }

    pub fn add_entity(&mut self, entity: EntityRef, range: SpanRange) -> Result<()> {
        self.add_attribution(Attribution::Entity(entity), range)
    }

    /// Replace every entity marker with `entities`.
    ///
    /// All ranges are checked first; on error nothing changes.
    pub fn replace_entities(&mut self, entities: &[(EntityRef, SpanRange)]) -> Result<()> {
        for (_, range) in entities {
            self.check_range(*range)?;
        }
        self.clear_entities();
        for (entity, range) in entities {
            self.spans.add(Attribution::Entity(entity.clone()), *range);
        }
        Ok(())
    }

    /// Replace this text's entity markers with those of `other`.
    ///
    /// Spans that do not fit this text are dropped.
    pub fn copy_entities_from(&mut self, other: &AttributedText) {
        self.clear_entities();
        for span in other.entity_spans() {
            if span.end < self.len {
                self.spans.add(span.attribution.clone(), span.range());
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert `text` before `offset`.
    ///
    /// The inserted characters carry exactly the style attributions in
    /// `styles`; enclosing entity spans grow to cover them.
    pub fn insert_text(&mut self, offset: usize, text: &str, styles: &[Attribution]) -> Result<()> {
        self.check_offset(offset)?;
        let count = char_len(text);
        if count == 0 {
            return Ok(());
        }

        insert_at_char(&mut self.text, offset, text);
        self.len += count;
        self.spans.on_insert(offset, count);

        let inserted = SpanRange::new(offset, offset + count - 1);
        self.spans.remove_matching(
            |attribution| attribution.is_style() && !styles.contains(attribution),
            inserted,
        );
        for style in styles.iter().filter(|style| style.is_style()) {
            self.spans.add(style.clone(), inserted);
        }
        Ok(())
    }

    /// Delete the characters of `range`.
    pub fn delete_range(&mut self, range: SpanRange) -> Result<()> {
        self.check_range(range)?;
        remove_char_range(&mut self.text, range.start, range.end_exclusive());
        self.len -= range.len();
        self.spans.on_delete(range);
        Ok(())
    }

    /// Split into the text before `offset` and the text from `offset` on.
    pub fn split_at(&self, offset: usize) -> Result<(AttributedText, AttributedText)> {
        self.check_offset(offset)?;
        let (left_spans, right_spans) = self.spans.split_at(offset);
        let left_text = char_slice(&self.text, 0, offset).to_string();
        let right_text = char_slice(&self.text, offset, self.len).to_string();

        Ok((
            AttributedText {
                text: left_text,
                len: offset,
                spans: left_spans,
            },
            AttributedText {
                text: right_text,
                len: self.len - offset,
                spans: right_spans,
            },
        ))
    }

    /// Append `other` to the end of this text.
    pub fn append(&mut self, other: AttributedText) {
        let shift = self.len;
        self.text.push_str(&other.text);
        self.len += other.len;
        self.spans.append(other.spans, shift);
    }

    /// Copy of the characters in `range` with their attributions.
    pub fn slice(&self, range: SpanRange) -> Result<AttributedText> {
        self.check_range(range)?;
        Ok(AttributedText {
            text: char_slice(&self.text, range.start, range.end_exclusive()).to_string(),
            len: range.len(),
            spans: self.spans.slice(range),
        })
    }
}

impl From<&str> for AttributedText {
    fn from(text: &str) -> Self {
        AttributedText::new(text)
    }
}

impl From<String> for AttributedText {
    fn from(text: String) -> Self {
        AttributedText::new(text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
