//! Entity highlight results and their application to a document
//!
//! Entity recognition runs outside the editor. A request carries a copy of
//! the document together with the editor revision it was cut from; the
//! result must come back with the same revision to be applied.

use super::EntityRecognizer;
use crate::attribution::EntityRef;
use crate::document::{BlockId, Document};
use crate::text::SpanRange;
use log::{debug, warn};
use std::collections::BTreeMap;

/// An entity mention inside one block, with inclusive char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub block_id: BlockId,
    pub start: usize,
    pub end: usize,
    pub entity: EntityRef,
}

impl EntitySpan {
    pub fn new(block_id: impl Into<BlockId>, range: SpanRange, entity: EntityRef) -> Self {
        Self {
            block_id: block_id.into(),
            start: range.start,
            end: range.end,
            entity,
        }
    }

    /// The covered range, or `None` if `start > end`.
    pub fn range(&self) -> Option<SpanRange> {
        (self.start <= self.end).then(|| SpanRange::new(self.start, self.end))
    }
}

/// Work handed to an entity recognizer.
#[derive(Debug, Clone)]
pub struct EntityRequest {
    pub revision: u64,
    pub document: Document,
}

impl EntityRequest {
    /// Run `recognizer` on the request's document.
    pub fn fulfill(&self, recognizer: &dyn EntityRecognizer) -> EntityHighlights {
        EntityHighlights {
            revision: self.revision,
            spans: recognizer.recognize(&self.document),
        }
    }
}

/// A recognizer's answer for one revision.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityHighlights {
    pub revision: u64,
    pub spans: Vec<EntitySpan>,
}

/// Replace every entity attribution in `document` with `spans`.
///
/// Spans naming an unknown or non-text block, or reaching past the block's
/// text, are skipped. Returns the number of spans applied.
pub fn replace_entity_spans(document: &mut Document, spans: &[EntitySpan]) -> usize {
    let ids: Vec<BlockId> = document.iter().map(|block| block.id.clone()).collect();
    for id in &ids {
        if let Ok(text) = document.text_mut(id) {
            text.clear_entities();
        }
    }

    let mut applied = 0;
    for span in spans {
        let text = match document.text_mut(&span.block_id) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping entity '{}': {}", span.entity.id, e);
                continue;
            }
        };
        let Some(range) = span.range() else {
            warn!(
                "Skipping entity '{}' in '{}': reversed range {}..={}",
                span.entity.id, span.block_id, span.start, span.end
            );
            continue;
        };
        match text.add_entity(span.entity.clone(), range) {
            Ok(()) => applied += 1,
            Err(e) => warn!("Skipping entity '{}' in '{}': {}", span.entity.id, span.block_id, e),
        }
    }

    debug!("Applied {} of {} entity span(s)", applied, spans.len());
    applied
}

/// Number of highlighted mentions per entity id.
pub fn entity_mentions(document: &Document) -> BTreeMap<String, usize> {
    let mut mentions = BTreeMap::new();
    for block in document.iter() {
        let Some(text) = block.text() else {
            continue;
        };
        for span in text.entity_spans() {
            if let Some(entity) = span.attribution.as_entity() {
                *mentions.entry(entity.id.clone()).or_insert(0) += 1;
            }
        }
    }
    mentions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::{Attribution, EntityKind};
    use crate::document::Block;
    use crate::text::AttributedText;

    fn mara() -> EntityRef {
        EntityRef::new("mara", EntityKind::Character)
    }

    fn keep() -> EntityRef {
        EntityRef::new("keep", EntityKind::Location)
    }

    fn sample() -> Document {
        let mut text = AttributedText::new("Mara reached the Keep.");
        text.add_attribution(Attribution::Bold, SpanRange::new(0, 3)).unwrap();
        text.add_entity(keep(), SpanRange::new(0, 3)).unwrap();
        Document::from_blocks(vec![
            Block::paragraph("a", text),
            Block::horizontal_rule("hr"),
        ])
        .unwrap()
    }

    #[test]
    fn test_replace_clears_old_entities() {
        let mut document = sample();
        let spans = vec![
            EntitySpan::new("a", SpanRange::new(0, 3), mara()),
            EntitySpan::new("a", SpanRange::new(17, 20), keep()),
        ];
        assert_eq!(replace_entity_spans(&mut document, &spans), 2);

        let text = document.text(&BlockId::from("a")).unwrap();
        assert!(text.has_attribution_at(&Attribution::Entity(mara()), 0));
        assert!(!text.has_attribution_at(&Attribution::Entity(keep()), 0));
        assert!(text.has_attribution_at(&Attribution::Entity(keep()), 20));
        assert!(text.has_attribution_at(&Attribution::Bold, 0));
    }

    #[test]
    fn test_invalid_spans_are_skipped() {
        let mut document = sample();
        let spans = vec![
            EntitySpan::new("missing", SpanRange::new(0, 1), mara()),
            EntitySpan::new("hr", SpanRange::new(0, 0), mara()),
            EntitySpan::new("a", SpanRange::new(20, 40), mara()),
            EntitySpan::new("a", SpanRange::new(0, 3), mara()),
        ];
        assert_eq!(replace_entity_spans(&mut document, &spans), 1);
    }

    #[test]
    fn test_reversed_spans_are_skipped() {
        let mut document = sample();
        let reversed = EntitySpan {
            block_id: BlockId::from("a"),
            start: 3,
            end: 0,
            entity: mara(),
        };
        assert_eq!(reversed.range(), None);
        assert_eq!(replace_entity_spans(&mut document, &[reversed]), 0);

        let text = document.text(&BlockId::from("a")).unwrap();
        assert_eq!(text.entity_spans().count(), 0);
        assert!(text.has_attribution_at(&Attribution::Bold, 0));
    }

    #[test]
    fn test_entity_mentions() {
        let mut document = sample();
        replace_entity_spans(
            &mut document,
            &[
                EntitySpan::new("a", SpanRange::new(0, 3), mara()),
                EntitySpan::new("a", SpanRange::new(17, 20), keep()),
            ],
        );
        let mentions = entity_mentions(&document);
        assert_eq!(mentions.get("mara"), Some(&1));
        assert_eq!(mentions.get("keep"), Some(&1));
        assert_eq!(mentions.len(), 2);
    }
}
