//! Entity recognizers
//!
//! [`EntityRecognizer`] is the seam for whatever produces entity spans. The
//! [`NameIndexRecognizer`] finds known names and aliases by whole-word,
//! case-insensitive matching.

use super::EntitySpan;
use crate::attribution::{EntityKind, EntityRef};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::string_utils::byte_index_to_char_index;
use crate::text::SpanRange;
use log::debug;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// Produces entity spans for a document.
pub trait EntityRecognizer {
    fn recognize(&self, document: &Document) -> Vec<EntitySpan>;
}

/// One entry of a name index file.
///
/// ```json
/// { "id": "mara", "kind": "character", "names": ["Mara", "Captain Vell"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameIndexEntry {
    pub id: String,
    pub kind: EntityKind,
    #[serde(default)]
    pub names: Vec<String>,
}

#[derive(Debug, Clone)]
struct NamePattern {
    entity: EntityRef,
    regex: Regex,
}

/// Recognizes entities by their known names.
#[derive(Debug, Clone, Default)]
pub struct NameIndexRecognizer {
    patterns: Vec<NamePattern>,
}

impl NameIndexRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a recognizer from a JSON array of [`NameIndexEntry`].
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<NameIndexEntry> =
            serde_json::from_str(json).map_err(|e| Error::DocumentParse {
                message: format!("Invalid name index: {}", e),
                source: Some(Box::new(e)),
            })?;

        let mut recognizer = Self::new();
        for entry in entries {
            recognizer.add_entity(EntityRef::new(entry.id, entry.kind), &entry.names)?;
        }
        Ok(recognizer)
    }

    /// Register `names` as mentions of `entity`. Blank names are ignored.
    pub fn add_entity<S: AsRef<str>>(&mut self, entity: EntityRef, names: &[S]) -> Result<()> {
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let pattern = format!(r"\b{}\b", regex::escape(name));
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::Application(format!("Bad entity name '{}': {}", name, e)))?;
            self.patterns.push(NamePattern {
                entity: entity.clone(),
                regex,
            });
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Matches in one text as (char range, entity), longest match winning
    /// where matches overlap.
    fn find_in(&self, text: &str) -> Vec<(SpanRange, &EntityRef)> {
        let mut candidates: Vec<(SpanRange, &EntityRef)> = Vec::new();
        for pattern in &self.patterns {
            for found in pattern.regex.find_iter(text) {
                let start = byte_index_to_char_index(text, found.start());
                let end = byte_index_to_char_index(text, found.end());
                if let Some(range) = SpanRange::from_exclusive(start, end) {
                    candidates.push((range, &pattern.entity));
                }
            }
        }

        candidates.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then(a.start.cmp(&b.start)));

        let mut accepted: Vec<(SpanRange, &EntityRef)> = Vec::new();
        for (range, entity) in candidates {
            if accepted.iter().all(|(taken, _)| !taken.overlaps(&range)) {
                accepted.push((range, entity));
            }
        }
        accepted.sort_by_key(|(range, _)| range.start);
        accepted
    }
}

impl EntityRecognizer for NameIndexRecognizer {
    fn recognize(&self, document: &Document) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        for block in document.iter() {
            let Some(text) = block.text() else {
                continue;
            };
            for (range, entity) in self.find_in(text.text()) {
                spans.push(EntitySpan::new(block.id.clone(), range, entity.clone()));
            }
        }
        debug!("Recognized {} entity mention(s)", spans.len());
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, BlockId};

    fn recognizer() -> NameIndexRecognizer {
        let mut recognizer = NameIndexRecognizer::new();
        recognizer
            .add_entity(EntityRef::new("ash", EntityKind::Character), &["Ash"])
            .unwrap();
        recognizer
            .add_entity(EntityRef::new("ashford", EntityKind::Location), &["Ashford Hall", "the hall"])
            .unwrap();
        recognizer
    }

    #[test]
    fn test_whole_word_case_insensitive() {
        let document = Document::from_blocks(vec![Block::paragraph("a", "ASH met ashen Ash.")]).unwrap();
        let spans = recognizer().recognize(&document);
        let ranges: Vec<(usize, usize)> = spans.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(ranges, vec![(0, 2), (14, 16)]);
        assert!(spans.iter().all(|s| s.entity.id == "ash"));
    }

    #[test]
    fn test_longest_match_wins() {
        let document =
            Document::from_blocks(vec![Block::paragraph("a", "Ashford Hall burned; Ash fled the hall.")])
                .unwrap();
        let spans = recognizer().recognize(&document);
        let found: Vec<(&str, usize, usize)> = spans
            .iter()
            .map(|s| (s.entity.id.as_str(), s.start, s.end))
            .collect();
        assert_eq!(
            found,
            vec![("ashford", 0, 11), ("ash", 21, 23), ("ashford", 30, 37)]
        );
    }

    #[test]
    fn test_offsets_are_chars() {
        let document = Document::from_blocks(vec![Block::paragraph("a", "Ça va, Ash?")]).unwrap();
        let spans = recognizer().recognize(&document);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (7, 9));
        assert_eq!(spans[0].block_id, BlockId::from("a"));
    }

    #[test]
    fn test_skips_rules_and_blank_names() {
        let mut recognizer = NameIndexRecognizer::new();
        recognizer
            .add_entity(EntityRef::new("x", EntityKind::Object), &["  ", ""])
            .unwrap();
        assert!(recognizer.is_empty());

        let document = Document::from_blocks(vec![Block::horizontal_rule("hr")]).unwrap();
        assert!(NameIndexRecognizer::new().recognize(&document).is_empty());
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"id": "dagger", "kind": "object", "names": ["the dagger"]},
            {"id": "feast", "kind": "event"}
        ]"#;
        let recognizer = NameIndexRecognizer::from_json(json).unwrap();
        let document = Document::from_blocks(vec![Block::paragraph("a", "She hid The Dagger.")]).unwrap();
        let spans = recognizer.recognize(&document);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].entity, EntityRef::new("dagger", EntityKind::Object));
    }

    #[test]
    fn test_from_json_rejects_bad_kind() {
        let json = r#"[{"id": "x", "kind": "planet", "names": ["X"]}]"#;
        assert!(NameIndexRecognizer::from_json(json).is_err());
    }
}
