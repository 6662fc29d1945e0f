//! Entity highlighting layer
//!
//! Entity spans are produced by a recognizer working on a snapshot of the
//! document and are applied back only if the document has not changed in
//! the meantime. Formatting commands never touch them.

mod highlights;
mod recognizer;

pub use highlights::{
    entity_mentions, replace_entity_spans, EntityHighlights, EntityRequest, EntitySpan,
};
pub use recognizer::{EntityRecognizer, NameIndexEntry, NameIndexRecognizer};
