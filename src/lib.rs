//! PlotEngine - attributed-text formatting core
//!
//! A block document of attributed paragraphs, formatting commands with
//! toggle semantics, an editing session with undo/redo, entity highlighting
//! fed by an external recognizer, versioned JSON persistence and HTML export.

pub mod attribution;
pub mod config;
pub mod document;
pub mod editor;
pub mod entities;
pub mod error;
pub mod export;
pub mod formatting;
pub mod serialization;
pub mod string_utils;
pub mod text;

pub use attribution::{Attribution, BlockMetadata, BlockType, Color, EntityKind, EntityRef};
pub use config::Settings;
pub use document::{Block, BlockId, Document, DocumentPosition, DocumentSelection};
pub use editor::{DocumentEditor, EditOutcome, EditRequest};
pub use error::{Error, Result};
pub use formatting::{apply_format, FormatCommand, FormatResult, FormattingState};
pub use text::{AttributedText, SpanRange};
