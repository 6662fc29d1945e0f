//! Editor module for PlotEngine
//!
//! This module wraps a document in an editing session: atomic transactions,
//! snapshot undo/redo, composer styles, entity highlight application and
//! text statistics.

#[allow(clippy::module_inception)]
mod editor;
mod history;
mod stats;

pub use editor::{DocumentEditor, EditOutcome, EditRequest};
pub use history::History;
pub use stats::TextStats;
