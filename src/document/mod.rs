//! Document model
//!
//! # Architecture
//!
//! - `block.rs` - block ids and block content (paragraph or horizontal rule)
//! - `document.rs` - ordered blocks, split/merge and structural text edits
//! - `selection.rs` - caret positions, selections and per-block ranges

mod block;
#[allow(clippy::module_inception)]
mod document;
mod selection;

pub use block::{Block, BlockContent, BlockId};
pub use document::{Document, PLAIN_TEXT_RULE};
pub use selection::{DocumentPosition, DocumentSelection, NormalizedSelection, SelectedBlock};
