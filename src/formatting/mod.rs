//! Formatting commands and formatting-state queries
//!
//! - `commands.rs` - `FormatCommand` and `apply_format`
//! - `state.rs` - `FormattingState` for toolbar-style queries

mod commands;
mod state;

pub use commands::{apply_format, FormatCommand, FormatResult};
pub use state::FormattingState;
