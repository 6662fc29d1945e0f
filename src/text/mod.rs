//! Attributed-text engine
//!
//! - `spans.rs` - normalized span storage with merge/split on edit
//! - `attributed_text.rs` - text plus spans, with range validation

mod attributed_text;
mod spans;

pub use attributed_text::AttributedText;
pub use spans::{AttributedSpans, AttributionRun, AttributionSpan, SpanRange};
