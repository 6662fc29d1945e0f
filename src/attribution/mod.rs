//! Attribution model
//!
//! Inline markers ([`Attribution`]) layered over character ranges, and
//! paragraph-wide [`BlockMetadata`].

mod block;
mod inline;

pub use block::*;
pub use inline::*;
