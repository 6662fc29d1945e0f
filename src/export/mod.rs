//! Document Export Module for PlotEngine
//!
//! This module renders documents to HTML, either as a fragment for embedding
//! or as a standalone page with inlined base CSS.
//!
//! # Architecture
//!
//! - `html.rs` - HTML generation for blocks, lists, inline runs and entities

pub mod html;

pub use html::{export_to_html_file, generate_html_document, generate_html_fragment, HtmlOptions};
