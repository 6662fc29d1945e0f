//! Document persistence formats
//!
//! - `json.rs` - the versioned JSON format with lenient decoding
//! - `plain.rs` - plain-text import (one paragraph per line)

mod json;
mod plain;

pub use json::{
    decode_document, decode_document_with_report, encode_document, DecodeReport, DecodeWarning,
    EncodeOptions, CURRENT_VERSION,
};
pub use plain::{import_plain_text, is_rule_line};
