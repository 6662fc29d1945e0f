//! Versioned JSON document format
//!
//! Encoding goes through serde DTOs. Decoding walks a `serde_json::Value`
//! by hand so that a bad span, block or metadata field is skipped (and
//! reported) instead of failing the whole document.

use super::plain::import_plain_text;
use crate::attribution::{
    Attribution, BlockMetadata, Color, EntityKind, EntityRef, HeadingLevel, ListKind,
    ListMembership, TextAlignment,
};
use crate::config::Settings;
use crate::document::{Block, BlockContent, BlockId, Document};
use crate::error::{Error, Result};
use crate::text::{AttributedText, AttributionSpan, SpanRange};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Format version written by [`encode_document`].
pub const CURRENT_VERSION: u64 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Options for [`encode_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Write entity spans
    pub include_entities: bool,
    /// Pretty-print the JSON
    pub pretty: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            include_entities: false,
            pretty: true,
        }
    }
}

impl EncodeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            include_entities: settings.persist_entity_attributions,
            pretty: settings.pretty_json,
        }
    }
}

#[derive(Serialize)]
struct DocumentDto<'a> {
    version: u64,
    blocks: Vec<BlockDto<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum BlockDto<'a> {
    Paragraph {
        id: &'a str,
        text: &'a str,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        spans: Vec<SpanDto<'a>>,
        #[serde(skip_serializing_if = "MetadataDto::is_empty")]
        metadata: MetadataDto,
    },
    HorizontalRule {
        id: &'a str,
    },
}

#[derive(Serialize)]
struct SpanDto<'a> {
    start: usize,
    end: usize,
    attribution: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

#[derive(Serialize)]
struct ListDto {
    kind: &'static str,
    indent: u8,
}

#[derive(Serialize)]
struct MetadataDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    heading: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    list: Option<ListDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alignment: Option<&'static str>,
    #[serde(rename = "blockQuote", skip_serializing_if = "is_false")]
    block_quote: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl MetadataDto {
    fn is_empty(&self) -> bool {
        self.heading.is_none() && self.list.is_none() && self.alignment.is_none() && !self.block_quote
    }
}

impl From<&BlockMetadata> for MetadataDto {
    fn from(metadata: &BlockMetadata) -> Self {
        Self {
            heading: metadata.heading.map(HeadingLevel::level),
            list: metadata.list.map(|list| ListDto {
                kind: list.kind.as_str(),
                indent: list.indent,
            }),
            alignment: metadata.alignment.map(|alignment| alignment.as_str()),
            block_quote: metadata.block_quote,
        }
    }
}

impl<'a> From<&'a AttributionSpan> for SpanDto<'a> {
    fn from(span: &'a AttributionSpan) -> Self {
        let mut dto = SpanDto {
            start: span.start,
            end: span.end,
            attribution: span.attribution.name(),
            value: None,
            id: None,
            kind: None,
        };
        match &span.attribution {
            Attribution::TextColor(color) | Attribution::Background(color) => {
                dto.value = Some(Value::String(color.to_hex()));
            }
            Attribution::FontSize(size) => dto.value = Some(Value::from(*size)),
            Attribution::Entity(entity) => {
                dto.id = Some(entity.id.as_str());
                dto.kind = Some(entity.kind.as_str());
            }
            _ => {}
        }
        dto
    }
}

fn block_dto<'a>(block: &'a Block, options: &EncodeOptions) -> BlockDto<'a> {
    match &block.content {
        BlockContent::Paragraph { text, metadata } => BlockDto::Paragraph {
            id: block.id.as_str(),
            text: text.text(),
            spans: text
                .spans()
                .iter()
                .filter(|span| options.include_entities || !span.attribution.is_entity())
                .map(SpanDto::from)
                .collect(),
            metadata: MetadataDto::from(metadata),
        },
        BlockContent::HorizontalRule => BlockDto::HorizontalRule {
            id: block.id.as_str(),
        },
    }
}

/// Serialize `document` in the current format version.
pub fn encode_document(document: &Document, options: &EncodeOptions) -> Result<String> {
    let dto = DocumentDto {
        version: CURRENT_VERSION,
        blocks: document.iter().map(|block| block_dto(block, options)).collect(),
    };

    let json = if options.pretty {
        serde_json::to_string_pretty(&dto)
    } else {
        serde_json::to_string(&dto)
    }
    .map_err(|e| Error::Application(format!("Failed to encode document: {}", e)))?;

    debug!("Encoded {} block(s), {} bytes", document.len(), json.len());
    Ok(json)
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────────────────────────

/// Something the lenient decoder fixed up or skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// The input was not JSON and was read as plain text
    PlainTextImport,
    /// No `version` field; the current version was assumed
    MissingVersion,
    /// `version` was not a non-negative integer
    InvalidVersion(String),
    /// No usable `blocks` array
    MissingBlocks,
    /// A block entry was not a JSON object
    InvalidBlock { index: usize },
    /// A block had an unrecognised `type`
    UnknownBlockType { index: usize, found: String },
    /// A block's id was missing or duplicated and was replaced
    AssignedBlockId { index: usize, id: BlockId },
    /// A paragraph had no usable `text`
    MissingText { block: BlockId },
    /// `spans` was present but not an array
    InvalidSpanList { block: BlockId },
    /// A span was dropped
    SkippedSpan {
        block: BlockId,
        index: usize,
        reason: String,
    },
    /// A span ran past the end of its text and was shortened
    ClampedSpan { block: BlockId, index: usize },
    /// A metadata field was invalid and left at its default
    InvalidMetadata { block: BlockId, field: &'static str },
    /// A list indent was deeper than any configuration allows
    ClampedListIndent { block: BlockId, found: u64 },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::PlainTextImport => write!(f, "Input is not JSON; imported as plain text"),
            DecodeWarning::MissingVersion => {
                write!(f, "Missing version; assuming version {}", CURRENT_VERSION)
            }
            DecodeWarning::InvalidVersion(found) => {
                write!(f, "Invalid version {}; assuming version {}", found, CURRENT_VERSION)
            }
            DecodeWarning::MissingBlocks => write!(f, "Missing blocks; document is empty"),
            DecodeWarning::InvalidBlock { index } => {
                write!(f, "Block #{} is not an object; skipped", index)
            }
            DecodeWarning::UnknownBlockType { index, found } => {
                write!(f, "Block #{} has unknown type '{}'; skipped", index, found)
            }
            DecodeWarning::AssignedBlockId { index, id } => {
                write!(f, "Block #{} had a missing or duplicate id; assigned '{}'", index, id)
            }
            DecodeWarning::MissingText { block } => {
                write!(f, "Block '{}' has no text; using empty text", block)
            }
            DecodeWarning::InvalidSpanList { block } => {
                write!(f, "Block '{}' has invalid spans; ignored", block)
            }
            DecodeWarning::SkippedSpan {
                block,
                index,
                reason,
            } => write!(f, "Span #{} of block '{}' skipped: {}", index, block, reason),
            DecodeWarning::ClampedSpan { block, index } => {
                write!(f, "Span #{} of block '{}' clamped to the text length", index, block)
            }
            DecodeWarning::InvalidMetadata { block, field } => {
                write!(f, "Block '{}' has invalid {}; using default", block, field)
            }
            DecodeWarning::ClampedListIndent { block, found } => write!(
                f,
                "Block '{}' has list indent {}; clamped to {}",
                block,
                found,
                Settings::MAX_LIST_INDENT
            ),
        }
    }
}

/// A decoded document together with everything that was fixed up.
#[derive(Debug, Clone)]
pub struct DecodeReport {
    pub document: Document,
    pub warnings: Vec<DecodeWarning>,
}

impl DecodeReport {
    /// True when the input decoded without any fix-ups.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Decode a document, discarding the warnings (they are still logged).
pub fn decode_document(input: &str) -> Result<Document> {
    decode_document_with_report(input).map(|report| report.document)
}

/// Decode a document leniently.
///
/// # Errors
///
/// - `Error::DocumentParse` if the input looks like JSON but is malformed
/// - `Error::UnsupportedVersion` if it was written by a newer version
pub fn decode_document_with_report(input: &str) -> Result<DecodeReport> {
    let mut decoder = Decoder::default();

    let trimmed = input.trim_start();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        decoder.warn(DecodeWarning::PlainTextImport);
        return Ok(DecodeReport {
            document: import_plain_text(input)?,
            warnings: decoder.warnings,
        });
    }

    let value: Value = serde_json::from_str(input)?;
    let blocks: &[Value] = match &value {
        Value::Array(items) => items,
        Value::Object(object) => {
            decoder.check_version(object.get("version"))?;
            match object.get("blocks") {
                Some(Value::Array(items)) => items,
                _ => {
                    decoder.warn(DecodeWarning::MissingBlocks);
                    &[]
                }
            }
        }
        _ => {
            return Err(Error::DocumentParse {
                message: "expected a JSON object or array".to_string(),
                source: None,
            })
        }
    };

    let mut document = Document::new();
    for (index, item) in blocks.iter().enumerate() {
        if let Some(block) = decoder.decode_block(&mut document, index, item) {
            document.push(block)?;
        }
    }

    debug!(
        "Decoded {} block(s) with {} warning(s)",
        document.len(),
        decoder.warnings.len()
    );
    Ok(DecodeReport {
        document,
        warnings: decoder.warnings,
    })
}

#[derive(Default)]
struct Decoder {
    warnings: Vec<DecodeWarning>,
}

impl Decoder {
    fn warn(&mut self, warning: DecodeWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn check_version(&mut self, version: Option<&Value>) -> Result<()> {
        match version {
            None | Some(Value::Null) => self.warn(DecodeWarning::MissingVersion),
            Some(value) => match value.as_u64() {
                Some(found) if found > CURRENT_VERSION => {
                    return Err(Error::UnsupportedVersion {
                        found,
                        supported: CURRENT_VERSION,
                    })
                }
                Some(_) => {}
                None => self.warn(DecodeWarning::InvalidVersion(value.to_string())),
            },
        }
        Ok(())
    }

    fn decode_block(&mut self, document: &mut Document, index: usize, value: &Value) -> Option<Block> {
        let Some(object) = value.as_object() else {
            self.warn(DecodeWarning::InvalidBlock { index });
            return None;
        };

        let is_rule = match object.get("type").and_then(Value::as_str) {
            None | Some("paragraph") => false,
            Some("horizontalRule") => true,
            Some(other) => {
                self.warn(DecodeWarning::UnknownBlockType {
                    index,
                    found: other.to_string(),
                });
                return None;
            }
        };

        let id = match object.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() && !document.contains(&BlockId::from(id)) => BlockId::from(id),
            _ => {
                let id = document.generate_block_id();
                self.warn(DecodeWarning::AssignedBlockId {
                    index,
                    id: id.clone(),
                });
                id
            }
        };

        if is_rule {
            return Some(Block::horizontal_rule(id));
        }

        let text = match object.get("text") {
            Some(Value::String(text)) => text.clone(),
            _ => {
                self.warn(DecodeWarning::MissingText { block: id.clone() });
                String::new()
            }
        };
        let mut text = AttributedText::new(text);

        match object.get("spans") {
            None | Some(Value::Null) => {}
            Some(Value::Array(spans)) => {
                for (span_index, span) in spans.iter().enumerate() {
                    self.decode_span(&mut text, &id, span_index, span);
                }
            }
            Some(_) => self.warn(DecodeWarning::InvalidSpanList { block: id.clone() }),
        }

        let metadata = self.decode_metadata(&id, object.get("metadata"));
        Some(Block::paragraph_with(id, text, metadata))
    }

    fn decode_span(&mut self, text: &mut AttributedText, block: &BlockId, index: usize, value: &Value) {
        let skip = |decoder: &mut Self, reason: String| {
            decoder.warn(DecodeWarning::SkippedSpan {
                block: block.clone(),
                index,
                reason,
            })
        };

        let Some(object) = value.as_object() else {
            return skip(self, "not an object".to_string());
        };
        let Some(start) = offset_field(object, "start") else {
            return skip(self, "missing or invalid start".to_string());
        };
        let Some(end) = offset_field(object, "end") else {
            return skip(self, "missing or invalid end".to_string());
        };
        let attribution = match decode_attribution(object) {
            Ok(attribution) => attribution,
            Err(reason) => return skip(self, reason),
        };
        if start > end {
            return skip(self, format!("start {} is after end {}", start, end));
        }
        if start >= text.len() {
            return skip(self, format!("start {} is past the end of the text", start));
        }

        let end = if end >= text.len() {
            self.warn(DecodeWarning::ClampedSpan {
                block: block.clone(),
                index,
            });
            text.len() - 1
        } else {
            end
        };

        if let Err(e) = text.add_attribution(attribution, SpanRange::new(start, end)) {
            skip(self, e.to_string());
        }
    }

    fn decode_metadata(&mut self, block: &BlockId, value: Option<&Value>) -> BlockMetadata {
        let mut metadata = BlockMetadata::default();
        let object = match value {
            None | Some(Value::Null) => return metadata,
            Some(Value::Object(object)) => object,
            Some(_) => {
                self.warn(DecodeWarning::InvalidMetadata {
                    block: block.clone(),
                    field: "metadata",
                });
                return metadata;
            }
        };

        if let Some(heading) = present(object, "heading") {
            match heading.as_u64().and_then(HeadingLevel::from_level) {
                Some(level) => metadata.heading = Some(level),
                None => self.invalid_field(block, "heading"),
            }
        }

        if let Some(list) = present(object, "list") {
            let kind = list
                .get("kind")
                .and_then(Value::as_str)
                .and_then(ListKind::parse);
            let indent = match list.get("indent") {
                None | Some(Value::Null) => Some(0),
                Some(indent) => indent.as_u64().map(|n| self.clamp_indent(block, n)),
            };
            match (kind, indent) {
                (Some(kind), Some(indent)) => metadata.list = Some(ListMembership::new(kind, indent)),
                _ => self.invalid_field(block, "list"),
            }
        }

        if let Some(alignment) = present(object, "alignment") {
            match alignment.as_str().and_then(TextAlignment::parse) {
                Some(alignment) => metadata.alignment = Some(alignment),
                None => self.invalid_field(block, "alignment"),
            }
        }

        if let Some(quote) = present(object, "blockQuote") {
            match quote.as_bool() {
                Some(quote) => metadata.block_quote = quote,
                None => self.invalid_field(block, "blockQuote"),
            }
        }

        metadata
    }

    fn clamp_indent(&mut self, block: &BlockId, indent: u64) -> u8 {
        let max = Settings::MAX_LIST_INDENT;
        if indent > u64::from(max) {
            self.warn(DecodeWarning::ClampedListIndent {
                block: block.clone(),
                found: indent,
            });
            max
        } else {
            indent as u8
        }
    }

    fn invalid_field(&mut self, block: &BlockId, field: &'static str) {
        self.warn(DecodeWarning::InvalidMetadata {
            block: block.clone(),
            field,
        });
    }
}

/// A field that is present and not `null`.
fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn offset_field(object: &Map<String, Value>, key: &str) -> Option<usize> {
    object
        .get(key)?
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
}

fn decode_attribution(object: &Map<String, Value>) -> std::result::Result<Attribution, String> {
    let name = object
        .get("attribution")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing attribution".to_string())?;

    let color_value = || {
        let hex = object
            .get("value")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("{} needs a colour value", name))?;
        Color::parse_hex(hex).ok_or_else(|| format!("invalid colour '{}'", hex))
    };

    let attribution = match name {
        "bold" => Attribution::Bold,
        "italic" => Attribution::Italic,
        "underline" => Attribution::Underline,
        "strikethrough" => Attribution::Strikethrough,
        "textColor" => Attribution::TextColor(color_value()?),
        "background" => Attribution::Background(color_value()?),
        "fontSize" => {
            let size = object
                .get("value")
                .and_then(Value::as_u64)
                .and_then(|n| u16::try_from(n).ok())
                .filter(|size| *size > 0)
                .ok_or_else(|| "invalid font size".to_string())?;
            Attribution::FontSize(size)
        }
        "entity" => {
            let id = object
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| "entity without id".to_string())?;
            let kind = object
                .get("kind")
                .and_then(Value::as_str)
                .and_then(EntityKind::parse)
                .ok_or_else(|| "entity without a valid kind".to_string())?;
            Attribution::Entity(EntityRef::new(id, kind))
        }
        other => return Err(format!("unknown attribution '{}'", other)),
    };
    Ok(attribution)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
