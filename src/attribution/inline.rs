//! Inline attribution markers
//!
//! An [`Attribution`] tags a character range with a style (bold, italic,
//! colour, size, ...) or with a reference to a story entity owned by the
//! entity-recognition layer.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// A 32-bit ARGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    /// Create a colour from a packed `0xAARRGGBB` value.
    pub const fn from_argb(argb: u32) -> Self {
        Color(argb)
    }

    /// Create an opaque colour from its channels.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }

    /// Parse `#RRGGBB` or `#AARRGGBB` (the leading `#` is optional).
    ///
    /// Returns `None` for anything else.
    pub fn parse_hex(input: &str) -> Option<Self> {
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            6 => Some(Color(0xFF00_0000 | value)),
            8 => Some(Color(value)),
            _ => None,
        }
    }

    /// Hex form used by the document format.
    ///
    /// Opaque colours are written as `#RRGGBB`, others as `#AARRGGBB`.
    pub fn to_hex(self) -> String {
        if self.is_opaque() {
            format!("#{:06X}", self.0 & 0x00FF_FFFF)
        } else {
            format!("#{:08X}", self.0)
        }
    }

    /// CSS value for HTML export.
    pub fn to_css(self) -> String {
        if self.is_opaque() {
            format!("#{:06x}", self.0 & 0x00FF_FFFF)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.red(),
                self.green(),
                self.blue(),
                self.alpha() as f32 / 255.0
            )
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entity References
// ─────────────────────────────────────────────────────────────────────────────

/// Category of a story entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Character,
    Location,
    Object,
    Event,
}

impl EntityKind {
    /// Name used in the document format and in CSS class names.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Character => "character",
            EntityKind::Location => "location",
            EntityKind::Object => "object",
            EntityKind::Event => "event",
        }
    }

    /// Parse a kind name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "character" => Some(EntityKind::Character),
            "location" => Some(EntityKind::Location),
            "object" => Some(EntityKind::Object),
            "event" => Some(EntityKind::Event),
            _ => None,
        }
    }

    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Character,
            EntityKind::Location,
            EntityKind::Object,
            EntityKind::Event,
        ]
    }
}

/// Opaque reference to an externally owned story entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub id: String,
    pub kind: EntityKind,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Attributions
// ─────────────────────────────────────────────────────────────────────────────

/// The toggleable, parameterless inline styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl InlineStyle {
    pub fn attribution(self) -> Attribution {
        match self {
            InlineStyle::Bold => Attribution::Bold,
            InlineStyle::Italic => Attribution::Italic,
            InlineStyle::Underline => Attribution::Underline,
            InlineStyle::Strikethrough => Attribution::Strikethrough,
        }
    }

    pub fn all() -> &'static [InlineStyle] {
        &[
            InlineStyle::Bold,
            InlineStyle::Italic,
            InlineStyle::Underline,
            InlineStyle::Strikethrough,
        ]
    }
}

/// Discriminant of an [`Attribution`], ignoring its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributionFamily {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    TextColor,
    Background,
    FontSize,
    Entity,
}

/// A marker applied to a character range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribution {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    TextColor(Color),
    Background(Color),
    /// Font size in points.
    FontSize(u16),
    Entity(EntityRef),
}

impl Attribution {
    pub fn family(&self) -> AttributionFamily {
        match self {
            Attribution::Bold => AttributionFamily::Bold,
            Attribution::Italic => AttributionFamily::Italic,
            Attribution::Underline => AttributionFamily::Underline,
            Attribution::Strikethrough => AttributionFamily::Strikethrough,
            Attribution::TextColor(_) => AttributionFamily::TextColor,
            Attribution::Background(_) => AttributionFamily::Background,
            Attribution::FontSize(_) => AttributionFamily::FontSize,
            Attribution::Entity(_) => AttributionFamily::Entity,
        }
    }

    /// Entity markers belong to the recognition layer, not to formatting.
    pub fn is_entity(&self) -> bool {
        matches!(self, Attribution::Entity(_))
    }

    /// Anything a formatting command may add or remove.
    pub fn is_style(&self) -> bool {
        !self.is_entity()
    }

    /// Families where at most one value may cover a character.
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            Attribution::TextColor(_) | Attribution::Background(_) | Attribution::FontSize(_)
        )
    }

    /// True when adding `self` must evict `other` from the same characters.
    pub fn conflicts_with(&self, other: &Attribution) -> bool {
        self.is_exclusive() && self.family() == other.family() && self != other
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Attribution::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Name used by the document format.
    pub fn name(&self) -> &'static str {
        match self {
            Attribution::Bold => "bold",
            Attribution::Italic => "italic",
            Attribution::Underline => "underline",
            Attribution::Strikethrough => "strikethrough",
            Attribution::TextColor(_) => "textColor",
            Attribution::Background(_) => "background",
            Attribution::FontSize(_) => "fontSize",
            Attribution::Entity(_) => "entity",
        }
    }
}

impl From<InlineStyle> for Attribution {
    fn from(style: InlineStyle) -> Self {
        style.attribution()
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribution::TextColor(color) | Attribution::Background(color) => {
                write!(f, "{}({})", self.name(), color)
            }
            Attribution::FontSize(size) => write!(f, "{}({}pt)", self.name(), size),
            Attribution::Entity(entity) => {
                write!(f, "entity({}:{})", entity.kind.as_str(), entity.id)
            }
            _ => f.write_str(self.name()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
