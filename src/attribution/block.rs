//! Block-level metadata
//!
//! Formatting that applies to a whole paragraph rather than to a character
//! range: heading level, list membership, alignment and the block-quote flag.

// ─────────────────────────────────────────────────────────────────────────────
// Heading Level
// ─────────────────────────────────────────────────────────────────────────────

/// Heading level (H1-H6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
    H4 = 4,
    H5 = 5,
    H6 = 6,
}

impl HeadingLevel {
    /// Convert a numeric level. Anything outside 1-6 is rejected.
    pub fn from_level(level: u64) -> Option<Self> {
        match level {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            4 => Some(HeadingLevel::H4),
            5 => Some(HeadingLevel::H5),
            6 => Some(HeadingLevel::H6),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

/// List type (ordered or unordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Unordered => "unordered",
            ListKind::Ordered => "ordered",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "unordered" | "bullet" => Some(ListKind::Unordered),
            "ordered" | "numbered" => Some(ListKind::Ordered),
            _ => None,
        }
    }
}

/// Membership of a block in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListMembership {
    pub kind: ListKind,
    /// Nesting depth, 0 for a top-level item
    pub indent: u8,
}

impl ListMembership {
    pub fn new(kind: ListKind, indent: u8) -> Self {
        Self { kind, indent }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Alignment
// ─────────────────────────────────────────────────────────────────────────────

/// Horizontal alignment of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlignment::Left => "left",
            TextAlignment::Center => "center",
            TextAlignment::Right => "right",
            TextAlignment::Justify => "justify",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(TextAlignment::Left),
            "center" => Some(TextAlignment::Center),
            "right" | "end" => Some(TextAlignment::Right),
            "justify" => Some(TextAlignment::Justify),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Type
// ─────────────────────────────────────────────────────────────────────────────

/// The kind of paragraph a block presents as.
///
/// This is a projection of [`BlockMetadata`]: a block-type change replaces
/// the metadata with [`BlockMetadata::for_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Paragraph,
    Heading(HeadingLevel),
    ListItem(ListKind),
    BlockQuote,
}

impl BlockType {
    pub fn label(&self) -> String {
        match self {
            BlockType::Paragraph => "Paragraph".to_string(),
            BlockType::Heading(level) => format!("Heading {}", level.level()),
            BlockType::ListItem(ListKind::Unordered) => "Bullet List".to_string(),
            BlockType::ListItem(ListKind::Ordered) => "Numbered List".to_string(),
            BlockType::BlockQuote => "Block Quote".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Paragraph-wide formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockMetadata {
    pub heading: Option<HeadingLevel>,
    pub list: Option<ListMembership>,
    pub alignment: Option<TextAlignment>,
    pub block_quote: bool,
}

impl BlockMetadata {
    /// Fresh metadata for a block of the given type.
    pub fn for_type(block_type: BlockType) -> Self {
        let mut metadata = Self::default();
        match block_type {
            BlockType::Paragraph => {}
            BlockType::Heading(level) => metadata.heading = Some(level),
            BlockType::ListItem(kind) => metadata.list = Some(ListMembership::new(kind, 0)),
            BlockType::BlockQuote => metadata.block_quote = true,
        }
        metadata
    }

    /// The type this metadata presents as.
    ///
    /// Heading wins over list membership, which wins over the quote flag.
    pub fn block_type(&self) -> BlockType {
        if let Some(level) = self.heading {
            BlockType::Heading(level)
        } else if let Some(list) = self.list {
            BlockType::ListItem(list.kind)
        } else if self.block_quote {
            BlockType::BlockQuote
        } else {
            BlockType::Paragraph
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Alignment with the default filled in.
    pub fn effective_alignment(&self) -> TextAlignment {
        self.alignment.unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
