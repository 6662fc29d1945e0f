//! User settings for PlotEngine formatting
//!
//! This module defines the `Settings` struct that holds the tunable limits
//! of the formatting core, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Formatting, history and persistence preferences.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Typography
    // ─────────────────────────────────────────────────────────────────────────
    /// Font size (points) assumed for text without a size attribution
    pub default_font_size: u16,

    /// Smallest size `SetFontSize` will apply
    pub min_font_size: u16,

    /// Largest size `SetFontSize` will apply
    pub max_font_size: u16,

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────
    /// Maximum number of undo steps kept per document
    pub max_undo_depth: usize,

    /// Deepest list nesting reachable with indent
    pub max_list_indent: u8,

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence & Export
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether saved documents include entity highlight spans
    pub persist_entity_attributions: bool,

    /// Whether saved documents are pretty-printed
    pub pretty_json: bool,

    /// Whether HTML export wraps entity mentions in marked-up spans
    pub html_entity_markup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Typography
            default_font_size: 12,
            min_font_size: 6,
            max_font_size: 96,

            // Editing
            max_undo_depth: 100,
            max_list_indent: 6,

            // Persistence & Export
            persist_entity_attributions: false,
            pretty_json: true,
            html_entity_markup: true,
        }
    }
}

impl Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Smallest font size any setting may hold.
    pub const MIN_FONT_SIZE: u16 = 6;
    /// Largest font size any setting may hold.
    pub const MAX_FONT_SIZE: u16 = 96;
    /// Minimum undo depth.
    pub const MIN_UNDO_DEPTH: usize = 1;
    /// Maximum undo depth.
    pub const MAX_UNDO_DEPTH: usize = 1000;
    /// Deepest list indent that may be configured.
    pub const MAX_LIST_INDENT: u8 = 10;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        // Clamp font size bounds, keeping min <= max
        self.min_font_size = self
            .min_font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);
        self.max_font_size = self
            .max_font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);
        if self.min_font_size > self.max_font_size {
            std::mem::swap(&mut self.min_font_size, &mut self.max_font_size);
        }

        // Default size must lie inside the bounds
        self.default_font_size = self
            .default_font_size
            .clamp(self.min_font_size, self.max_font_size);

        // Clamp history depth
        self.max_undo_depth = self
            .max_undo_depth
            .clamp(Self::MIN_UNDO_DEPTH, Self::MAX_UNDO_DEPTH);

        // Clamp list nesting
        self.max_list_indent = self.max_list_indent.min(Self::MAX_LIST_INDENT);
    }

    /// Clamp a requested font size to the configured bounds.
    ///
    /// Inverted bounds resolve to `min_font_size`.
    pub fn clamp_font_size(&self, size: u16) -> u16 {
        let min = self.min_font_size;
        size.max(min).min(self.max_font_size.max(min))
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_font_size, 12);
        assert_eq!(settings.max_undo_depth, 100);
        assert_eq!(settings.max_list_indent, 6);
        assert!(!settings.persist_entity_attributions);
        assert!(settings.pretty_json);
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let mut settings = Settings::default();
        settings.max_undo_depth = 42;
        settings.persist_entity_attributions = true;

        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let json = r#"{"max_list_indent": 3}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.max_list_indent, 3);
        assert_eq!(settings.default_font_size, 12);
    }

    #[test]
    fn test_settings_deserialize_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_sanitize_font_sizes() {
        let mut settings = Settings {
            min_font_size: 200,
            max_font_size: 1,
            default_font_size: 500,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.min_font_size, Settings::MIN_FONT_SIZE);
        assert_eq!(settings.max_font_size, Settings::MAX_FONT_SIZE);
        assert_eq!(settings.default_font_size, Settings::MAX_FONT_SIZE);
    }

    #[test]
    fn test_sanitize_undo_depth() {
        let mut settings = Settings {
            max_undo_depth: 0,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.max_undo_depth, Settings::MIN_UNDO_DEPTH);

        settings.max_undo_depth = 1_000_000;
        settings.sanitize();
        assert_eq!(settings.max_undo_depth, Settings::MAX_UNDO_DEPTH);
    }

    #[test]
    fn test_sanitize_list_indent() {
        let mut settings = Settings {
            max_list_indent: 200,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.max_list_indent, Settings::MAX_LIST_INDENT);
    }

    #[test]
    fn test_clamp_font_size() {
        let settings = Settings::default();
        assert_eq!(settings.clamp_font_size(2), 6);
        assert_eq!(settings.clamp_font_size(18), 18);
        assert_eq!(settings.clamp_font_size(400), 96);
    }

    #[test]
    fn test_clamp_font_size_inverted_bounds() {
        let settings = Settings {
            min_font_size: 40,
            max_font_size: 10,
            ..Settings::default()
        };
        assert_eq!(settings.clamp_font_size(18), 40);
        assert_eq!(settings.clamp_font_size(90), 40);
    }

    #[test]
    fn test_from_json_sanitized() {
        let json = r#"{"max_undo_depth": 0, "pretty_json": false}"#;
        let settings = Settings::from_json_sanitized(json).unwrap();
        assert_eq!(settings.max_undo_depth, 1);
        assert!(!settings.pretty_json);
    }
}
