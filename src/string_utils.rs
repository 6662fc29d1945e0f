//! Character-Offset String Utilities
//!
//! Attributed text addresses its content by character offset (Unicode scalar
//! values), while Rust strings are indexed by UTF-8 byte. These helpers do the
//! conversion so callers never slice in the middle of a multi-byte character.
//!
//! # Example
//! ```ignore
//! use crate::string_utils::char_slice;
//!
//! let text = "Hei på deg"; // 'å' is 2 bytes
//! assert_eq!(char_slice(text, 4, 6), "på");
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Index Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Number of characters in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Convert a character index to a byte index.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Convert a byte index to a character index.
///
/// Returns the number of characters that start before `byte_index`.
pub fn byte_index_to_char_index(s: &str, byte_index: usize) -> usize {
    s.char_indices().take_while(|(i, _)| *i < byte_index).count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Character-Range Slicing and Editing
// ─────────────────────────────────────────────────────────────────────────────

/// Slice `s` by character offsets `[start, end)`.
///
/// Offsets past the end are clamped; an inverted range yields `""`.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let start = char_index_to_byte_index(s, start);
    let end = char_index_to_byte_index(s, end);
    &s[start..end]
}

/// Insert `text` before the character at `char_index`.
pub fn insert_at_char(s: &mut String, char_index: usize, text: &str) {
    let at = char_index_to_byte_index(s, char_index);
    s.insert_str(at, text);
}

/// Remove characters `[start, end)` from `s`.
pub fn remove_char_range(s: &mut String, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let start = char_index_to_byte_index(s, start);
    let end = char_index_to_byte_index(s, end);
    s.replace_range(start..end, "");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_multibyte() {
        assert_eq!(char_len("Hello"), 5);
        assert_eq!(char_len("Hei på deg"), 10);
        assert_eq!(char_len("🎉中"), 2);
        assert_eq!(char_len(""), 0);
    }

    #[test]
    fn test_char_index_to_byte_index() {
        let s = "på deg";
        assert_eq!(char_index_to_byte_index(s, 0), 0);
        assert_eq!(char_index_to_byte_index(s, 2), 3);
        assert_eq!(char_index_to_byte_index(s, 100), s.len());
    }

    #[test]
    fn test_byte_index_to_char_index() {
        let s = "på deg";
        assert_eq!(byte_index_to_char_index(s, 0), 0);
        assert_eq!(byte_index_to_char_index(s, 3), 2);
        // Middle of 'å' counts only the characters that start before it
        assert_eq!(byte_index_to_char_index(s, 2), 2);
    }

    #[test]
    fn test_char_slice() {
        let text = "Hei på deg";
        assert_eq!(char_slice(text, 4, 6), "på");
        assert_eq!(char_slice(text, 7, 100), "deg");
        assert_eq!(char_slice(text, 5, 5), "");
        assert_eq!(char_slice(text, 6, 2), "");
    }

    #[test]
    fn test_insert_at_char() {
        let mut s = String::from("中文");
        insert_at_char(&mut s, 1, "-");
        assert_eq!(s, "中-文");
        insert_at_char(&mut s, 99, "!");
        assert_eq!(s, "中-文!");
    }

    #[test]
    fn test_remove_char_range() {
        let mut s = String::from("Hei på deg");
        remove_char_range(&mut s, 3, 6);
        assert_eq!(s, "Hei deg");
        remove_char_range(&mut s, 2, 2);
        assert_eq!(s, "Hei deg");
    }
}
