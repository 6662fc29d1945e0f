//! Centralized error handling for PlotEngine
//!
//! This module provides a unified error type that covers all error scenarios
//! in the crate: file I/O, configuration, document decoding, and the
//! attributed-text model itself.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the crate.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // File I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to read file contents
    FileRead { path: PathBuf, source: io::Error },

    /// Failed to write file contents
    FileWrite { path: PathBuf, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Document Format Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The document JSON could not be parsed at all
    DocumentParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The document was written by a newer format version
    UnsupportedVersion { found: u64, supported: u64 },

    // ─────────────────────────────────────────────────────────────────────────
    // Model Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A character range does not fit inside the text it targets
    InvalidRange { start: usize, end: usize, len: usize },

    /// No block with the given id exists in the document
    BlockNotFound(String),

    /// A block id is already used by another block
    DuplicateBlockId(String),

    /// The operation needs a text block but the target is not one
    NotATextBlock(String),

    /// The selection cannot be resolved against the document
    InvalidSelection(String),

    // ─────────────────────────────────────────────────────────────────────────
    // History Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Undo was requested with an empty undo stack
    NothingToUndo,

    /// Redo was requested with an empty redo stack
    NothingToRedo,

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic application error with a message
    Application(String),
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::DocumentParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // File I/O Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }

            // Document Format Errors
            Error::DocumentParse { message, .. } => {
                write!(f, "Invalid document format: {}", message)
            }
            Error::UnsupportedVersion { found, supported } => {
                write!(
                    f,
                    "Document format version {} is newer than the supported version {}",
                    found, supported
                )
            }

            // Model Errors
            Error::InvalidRange { start, end, len } => {
                write!(
                    f,
                    "Range {}..={} is out of bounds for text of length {}",
                    start, end, len
                )
            }
            Error::BlockNotFound(id) => write!(f, "Block '{}' not found", id),
            Error::DuplicateBlockId(id) => write!(f, "Block id '{}' is already in use", id),
            Error::NotATextBlock(id) => write!(f, "Block '{}' does not contain text", id),
            Error::InvalidSelection(msg) => write!(f, "Invalid selection: {}", msg),

            // History Errors
            Error::NothingToUndo => write!(f, "Nothing to undo"),
            Error::NothingToRedo => write!(f, "Nothing to redo"),

            // Application Errors
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::FileRead { source, .. } => Some(source),
            Error::FileWrite { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } | Error::DocumentParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::ConfigDirNotFound
            | Error::UnsupportedVersion { .. }
            | Error::InvalidRange { .. }
            | Error::BlockNotFound(_)
            | Error::DuplicateBlockId(_)
            | Error::NotATextBlock(_)
            | Error::InvalidSelection(_)
            | Error::NothingToUndo
            | Error::NothingToRedo
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
