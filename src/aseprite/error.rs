//! Decode failures for layered documents

use thiserror::Error;

/// Error produced when a document cannot be decoded.
///
/// Decoding never yields a partial document: any of these aborts the decode.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The file could not be read
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
    /// Header magic number mismatch
    #[error("Not an Aseprite document (magic {found:#06x}, expected 0xa5e0)")]
    BadMagic { found: u16 },
    /// Frame header magic number mismatch
    #[error("Frame {frame} has invalid magic {found:#06x}, expected 0xf1fa")]
    BadFrameMagic { frame: usize, found: u16 },
    /// Color depth other than RGBA or indexed
    #[error("Unsupported color depth: {0} bits per pixel")]
    UnsupportedColorDepth(u16),
    /// Data ended before a structure was complete
    #[error("Truncated document while reading {context}")]
    Truncated { context: &'static str },
    /// A structure was complete but its content is inconsistent
    #[error("Malformed {context}: {message}")]
    Malformed { context: &'static str, message: String },
    /// A compressed cel failed to inflate
    #[error("Failed to decompress cel on layer {layer}: {source}")]
    Decompress {
        layer: u16,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    pub(crate) fn malformed(context: &'static str, message: impl Into<String>) -> Self {
        ParseError::Malformed { context, message: message.into() }
    }
}
