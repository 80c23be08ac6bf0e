//! Custom error types for the matfile-reader crate.

use thiserror::Error;

use super::models::Tag;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum MatError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The stream ended before an expected field could be read.
    #[error("Truncated stream at byte {offset}: expected {context}")]
    TruncatedStream { offset: u64, context: &'static str },

    /// A tag is structurally invalid (bad small-form length, length not a
    /// multiple of the element width).
    #[error("Malformed tag {tag}: {reason}")]
    MalformedTag { tag: Tag, reason: String },

    /// The tag's data type code is not part of the MAT-file registry.
    #[error("Unrecognized data type in tag {tag}")]
    UnrecognizedType { tag: Tag },

    /// Alignment padding after an element contained non-zero bytes.
    #[error("Non-zero padding after element {tag}; stream is likely misaligned")]
    PaddingCorruption { tag: Tag },

    /// Inflating a compressed element failed.
    #[error("Decompression failed: {0}")]
    DecompressionError(String),

    /// The matrix has more than two dimensions and cannot be reconstructed.
    #[error("Unsupported rank {rank}: only matrices with two dimensions or less can be reconstructed")]
    UnsupportedRank { rank: usize },

    /// The matrix class code is unknown or names a class this reader does not decode.
    #[error("Unsupported matrix class code {code}")]
    UnsupportedClass { code: u8 },

    /// A declared count of items does not match the actual number of items found.
    #[error("Count mismatch for {item_type}: expected {expected}, but found {found}")]
    CountMismatch {
        item_type: &'static str,
        expected: u64,
        found: u64,
    },

    /// The file is structurally invalid in a way not covered by a more specific variant.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// A convenience `Result` type alias using the crate's `MatError` type.
pub type Result<T> = std::result::Result<T, MatError>;
