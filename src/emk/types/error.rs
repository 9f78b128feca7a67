//! Custom error types for the emk-codec crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum EmkError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The decrypted buffer does not start with the EMK file magic.
    /// Either the file is not an EMK archive or it was obfuscated with a
    /// different key.
    #[error("Invalid file magic: expected {expected:02x?}, got {found:02x?}")]
    InvalidMagic { expected: Vec<u8>, found: Vec<u8> },

    /// The fixed header or a region it points at extends past the end of the
    /// buffer.
    #[error("Truncated header: needed {needed} bytes, only {available} available")]
    TruncatedHeader { needed: usize, available: usize },

    /// The section table ended in the middle of a record field.
    #[error("Truncated section record at table offset {offset:#x}")]
    TruncatedRecord { offset: usize },

    /// A typed value carried a type byte outside the documented set
    /// (0x02, 0x03, 0x04, 0x06).
    #[error("Unknown value type {tag:#04x} at table offset {offset:#x}")]
    UnknownTagType { tag: u8, offset: usize },

    /// A record field decoded to a value of the wrong kind (e.g. a numeric
    /// field holding a string).
    #[error("Unexpected field type at table offset {offset:#x}: expected {expected}")]
    UnexpectedFieldType {
        expected: &'static str,
        offset: usize,
    },

    /// A section record's compression id matches no known algorithm.
    #[error("Unknown compression id {id:#010x} in section '{tag}'")]
    UnknownCompression { tag: String, id: u32 },

    /// A decompressed payload's length does not match the size recorded in
    /// its section record.
    #[error("Size mismatch in section '{tag}': expected {expected} bytes, got {found}")]
    SizeMismatch {
        tag: String,
        expected: u64,
        found: u64,
    },

    /// A payload could not be decompressed, usually due to corruption.
    #[error("Decompression failed for section '{tag}': {reason}")]
    DecompressionFailed { tag: String, reason: String },

    /// A section record's data range falls outside the decrypted buffer.
    #[error("Section '{tag}' data range {begin:#x}..{end:#x} is out of bounds (buffer is {len} bytes)")]
    DataOutOfBounds {
        tag: String,
        begin: u64,
        end: u64,
        len: usize,
    },

    /// The cursor stream ran out of ticks while segmenting lyric lines.
    #[error("Insufficient cursor ticks at line {line}: needed {needed}, only {available} available")]
    InsufficientTicks {
        line: usize,
        needed: usize,
        available: usize,
    },

    /// Two sections were added under the same tag; tags are unique within a
    /// container.
    #[error("Duplicate section tag '{tag}'")]
    DuplicateTag { tag: String },

    /// A section the caller asked for is not present in the archive.
    #[error("Section '{tag}' not found in archive")]
    MissingSection { tag: String },
}

/// A convenience `Result` type alias using the crate's `EmkError` type.
pub type Result<T> = std::result::Result<T, EmkError>;
