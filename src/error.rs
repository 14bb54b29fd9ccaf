//! Error types for compression and decompression.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = core::result::Result<T, HuffError>;

/// Everything that can go wrong while compressing or decompressing.
#[derive(Debug, Error)]
pub enum HuffError {
    /// A tree or header was requested from a table with no entries.
    #[error("cannot build from an empty table")]
    EmptyTable,

    /// The encode pass met a byte that the frequency pass never saw.
    ///
    /// This means the input changed between the two passes, or the table was built from
    /// different data. Compression is aborted.
    #[error("byte 0x{symbol:02x} at offset {offset} has no code in the table")]
    MissingCode { symbol: u8, offset: u64 },

    /// The input contains the reserved end-of-stream byte, which the decoder would treat as
    /// the end of the data.
    #[error("input contains the reserved end-of-stream byte 0x03 at offset {offset}")]
    SentinelInInput { offset: u64 },

    /// The code table header could not be parsed or describes an inconsistent tree.
    #[error("corrupt header at byte {offset}: {reason}")]
    CorruptHeader { offset: usize, reason: String },

    /// The payload walked off the decoding tree.
    #[error("corrupt stream: no edge to follow at bit {bit}")]
    CorruptStream { bit: u64 },

    /// The payload ran out before the end-of-stream code was decoded.
    #[error("truncated stream: {bits} bits consumed without reaching the end-of-stream code")]
    TruncatedStream { bits: u64 },

    /// The container prelude is missing or malformed.
    #[error("invalid container: {0}")]
    InvalidContainer(String),

    /// A freshly written container did not decode back to its input.
    #[error("verification failed: decoded {actual} bytes, expected {expected} bytes of identical content")]
    VerifyMismatch { expected: u64, actual: u64 },

    /// The output path names the input file, which creating the output would truncate.
    #[error("output {path} is the input file")]
    OutputIsInput { path: String },

    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HuffError {
    /// Create a corrupt header error.
    pub fn corrupt_header(offset: usize, reason: impl Into<String>) -> Self {
        HuffError::CorruptHeader {
            offset,
            reason: reason.into(),
        }
    }

    /// Create an invalid container error.
    pub fn invalid_container(message: impl Into<String>) -> Self {
        HuffError::InvalidContainer(message.into())
    }

    /// Whether the error was caused by damaged compressed data rather than by the caller or
    /// the environment.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            HuffError::CorruptHeader { .. }
                | HuffError::CorruptStream { .. }
                | HuffError::TruncatedStream { .. }
                | HuffError::InvalidContainer(_)
        )
    }

    /// Short category name, used as a structured logging field.
    pub fn category(&self) -> &'static str {
        match self {
            HuffError::EmptyTable => "construction",
            HuffError::MissingCode { .. } | HuffError::SentinelInInput { .. } => "input_integrity",
            HuffError::CorruptHeader { .. } => "corrupt_header",
            HuffError::CorruptStream { .. } | HuffError::TruncatedStream { .. } => "corrupt_stream",
            HuffError::InvalidContainer(_) => "container",
            HuffError::VerifyMismatch { .. } => "verification",
            HuffError::OutputIsInput { .. } => "usage",
            HuffError::Io(_) => "io",
        }
    }
}
