//! Error types for LbrKit operations.
//!
//! One error enum serves the whole workspace: the container, both codecs,
//! and the shared utilities all report through [`LbrError`], so callers get
//! a single `Result` type across every operation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for LbrKit operations.
#[derive(Debug, Error)]
pub enum LbrError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Source file does not exist.
    #[error("Cannot open file: {path}")]
    FileNotFound {
        /// Path that could not be opened.
        path: PathBuf,
    },

    /// Archive directory unreadable or malformed.
    #[error("Not a library: {reason}")]
    NotALibrary {
        /// Description of what failed to parse.
        reason: String,
    },

    /// No free directory slot for a new member.
    #[error("Library is full ({slots} slots)")]
    LibraryFull {
        /// Total slot count of the library.
        slots: usize,
    },

    /// Named member absent from the library.
    #[error("{name}: not in library")]
    NotFound {
        /// The member name that was requested.
        name: String,
    },

    /// Decoded payload's checksum disagrees with the stored value.
    #[error("Checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        /// Checksum stored in the stream.
        stored: u16,
        /// Checksum computed over the output.
        computed: u16,
    },

    /// Malformed squeeze decode tree.
    #[error("Corrupt decode tree: {detail}")]
    TreeCorrupt {
        /// Description of the malformation.
        detail: String,
    },

    /// Compressed payload ended before its logical end-of-data.
    #[error("Unexpected end of stream while reading {expected}")]
    StreamExhausted {
        /// What was being read when the stream ran out.
        expected: String,
    },

    /// Destination I/O failure during extraction or copy.
    #[error("Write failure in {path}: {source}")]
    WriteFailure {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Name does not fit the 8.3 form and was truncated.
    #[error("{name}: name truncated")]
    TruncatedName {
        /// The offending name as given.
        name: String,
    },

    /// Unrecognized codec signature bytes.
    #[error("Invalid signature: expected {expected:#06x}, found {found:#06x}")]
    InvalidSignature {
        /// Signature the format requires.
        expected: u16,
        /// Signature actually read.
        found: u16,
    },

    /// Crunch significance revision outside the supported range.
    #[error("Unsupported format revision {found:#04x} (supported: 0x20-0x2f)")]
    UnsupportedRevision {
        /// Revision byte read from the stream.
        found: u8,
    },

    /// LZW code referencing a vacant table entry.
    #[error("Invalid code {code:#05x} references an undefined table entry")]
    InvalidCode {
        /// The offending code value.
        code: u16,
    },

    /// Requested slot count out of range for a new library.
    #[error("Invalid slot count {requested} (must be 4-256)")]
    InvalidSlotCount {
        /// Slot count as requested.
        requested: usize,
    },

    /// More file names than the directory can ever hold.
    #[error("Too many file names ({count}, limit {limit})")]
    TooManyFiles {
        /// Number of names given.
        count: usize,
        /// Maximum allowed.
        limit: usize,
    },
}

/// Result type alias for LbrKit operations.
pub type Result<T> = std::result::Result<T, LbrError>;

impl LbrError {
    /// Create a file-not-found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a not-a-library error.
    pub fn not_a_library(reason: impl Into<String>) -> Self {
        Self::NotALibrary {
            reason: reason.into(),
        }
    }

    /// Create a library-full error.
    pub fn library_full(slots: usize) -> Self {
        Self::LibraryFull { slots }
    }

    /// Create a member-not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(stored: u16, computed: u16) -> Self {
        Self::ChecksumMismatch { stored, computed }
    }

    /// Create a corrupt-tree error.
    pub fn tree_corrupt(detail: impl Into<String>) -> Self {
        Self::TreeCorrupt {
            detail: detail.into(),
        }
    }

    /// Create a stream-exhausted error.
    pub fn stream_exhausted(expected: impl Into<String>) -> Self {
        Self::StreamExhausted {
            expected: expected.into(),
        }
    }

    /// Create a write-failure error.
    pub fn write_failure(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    /// Create a truncated-name warning.
    pub fn truncated_name(name: impl Into<String>) -> Self {
        Self::TruncatedName { name: name.into() }
    }

    /// Create an invalid-signature error.
    pub fn invalid_signature(expected: u16, found: u16) -> Self {
        Self::InvalidSignature { expected, found }
    }

    /// Create an invalid-code error.
    pub fn invalid_code(code: u16) -> Self {
        Self::InvalidCode { code }
    }

    /// Create an unsupported-revision error.
    pub fn unsupported_revision(found: u8) -> Self {
        Self::UnsupportedRevision { found }
    }

    /// Create an invalid-slot-count error.
    pub fn invalid_slot_count(requested: usize) -> Self {
        Self::InvalidSlotCount { requested }
    }

    /// Create a too-many-files error.
    pub fn too_many_files(count: usize, limit: usize) -> Self {
        Self::TooManyFiles { count, limit }
    }
}
