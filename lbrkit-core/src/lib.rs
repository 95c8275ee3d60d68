//! # LbrKit Core
//!
//! Core components for the LbrKit library toolkit.
//!
//! This crate provides the building blocks shared by the codec and
//! container crates:
//!
//! - [`bitstream`]: Bit-level I/O for variable-length codes
//! - [`checksum`]: The 16-bit additive checksum both codecs carry
//! - [`rle`]: The 0x90 run-length layer both codecs wrap around
//! - [`preview`]: Console-safe rendering of member text
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! LbrKit is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     lbr command surface                                 │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     .LBR directory parsing and member operations       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     Squeeze (RLE+Huffman), Crunch (RLE+adaptive LZW)   │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Primitives (this crate)                             │
//! │     BitReader/BitWriter, checksum, RLE, preview        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lbrkit_core::bitstream::BitReader;
//! use lbrkit_core::checksum::checksum16;
//! use std::io::Cursor;
//!
//! // Read bits least-significant-first, the way squeeze packs them
//! let data = vec![0x05];
//! let mut reader = BitReader::new(Cursor::new(data));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//!
//! // Checksum over original bytes
//! assert_eq!(checksum16(b"AB"), 0x0083);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod checksum;
pub mod error;
pub mod preview;
pub mod rle;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use checksum::{Checksum16, checksum16};
pub use error::{LbrError, Result};
pub use preview::Preview;
pub use rle::{DLE, RleExpander, rle_collapse, rle_expand};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::checksum::{Checksum16, checksum16};
    pub use crate::error::{LbrError, Result};
    pub use crate::preview::Preview;
    pub use crate::rle::{RleExpander, rle_collapse, rle_expand};
}
