//! # LbrKit-Squeeze: Pure Rust Squeeze Codec
//!
//! This crate encodes and decodes the CP/M "squeeze" format (.SQ /
//! .?Q? member files), the Huffman-plus-run-length scheme used by the
//! historical SQ/USQ tools and by library members squeezed before being
//! stored in a .LBR container.
//!
//! ## Stream layout
//!
//! - **Signature**: little-endian word `0xFF76`
//! - **Checksum**: 16-bit sum of the decoded bytes, little-endian
//! - **Original name**: NUL-terminated
//! - **Decode tree**: node count, then signed child word pairs; a
//!   negative word `-(v+1)` is a leaf for symbol `v`, 256 = end of
//!   stream, and node 0 is the root
//! - **Payload**: Huffman codes packed LSB-first per byte
//!
//! Below the Huffman layer sits the 0x90 run-length layer shared with
//! the crunch format.
//!
//! ## Example
//!
//! ```rust
//! use lbrkit_squeeze::{squeeze, unsqueeze};
//!
//! let original = b"a run: AAAAAAAAAAAAAAAA and some text";
//! let packed = squeeze("note.txt", original).unwrap();
//!
//! let out = unsqueeze(&packed).unwrap();
//! assert_eq!(out.data, original);
//! assert_eq!(out.original_name, "note.txt");
//! assert!(!out.checksum_mismatch);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod decoder;
mod encoder;
mod tree;

pub use decoder::{SQUEEZE_SIG, SqueezeOutput, is_squeezed, unsqueeze};
pub use encoder::squeeze;
pub use tree::{Child, DecodeTree, NUMVALS, SPEOF};
