//! The squeeze decode tree.
//!
//! A squeeze header carries the Huffman tree as a flat array of internal
//! nodes, each holding two signed child words. A non-negative word is the
//! index of another internal node; a negative word `-(v+1)` is a leaf for
//! symbol `v`, where symbol 256 marks end of stream. Node 0 is the root.

use lbrkit_core::bitstream::BitReader;
use lbrkit_core::error::{LbrError, Result};
use std::io::Read;

/// End-of-stream symbol, one past the largest byte value.
pub const SPEOF: u16 = 256;

/// Number of distinct symbols (256 byte values plus the end marker).
pub const NUMVALS: usize = 257;

/// One side of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    /// Terminal symbol: a byte value, or [`SPEOF`].
    Leaf(u16),
    /// Index of another internal node.
    Node(usize),
}

impl Child {
    /// Decode an on-disk signed child word, checking it against the
    /// declared node count.
    fn from_word(word: i16, node_count: usize) -> Result<Self> {
        if word < 0 {
            let value = -(i32::from(word) + 1);
            if value >= NUMVALS as i32 {
                return Err(LbrError::tree_corrupt(format!(
                    "leaf value {value} out of range"
                )));
            }
            Ok(Child::Leaf(value as u16))
        } else {
            let index = word as usize;
            if index >= node_count {
                return Err(LbrError::tree_corrupt(format!(
                    "child index {index} exceeds node count {node_count}"
                )));
            }
            Ok(Child::Node(index))
        }
    }

    /// Encode this child back into its on-disk signed word.
    pub fn to_word(self) -> i16 {
        match self {
            Child::Leaf(value) => -(value as i16 + 1),
            Child::Node(index) => index as i16,
        }
    }
}

/// Binary decode tree read from a squeeze header.
#[derive(Debug)]
pub struct DecodeTree {
    nodes: Vec<[Child; 2]>,
}

impl DecodeTree {
    /// Read the node count and child table.
    ///
    /// A node count of 0 is the single-symbol degenerate case: the
    /// implicit tree maps every bit straight to the end-of-stream leaf.
    pub fn parse<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let count = reader.read_i16_le()?;
        if count < 0 || count as usize >= NUMVALS {
            return Err(LbrError::tree_corrupt(format!(
                "node count {count} out of range"
            )));
        }
        let count = count as usize;

        if count == 0 {
            return Ok(Self {
                nodes: vec![[Child::Leaf(SPEOF), Child::Leaf(SPEOF)]],
            });
        }

        let mut nodes = Vec::with_capacity(count);
        for _ in 0..count {
            let left = Child::from_word(reader.read_i16_le()?, count)?;
            let right = Child::from_word(reader.read_i16_le()?, count)?;
            nodes.push([left, right]);
        }
        Ok(Self { nodes })
    }

    /// Walk the tree one bit at a time from the root until a leaf.
    ///
    /// The payload carries no length of its own; running out of bytes
    /// mid-walk means tree and payload disagree, reported as a corrupt
    /// tree rather than plain exhaustion.
    pub fn next_symbol<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let mut index = 0;
        loop {
            let bit = reader.read_bit().map_err(|_| {
                LbrError::tree_corrupt("bit stream ended before the end-of-stream leaf")
            })?;
            match self.nodes[index][usize::from(bit)] {
                Child::Leaf(value) => return Ok(value),
                Child::Node(next) => index = next,
            }
        }
    }
}
