//! Squeeze stream encoding.
//!
//! Runs are collapsed through the 0x90 layer first, then a Huffman tree
//! is built over the collapsed symbols plus the end-of-stream marker and
//! serialized with the root at node 0.

use crate::decoder::SQUEEZE_SIG;
use crate::tree::{Child, NUMVALS, SPEOF};
use lbrkit_core::bitstream::BitWriter;
use lbrkit_core::checksum::checksum16;
use lbrkit_core::error::Result;
use lbrkit_core::rle::rle_collapse;

enum BuildNode {
    Leaf(u16),
    Internal(usize, usize),
}

/// Encode `data` into a squeeze stream recording `original_name`.
///
/// The header checksum covers the original bytes, not the collapsed
/// form. Interior NUL bytes in the name end it early (the header stores
/// the name NUL-terminated).
pub fn squeeze(original_name: &str, data: &[u8]) -> Result<Vec<u8>> {
    let packed = rle_collapse(data);

    let mut freq = [0u64; NUMVALS];
    for &b in &packed {
        freq[b as usize] += 1;
    }
    freq[SPEOF as usize] = 1;

    let (nodes, codes) = build_tree(&freq);

    let mut out = Vec::with_capacity(packed.len() / 2 + 64);
    out.extend_from_slice(&SQUEEZE_SIG.to_le_bytes());
    out.extend_from_slice(&checksum16(data).to_le_bytes());
    for &b in original_name.as_bytes() {
        if b == 0 {
            break;
        }
        out.push(b);
    }
    out.push(0);
    out.extend_from_slice(&(nodes.len() as u16).to_le_bytes());
    for node in &nodes {
        out.extend_from_slice(&node[0].to_word().to_le_bytes());
        out.extend_from_slice(&node[1].to_word().to_le_bytes());
    }

    let mut writer = BitWriter::new(&mut out);
    for &b in &packed {
        for &bit in &codes[b as usize] {
            writer.write_bit(bit == 1)?;
        }
    }
    for &bit in &codes[SPEOF as usize] {
        writer.write_bit(bit == 1)?;
    }
    writer.flush()?;

    Ok(out)
}

/// Build the node table (root first) and per-symbol code bit paths.
fn build_tree(freq: &[u64; NUMVALS]) -> (Vec<[Child; 2]>, Vec<Vec<u8>>) {
    let mut arena: Vec<BuildNode> = Vec::new();
    let mut live: Vec<(u64, usize)> = Vec::new();
    for (symbol, &weight) in freq.iter().enumerate() {
        if weight > 0 {
            arena.push(BuildNode::Leaf(symbol as u16));
            live.push((weight, arena.len() - 1));
        }
    }

    let mut codes = vec![Vec::new(); NUMVALS];

    // Empty input leaves only the end marker; the implicit zero-node
    // tree decodes any single bit as end of stream.
    if live.len() == 1 {
        codes[SPEOF as usize] = vec![0];
        return (Vec::new(), codes);
    }

    while live.len() > 1 {
        let (w0, n0) = remove_lightest(&mut live);
        let (w1, n1) = remove_lightest(&mut live);
        arena.push(BuildNode::Internal(n0, n1));
        live.push((w0 + w1, arena.len() - 1));
    }

    let mut nodes = Vec::new();
    let root = live[0].1;
    layout(&arena, root, &mut nodes);
    assign_codes(&nodes, 0, &mut Vec::new(), &mut codes);
    (nodes, codes)
}

fn remove_lightest(live: &mut Vec<(u64, usize)>) -> (u64, usize) {
    let mut lightest = 0;
    for i in 1..live.len() {
        if live[i].0 < live[lightest].0 {
            lightest = i;
        }
    }
    live.swap_remove(lightest)
}

/// Number internal nodes in preorder so the root lands at index 0.
fn layout(arena: &[BuildNode], index: usize, nodes: &mut Vec<[Child; 2]>) -> Child {
    match arena[index] {
        BuildNode::Leaf(symbol) => Child::Leaf(symbol),
        BuildNode::Internal(left, right) => {
            let slot = nodes.len();
            nodes.push([Child::Leaf(0), Child::Leaf(0)]);
            let left = layout(arena, left, nodes);
            let right = layout(arena, right, nodes);
            nodes[slot] = [left, right];
            Child::Node(slot)
        }
    }
}

fn assign_codes(
    nodes: &[[Child; 2]],
    index: usize,
    prefix: &mut Vec<u8>,
    codes: &mut [Vec<u8>],
) {
    for (bit, child) in nodes[index].iter().enumerate() {
        prefix.push(bit as u8);
        match *child {
            Child::Leaf(symbol) => codes[symbol as usize] = prefix.clone(),
            Child::Node(next) => assign_codes(nodes, next, prefix, codes),
        }
        prefix.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::unsqueeze;

    #[test]
    fn test_empty_input_uses_zero_node_tree() {
        let packed = squeeze("nul", &[]).unwrap();
        // signature, checksum, "nul\0", node count 0, one payload byte
        assert_eq!(&packed[..4], &[0x76, 0xff, 0x00, 0x00]);
        assert_eq!(&packed[8..10], &[0x00, 0x00]);
        let out = unsqueeze(&packed).unwrap();
        assert!(out.data.is_empty());
        assert_eq!(out.original_name, "nul");
    }

    #[test]
    fn test_header_records_original_checksum() {
        let data = b"AAAA";
        let packed = squeeze("a", data).unwrap();
        assert_eq!(u16::from_le_bytes([packed[2], packed[3]]), 0x0104);
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let mut freq = [0u64; NUMVALS];
        freq[b'a' as usize] = 40;
        freq[b'b' as usize] = 20;
        freq[b'c' as usize] = 10;
        freq[b'd' as usize] = 1;
        freq[SPEOF as usize] = 1;
        let (_, codes) = build_tree(&freq);

        let assigned: Vec<&Vec<u8>> = codes.iter().filter(|c| !c.is_empty()).collect();
        assert_eq!(assigned.len(), 5);
        for (i, a) in assigned.iter().enumerate() {
            for (j, b) in assigned.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a.as_slice()));
                }
            }
        }
    }

    #[test]
    fn test_heavier_symbols_get_shorter_codes() {
        let mut freq = [0u64; NUMVALS];
        freq[b'x' as usize] = 1000;
        freq[b'y' as usize] = 2;
        freq[b'z' as usize] = 2;
        freq[SPEOF as usize] = 1;
        let (_, codes) = build_tree(&freq);
        assert!(codes[b'x' as usize].len() < codes[b'y' as usize].len());
    }

    #[test]
    fn test_root_is_node_zero() {
        let data = b"mixed content 1234";
        let packed = squeeze("m", data).unwrap();
        let out = unsqueeze(&packed).unwrap();
        assert_eq!(out.data, data);
    }
}
