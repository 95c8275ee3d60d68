//! Squeeze stream decoding.

use crate::tree::{DecodeTree, SPEOF};
use lbrkit_core::bitstream::BitReader;
use lbrkit_core::checksum::checksum16;
use lbrkit_core::error::{LbrError, Result};
use lbrkit_core::rle::RleExpander;

/// Little-endian signature word opening every squeeze stream.
pub const SQUEEZE_SIG: u16 = 0xFF76;

/// Result of decoding a squeeze stream.
#[derive(Debug, Clone)]
pub struct SqueezeOutput {
    /// Original filename recorded in the header.
    pub original_name: String,
    /// Decoded bytes.
    pub data: Vec<u8>,
    /// True when the header checksum disagreed with the decoded data.
    /// The data is kept either way.
    pub checksum_mismatch: bool,
}

/// Quick probe for the squeeze signature at the start of a buffer.
pub fn is_squeezed(data: &[u8]) -> bool {
    data.len() >= 2 && u16::from_le_bytes([data[0], data[1]]) == SQUEEZE_SIG
}

/// Decode a complete squeeze stream.
///
/// Trailing bytes after the end-of-stream leaf are ignored; members cut
/// out of a library arrive padded to a sector boundary.
pub fn unsqueeze(input: &[u8]) -> Result<SqueezeOutput> {
    let mut reader = BitReader::new(input);

    let sig = reader.read_u16_le()?;
    if sig != SQUEEZE_SIG {
        return Err(LbrError::invalid_signature(SQUEEZE_SIG, sig));
    }
    let stored_sum = reader.read_u16_le()?;
    let name_bytes = reader.read_cstring()?;
    let original_name = String::from_utf8_lossy(&name_bytes).into_owned();
    let tree = DecodeTree::parse(&mut reader)?;

    let mut data = Vec::new();
    let mut expander = RleExpander::new();
    loop {
        let symbol = tree.next_symbol(&mut reader)?;
        if symbol == SPEOF {
            break;
        }
        expander.feed(symbol as u8, &mut data);
    }

    let computed = checksum16(&data);
    // The CP/M-era tools reduced both sums to zero/nonzero before
    // comparing, so only a zero-vs-nonzero disagreement is observable.
    let checksum_mismatch = (stored_sum != 0) != (computed != 0);

    Ok(SqueezeOutput {
        original_name,
        data,
        checksum_mismatch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_probe() {
        assert!(is_squeezed(&[0x76, 0xff, 0x00]));
        assert!(!is_squeezed(&[0x76, 0xfe]));
        assert!(!is_squeezed(&[0x76]));
    }

    #[test]
    fn test_rejects_bad_signature() {
        let err = unsqueeze(&[0x50, 0x4b, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, LbrError::InvalidSignature { .. }));
    }

    #[test]
    fn test_zero_node_stream_is_empty() {
        let stream = [
            0x76, 0xff, // signature
            0x00, 0x00, // checksum
            b'e', 0x00, // name "e"
            0x00, 0x00, // zero nodes
            0x00, // one bit reaches the implicit end leaf
        ];
        let out = unsqueeze(&stream).unwrap();
        assert_eq!(out.original_name, "e");
        assert!(out.data.is_empty());
        assert!(!out.checksum_mismatch);
    }

    #[test]
    fn test_single_node_stream() {
        // One node: bit 0 -> 'A', bit 1 -> end. Payload 0x08 encodes
        // the bit sequence 0,0,0,1 = "AAA" then end of stream.
        let stream = [
            0x76, 0xff, //
            0xc3, 0x00, // 3 * 'A'
            b'a', 0x00, //
            0x01, 0x00, //
            0xbe, 0xff, 0xff, 0xfe, //
            0x08,
        ];
        let out = unsqueeze(&stream).unwrap();
        assert_eq!(out.data, b"AAA");
        assert!(!out.checksum_mismatch);
    }

    #[test]
    fn test_run_length_payload_expands() {
        // Four-leaf tree ('B', 0x90 marker, count 5, end); the payload
        // holds exactly one run triple, so the output is 'B' five times.
        let stream = [
            0x76, 0xff, //
            0x4a, 0x01, // 5 * 'B'
            b'r', 0x00, //
            0x03, 0x00, // three nodes
            0x01, 0x00, 0x02, 0x00, // root -> node1 / node2
            0xbd, 0xff, 0x6f, 0xff, // 'B' / 0x90
            0xfa, 0xff, 0xff, 0xfe, // 5 / end
            0xd8, // bits 0,0 0,1 1,0 1,1
        ];
        let out = unsqueeze(&stream).unwrap();
        assert_eq!(out.data, vec![b'B'; 5]);
        assert!(!out.checksum_mismatch);
    }

    #[test]
    fn test_checksum_compare_is_boolean_reduced() {
        // Stored sum 0x9999 is wrong for "AAA" (0x00c3), but both are
        // nonzero, so the historical compare sees no mismatch.
        let stream = [
            0x76, 0xff, //
            0x99, 0x99, //
            b'a', 0x00, //
            0x01, 0x00, //
            0xbe, 0xff, 0xff, 0xfe, //
            0x08,
        ];
        let out = unsqueeze(&stream).unwrap();
        assert_eq!(out.data, b"AAA");
        assert!(!out.checksum_mismatch);
    }

    #[test]
    fn test_checksum_zero_vs_nonzero_is_reported() {
        let stream = [
            0x76, 0xff, //
            0x00, 0x00, // stored zero, computed 0x00c3
            b'a', 0x00, //
            0x01, 0x00, //
            0xbe, 0xff, 0xff, 0xfe, //
            0x08,
        ];
        let out = unsqueeze(&stream).unwrap();
        // Mismatch is reported but the decode output is retained.
        assert!(out.checksum_mismatch);
        assert_eq!(out.data, b"AAA");
    }

    #[test]
    fn test_truncated_payload() {
        let stream = [
            0x76, 0xff, //
            0xc3, 0x00, //
            b'a', 0x00, //
            0x01, 0x00, //
            0xbe, 0xff, 0xff, 0xfe, // tree only, payload missing
        ];
        let err = unsqueeze(&stream).unwrap_err();
        assert!(matches!(err, LbrError::TreeCorrupt { .. }));
    }

    #[test]
    fn test_truncated_header() {
        let err = unsqueeze(&[0x76, 0xff, 0x00]).unwrap_err();
        assert!(matches!(err, LbrError::StreamExhausted { .. }));
    }
}
