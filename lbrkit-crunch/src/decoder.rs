//! Uncrunching: decoding a crunched stream back to its original bytes.

use lbrkit_core::{LbrError, Result, RleExpander, checksum16};

use crate::codestream::CodeReader;
use crate::table::{
    ATOMIC_LIMIT, CodeTable, EOF_CODE, NULL_CODE, Predecessor, RESET_CODE, SPARE_CODE, TABLE_SIZE,
};

/// Signature bytes opening every crunched stream.
pub const CRUNCH_SIG: [u8; 2] = [0x76, 0xfe];

/// Result of uncrunching one stream.
#[derive(Debug, Clone)]
pub struct CrunchOutput {
    /// Original file name recorded in the stream header.
    pub original_name: String,
    /// Decoded bytes.
    pub data: Vec<u8>,
    /// Checksum verdict: `None` when the stream carries no checksum,
    /// otherwise whether the stored and computed sums disagree.
    pub checksum_mismatch: Option<bool>,
}

/// Returns true when `data` starts with the crunch signature.
pub fn is_crunched(data: &[u8]) -> bool {
    data.len() >= 2 && data[..2] == CRUNCH_SIG
}

/// Decodes a complete crunched stream.
///
/// The header is validated first: signature, NUL-terminated original
/// name, then four info bytes of which the significant revision level
/// must fall in `0x20..=0x2f`. Codes follow MSB first, 9 bits wide
/// until table growth widens them, and the decode stops at the EOF
/// code. A 2-byte checksum trailer is read at the next byte boundary
/// when the error-detection info byte says one is present.
pub fn uncrunch(input: &[u8]) -> Result<CrunchOutput> {
    let mut reader = CodeReader::new(input);

    let sig = [reader.read_byte()?, reader.read_byte()?];
    if sig != CRUNCH_SIG {
        return Err(LbrError::invalid_signature(
            u16::from_le_bytes(CRUNCH_SIG),
            u16::from_le_bytes(sig),
        ));
    }
    let original_name = String::from_utf8_lossy(&reader.read_cstring()?).into_owned();

    let _ref_level = reader.read_byte()?;
    let sig_level = reader.read_byte()?;
    let err_detect = reader.read_byte()?;
    let _spare = reader.read_byte()?;
    if !(0x20..=0x2f).contains(&sig_level) {
        return Err(LbrError::unsupported_revision(sig_level));
    }

    let mut table = CodeTable::new();
    let mut expander = RleExpander::new();
    let mut data = Vec::new();
    let mut stack = Vec::new();

    // Pair state for table growth: the previous code and the first
    // byte of the string it decoded to.
    let mut last = Predecessor::None;
    let mut first_byte = 0u8;
    // The first code after initialization or a reset is always atomic
    // and defines no pair.
    let mut suppress_insert = true;

    loop {
        let code = next_stream_code(&mut reader, &table)?;
        if code == EOF_CODE {
            break;
        }
        if code == RESET_CODE {
            // The bit phase carries straight on; only the table state
            // rewinds.
            table.reset();
            last = Predecessor::None;
            suppress_insert = true;
            continue;
        }

        if table.is_full() {
            expand_code(
                &mut table,
                code,
                &mut first_byte,
                &mut stack,
                &mut expander,
                &mut data,
            )?;
            table.reassign(last, first_byte);
        } else {
            if code >= table.next_code() {
                // The code is the entry being defined right now: the
                // previous string followed by its own first byte.
                table.insert(last, first_byte);
                suppress_insert = true;
            }
            expand_code(
                &mut table,
                code,
                &mut first_byte,
                &mut stack,
                &mut expander,
                &mut data,
            )?;
            if suppress_insert {
                suppress_insert = false;
            } else {
                table.insert(last, first_byte);
            }
        }
        last = Predecessor::Code(code);
    }

    let checksum_mismatch = if err_detect == 0 {
        let stored = reader.read_trailer_word()?;
        Some(stored != checksum16(&data))
    } else {
        None
    };

    Ok(CrunchOutput {
        original_name,
        data,
        checksum_mismatch,
    })
}

/// Reads the next meaningful code, skipping null and spare filler.
fn next_stream_code(reader: &mut CodeReader, table: &CodeTable) -> Result<u16> {
    loop {
        let code = reader.read_code(table.code_len())?;
        if code != NULL_CODE && code != SPARE_CODE {
            return Ok(code);
        }
    }
}

/// Walks the chain behind `code`, marking every visited cell as
/// referenced, and feeds the decoded string through the run-length
/// expander. `first_byte` receives the string's leading byte.
fn expand_code(
    table: &mut CodeTable,
    code: u16,
    first_byte: &mut u8,
    stack: &mut Vec<u8>,
    expander: &mut RleExpander,
    data: &mut Vec<u8>,
) -> Result<()> {
    stack.clear();
    let mut index = code;
    while index >= ATOMIC_LIMIT {
        let cell = table
            .get(index)
            .ok_or_else(|| LbrError::invalid_code(index))?;
        match cell.predecessor {
            Predecessor::Code(previous) => {
                table.mark_referenced(index);
                stack.push(cell.suffix);
                index = previous;
            }
            // Reserved placeholders and atomic definitions never sit
            // mid-chain in a well-formed stream.
            _ => return Err(LbrError::invalid_code(index)),
        }
        if stack.len() > TABLE_SIZE {
            return Err(LbrError::invalid_code(code));
        }
    }
    let atomic = table
        .get(index)
        .ok_or_else(|| LbrError::invalid_code(index))?;
    table.mark_referenced(index);
    *first_byte = atomic.suffix;
    expander.feed(atomic.suffix, data);
    while let Some(suffix) = stack.pop() {
        expander.feed(suffix, data);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(name: &[u8], err_detect: u8, payload: &[u8], trailer: Option<[u8; 2]>) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&CRUNCH_SIG);
        bytes.extend_from_slice(name);
        bytes.push(0);
        bytes.extend_from_slice(&[0x20, 0x20, err_detect, 0x00]);
        bytes.extend_from_slice(payload);
        if let Some(t) = trailer {
            bytes.extend_from_slice(&t);
        }
        bytes
    }

    #[test]
    fn test_signature_probe() {
        assert!(is_crunched(&[0x76, 0xfe, 0x00]));
        assert!(!is_crunched(&[0x76, 0xff]));
        assert!(!is_crunched(&[0x76]));
    }

    #[test]
    fn test_rejects_wrong_signature() {
        let err = uncrunch(&[0x76, 0xff, 0x00]).unwrap_err();
        assert!(matches!(err, LbrError::InvalidSignature { .. }));
    }

    #[test]
    fn test_rejects_unsupported_revision() {
        // Significance level 0x30 is outside the supported band.
        let bytes = stream(b"x", 0, &[], None);
        let mut bad = bytes.clone();
        bad[5] = 0x30;
        let err = uncrunch(&bad).unwrap_err();
        assert!(matches!(err, LbrError::UnsupportedRevision { found: 0x30 }));
    }

    #[test]
    fn test_uncrunch_two_atomics() {
        // Codes 'h', 'i', EOF at 9 bits each.
        let bytes = stream(b"h", 0, &[0x34, 0x1A, 0x60, 0x00], Some([0xD1, 0x00]));
        let out = uncrunch(&bytes).expect("decode");
        assert_eq!(out.data, b"hi");
        assert_eq!(out.original_name, "h");
        assert_eq!(out.checksum_mismatch, Some(false));
    }

    #[test]
    fn test_uncrunch_expands_rle() {
        // Codes 'A', 0x90, 0x05, EOF: one run-length triple for "AAAAA".
        let bytes = stream(b"a", 0, &[0x20, 0xA4, 0x00, 0xB0, 0x00], Some([0x45, 0x01]));
        let out = uncrunch(&bytes).expect("decode");
        assert_eq!(out.data, b"AAAAA");
        assert_eq!(out.checksum_mismatch, Some(false));
    }

    #[test]
    fn test_kwkwk_code_decodes_before_definition() {
        // Codes 'a', 0x104, EOF. Code 0x104 arrives while it is the
        // next free entry, so it must decode as "aa".
        let bytes = stream(b"k", 0, &[0x30, 0xC1, 0x20, 0x00], Some([0x23, 0x01]));
        let out = uncrunch(&bytes).expect("decode");
        assert_eq!(out.data, b"aaa");
        assert_eq!(out.checksum_mismatch, Some(false));
    }

    #[test]
    fn test_reset_reinitializes_table() {
        // Codes 'a', 'b', RESET, 'c', 'd', 0x104, EOF. After the reset
        // the table restarts at 9-bit codes and entry 0x104 is the
        // fresh ('c', 'd') pair, not the pre-reset ('a', 'b').
        let payload = [0x30, 0x98, 0xA0, 0x26, 0x33, 0x24, 0x12, 0x00];
        let bytes = stream(b"r", 0, &payload, Some([0x51, 0x02]));
        let out = uncrunch(&bytes).expect("decode");
        assert_eq!(out.data, b"abcdcd");
        assert_eq!(out.checksum_mismatch, Some(false));
    }

    #[test]
    fn test_no_checksum_when_detection_disabled() {
        let bytes = stream(b"n", 1, &[0x30, 0xC1, 0x20, 0x00], None);
        let out = uncrunch(&bytes).expect("decode");
        assert_eq!(out.data, b"aaa");
        assert_eq!(out.checksum_mismatch, None);
    }

    #[test]
    fn test_checksum_mismatch_keeps_data() {
        let bytes = stream(b"k", 0, &[0x30, 0xC1, 0x20, 0x00], Some([0x99, 0x99]));
        let out = uncrunch(&bytes).expect("decode");
        assert_eq!(out.data, b"aaa");
        assert_eq!(out.checksum_mismatch, Some(true));
    }

    #[test]
    fn test_missing_trailer_is_exhaustion() {
        let bytes = stream(b"k", 0, &[0x30, 0xC1, 0x20, 0x00], None);
        let err = uncrunch(&bytes).unwrap_err();
        assert!(matches!(err, LbrError::StreamExhausted { .. }));
    }

    #[test]
    fn test_undefined_code_is_invalid() {
        // First code is 300, far beyond the next free entry, and the
        // cell behind it was never assigned.
        let bytes = stream(b"x", 1, &[0x96, 0x00], None);
        let err = uncrunch(&bytes).unwrap_err();
        assert!(matches!(err, LbrError::InvalidCode { .. }));
    }

    #[test]
    fn test_truncated_mid_code_is_exhaustion() {
        let bytes = stream(b"t", 1, &[0x34], None);
        let err = uncrunch(&bytes).unwrap_err();
        assert!(matches!(err, LbrError::StreamExhausted { .. }));
    }
}
