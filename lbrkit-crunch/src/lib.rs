//! # LbrKit-Crunch: Pure Rust Crunch Codec
//!
//! Encoder and decoder for the CP/M "crunch" format, an adaptive LZW
//! scheme layered over run-length collapse. A crunched stream holds:
//!
//! - the signature bytes `0x76 0xFE`
//! - the original file name, lowercase and NUL-terminated
//! - four info bytes: reference revision, significance level
//!   (`0x20..=0x2f` accepted), error-detection flag, spare
//! - MSB-first codes, 9 bits wide growing to 12 as the table fills
//! - after the EOF code, an optional little-endian checksum of the
//!   decoded bytes at the next byte boundary
//!
//! The code table starts with the 256 atomic bytes plus four reserved
//! control codes. A reset code rewinds both sides to 9-bit codes
//! mid-stream; once the table is full, cells that never took part in a
//! decode are reassigned in place.
//!
//! ## Example
//!
//! ```
//! use lbrkit_crunch::{crunch, uncrunch};
//!
//! let packed = crunch("note.txt", b"to be or not to be")?;
//! let out = uncrunch(&packed)?;
//! assert_eq!(out.data, b"to be or not to be");
//! assert_eq!(out.original_name, "note.txt");
//! assert_eq!(out.checksum_mismatch, Some(false));
//! # Ok::<(), lbrkit_core::LbrError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod codestream;
mod decoder;
mod encoder;
mod table;

pub use decoder::{CRUNCH_SIG, CrunchOutput, is_crunched, uncrunch};
pub use encoder::crunch;
pub use table::{
    ATOMIC_LIMIT, Cell, CodeTable, EOF_CODE, FIRST_FREE_CODE, NULL_CODE, Predecessor, RESET_CODE,
    SPARE_CODE, TABLE_SIZE, XLAT_SIZE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_text() {
        let data = b"The quick brown fox jumps over the lazy dog".to_vec();
        let packed = crunch("fox.txt", &data).expect("encode");
        let out = uncrunch(&packed).expect("decode");
        assert_eq!(out.data, data);
        assert_eq!(out.original_name, "fox.txt");
        assert_eq!(out.checksum_mismatch, Some(false));
    }

    #[test]
    fn test_roundtrip_all_byte_values() {
        let mut data = Vec::new();
        for _ in 0..2 {
            data.extend(0u8..=255);
        }
        let packed = crunch("bytes", &data).expect("encode");
        let out = uncrunch(&packed).expect("decode");
        assert_eq!(out.data, data);
    }

    #[test]
    fn test_repetitive_input_compresses() {
        let data = vec![b'X'; 1000];
        let packed = crunch("x", &data).expect("encode");
        assert!(packed.len() < data.len() / 2);
        let out = uncrunch(&packed).expect("decode");
        assert_eq!(out.data, data);
    }

    #[test]
    fn test_roundtrip_marker_runs() {
        // Runs of the run-length marker itself must survive both the
        // collapse escaping and the LZW layer.
        let mut data = vec![0x90; 40];
        data.extend_from_slice(b"tail");
        let packed = crunch("m", &data).expect("encode");
        let out = uncrunch(&packed).expect("decode");
        assert_eq!(out.data, data);
    }

    #[test]
    fn test_own_output_probes_as_crunched() {
        let packed = crunch("p", b"probe me").expect("encode");
        assert!(is_crunched(&packed));
    }
}
