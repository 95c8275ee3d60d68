//! Crunching: encoding raw bytes into an adaptive LZW stream.

use lbrkit_core::{Result, checksum16, rle_collapse};

use crate::codestream::CodeWriter;
use crate::decoder::CRUNCH_SIG;
use crate::table::{CodeTable, EOF_CODE, FIRST_FREE_CODE, Predecessor, RESET_CODE};

/// Tracks the width at which the decoder will read each code.
///
/// The decoder grows its table one code behind the encoder: it only
/// learns a pair after reading the code that follows it. Emitting at
/// the encoder's own width would flip to a wider code one position too
/// soon, so this mirror advances with the decoder's timing instead.
struct WidthSim {
    next_code: u16,
    code_len: u8,
    code_mask: u16,
}

impl WidthSim {
    fn new() -> Self {
        Self {
            next_code: FIRST_FREE_CODE,
            code_len: 9,
            code_mask: 0x1ff,
        }
    }

    /// One decoder-side insert: widening triggers an entry early, just
    /// as the table does.
    fn step(&mut self) {
        self.next_code += 1;
        if self.next_code >= self.code_mask && self.code_len < 12 {
            self.code_len += 1;
            self.code_mask = (self.code_mask << 1) | 1;
        }
    }
}

/// Emitter pairing the packed output with the decoder width mirror.
struct CodeEmitter {
    writer: CodeWriter,
    sim: WidthSim,
    // The decoder defines no pair after the first code it reads
    // following initialization or a reset.
    first_code: bool,
}

impl CodeEmitter {
    fn new() -> Self {
        Self {
            writer: CodeWriter::new(),
            sim: WidthSim::new(),
            first_code: true,
        }
    }

    fn emit(&mut self, code: u16) {
        self.writer.write_code(code, self.sim.code_len);
        if self.first_code {
            self.first_code = false;
        } else {
            self.sim.step();
        }
    }

    fn reset(&mut self) {
        self.emit(RESET_CODE);
        self.sim = WidthSim::new();
        self.first_code = true;
    }

    fn finish(mut self) -> Vec<u8> {
        self.emit(EOF_CODE);
        self.writer.into_vec()
    }
}

/// Encodes `data` as a complete crunched stream.
///
/// The header records `original_name` shaped to a lowercase 8.3 name.
/// Input bytes pass through run-length collapse first, then adaptive
/// LZW coding; when the table fills, a reset code rewinds both sides
/// to 9-bit codes. The stream ends with the EOF code and a checksum
/// over the original bytes.
pub fn crunch(original_name: &str, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(&CRUNCH_SIG);
    out.extend_from_slice(header_name(original_name).as_bytes());
    out.push(0);
    // Reference revision, significance level, checksum present, spare.
    out.extend_from_slice(&[0x20, 0x20, 0x00, 0x00]);

    let packed = rle_collapse(data);

    let mut table = CodeTable::new();
    let mut emitter = CodeEmitter::new();
    let mut pred: Option<u16> = None;

    for &byte in &packed {
        let Some(p) = pred else {
            pred = Some(u16::from(byte));
            continue;
        };
        if let Some(hit) = table.lookup(Predecessor::Code(p), byte) {
            pred = Some(hit);
        } else {
            emitter.emit(p);
            table.insert(Predecessor::Code(p), byte);
            pred = Some(u16::from(byte));
            if table.is_full() {
                emitter.reset();
                table.reset();
            }
        }
    }
    if let Some(p) = pred {
        emitter.emit(p);
    }

    out.extend_from_slice(&emitter.finish());
    out.extend_from_slice(&checksum16(data).to_le_bytes());
    Ok(out)
}

/// Shapes a name to the lowercase 8.3 form the header carries: up to
/// eight stem bytes, a dot, up to three extension bytes.
fn header_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let (stem, ext) = match lower.split_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (lower.as_str(), ""),
    };
    let stem: String = stem.chars().take(8).collect();
    let ext: String = ext.chars().take(3).collect();
    if ext.is_empty() {
        stem
    } else {
        format!("{stem}.{ext}")
    }
}
