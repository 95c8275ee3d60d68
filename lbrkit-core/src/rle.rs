//! The 0x90 run-length layer shared by the squeeze and crunch codecs.
//!
//! Both formats wrap their entropy stage in the same byte-level scheme:
//! a literal byte followed by the marker 0x90 and a count means the
//! literal occurs `count` times in total; the pair `0x90, 0x00` encodes a
//! literal 0x90. Expanding `0x90, 0x00` does not touch the previous-byte
//! memory, so a repeat count after it still refers to the byte before the
//! marker. The collapser therefore never run-encodes 0x90 itself; each
//! occurrence becomes its own `0x90, 0x00` pair.

/// The run-length marker byte.
pub const DLE: u8 = 0x90;

/// Runs shorter than this are cheaper written out literally.
const RUN_THRESHOLD: usize = 3;

/// Streaming expander for the 0x90 run-length layer.
///
/// Decoders feed decoded symbols one at a time; expanded output is
/// appended to the caller's buffer.
#[derive(Debug, Default)]
pub struct RleExpander {
    /// Previous literal byte, the one a repeat count refers to.
    prev: u8,
    /// Set when the last symbol was the marker and a count is expected.
    awaiting_count: bool,
}

impl RleExpander {
    /// Create an expander with cleared state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one decoded symbol, appending any expansion to `out`.
    pub fn feed(&mut self, byte: u8, out: &mut Vec<u8>) {
        if self.awaiting_count {
            self.awaiting_count = false;
            if byte == 0 {
                // Literal marker; previous-byte memory stays as it was.
                out.push(DLE);
            } else {
                // One occurrence was already emitted before the marker.
                for _ in 1..byte {
                    out.push(self.prev);
                }
            }
        } else if byte == DLE {
            self.awaiting_count = true;
        } else {
            self.prev = byte;
            out.push(byte);
        }
    }

    /// True if the stream ended right after a marker, count never seen.
    pub fn awaiting_count(&self) -> bool {
        self.awaiting_count
    }
}

/// Collapse a byte buffer into its run-length form.
pub fn rle_collapse(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let b = data[i];

        if b == DLE {
            out.push(DLE);
            out.push(0);
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < data.len() && data[i + run] == b && run < 255 {
            run += 1;
        }

        if run < RUN_THRESHOLD {
            for _ in 0..run {
                out.push(b);
            }
        } else {
            out.push(b);
            out.push(DLE);
            out.push(run as u8);
        }
        i += run;
    }

    out
}

/// Expand a fully collapsed buffer back into raw bytes.
pub fn rle_expand(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut expander = RleExpander::new();
    for &b in data {
        expander.feed(b, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        let data = b"no runs here";
        assert_eq!(rle_expand(&rle_collapse(data)), data);
    }

    #[test]
    fn test_run_collapses() {
        let data = vec![b'A'; 40];
        let packed = rle_collapse(&data);
        assert_eq!(packed, vec![b'A', DLE, 40]);
        assert_eq!(rle_expand(&packed), data);
    }

    #[test]
    fn test_short_runs_stay_literal() {
        assert_eq!(rle_collapse(b"AA"), b"AA");
        assert_eq!(rle_collapse(b"AAA"), vec![b'A', DLE, 3]);
    }

    #[test]
    fn test_literal_marker() {
        let data = [0x10, DLE, 0x20];
        let packed = rle_collapse(&data);
        assert_eq!(packed, vec![0x10, DLE, 0x00, 0x20]);
        assert_eq!(rle_expand(&packed), data);
    }

    #[test]
    fn test_marker_run_never_collapsed() {
        // A count after (DLE, 0) would repeat the byte before the marker,
        // so marker runs must be emitted pair by pair.
        let data = vec![DLE; 5];
        let packed = rle_collapse(&data);
        assert_eq!(packed, vec![DLE, 0, DLE, 0, DLE, 0, DLE, 0, DLE, 0]);
        assert_eq!(rle_expand(&packed), data);
    }

    #[test]
    fn test_count_refers_past_literal_marker() {
        // b, DLE, 0, DLE, 4 expands to b, 0x90, b, b, b.
        let mut out = Vec::new();
        let mut ex = RleExpander::new();
        for b in [b'b', DLE, 0, DLE, 4] {
            ex.feed(b, &mut out);
        }
        assert_eq!(out, [b'b', DLE, b'b', b'b', b'b']);
    }

    #[test]
    fn test_long_run_chunks_at_255() {
        let data = vec![0x42u8; 600];
        let packed = rle_collapse(&data);
        assert_eq!(
            packed,
            vec![0x42, DLE, 255, 0x42, DLE, 255, 0x42, DLE, 90]
        );
        assert_eq!(rle_expand(&packed), data);
    }

    #[test]
    fn test_run_of_257_leaves_two_literals() {
        let data = vec![0x42u8; 257];
        let packed = rle_collapse(&data);
        assert_eq!(packed, vec![0x42, DLE, 255, 0x42, 0x42]);
        assert_eq!(rle_expand(&packed), data);
    }

    #[test]
    fn test_empty() {
        assert!(rle_collapse(&[]).is_empty());
        assert!(rle_expand(&[]).is_empty());
    }

    #[test]
    fn test_dangling_marker_reported() {
        let mut out = Vec::new();
        let mut ex = RleExpander::new();
        ex.feed(b'x', &mut out);
        ex.feed(DLE, &mut out);
        assert!(ex.awaiting_count());
        assert_eq!(out, b"x");
    }
}
