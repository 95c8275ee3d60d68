//! Running 16-bit checksum used by both legacy codecs.
//!
//! Squeeze headers and crunch trailers both carry the plain sum of every
//! decoded output byte, taken modulo 65536. No polynomial, no final xor.

/// Accumulator for the mod-65536 byte sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checksum16 {
    sum: u16,
}

impl Checksum16 {
    /// Create a new accumulator starting at zero.
    pub fn new() -> Self {
        Self { sum: 0 }
    }

    /// Add a single byte.
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte as u16);
    }

    /// Add every byte of a slice.
    pub fn update_slice(&mut self, data: &[u8]) {
        for &b in data {
            self.update(b);
        }
    }

    /// Current checksum value.
    pub fn value(&self) -> u16 {
        self.sum
    }
}

/// Sum a whole buffer in one call.
pub fn checksum16(data: &[u8]) -> u16 {
    let mut ck = Checksum16::new();
    ck.update_slice(data);
    ck.value()
}
