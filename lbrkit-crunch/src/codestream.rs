//! MSB-first code stream I/O.
//!
//! Crunched payloads pack their codes most-significant-bit first, with
//! the code width growing from 9 to 12 bits as the table fills. Header
//! fields and the checksum trailer sit on byte boundaries, so the reader
//! also offers aligned accessors that discard any partial code bits.

use lbrkit_core::{LbrError, Result};

/// Reads variable-width codes from a crunched byte stream.
pub struct CodeReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    buffer: u32,
    bits_in_buffer: u8,
}

impl<'a> CodeReader<'a> {
    /// Creates a reader over the full stream, starting at the first byte.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    fn fill_buffer(&mut self, count: u8) -> Result<()> {
        while self.bits_in_buffer < count {
            if self.byte_pos >= self.data.len() {
                return Err(LbrError::stream_exhausted("code stream"));
            }
            self.buffer = (self.buffer << 8) | u32::from(self.data[self.byte_pos]);
            self.byte_pos += 1;
            self.bits_in_buffer += 8;
        }
        Ok(())
    }

    /// Reads a single code of `count` bits (at most 12), MSB first.
    pub fn read_code(&mut self, count: u8) -> Result<u16> {
        self.fill_buffer(count)?;
        let shift = self.bits_in_buffer - count;
        let value = (self.buffer >> shift) & ((1u32 << count) - 1);
        self.bits_in_buffer -= count;
        Ok(value as u16)
    }

    /// Reads one byte-aligned header byte, discarding partial code bits.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.buffer = 0;
        self.bits_in_buffer = 0;
        let byte = *self
            .data
            .get(self.byte_pos)
            .ok_or_else(|| LbrError::stream_exhausted("header byte"))?;
        self.byte_pos += 1;
        Ok(byte)
    }

    /// Reads bytes up to and excluding a NUL terminator.
    pub fn read_cstring(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        loop {
            match self.read_byte() {
                Ok(0) => return Ok(bytes),
                Ok(byte) => bytes.push(byte),
                Err(_) => return Err(LbrError::stream_exhausted("name terminator")),
            }
        }
    }

    /// Reads the little-endian checksum trailer at the next byte boundary.
    pub fn read_trailer_word(&mut self) -> Result<u16> {
        self.buffer = 0;
        self.bits_in_buffer = 0;
        let lo = *self
            .data
            .get(self.byte_pos)
            .ok_or_else(|| LbrError::stream_exhausted("checksum trailer"))?;
        let hi = *self
            .data
            .get(self.byte_pos + 1)
            .ok_or_else(|| LbrError::stream_exhausted("checksum trailer"))?;
        self.byte_pos += 2;
        Ok(u16::from_le_bytes([lo, hi]))
    }
}

/// Packs variable-width codes into a byte stream, MSB first.
pub struct CodeWriter {
    output: Vec<u8>,
    buffer: u32,
    bits_in_buffer: u8,
}

impl CodeWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Appends one code of `count` bits (at most 12).
    pub fn write_code(&mut self, code: u16, count: u8) {
        self.buffer = (self.buffer << count) | u32::from(code);
        self.bits_in_buffer += count;
        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer >> (self.bits_in_buffer - 8)) as u8;
            self.output.push(byte);
            self.bits_in_buffer -= 8;
        }
    }

    /// Flushes any partial byte (zero-padded on the right) and returns
    /// the packed stream.
    pub fn into_vec(mut self) -> Vec<u8> {
        if self.bits_in_buffer > 0 {
            let byte = (self.buffer << (8 - self.bits_in_buffer)) as u8;
            self.output.push(byte);
        }
        self.output
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
