//! Member compression auto-detection.
//!
//! Members carry no compression flag in the directory; the stored
//! stream is probed for codec signatures instead.

use lbrkit_crunch::is_crunched;
use lbrkit_squeeze::is_squeezed;

/// Compression applied to a stored member stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Squeezed stream (Huffman over RLE).
    Squeezed,
    /// Crunched stream (LZW over RLE).
    Crunched,
    /// Plain stored bytes.
    Stored,
}

impl Compression {
    /// Detect compression from the leading bytes of a member stream.
    pub fn from_magic(magic: &[u8]) -> Self {
        if is_squeezed(magic) {
            return Self::Squeezed;
        }
        if is_crunched(magic) {
            return Self::Crunched;
        }
        Self::Stored
    }

    /// Typical host-side file extension for the compressed stream.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Squeezed => "sq",
            Self::Crunched => "crn",
            Self::Stored => "",
        }
    }

    /// True when a decoder must run to recover the original bytes.
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::Stored)
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squeezed => write!(f, "squeezed"),
            Self::Crunched => write!(f, "crunched"),
            Self::Stored => write!(f, "stored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_squeezed() {
        let magic = [0x76, 0xFF, 0x00, 0x00];
        assert_eq!(Compression::from_magic(&magic), Compression::Squeezed);
    }

    #[test]
    fn test_detect_crunched() {
        let magic = [0x76, 0xFE, b'a', 0x00];
        assert_eq!(Compression::from_magic(&magic), Compression::Crunched);
    }

    #[test]
    fn test_detect_stored() {
        assert_eq!(Compression::from_magic(b"plain text"), Compression::Stored);
        assert_eq!(Compression::from_magic(&[0x76]), Compression::Stored);
        assert_eq!(Compression::from_magic(&[]), Compression::Stored);
    }

    #[test]
    fn test_format_properties() {
        assert!(Compression::Squeezed.is_compressed());
        assert!(Compression::Crunched.is_compressed());
        assert!(!Compression::Stored.is_compressed());
        assert_eq!(Compression::Crunched.extension(), "crn");
    }
}
