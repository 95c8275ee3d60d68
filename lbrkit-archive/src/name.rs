//! 8.3 member names as stored in the directory.
//!
//! The directory keeps names as two space-padded fields, eight bytes of
//! stem and three of extension, conventionally uppercase. Host-side the
//! same member appears as a lowercase `stem.ext` string.

/// One directory name field pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberName {
    stem: [u8; 8],
    ext: [u8; 3],
}

impl MemberName {
    /// The blank name carried by unused slots and the header entry.
    pub fn blank() -> Self {
        Self {
            stem: [b' '; 8],
            ext: [b' '; 3],
        }
    }

    /// Wraps the raw directory fields.
    pub fn from_raw(stem: [u8; 8], ext: [u8; 3]) -> Self {
        Self { stem, ext }
    }

    /// Shapes a host file name into directory fields. Characters are
    /// uppercased; a dot moves the write position to the extension
    /// field (a second dot rewinds it, so only the last part lands
    /// there). Returns the shaped name and whether anything had to be
    /// dropped for not fitting 8.3.
    pub fn from_host(host: &str) -> (Self, bool) {
        let mut stem = [b' '; 8];
        let mut ext = [b' '; 3];
        let mut cursor = 0usize;
        let mut truncated = false;

        for byte in host.bytes() {
            if byte == b'.' {
                cursor = 8;
                continue;
            }
            if cursor >= 11 {
                truncated = true;
                break;
            }
            let upper = byte.to_ascii_uppercase();
            if cursor < 8 {
                stem[cursor] = upper;
            } else {
                ext[cursor - 8] = upper;
            }
            cursor += 1;
        }

        (Self { stem, ext }, truncated)
    }

    /// Raw stem field, space-padded.
    pub fn stem_bytes(&self) -> &[u8; 8] {
        &self.stem
    }

    /// Raw extension field, space-padded.
    pub fn ext_bytes(&self) -> &[u8; 3] {
        &self.ext
    }

    /// Host-style rendering: lowercase `stem.ext`, the dot omitted when
    /// the extension is blank.
    pub fn display(&self) -> String {
        let stem = field_str(&self.stem);
        let ext = field_str(&self.ext);
        if ext.is_empty() {
            stem
        } else {
            format!("{stem}.{ext}")
        }
    }

    /// True for the all-spaces name.
    pub fn is_blank(&self) -> bool {
        self.stem == [b' '; 8] && self.ext == [b' '; 3]
    }

    /// Case-insensitive comparison against a host-style name.
    pub fn matches(&self, host: &str) -> bool {
        self.display().eq_ignore_ascii_case(host)
    }

    /// Field-wise comparison ignoring ASCII case.
    pub fn eq_ignore_case(&self, other: &Self) -> bool {
        self.stem.eq_ignore_ascii_case(&other.stem) && self.ext.eq_ignore_ascii_case(&other.ext)
    }
}

/// Field bytes up to the first space, lowercased.
fn field_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == b' ').unwrap_or(field.len());
    field[..end]
        .iter()
        .map(|&b| char::from(b.to_ascii_lowercase()))
        .collect()
}
