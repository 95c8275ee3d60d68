//! Console-safe rendering of member content.
//!
//! CP/M text travels with the high bit sometimes used for parity, so the
//! filter strips bit 7 before classifying a byte. Printable characters,
//! tabs, form feeds and line feeds pass through; carriage returns are
//! dropped (the line feed alone ends a line on modern terminals); every
//! other byte renders as `.`. An optional line budget stops output once
//! enough line feeds have been seen.

/// Incremental filter that renders member bytes as console-safe text.
#[derive(Debug)]
pub struct Preview {
    max_lines: Option<u32>,
    lines: u32,
    text: String,
    full: bool,
}

impl Preview {
    /// Create a filter. `max_lines` of `None` renders the whole member.
    pub fn new(max_lines: Option<u32>) -> Self {
        Self {
            max_lines,
            lines: 0,
            text: String::new(),
            full: max_lines == Some(0),
        }
    }

    /// Feed one raw byte. Returns `false` once the line budget is spent;
    /// further bytes are ignored.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.full {
            return false;
        }

        let cc = byte & 0x7f;
        match cc {
            b' '..=b'~' => self.text.push(cc as char),
            b'\r' => {}
            b'\n' => {
                self.text.push('\n');
                self.lines += 1;
                if let Some(max) = self.max_lines {
                    if self.lines >= max {
                        self.full = true;
                    }
                }
            }
            b'\t' | 0x0c => self.text.push(cc as char),
            _ => self.text.push('.'),
        }

        !self.full
    }

    /// Feed a whole buffer, stopping early if the line budget runs out.
    pub fn push_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if !self.push(b) {
                break;
            }
        }
    }

    /// True once the line budget has been spent.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Consume the filter and return the rendered text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Render a complete buffer with no line budget.
pub fn render(bytes: &[u8]) -> String {
    let mut preview = Preview::new(None);
    preview.push_slice(bytes);
    preview.into_text()
}
