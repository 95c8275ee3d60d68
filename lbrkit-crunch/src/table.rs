//! The adaptive LZW code table and its hash index.
//!
//! The table holds up to 4096 cells, each recording a predecessor link
//! and a one-byte suffix. A separate open-addressing index of 5003
//! slots maps (predecessor, suffix) pairs to cell numbers; 5003 is
//! prime, so the probe sequence visits every slot and always finds one
//! of the at least 907 vacancies. Codes 0-255 are atomic bytes, codes
//! 0x100-0x103 are reserved control codes, and chain entries start at
//! 0x104.

/// Total cell count, the ceiling for 12-bit codes.
pub const TABLE_SIZE: usize = 4096;
/// Slot count of the hash index.
pub const XLAT_SIZE: usize = 5003;
/// Codes below this value decode to a single raw byte.
pub const ATOMIC_LIMIT: u16 = 0x100;
/// Marks the end of the code stream.
pub const EOF_CODE: u16 = 0x100;
/// Tells the decoder to reinitialize its table mid-stream.
pub const RESET_CODE: u16 = 0x101;
/// Filler code, skipped transparently when reading.
pub const NULL_CODE: u16 = 0x102;
/// Reserved for extensions, also skipped when reading.
pub const SPARE_CODE: u16 = 0x103;
/// First code value assigned to a chain entry.
pub const FIRST_FREE_CODE: u16 = 0x104;

/// Predecessor link stored in a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predecessor {
    /// Atomic entry, the start of every chain.
    None,
    /// Placeholder cell backing one of the reserved control codes.
    Reserved,
    /// Link to the cell holding the rest of the string.
    Code(u16),
}

impl Predecessor {
    /// Raw hash value, chosen so the layout matches the historical
    /// table (no-predecessor 0x6fff, reserved 0x7fff).
    fn raw(self) -> usize {
        match self {
            Predecessor::None => 0x6fff,
            Predecessor::Reserved => 0x7fff,
            Predecessor::Code(index) => usize::from(index),
        }
    }
}

/// One assigned cell of the code table.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    /// Link to the preceding entry of the string, if any.
    pub predecessor: Predecessor,
    /// Final byte of the string this cell encodes.
    pub suffix: u8,
    /// Set once the cell has taken part in a decode walk. Unreferenced
    /// cells may be cannibalized after the table fills.
    pub referenced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    Index(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FillState {
    Filling,
    AlmostFull,
    Full,
}

/// Adaptive code table shared by the encoder and decoder.
///
/// Both sides grow the table with the same [`insert`](Self::insert)
/// calls, so the code width widens in lockstep on either end of a
/// stream.
pub struct CodeTable {
    cells: Vec<Option<Cell>>,
    xlat: Vec<Slot>,
    next_code: u16,
    code_len: u8,
    code_mask: u16,
    fill: FillState,
}

impl CodeTable {
    /// Builds a fresh table holding the 256 atomic codes and the four
    /// reserved control codes.
    pub fn new() -> Self {
        let mut table = Self {
            cells: vec![None; TABLE_SIZE],
            xlat: vec![Slot::Empty; XLAT_SIZE],
            next_code: 0,
            code_len: 9,
            code_mask: 0x1ff,
            fill: FillState::Filling,
        };
        table.enter_atomics();
        table
    }

    /// Reinitializes for a mid-stream reset. The hash index is cleared
    /// and the atomic and reserved codes re-entered; stale chain cells
    /// above [`FIRST_FREE_CODE`] keep their old contents but are no
    /// longer reachable through the index.
    pub fn reset(&mut self) {
        self.next_code = 0;
        self.code_len = 9;
        self.code_mask = 0x1ff;
        self.fill = FillState::Filling;
        self.xlat.fill(Slot::Empty);
        self.enter_atomics();
    }

    fn enter_atomics(&mut self) {
        for byte in 0..=255u8 {
            self.insert(Predecessor::None, byte);
        }
        for _ in 0..4 {
            self.insert(Predecessor::Reserved, 0);
        }
    }

    /// Current code width in bits.
    pub fn code_len(&self) -> u8 {
        self.code_len
    }

    /// Next unassigned code value.
    pub fn next_code(&self) -> u16 {
        self.next_code
    }

    /// True once all 4096 cells are assigned and no growth remains.
    pub fn is_full(&self) -> bool {
        self.fill == FillState::Full
    }

    /// Returns the cell behind `code`, if one has been assigned.
    pub fn get(&self, code: u16) -> Option<Cell> {
        self.cells.get(usize::from(code)).copied().flatten()
    }

    /// Records that `code` took part in a decode walk.
    pub fn mark_referenced(&mut self, code: u16) {
        if let Some(Some(cell)) = self.cells.get_mut(usize::from(code)) {
            cell.referenced = true;
        }
    }

    /// Hash of a (predecessor, suffix) pair, always in 1..=4096. The
    /// predecessor's low nibble lands in the high bits so chains spread
    /// across the index.
    fn hash(pred: Predecessor, suffix: u8) -> usize {
        let p = pred.raw();
        ((((p >> 4) & 0xff) ^ usize::from(suffix)) | ((p & 0xf) << 8)) + 1
    }

    /// One probe step. The historical walk subtracts `XLAT_SIZE - hash`
    /// with wraparound, which is the same as adding `hash` modulo the
    /// index size.
    fn advance(index: usize, hashval: usize) -> usize {
        (index + hashval) % XLAT_SIZE
    }

    /// Assigns the next free code to (pred, suffix) and widens the code
    /// length when the stream needs it. Widening happens one entry
    /// early because the decoder reads one code ahead of its inserts.
    pub fn insert(&mut self, pred: Predecessor, suffix: u8) {
        if self.is_full() {
            return;
        }
        let hashval = Self::hash(pred, suffix);
        let mut index = hashval;
        while self.xlat[index] != Slot::Empty {
            index = Self::advance(index, hashval);
        }
        self.xlat[index] = Slot::Index(self.next_code);
        self.cells[usize::from(self.next_code)] = Some(Cell {
            predecessor: pred,
            suffix,
            referenced: false,
        });
        self.next_code += 1;

        if self.next_code >= self.code_mask {
            if self.code_len < 12 {
                self.code_len += 1;
                self.code_mask = (self.code_mask << 1) | 1;
            } else {
                self.fill = match self.fill {
                    FillState::Filling => FillState::AlmostFull,
                    _ => FillState::Full,
                };
            }
        }
    }

    /// Finds the code already assigned to (pred, suffix), if any.
    pub fn lookup(&self, pred: Predecessor, suffix: u8) -> Option<u16> {
        let hashval = Self::hash(pred, suffix);
        let mut index = hashval;
        loop {
            match self.xlat[index] {
                Slot::Empty => return None,
                Slot::Index(code) => {
                    if let Some(cell) = self.cells[usize::from(code)] {
                        if cell.predecessor == pred && cell.suffix == suffix {
                            return Some(code);
                        }
                    }
                }
            }
            index = Self::advance(index, hashval);
        }
    }

    /// Reassigns an unreferenced cell on the probe chain of
    /// (pred, suffix) once the table is full. The first candidate that
    /// never took part in a walk is overwritten in place; if the chain
    /// ends or every candidate is referenced, nothing changes. The hash
    /// index is not updated, matching the historical table.
    pub fn reassign(&mut self, pred: Predecessor, suffix: u8) {
        let hashval = Self::hash(pred, suffix);
        let mut index = hashval;
        loop {
            match self.xlat[index] {
                Slot::Empty => return,
                Slot::Index(code) => {
                    if let Some(cell) = &mut self.cells[usize::from(code)] {
                        if !cell.referenced {
                            *cell = Cell {
                                predecessor: pred,
                                suffix,
                                referenced: false,
                            };
                            return;
                        }
                    }
                }
            }
            index = Self::advance(index, hashval);
        }
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::new()
    }
}
