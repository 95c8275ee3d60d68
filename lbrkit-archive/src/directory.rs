//! Library directory sectors.
//!
//! The directory occupies the first sectors of the file: 32-byte slots,
//! four per 128-byte sector. Slot 0 is the header entry describing the
//! directory itself; member entries follow. Offsets and lengths count
//! whole sectors throughout.

use std::io::{Read, Seek, SeekFrom, Write};

use lbrkit_core::{LbrError, Result};

use crate::name::MemberName;

/// Bytes per sector; every offset and length counts these.
pub const SECTOR_SIZE: usize = 128;
/// Bytes per directory slot.
pub const ENTRY_SIZE: usize = 32;
/// Directory slots per sector.
pub const SLOTS_PER_SECTOR: usize = SECTOR_SIZE / ENTRY_SIZE;
/// Largest slot count a directory may carry.
pub const MAX_SLOTS: usize = 256;
/// Padding byte filling the short final sector of a stored member.
pub const CTRL_Z: u8 = 0x1a;

const STATUS_ACTIVE: u8 = 0x00;
const STATUS_UNUSED: u8 = 0xff;
const STATUS_DELETED: u8 = 0xfe;

/// Life-cycle state of a directory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Slot describes a live member (or, in slot 0, the directory itself).
    Active,
    /// Slot has never held a member.
    Unused,
    /// Slot held a member that was deleted.
    Deleted,
}

impl EntryStatus {
    /// Maps a stored status byte. Any byte that is neither active nor
    /// unused reads as deleted, so exotic markers normalize when the
    /// directory is rewritten.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            STATUS_ACTIVE => Self::Active,
            STATUS_UNUSED => Self::Unused,
            _ => Self::Deleted,
        }
    }

    /// The status byte written to disk.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::Unused => STATUS_UNUSED,
            Self::Deleted => STATUS_DELETED,
        }
    }
}

/// One 32-byte directory slot.
#[derive(Debug, Clone, Copy)]
pub struct DirEntry {
    /// Slot state.
    pub status: EntryStatus,
    /// Member name fields.
    pub name: MemberName,
    /// First sector of the member, counted from the start of the file.
    pub offset: u16,
    /// Member length in sectors.
    pub length: u16,
    fill: [u8; 16],
}

impl DirEntry {
    /// A fresh unused slot.
    pub fn blank() -> Self {
        Self {
            status: EntryStatus::Unused,
            name: MemberName::blank(),
            offset: 0,
            length: 0,
            fill: [0; 16],
        }
    }

    /// Parses one slot from its raw bytes. The pad region behind the
    /// fixed fields is kept and written back verbatim.
    pub fn parse(raw: &[u8; ENTRY_SIZE]) -> Self {
        let mut stem = [0u8; 8];
        stem.copy_from_slice(&raw[1..9]);
        let mut ext = [0u8; 3];
        ext.copy_from_slice(&raw[9..12]);
        let mut fill = [0u8; 16];
        fill.copy_from_slice(&raw[16..32]);
        Self {
            status: EntryStatus::from_byte(raw[0]),
            name: MemberName::from_raw(stem, ext),
            offset: u16::from_le_bytes([raw[12], raw[13]]),
            length: u16::from_le_bytes([raw[14], raw[15]]),
            fill,
        }
    }

    /// Serializes the slot back to its 32-byte form.
    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut raw = [0u8; ENTRY_SIZE];
        raw[0] = self.status.to_byte();
        raw[1..9].copy_from_slice(self.name.stem_bytes());
        raw[9..12].copy_from_slice(self.name.ext_bytes());
        raw[12..14].copy_from_slice(&self.offset.to_le_bytes());
        raw[14..16].copy_from_slice(&self.length.to_le_bytes());
        raw[16..32].copy_from_slice(&self.fill);
        raw
    }
}

/// Slot status totals over the member slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCounts {
    /// Live member entries.
    pub active: usize,
    /// Deleted entries awaiting reuse.
    pub deleted: usize,
    /// Never-used entries.
    pub unused: usize,
}

/// An in-memory image of a library's directory.
#[derive(Debug, Clone)]
pub struct Directory {
    entries: Vec<DirEntry>,
}

impl Directory {
    /// Reads the directory from a library opened at its start.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        let mut raw = [0u8; ENTRY_SIZE];
        reader
            .read_exact(&mut raw)
            .map_err(|_| LbrError::not_a_library("cannot read header entry"))?;
        let header = DirEntry::parse(&raw);

        if header.status != EntryStatus::Active {
            return Err(LbrError::not_a_library("header entry is not active"));
        }
        let slots = header.length as usize * SLOTS_PER_SECTOR;
        if slots == 0 || slots > MAX_SLOTS {
            return Err(LbrError::not_a_library(format!(
                "directory of {slots} slots out of range"
            )));
        }

        let mut entries = Vec::with_capacity(slots);
        entries.push(header);
        for _ in 1..slots {
            reader.read_exact(&mut raw).map_err(|_| {
                LbrError::not_a_library("directory shorter than its header claims")
            })?;
            entries.push(DirEntry::parse(&raw));
        }
        Ok(Self { entries })
    }

    /// Rewrites the directory sectors at the start of the file.
    pub fn save<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.seek(SeekFrom::Start(0))?;
        for entry in &self.entries {
            writer.write_all(&entry.to_bytes())?;
        }
        Ok(())
    }

    /// Builds a fresh directory for a new library.
    ///
    /// The requested slot count rounds down to whole sectors, so it must
    /// be at least [`SLOTS_PER_SECTOR`] and at most [`MAX_SLOTS`]. Slot 0
    /// becomes the header entry and every other slot starts unused.
    pub fn initialize(requested_slots: usize) -> Result<Self> {
        if requested_slots > MAX_SLOTS {
            return Err(LbrError::invalid_slot_count(requested_slots));
        }
        let sectors = requested_slots / SLOTS_PER_SECTOR;
        if sectors == 0 {
            return Err(LbrError::invalid_slot_count(requested_slots));
        }

        let mut entries = vec![DirEntry::blank(); sectors * SLOTS_PER_SECTOR];
        entries[0].status = EntryStatus::Active;
        entries[0].length = sectors as u16;
        Ok(Self { entries })
    }

    /// Number of directory slots, header included.
    pub fn slot_count(&self) -> usize {
        self.entries.len()
    }

    /// Sectors occupied by the directory itself.
    pub fn dir_sectors(&self) -> u16 {
        self.entries[0].length
    }

    /// All slots in order, header first.
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Mutable access to one slot.
    pub fn entry_mut(&mut self, slot: usize) -> &mut DirEntry {
        &mut self.entries[slot]
    }

    /// Finds the slot for a new or updated member.
    ///
    /// A live entry with the same name wins so the member updates in
    /// place; otherwise the first free slot is reused. The name pass runs
    /// to completion first, so a free slot early in the directory never
    /// shadows an existing member further down.
    pub fn find_slot(&self, name: &MemberName) -> Option<(usize, bool)> {
        for (i, entry) in self.entries.iter().enumerate().skip(1) {
            if entry.status == EntryStatus::Active && entry.name.eq_ignore_case(name) {
                return Some((i, true));
            }
        }
        for (i, entry) in self.entries.iter().enumerate().skip(1) {
            if entry.status != EntryStatus::Active {
                return Some((i, false));
            }
        }
        None
    }

    /// Tallies member slot statuses. Slot 0 is not counted.
    pub fn counts(&self) -> SlotCounts {
        let mut counts = SlotCounts {
            active: 0,
            deleted: 0,
            unused: 0,
        };
        for entry in &self.entries[1..] {
            match entry.status {
                EntryStatus::Active => counts.active += 1,
                EntryStatus::Deleted => counts.deleted += 1,
                EntryStatus::Unused => counts.unused += 1,
            }
        }
        counts
    }
}
