//! Whole-library operations.
//!
//! Each operation opens the library, works through the directory, and
//! returns a report instead of printing. Per-member failures during a
//! multi-member pass are collected so the pass can finish; operations
//! that rewrite the directory skip the write when anything failed,
//! leaving the prior on-disk state intact.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use lbrkit_core::{LbrError, Preview, Result};
use lbrkit_crunch::uncrunch;
use lbrkit_squeeze::unsqueeze;
use tempfile::NamedTempFile;

use crate::detect::Compression;
use crate::directory::{CTRL_Z, DirEntry, Directory, EntryStatus, MAX_SLOTS, SECTOR_SIZE};
use crate::filter::NameFilter;
use crate::name::MemberName;

/// One row of a library listing.
#[derive(Debug, Clone)]
pub struct ListRow {
    /// Member name in display form.
    pub name: String,
    /// First sector of the member.
    pub offset: u16,
    /// Member length in sectors.
    pub sectors: u16,
}

/// Everything `list` learns about a library in one pass.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Library path as given.
    pub library: String,
    /// Sectors occupied by the directory itself.
    pub dir_sectors: u16,
    /// Total directory slots, header included.
    pub slots: usize,
    /// Filter-matched live members in directory order.
    pub rows: Vec<ListRow>,
    /// Directory sectors plus every live member's sectors, filtered or not.
    pub total_sectors: u32,
    /// Live member entries.
    pub active: usize,
    /// Deleted entries awaiting compaction.
    pub deleted: usize,
    /// Never-used entries.
    pub unused: usize,
    /// Requested names that matched nothing.
    pub missing: Vec<String>,
}

impl Listing {
    /// Renders the listing in the classic table shape: bare names, or
    /// with `verbose` the full table with directory and slot totals.
    pub fn render(&self, verbose: bool) -> String {
        let mut out = String::new();
        if !verbose {
            for row in &self.rows {
                out.push_str(&row.name);
                out.push('\n');
            }
            return out;
        }

        out.push_str("Name          Index Length\n");
        out.push_str(&format!("Directory           {:4}\n", self.dir_sectors));
        for row in &self.rows {
            out.push_str(&format!(
                "{:<12}   {:4} {:4}\n",
                row.name, row.offset, row.sectors
            ));
        }
        out.push_str("--------------------------\n");
        out.push_str(&format!("Total sectors       {:4}\n", self.total_sectors));
        out.push_str(&format!(
            "\nLibrary {} has {} slots, {} deleted {} active, {} unused\n",
            self.library, self.slots, self.deleted, self.active, self.unused
        ));
        out
    }
}

/// A per-name failure captured during a multi-member operation.
#[derive(Debug)]
pub struct Failure {
    /// Member or source file the failure belongs to.
    pub name: String,
    /// What went wrong.
    pub error: LbrError,
}

/// One member written out by `extract`.
#[derive(Debug)]
pub struct ExtractOutcome {
    /// Member name as listed in the directory.
    pub member: String,
    /// Destination the content was written to.
    pub path: PathBuf,
    /// Bytes written after any decode or padding strip.
    pub written: usize,
    /// Compression found on the stored stream.
    pub compression: Compression,
    /// Checksum verdict from the decoder, when one ran and the stream
    /// carried a checksum.
    pub checksum_mismatch: Option<bool>,
}

/// Result of an `extract` pass.
#[derive(Debug)]
pub struct ExtractReport {
    /// Members extracted, in directory order.
    pub extracted: Vec<ExtractOutcome>,
    /// Per-member failures plus never-matched requested names.
    pub failures: Vec<Failure>,
}

/// One member rendered by `print`.
#[derive(Debug)]
pub struct PrintedMember {
    /// Member name as listed in the directory.
    pub member: String,
    /// Compression found on the stored stream.
    pub compression: Compression,
    /// Console-safe rendering of the member content.
    pub text: String,
    /// True when the line budget cut the rendering short.
    pub truncated: bool,
    /// Checksum verdict from the decoder, when applicable.
    pub checksum_mismatch: Option<bool>,
}

/// Result of a `print` pass.
#[derive(Debug)]
pub struct PrintReport {
    /// Members rendered, in directory order.
    pub printed: Vec<PrintedMember>,
    /// Per-member failures plus never-matched requested names.
    pub failures: Vec<Failure>,
}

/// One file placed in the library by `add`.
#[derive(Debug)]
pub struct AddedFile {
    /// Member name the file got in the directory.
    pub member: String,
    /// Sectors the content occupies.
    pub sectors: u16,
    /// True when an existing member of the same name was replaced.
    pub updated: bool,
}

/// Result of an `add` pass.
#[derive(Debug)]
pub struct AddReport {
    /// Files placed, in argument order.
    pub added: Vec<AddedFile>,
    /// Per-file failures.
    pub failures: Vec<Failure>,
    /// Non-fatal notices, currently name truncations.
    pub warnings: Vec<String>,
    /// True when the directory was rewritten. A pass with any failure
    /// leaves the directory untouched.
    pub saved: bool,
}

/// Result of a `delete` pass.
#[derive(Debug)]
pub struct DeleteReport {
    /// Members marked deleted, in directory order.
    pub deleted: Vec<String>,
    /// Requested names that matched nothing.
    pub missing: Vec<String>,
    /// True when the directory was rewritten. Any missing name skips
    /// the write, leaving the library byte-identical.
    pub saved: bool,
}

/// Result of a `compact` pass.
#[derive(Debug)]
pub struct CompactReport {
    /// Slot count of the rebuilt library (same as the original).
    pub slots: usize,
    /// Members carried over, in original order.
    pub copied: Vec<String>,
}

/// Shape of a freshly initialized library.
#[derive(Debug, Clone, Copy)]
pub struct CreateReport {
    /// Directory slots, header included.
    pub slots: usize,
    /// Sectors the empty directory occupies.
    pub dir_sectors: u16,
}

/// Initializes an empty library with the requested slot count.
///
/// The count is rounded down to a whole directory sector; anything that
/// rounds to zero sectors or exceeds the 256-slot format limit is
/// rejected. An existing file at the path is truncated.
pub fn create(library: &Path, requested_slots: usize) -> Result<CreateReport> {
    let (_, dir) = create_library(library, requested_slots)?;
    Ok(CreateReport {
        slots: dir.slot_count(),
        dir_sectors: dir.dir_sectors(),
    })
}

/// Lists a library's members and slot accounting.
///
/// Rows cover only filter-matched live members, while the totals and
/// status counters always cover the whole directory.
pub fn list(library: &Path, names: &[String]) -> Result<Listing> {
    let mut filter = NameFilter::new(names)?;
    let mut file = open_library(library)?;
    let dir = Directory::load(&mut file)?;

    let counts = dir.counts();
    let mut total_sectors = u32::from(dir.dir_sectors());
    let mut rows = Vec::new();
    for entry in dir.entries().iter().skip(1) {
        if entry.status != EntryStatus::Active {
            continue;
        }
        total_sectors += u32::from(entry.length);
        if filter.matches(&entry.name) {
            rows.push(ListRow {
                name: entry.name.display(),
                offset: entry.offset,
                sectors: entry.length,
            });
        }
    }

    Ok(Listing {
        library: library.display().to_string(),
        dir_sectors: dir.dir_sectors(),
        slots: dir.slot_count(),
        rows,
        total_sectors,
        active: counts.active,
        deleted: counts.deleted,
        unused: counts.unused,
        missing: filter.missing(),
    })
}

/// Extracts filter-matched members into `out_dir`.
///
/// With `auto_decompress`, squeezed and crunched members are decoded in
/// memory and only the decoded bytes land on disk, under the original
/// name embedded in the stream. Stored members (and everything when the
/// flag is off) get trailing CTRL-Z padding stripped from the final
/// sector when the content is free of high-bit bytes.
pub fn extract(
    library: &Path,
    names: &[String],
    out_dir: &Path,
    auto_decompress: bool,
) -> Result<ExtractReport> {
    let mut filter = NameFilter::new(names)?;
    let mut file = open_library(library)?;
    let dir = Directory::load(&mut file)?;

    let mut extracted = Vec::new();
    let mut failures = Vec::new();
    for entry in dir.entries().iter().skip(1) {
        if entry.status != EntryStatus::Active || !filter.matches(&entry.name) {
            continue;
        }
        match extract_member(&mut file, entry, out_dir, auto_decompress) {
            Ok(outcome) => extracted.push(outcome),
            Err(error) => failures.push(Failure {
                name: entry.name.display(),
                error,
            }),
        }
    }
    for name in filter.missing() {
        failures.push(Failure {
            error: LbrError::not_found(&name),
            name,
        });
    }
    Ok(ExtractReport { extracted, failures })
}

/// Renders filter-matched members as console-safe text.
///
/// Compressed members are decoded first, so squeezed and crunched text
/// previews as text rather than code noise. `max_lines` of `None`
/// renders each member in full.
pub fn print(library: &Path, names: &[String], max_lines: Option<u32>) -> Result<PrintReport> {
    let mut filter = NameFilter::new(names)?;
    let mut file = open_library(library)?;
    let dir = Directory::load(&mut file)?;

    let mut printed = Vec::new();
    let mut failures = Vec::new();
    for entry in dir.entries().iter().skip(1) {
        if entry.status != EntryStatus::Active || !filter.matches(&entry.name) {
            continue;
        }
        match print_member(&mut file, entry, max_lines) {
            Ok(member) => printed.push(member),
            Err(error) => failures.push(Failure {
                name: entry.name.display(),
                error,
            }),
        }
    }
    for name in filter.missing() {
        failures.push(Failure {
            error: LbrError::not_found(&name),
            name,
        });
    }
    Ok(PrintReport { printed, failures })
}

/// Adds or updates files in a library.
///
/// Content is appended sector-aligned at end of file with the short
/// final sector CTRL-Z padded; a member of the same name updates its
/// slot in place, otherwise the first free slot is used. When the
/// library does not exist yet, `new_library_slots` creates it first; a
/// missing library with no slot count is an error, since choosing a
/// size is the caller's concern.
pub fn add(
    library: &Path,
    files: &[PathBuf],
    new_library_slots: Option<usize>,
) -> Result<AddReport> {
    if files.len() > MAX_SLOTS {
        return Err(LbrError::too_many_files(files.len(), MAX_SLOTS));
    }

    let (mut file, mut dir) = match OpenOptions::new().read(true).write(true).open(library) {
        Ok(mut file) => {
            let dir = Directory::load(&mut file)?;
            (file, dir)
        }
        Err(_) => match new_library_slots {
            Some(slots) => create_library(library, slots)?,
            None => return Err(LbrError::file_not_found(library)),
        },
    };

    let mut added = Vec::new();
    let mut failures = Vec::new();
    let mut warnings = Vec::new();
    for source in files {
        match add_one(&mut file, &mut dir, source, &mut warnings) {
            Ok(outcome) => added.push(outcome),
            Err(error) => failures.push(Failure {
                name: source.display().to_string(),
                error,
            }),
        }
    }

    let saved = failures.is_empty();
    if saved {
        dir.save(&mut file)?;
    }
    Ok(AddReport {
        added,
        failures,
        warnings,
        saved,
    })
}

/// Marks filter-matched members deleted.
///
/// Space is not reclaimed; `compact` does that. Any requested name that
/// matches nothing skips the directory write entirely, so a misspelled
/// name never costs a member. An empty name list deletes nothing.
pub fn delete(library: &Path, names: &[String]) -> Result<DeleteReport> {
    if names.is_empty() {
        return Ok(DeleteReport {
            deleted: Vec::new(),
            missing: Vec::new(),
            saved: false,
        });
    }
    let mut filter = NameFilter::new(names)?;
    let mut file = open_library_rw(library)?;
    let mut dir = Directory::load(&mut file)?;

    let mut deleted = Vec::new();
    for slot in 1..dir.slot_count() {
        let entry = dir.entry_mut(slot);
        if entry.status == EntryStatus::Active && filter.matches(&entry.name) {
            entry.status = EntryStatus::Deleted;
            deleted.push(entry.name.display());
        }
    }

    let missing = filter.missing();
    let saved = missing.is_empty();
    if saved {
        dir.save(&mut file)?;
    }
    Ok(DeleteReport {
        deleted,
        missing,
        saved,
    })
}

/// Rebuilds a library without its deleted and unused gaps.
///
/// Live members are copied in directory order into a temporary file
/// with offsets recomputed contiguously, keeping the original slot
/// count. The temporary replaces the library only after every copy
/// succeeded; any failure discards it and leaves the original alone.
pub fn compact(library: &Path) -> Result<CompactReport> {
    let mut file = open_library(library)?;
    let dir = Directory::load(&mut file)?;

    let parent = match library.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent)?;

    let mut compacted = Directory::initialize(dir.slot_count())?;
    // Reserve the directory region; entries are rewritten once the
    // offsets are known.
    compacted.save(tmp.as_file_mut())?;

    let mut copied = Vec::new();
    let mut next_slot = 1;
    for entry in dir.entries().iter().skip(1) {
        if entry.status != EntryStatus::Active {
            continue;
        }
        let data = read_member(&mut file, entry)?;
        let position = tmp.as_file_mut().stream_position()?;
        let offset = position / SECTOR_SIZE as u64;
        if offset > u64::from(u16::MAX) {
            return Err(LbrError::Io(io::Error::other(
                "library exceeds 16-bit sector addressing",
            )));
        }
        tmp.as_file_mut().write_all(&data)?;

        let slot = compacted.entry_mut(next_slot);
        slot.status = EntryStatus::Active;
        slot.name = entry.name;
        slot.offset = offset as u16;
        slot.length = entry.length;
        next_slot += 1;
        copied.push(entry.name.display());
    }

    compacted.save(tmp.as_file_mut())?;
    tmp.persist(library).map_err(|err| LbrError::Io(err.error))?;
    Ok(CompactReport {
        slots: dir.slot_count(),
        copied,
    })
}

fn open_library(path: &Path) -> Result<File> {
    File::open(path).map_err(|_| LbrError::file_not_found(path))
}

fn open_library_rw(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|_| LbrError::file_not_found(path))
}

fn create_library(path: &Path, requested_slots: usize) -> Result<(File, Directory)> {
    let dir = Directory::initialize(requested_slots)?;
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|err| LbrError::write_failure(path, err))?;
    dir.save(&mut file)?;
    Ok((file, dir))
}

/// Reads a member's full sector range.
fn read_member(file: &mut File, entry: &DirEntry) -> Result<Vec<u8>> {
    file.seek(SeekFrom::Start(
        u64::from(entry.offset) * SECTOR_SIZE as u64,
    ))?;
    let mut data = vec![0u8; entry.length as usize * SECTOR_SIZE];
    file.read_exact(&mut data)
        .map_err(|_| LbrError::stream_exhausted("member sectors"))?;
    Ok(data)
}

struct DecodedMember {
    name: String,
    data: Vec<u8>,
    compression: Compression,
    checksum_mismatch: Option<bool>,
}

/// Turns a stored member stream into the bytes a user wants.
fn decode_member(name: &MemberName, stored: &[u8], auto_decompress: bool) -> Result<DecodedMember> {
    if auto_decompress {
        match Compression::from_magic(stored) {
            Compression::Squeezed => {
                let output = unsqueeze(stored)?;
                return Ok(DecodedMember {
                    name: host_file_name(&output.original_name, name),
                    data: output.data,
                    compression: Compression::Squeezed,
                    checksum_mismatch: Some(output.checksum_mismatch),
                });
            }
            Compression::Crunched => {
                let output = uncrunch(stored)?;
                return Ok(DecodedMember {
                    name: host_file_name(&output.original_name, name),
                    data: output.data,
                    compression: Compression::Crunched,
                    checksum_mismatch: output.checksum_mismatch,
                });
            }
            Compression::Stored => {}
        }
    }
    Ok(DecodedMember {
        name: name.display(),
        data: strip_text_padding(stored),
        compression: Compression::Stored,
        checksum_mismatch: None,
    })
}

/// Drops CTRL-Z padding from the final sector of text content.
///
/// A byte at or above 0x80 anywhere marks the whole member binary and
/// disables stripping. Only the last sector is filtered, so a CTRL-Z in
/// the body of a text file survives.
fn strip_text_padding(data: &[u8]) -> Vec<u8> {
    if data.iter().any(|&b| b >= 0x80) {
        return data.to_vec();
    }
    let tail_start = data.len().saturating_sub(SECTOR_SIZE);
    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[..tail_start]);
    out.extend(data[tail_start..].iter().copied().filter(|&b| b != CTRL_Z));
    out
}

/// Picks the host file name for an extracted member. The name embedded
/// in a compressed stream wins unless it is empty or tries to climb
/// out of the output directory.
fn host_file_name(embedded: &str, member: &MemberName) -> String {
    let trimmed = embedded.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
        member.display()
    } else {
        trimmed.to_string()
    }
}

fn extract_member(
    file: &mut File,
    entry: &DirEntry,
    out_dir: &Path,
    auto_decompress: bool,
) -> Result<ExtractOutcome> {
    let stored = read_member(file, entry)?;
    let decoded = decode_member(&entry.name, &stored, auto_decompress)?;
    let path = out_dir.join(&decoded.name);
    fs::write(&path, &decoded.data).map_err(|err| LbrError::write_failure(&path, err))?;
    Ok(ExtractOutcome {
        member: entry.name.display(),
        path,
        written: decoded.data.len(),
        compression: decoded.compression,
        checksum_mismatch: decoded.checksum_mismatch,
    })
}

fn print_member(
    file: &mut File,
    entry: &DirEntry,
    max_lines: Option<u32>,
) -> Result<PrintedMember> {
    let stored = read_member(file, entry)?;
    let decoded = decode_member(&entry.name, &stored, true)?;
    let mut preview = Preview::new(max_lines);
    preview.push_slice(&decoded.data);
    Ok(PrintedMember {
        member: entry.name.display(),
        compression: decoded.compression,
        truncated: preview.is_full(),
        text: preview.into_text(),
        checksum_mismatch: decoded.checksum_mismatch,
    })
}

fn add_one(
    file: &mut File,
    dir: &mut Directory,
    source: &Path,
    warnings: &mut Vec<String>,
) -> Result<AddedFile> {
    let data = fs::read(source).map_err(|_| LbrError::file_not_found(source))?;

    let host = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (name, truncated) = MemberName::from_host(&host);
    if truncated {
        warnings.push(LbrError::truncated_name(&host).to_string());
    }

    let (slot, updated) = dir
        .find_slot(&name)
        .ok_or_else(|| LbrError::library_full(dir.slot_count()))?;

    let (offset, sectors) = append_member(file, &data)?;
    let entry = dir.entry_mut(slot);
    entry.status = EntryStatus::Active;
    entry.name = name;
    entry.offset = offset;
    entry.length = sectors;

    Ok(AddedFile {
        member: name.display(),
        sectors,
        updated,
    })
}

/// Appends content sector-aligned at end of file, padding the short
/// final sector with CTRL-Z. Returns the first sector and sector count.
fn append_member(file: &mut File, data: &[u8]) -> Result<(u16, u16)> {
    let end = file.seek(SeekFrom::End(0))?;
    let first_sector = end.div_ceil(SECTOR_SIZE as u64);
    let sectors = data.len().div_ceil(SECTOR_SIZE);
    if first_sector > u64::from(u16::MAX) || sectors > usize::from(u16::MAX) {
        return Err(LbrError::Io(io::Error::other(
            "library exceeds 16-bit sector addressing",
        )));
    }

    file.seek(SeekFrom::Start(first_sector * SECTOR_SIZE as u64))?;
    file.write_all(data)?;
    let padding = [CTRL_Z; SECTOR_SIZE];
    file.write_all(&padding[..sectors * SECTOR_SIZE - data.len()])?;
    Ok((first_sector as u16, sectors as u16))
}
