//! # LbrKit Archive
//!
//! .LBR container support for LbrKit.
//!
//! A library is a flat file of 128-byte sectors: a directory of 32-byte
//! slots up front, member content packed sector-aligned behind it. This
//! crate provides the directory model plus the whole-library operations:
//!
//! - **list**: member table with slot and sector accounting
//! - **extract**: copy members out, auto-decoding squeezed/crunched streams
//! - **print**: console-safe preview of member text
//! - **add**: append or update members, creating the library on demand
//! - **delete**: mark members deleted without moving data
//! - **compact**: rebuild the library without deleted/unused gaps
//!
//! ## Example
//!
//! ```rust,no_run
//! use lbrkit_archive::ops;
//! use std::path::Path;
//!
//! let listing = ops::list(Path::new("programs.lbr"), &[]).unwrap();
//! print!("{}", listing.render(true));
//! ```
//!
//! ## Compression Detection
//!
//! Members carry no compression flag; [`detect::Compression`] probes the
//! stored stream's leading bytes for the squeeze and crunch signatures.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod detect;
pub mod directory;
pub mod filter;
pub mod name;
pub mod ops;

// Re-exports
pub use detect::Compression;
pub use directory::{
    CTRL_Z, DirEntry, Directory, ENTRY_SIZE, EntryStatus, MAX_SLOTS, SECTOR_SIZE,
    SLOTS_PER_SECTOR, SlotCounts,
};
pub use filter::NameFilter;
pub use name::MemberName;
pub use ops::{
    AddReport, AddedFile, CompactReport, CreateReport, DeleteReport, ExtractOutcome, ExtractReport,
    Failure, ListRow, Listing, PrintReport, PrintedMember, add, compact, create, delete, extract,
    list, print,
};
