//! Member name selection for multi-file operations.

use lbrkit_core::{LbrError, Result};

use crate::directory::MAX_SLOTS;
use crate::name::MemberName;

/// A set of requested member names with match bookkeeping.
///
/// An empty set selects every member. Each requested name remembers
/// whether it ever matched, so the caller can report the ones that
/// were never found. Duplicate names are tolerated; a match marks all
/// copies at once.
#[derive(Debug, Clone)]
pub struct NameFilter {
    names: Vec<String>,
    touched: Vec<bool>,
}

impl NameFilter {
    /// Builds a filter from requested names.
    pub fn new(names: &[String]) -> Result<Self> {
        if names.len() > MAX_SLOTS {
            return Err(LbrError::too_many_files(names.len(), MAX_SLOTS));
        }
        Ok(Self {
            names: names.to_vec(),
            touched: vec![false; names.len()],
        })
    }

    /// True when no names were requested, meaning select-all.
    pub fn selects_all(&self) -> bool {
        self.names.is_empty()
    }

    /// Tests a member against the set, marking every matching request.
    pub fn matches(&mut self, member: &MemberName) -> bool {
        if self.names.is_empty() {
            return true;
        }
        let mut hit = false;
        for (name, touched) in self.names.iter().zip(self.touched.iter_mut()) {
            if member.matches(name) {
                *touched = true;
                hit = true;
            }
        }
        hit
    }

    /// Requested names that never matched any member.
    pub fn missing(&self) -> Vec<String> {
        self.names
            .iter()
            .zip(self.touched.iter())
            .filter(|&(_, &touched)| !touched)
            .map(|(name, _)| name.clone())
            .collect()
    }
}
