//! # Exclusion Ledger
//!
//! Keeps the working tree's ignore file in step with the modules that have
//! been materialized. Module-derived paths must never be committed by the
//! host repository, so every materialized module name is recorded exactly
//! once.
//!
//! The ledger is loaded once per run and threaded through the fetch loop.
//! The file is only ever appended to; existing lines (including the user's
//! own patterns) are never rewritten.

use crate::error::Result;
use log::debug;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The set of paths listed in an ignore file.
#[derive(Debug)]
pub struct ExclusionLedger {
    path: PathBuf,
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl ExclusionLedger {
    /// Read the existing entries of the ignore file at `path`.
    ///
    /// A missing file yields an empty ledger; it is created on the first
    /// [`ensure`](Self::ensure).
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut ledger = Self {
            path,
            entries: Vec::new(),
            seen: HashSet::new(),
        };

        if ledger.path.is_file() {
            let content = fs::read_to_string(&ledger.path)?;
            for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
                ledger.remember(line);
            }
        }

        debug!(
            "Loaded {} ignore entries from {}",
            ledger.entries.len(),
            ledger.path.display()
        );
        Ok(ledger)
    }

    /// Record `entry` in the ignore file unless it is already listed.
    ///
    /// Returns `true` when the entry was appended.
    pub fn ensure(&mut self, entry: &str) -> Result<bool> {
        if self.contains(entry) {
            return Ok(false);
        }

        let needs_separator = match fs::read(&self.path) {
            Ok(bytes) => bytes.last().is_some_and(|last| *last != b'\n'),
            Err(_) => false,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if needs_separator {
            writeln!(file)?;
        }
        writeln!(file, "{entry}")?;

        debug!("Added '{}' to {}", entry, self.path.display());
        self.remember(entry);
        Ok(true)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.seen.contains(entry)
    }

    /// Entries in the order they were first seen.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remember(&mut self, entry: &str) {
        if self.seen.insert(entry.to_string()) {
            self.entries.push(entry.to_string());
        }
    }
}
