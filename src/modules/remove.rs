//! Removing materialized modules from the working tree.

use crate::error::Result;
use crate::output::Reporter;
use log::debug;
use std::fs;
use std::io;
use std::path::Path;

/// Delete whatever is at `path` (directory, file or symlink).
///
/// Returns whether anything was removed. A missing path is not an error.
pub fn remove_path(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path)?,
        Ok(_) => fs::remove_file(path)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    }
    Ok(true)
}

/// Deletes module paths from the working tree.
pub struct ModuleRemover<'a> {
    root: &'a Path,
    reporter: &'a Reporter,
}

impl<'a> ModuleRemover<'a> {
    pub fn new(root: &'a Path, reporter: &'a Reporter) -> Self {
        Self { root, reporter }
    }

    /// Remove the working-tree path of module `name`.
    ///
    /// The returned flag only feeds reporting; cleaning a module that is not
    /// present is a no-op.
    pub fn clean(&self, name: &str) -> Result<bool> {
        let removed = remove_path(&self.root.join(name))?;
        if removed {
            self.reporter.cleaned(name);
        } else {
            debug!("Module '{}' is not present; nothing to clean", name);
        }
        Ok(removed)
    }
}
