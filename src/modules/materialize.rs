//! Fetching a module into the working tree.
//!
//! Materializing always starts from a clean slate: the module's previous
//! working-tree path is deleted, a fresh scratch clone is made under the
//! staging root, and the relevant subtree is copied out of it without any
//! version-control metadata. Re-running is therefore the recovery path for an
//! interrupted fetch.

use super::copy::copy_tree;
use super::remove::remove_path;
use crate::config::ModuleDescriptor;
use crate::defaults;
use crate::error::Result;
use crate::ledger::ExclusionLedger;
use crate::output::Reporter;
use crate::repository::GitOperations;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// What happened to a module's sources after the clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeStatus {
    /// The subtree was copied into the working tree.
    Copied { files: usize },
    /// The declared subpath does not exist in the clone; nothing was copied.
    Skipped { subpath: String },
}

/// Result of materializing a single module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeOutcome {
    pub name: String,
    /// The pinned revision when one is declared, else what the clone resolved to.
    pub revision: String,
    pub status: MaterializeStatus,
    /// Non-fatal cleanup failures.
    pub warnings: Vec<String>,
}

/// Clones modules and copies them into the working tree.
pub struct ModuleMaterializer<'a> {
    root: &'a Path,
    staging_root: PathBuf,
    git: &'a dyn GitOperations,
    reporter: &'a Reporter,
}

impl<'a> ModuleMaterializer<'a> {
    pub fn new(root: &'a Path, git: &'a dyn GitOperations, reporter: &'a Reporter) -> Self {
        Self {
            root,
            staging_root: defaults::staging_root(root),
            git,
            reporter,
        }
    }

    /// Fetch module `name` and record it in `ledger`.
    ///
    /// Clone and checkout failures abort with an error. A missing subpath is
    /// reported as [`MaterializeStatus::Skipped`]. Failures while discarding
    /// the scratch clone are logged and returned as warnings.
    pub fn materialize(
        &self,
        name: &str,
        descriptor: &ModuleDescriptor,
        ledger: &mut ExclusionLedger,
    ) -> Result<MaterializeOutcome> {
        let destination = self.root.join(name);
        if remove_path(&destination)? {
            debug!("Removed previous copy of '{}'", name);
        }

        let scratch = self.staging_root.join(name);
        if remove_path(&scratch)? {
            debug!("Reset scratch clone at {}", scratch.display());
        }
        std::fs::create_dir_all(&self.staging_root)?;

        let submodules_file = self.root.join(defaults::SUBMODULES_FILE);
        let had_submodules_file = submodules_file.exists();

        let progress = self.reporter.clone_started(&descriptor.repository);
        self.git
            .clone_branch(&descriptor.repository, &descriptor.branch, &scratch)?;

        let revision = match &descriptor.hexsha {
            Some(pinned) => {
                self.git.checkout(&scratch, pinned)?;
                pinned.clone()
            }
            None => self.git.head_revision(&scratch)?,
        };
        progress.finish(name, &revision);

        let status = match descriptor.subpath() {
            Some(subpath) if !scratch.join(subpath).exists() => {
                self.reporter.subpath_skipped(subpath);
                info!("Module '{}' has no '{}' directory; skipped", name, subpath);
                MaterializeStatus::Skipped {
                    subpath: subpath.to_string(),
                }
            }
            subpath => {
                let source = subpath.map_or_else(|| scratch.clone(), |subpath| scratch.join(subpath));
                let files = copy_tree(&source, &destination)?;
                debug!("Copied {} files into '{}'", files, name);
                MaterializeStatus::Copied { files }
            }
        };

        let mut warnings = self.discard_scratch(&scratch);
        if !had_submodules_file && submodules_file.exists() {
            warnings.extend(self.discard_submodules_file(&submodules_file));
        }

        ledger.ensure(name)?;

        Ok(MaterializeOutcome {
            name: name.to_string(),
            revision,
            status,
            warnings,
        })
    }

    /// Detach the scratch clone from version control and tear it down.
    fn discard_scratch(&self, scratch: &Path) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Err(e) = self.git.remove_metadata(scratch) {
            warnings.push(format!(
                "could not remove version-control metadata from {}: {}",
                scratch.display(),
                e
            ));
        }
        if let Err(e) = remove_path(scratch) {
            warnings.push(format!(
                "could not remove scratch clone {}: {}",
                scratch.display(),
                e
            ));
        }
        for warning in &warnings {
            warn!("{}", warning);
        }
        warnings
    }

    /// Delete a submodule manifest left behind by the clone step and drop it
    /// from the host index.
    fn discard_submodules_file(&self, submodules_file: &Path) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Err(e) = remove_path(submodules_file) {
            warnings.push(format!("could not remove {}: {}", submodules_file.display(), e));
        }
        if self.git.has_metadata(self.root) {
            if let Err(e) = self.git.untrack(self.root, defaults::SUBMODULES_FILE) {
                warnings.push(format!(
                    "could not untrack {}: {}",
                    defaults::SUBMODULES_FILE,
                    e
                ));
            }
        }
        for warning in &warnings {
            warn!("{}", warning);
        }
        warnings
    }
}
