//! Default values for quack configuration.
//!
//! This module provides centralized default names and paths used across the
//! engine and the CLI, ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Manifest file looked up in the working root when no override is given.
pub const MANIFEST_FILE: &str = "quack.yaml";

/// Profile run when no override is given.
pub const PROFILE: &str = "init";

/// Environment variable overriding the manifest file.
pub const MANIFEST_ENV: &str = "QUACK_MANIFEST";

/// Environment variable overriding the profile.
pub const PROFILE_ENV: &str = "QUACK_PROFILE";

/// Branch cloned when a module does not declare one.
pub const BRANCH: &str = "master";

/// Ignore file at the working-tree root that records module paths.
pub const IGNORE_FILE: &str = ".gitignore";

/// Private working directory at the working-tree root.
pub const WORK_DIR: &str = ".quack";

/// Submodule manifest that a clone step may leave behind.
pub const SUBMODULES_FILE: &str = ".gitmodules";

/// Returns the staging root where scratch clones are placed.
///
/// Each module gets its own `<root>/.quack/modules/<name>` scratch directory,
/// reset before every clone.
pub fn staging_root(root: &Path) -> PathBuf {
    root.join(WORK_DIR).join("modules")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_root_is_inside_work_dir() {
        let staging = staging_root(Path::new("/work"));
        assert_eq!(staging, PathBuf::from("/work/.quack/modules"));
    }
}
