//! Copying a cloned subtree into the working tree.

use crate::error::Result;
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Entries whose name starts with this prefix are version-control metadata
/// (`.git`, `.gitignore`, `.gitmodules`, `.gitattributes`, ...) and are never
/// copied out of a clone.
const VCS_PREFIX: &str = ".git";

fn is_vcs_entry(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with(VCS_PREFIX))
}

/// Copy `source` to `destination`, skipping version-control metadata at any
/// depth. `source` may be a directory or a single file.
///
/// Returns the number of files (including symlinks) written.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<usize> {
    if source.is_file() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, destination)?;
        return Ok(1);
    }

    let mut copied = 0;
    let walker = WalkDir::new(source)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_vcs_entry(entry));

    for entry in walker {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            copied += 1;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let points_to = fs::read_link(link)?;
    std::os::unix::fs::symlink(points_to, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    fs::copy(link, target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let file = root.join(path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
    }

    #[test]
    fn test_copy_tree_skips_vcs_metadata() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        write(&source, "README.md", "readme");
        write(&source, "src/lib.rs", "// lib");
        write(&source, ".git/HEAD", "ref: refs/heads/master");
        write(&source, ".gitignore", "target");
        write(&source, ".gitmodules", "[submodule]");
        write(&source, "nested/.git/config", "[core]");
        write(&source, ".github/workflows/ci.yml", "on: push");

        let destination = temp.path().join("dest");
        let copied = copy_tree(&source, &destination).unwrap();

        assert_eq!(copied, 2);
        assert!(destination.join("README.md").is_file());
        assert!(destination.join("src/lib.rs").is_file());
        assert!(!destination.join(".git").exists());
        assert!(!destination.join(".gitignore").exists());
        assert!(!destination.join(".gitmodules").exists());
        assert!(!destination.join("nested/.git").exists());
        assert!(!destination.join(".github").exists());
    }

    #[test]
    fn test_copy_tree_root_named_like_metadata_is_copied() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join(".github");
        write(&source, "workflows/ci.yml", "on: push");

        let destination = temp.path().join("ci");
        assert_eq!(copy_tree(&source, &destination).unwrap(), 1);
        assert!(destination.join("workflows/ci.yml").is_file());
    }

    #[test]
    fn test_copy_tree_single_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "repo/LICENSE", "MIT");

        let destination = temp.path().join("license");
        assert_eq!(copy_tree(&temp.path().join("repo/LICENSE"), &destination).unwrap(), 1);
        assert_eq!(fs::read_to_string(destination).unwrap(), "MIT");
    }

    #[test]
    fn test_copy_tree_keeps_empty_directories() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        fs::create_dir_all(source.join("empty")).unwrap();

        let destination = temp.path().join("dest");
        assert_eq!(copy_tree(&source, &destination).unwrap(), 0);
        assert!(destination.join("empty").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_recreates_symlinks() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        write(&source, "real.txt", "content");
        std::os::unix::fs::symlink("real.txt", source.join("link.txt")).unwrap();

        let destination = temp.path().join("dest");
        copy_tree(&source, &destination).unwrap();

        let link = destination.join("link.txt");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("real.txt"));
    }
}
