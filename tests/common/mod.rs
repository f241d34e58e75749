//! Shared test utilities for integration and E2E tests.
//!
//! This module provides fixtures for a working root with a manifest and for
//! throwaway source repositories that modules can be cloned from.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let source = SourceRepo::new(&[("README.md", "# foo\n")]);
//!     let fixture = TestFixture::new().with_manifest(&manifests::single_module(&source.url()));
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::{SourceRepo, TestFixture};
}

/// Manifest snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// A single module `foo` fetched by the default profile, cleaned by `clean`.
    pub fn single_module(url: &str) -> String {
        format!(
            r#"
modules:
  foo:
    repository: {url}
profiles:
  init:
    tasks:
      - modules:foo
  clean:
    tasks:
      - -modules:foo
"#
        )
    }

    /// A module `foo` that only contributes its `path` subtree.
    pub fn module_with_path(url: &str, path: &str) -> String {
        format!(
            r#"
modules:
  foo:
    repository: {url}
    path: {path}
profiles:
  init:
    tasks: [modules:foo]
"#
        )
    }

    /// A module `foo` pinned to `hexsha`.
    pub fn pinned_module(url: &str, hexsha: &str) -> String {
        format!(
            r#"
modules:
  foo:
    repository: {url}
    hexsha: {hexsha}
profiles:
  init:
    tasks: [modules:foo]
"#
        )
    }

    /// A profile whose only job is building the dependency `descriptor`.
    pub fn dependency_only(descriptor: &str) -> String {
        format!(
            r#"
profiles:
  init:
    dependencies:
      dep:
        quack: {descriptor}
"#
        )
    }
}

/// Run `git` in `dir`, panicking with its stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.email=tests@example.com",
            "-c",
            "user.name=quack tests",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Relative path and content of every file below `dir`.
#[allow(dead_code)]
pub fn snapshot(dir: &Path) -> BTreeMap<String, String> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .map(|entry| entry.expect("Failed to walk directory"))
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(dir)
                .expect("Entry outside the walked directory")
                .to_string_lossy()
                .to_string();
            let content = std::fs::read_to_string(entry.path()).expect("Failed to read file");
            (relative, content)
        })
        .collect()
}

/// A local repository on branch `master` that modules can be cloned from.
pub struct SourceRepo {
    temp_dir: assert_fs::TempDir,
}

impl SourceRepo {
    /// Create a repository with one commit holding `files`.
    pub fn new(files: &[(&str, &str)]) -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        git(temp_dir.path(), &["init", "--quiet"]);
        git(temp_dir.path(), &["symbolic-ref", "HEAD", "refs/heads/master"]);
        let repo = Self { temp_dir };
        repo.commit(files, "initial");
        repo
    }

    /// Write `files` and commit them. Returns the new revision.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> String {
        for (path, content) in files {
            self.temp_dir
                .child(path)
                .write_str(content)
                .expect("Failed to write file");
        }
        git(self.path(), &["add", "-A"]);
        git(self.path(), &["commit", "--quiet", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        git(self.path(), &["rev-parse", "HEAD"])
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path().display())
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// A working root, optionally with a `quack.yaml`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `quack.yaml` manifest with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("quack.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read a file below the working root.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// Create a command configured to run in this fixture's directory.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("quack");
        cmd.current_dir(self.path())
            .env_remove("QUACK_MANIFEST")
            .env_remove("QUACK_PROFILE")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
