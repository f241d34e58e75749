//! Thin wrappers around the system `git` command.
//!
//! Shelling out (instead of linking a Git library) means clones pick up
//! whatever the user has configured:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::Error;

/// Clone `url` at `branch` into `target_dir` with full history.
///
/// History is kept so that a pinned revision reachable from the branch can be
/// checked out afterwards.
pub fn clone_branch(url: &str, branch: &str, target_dir: &Path) -> Result<(), Error> {
    // git won't clone into an existing non-empty directory
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let output = Command::new("git")
        .args(["clone", "--quiet", "--branch", branch, url])
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            branch: branch.to_string(),
            message: e.to_string(),
            hint: Some("Make sure git is installed and on your PATH".to_string()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(Error::GitClone {
            url: url.to_string(),
            branch: branch.to_string(),
            hint: clone_hint(&stderr),
            message: stderr,
        });
    }

    Ok(())
}

/// Pick a hint for the most common clone failures.
fn clone_hint(stderr: &str) -> Option<String> {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        Some(
            "Authentication failed. For private repositories make sure an SSH key \
             is loaded or git credentials are configured"
                .to_string(),
        )
    } else if stderr.contains("Remote branch") && stderr.contains("not found") {
        Some("Check the module's 'branch' (the default is 'master')".to_string())
    } else {
        None
    }
}

/// Check out an exact revision inside an existing clone.
pub fn checkout(repo_dir: &Path, revision: &str) -> Result<(), Error> {
    run(repo_dir, &["checkout", "--quiet", revision]).map(|_| ())
}

/// The commit hash HEAD resolves to.
pub fn head_revision(repo_dir: &Path) -> Result<String, Error> {
    run(repo_dir, &["rev-parse", "HEAD"])
}

/// Initialize an empty repository, creating the directory if needed.
pub fn init(dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir)?;
    run(dir, &["init", "--quiet"]).map(|_| ())
}

/// Drop `path` from the index of the repository at `repo_root`, keeping the
/// file on disk. Succeeds when the path was not tracked.
pub fn untrack(repo_root: &Path, path: &str) -> Result<(), Error> {
    run(
        repo_root,
        &["rm", "--quiet", "--cached", "--ignore-unmatch", "--", path],
    )
    .map(|_| ())
}

/// Delete the `.git` entry of `dir`.
///
/// Handles both a metadata directory and the `gitdir:` file used by linked
/// worktrees and submodules. Returns whether anything was removed.
pub fn remove_metadata(dir: &Path) -> Result<bool, Error> {
    let metadata_path = dir.join(".git");
    match fs::symlink_metadata(&metadata_path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(&metadata_path)?,
        Ok(_) => fs::remove_file(&metadata_path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    }
    Ok(true)
}

/// Run a git subcommand in `dir`, returning trimmed stdout.
fn run(dir: &Path, args: &[&str]) -> Result<String, Error> {
    let command = args.join(" ");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            path: dir.to_path_buf(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            path: dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
