//! # Error Handling
//!
//! This module defines the centralized error type for `quack`. It uses the
//! `thiserror` library to describe every anticipated failure mode with enough
//! context (paths, URLs, names) to act on the message.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors raised by
//!   the engine. Configuration variants may carry a `hint` explaining how to
//!   fix the manifest.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! Every variant here is fatal to the run. Conditions the engine tolerates
//! (a missing module subpath, cleaning an absent module, failing to strip
//! throwaway metadata) are reported through return values and log warnings
//! instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for quack operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest file could not be found at the resolved location.
    #[error("Manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    /// An error occurred while interpreting the manifest.
    ///
    /// This error includes the specific issue and optionally a hint about how
    /// to fix it.
    #[error("Manifest error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// The selected profile is not declared in the manifest.
    #[error("Unknown profile '{name}'{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    UnknownProfile { name: String, hint: Option<String> },

    /// A task referenced a module that is not declared in the manifest.
    #[error("Unknown module '{name}'{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    UnknownModule { name: String, hint: Option<String> },

    /// A module name cannot be used as a working-tree path.
    #[error("Invalid module name '{name}': {reason}")]
    InvalidModuleName { name: String, reason: String },

    /// A compact dependency descriptor could not be interpreted.
    #[error("Malformed dependency specification '{spec}': {reason}")]
    MalformedDependency { spec: String, reason: String },

    /// An error occurred while cloning a Git repository.
    ///
    /// Includes the repository URL, branch, error message, and an optional
    /// hint for resolution.
    #[error("Git clone error for {url}@{branch}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        branch: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A Git command other than clone failed.
    #[error("Git command failed in {}: {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// A dependency sub-build could not be run or reported failure.
    #[error("Dependency build in {} failed: {message}", target.display())]
    SubBuild { target: PathBuf, message: String },

    /// A dependency chain leads back into a build that is already running.
    #[error("Cycle detected in profile dependencies: {cycle}")]
    CycleDetected { cycle: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A directory walk failed while copying a module.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
