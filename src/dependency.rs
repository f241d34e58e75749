//! # Dependencies
//!
//! A dependency is another, independently-run build whose output directory
//! becomes part of the current tree. Each one names a target directory and,
//! optionally, the manifest and profile to run there. Running a dependency is
//! a recursive descent: the sub-build has its own dependencies, which run
//! before its own tasks, and so on.
//!
//! ## Descriptor forms
//!
//! ```yaml
//! dependencies:
//!   tools:
//!     quack: tools/build.yaml:release   # compact: <dir>[/<manifest>][:<profile>]
//!   vendor:
//!     directory: vendor                 # structured
//!     profile: fetch
//! ```
//!
//! Both forms resolve to a [`DependencySpec`] when the manifest is loaded.
//! How the sub-build is executed is behind the [`SubBuild`] trait: in the same
//! process by default, or as a child process of the current executable.

use crate::config::is_contained_relative;
use crate::defaults::{MANIFEST_ENV, PROFILE_ENV};
use crate::error::{Error, Result};
use crate::output::Reporter;
use crate::planner::Invocation;
use crate::repository::GitOperations;
use log::{debug, warn};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

/// A resolved dependency: where to build, and with which manifest/profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDependency")]
pub struct DependencySpec {
    /// Directory, relative to the working root, the sub-build runs in.
    pub directory: String,
    /// Manifest file override, relative to `directory`.
    pub manifest: Option<String>,
    /// Profile override.
    pub profile: Option<String>,
}

impl DependencySpec {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            manifest: None,
            profile: None,
        }
    }

    /// Parse a compact descriptor: `<dir>`, `<dir>/<manifest>`,
    /// `<dir>/<manifest>:<profile>`, `<dir>/:<profile>` or `<dir>/<manifest>:`.
    ///
    /// The overrides come from the text after the last `/`; everything before
    /// it is the directory, so `vendor/libs/quack.yaml:build` builds in
    /// `vendor/libs`. Without a `/` the whole descriptor names the directory
    /// and no overrides apply.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedDependency {
            spec: descriptor.to_string(),
            reason: reason.to_string(),
        };

        if descriptor.is_empty() {
            return Err(malformed("descriptor is empty"));
        }

        let Some((directory, remainder)) = descriptor.rsplit_once('/') else {
            validate_directory(descriptor, descriptor)?;
            return Ok(Self::new(descriptor));
        };

        if directory.is_empty() {
            return Err(malformed("target directory before '/' is empty"));
        }

        let (manifest, profile) = match remainder.split_once(':') {
            Some((_, profile)) if profile.contains(':') => {
                return Err(malformed("more than one ':' after '/'"));
            }
            Some((manifest, profile)) => (manifest, profile),
            None => (remainder, ""),
        };

        validate_directory(descriptor, directory)?;
        Ok(Self {
            directory: directory.to_string(),
            manifest: non_empty(manifest),
            profile: non_empty(profile),
        })
    }
}

impl FromStr for DependencySpec {
    type Err = Error;

    fn from_str(descriptor: &str) -> Result<Self> {
        Self::parse(descriptor)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// A dependency target must be a directory strictly inside the working root.
fn validate_directory(spec: &str, directory: &str) -> Result<()> {
    let path = Path::new(directory);
    let has_normal_component = path
        .components()
        .any(|component| matches!(component, Component::Normal(_)));

    if directory.is_empty() || !is_contained_relative(path) || !has_normal_component {
        return Err(Error::MalformedDependency {
            spec: spec.to_string(),
            reason: format!("'{directory}' is not a directory inside the working tree"),
        });
    }
    Ok(())
}

/// Shape of a dependency entry as written in the manifest.
#[derive(Deserialize)]
struct RawDependency {
    #[serde(default)]
    quack: Option<String>,
    #[serde(default)]
    directory: Option<String>,
    #[serde(default)]
    manifest: Option<String>,
    #[serde(default)]
    profile: Option<String>,
}

impl TryFrom<RawDependency> for DependencySpec {
    type Error = Error;

    fn try_from(raw: RawDependency) -> Result<Self> {
        match (raw.quack, raw.directory) {
            (Some(descriptor), None) => {
                if raw.manifest.is_some() || raw.profile.is_some() {
                    return Err(Error::ConfigParse {
                        message: format!(
                            "dependency '{descriptor}' mixes a 'quack' descriptor with 'manifest'/'profile'"
                        ),
                        hint: Some("Use either 'quack' or 'directory' with 'manifest'/'profile'".to_string()),
                    });
                }
                Self::parse(&descriptor)
            }
            (None, Some(directory)) => {
                validate_directory(&directory, &directory)?;
                Ok(Self {
                    directory,
                    manifest: raw.manifest,
                    profile: raw.profile,
                })
            }
            (Some(_), Some(_)) => Err(Error::ConfigParse {
                message: "dependency declares both 'quack' and 'directory'".to_string(),
                hint: None,
            }),
            (None, None) => Err(Error::ConfigParse {
                message: "dependency needs a 'quack' descriptor or a 'directory'".to_string(),
                hint: Some("For example: quack: tools/quack.yaml:init".to_string()),
            }),
        }
    }
}

/// Runs a full build of a profile in another working root.
pub trait SubBuild {
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Runs sub-builds by re-executing a quack binary with the target directory
/// as its working directory.
///
/// Overrides are passed as `--yaml`/`--profile` flags only when present, so
/// the child applies its own defaults otherwise.
#[derive(Debug, Clone)]
pub struct ChildProcess {
    program: PathBuf,
    forwarded_args: Vec<String>,
}

impl ChildProcess {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            forwarded_args: Vec::new(),
        }
    }

    /// A child process of the running executable.
    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Arguments passed to every child ahead of the overrides, such as output
    /// and logging flags.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.forwarded_args.extend(args);
        self
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.forwarded_args);
        if let Some(manifest) = &invocation.manifest {
            command.arg("--yaml").arg(manifest);
        }
        if let Some(profile) = &invocation.profile {
            command.arg("--profile").arg(profile);
        }
        // The child falls back to its own defaults, not to ours.
        command.env_remove(MANIFEST_ENV).env_remove(PROFILE_ENV);
        command.current_dir(&invocation.root);
        command
    }
}

impl SubBuild for ChildProcess {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        let mut command = self.command(invocation);
        debug!("Spawning {:?} in {}", command, invocation.root.display());

        let status = command.status().map_err(|e| Error::SubBuild {
            target: invocation.root.clone(),
            message: format!("could not start {}: {}", self.program.display(), e),
        })?;

        if !status.success() {
            return Err(Error::SubBuild {
                target: invocation.root.clone(),
                message: format!("{} exited with {}", self.program.display(), status),
            });
        }
        Ok(())
    }
}

/// Result of running one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOutcome {
    pub target: PathBuf,
    /// Non-fatal cleanup failures.
    pub warnings: Vec<String>,
}

/// Prepares a dependency's directory and runs its sub-build there.
pub struct DependencyInvoker<'a> {
    root: &'a Path,
    git: &'a dyn GitOperations,
    reporter: &'a Reporter,
    sub_build: &'a dyn SubBuild,
}

impl<'a> DependencyInvoker<'a> {
    pub fn new(
        root: &'a Path,
        git: &'a dyn GitOperations,
        reporter: &'a Reporter,
        sub_build: &'a dyn SubBuild,
    ) -> Self {
        Self {
            root,
            git,
            reporter,
            sub_build,
        }
    }

    /// Run the sub-build described by `spec`.
    ///
    /// The target gets a throwaway repository for the duration of the build,
    /// removed afterwards. A target that already has its own repository keeps
    /// it untouched.
    pub fn invoke(&self, spec: &DependencySpec) -> Result<DependencyOutcome> {
        let target = self.root.join(&spec.directory);
        self.reporter.dependency(&spec.directory);

        let owns_repository = if self.git.has_metadata(&target) {
            debug!(
                "{} already is a repository; leaving its metadata in place",
                target.display()
            );
            false
        } else {
            self.git.init(&target)?;
            true
        };

        let invocation = Invocation {
            root: target.clone(),
            manifest: spec.manifest.clone(),
            profile: spec.profile.clone(),
        };
        let result = self.sub_build.run(&invocation);

        let mut warnings = Vec::new();
        if owns_repository {
            if let Err(e) = self.git.remove_metadata(&target) {
                let warning = format!(
                    "could not remove throwaway repository in {}: {}",
                    target.display(),
                    e
                );
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        result?;
        self.reporter.dependency_finished();
        Ok(DependencyOutcome { target, warnings })
    }
}
