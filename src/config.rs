//! # Manifest Schema and Parsing
//!
//! This module defines the data structures behind the `quack.yaml` manifest
//! and the logic for loading it. A manifest has two top-level mappings:
//!
//! ```yaml
//! modules:
//!   core:
//!     repository: https://example.com/core.git
//!     branch: main          # default: master
//!     hexsha: 4f2a9c1       # optional pinned revision
//!     path: src             # optional subpath, default: repository root
//! profiles:
//!   init:
//!     dependencies:
//!       tools:
//!         quack: tools/quack.yaml:build
//!     tasks:
//!       - modules:core
//!       - -modules:docs
//! ```
//!
//! ## Key Components
//!
//! - **`Manifest`**: The whole document. Loaded once per invocation and never
//!   mutated afterwards.
//! - **`ModuleDescriptor`**: Where a module comes from and which part of it is
//!   copied into the working tree.
//! - **`Profile`**: An ordered dependency map followed by an ordered task list.
//! - **`NamedMap`**: An ordered name → value mapping. Declaration order is
//!   execution order for both dependencies and "all modules" tasks, so the
//!   manifest's mappings are never collected into hash maps.
//!
//! Dependency descriptors are parsed into [`DependencySpec`] while the
//! manifest is loaded, so a malformed descriptor is reported before any task
//! runs.

use crate::defaults;
use crate::dependency::DependencySpec;
use crate::error::{Error, Result};
use crate::suggestions;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Component, Path};

/// An ordered mapping from names to values, preserving declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> NamedMap<T> {
    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Iterate over entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for NamedMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

struct NamedMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for NamedMapVisitor<T> {
    type Value = NamedMap<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mapping of names")
    }

    fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(NamedMap::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, T)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            if entries.iter().any(|(existing, _)| *existing == key) {
                return Err(serde::de::Error::custom(format!("duplicate entry '{key}'")));
            }
            entries.push((key, value));
        }
        Ok(NamedMap { entries })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NamedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(NamedMapVisitor(PhantomData))
    }
}

/// Where a module comes from and which part of it lands in the working tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleDescriptor {
    /// The URL of the Git repository to clone.
    pub repository: String,
    /// The branch cloned to obtain the revision graph.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// An exact revision to check out after cloning.
    #[serde(default)]
    pub hexsha: Option<String>,
    /// A sub-path within the repository. Only this subtree is copied.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_branch() -> String {
    defaults::BRANCH.to_string()
}

impl ModuleDescriptor {
    /// Create a descriptor for `repository` on the default branch.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            branch: default_branch(),
            hexsha: None,
            path: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_hexsha(mut self, hexsha: impl Into<String>) -> Self {
        self.hexsha = Some(hexsha.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The declared subpath, or `None` when the repository root is used.
    pub fn subpath(&self) -> Option<&str> {
        self.path
            .as_deref()
            .map(|path| path.trim_matches('/'))
            .filter(|path| !path.is_empty())
    }
}

/// A named plan: dependencies first, then tasks.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Option<ProfileFields>")]
pub struct Profile {
    dependencies: NamedMap<DependencySpec>,
    tasks: Vec<String>,
}

#[derive(Deserialize)]
struct ProfileFields {
    #[serde(default)]
    dependencies: NamedMap<DependencySpec>,
    #[serde(default)]
    tasks: Option<Vec<String>>,
}

impl From<Option<ProfileFields>> for Profile {
    fn from(fields: Option<ProfileFields>) -> Self {
        match fields {
            Some(fields) => Self {
                dependencies: fields.dependencies,
                tasks: fields.tasks.unwrap_or_default(),
            },
            None => Self::default(),
        }
    }
}

impl Profile {
    pub fn dependencies(&self) -> &NamedMap<DependencySpec> {
        &self.dependencies
    }

    /// Task tokens in execution order.
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }
}

/// The parsed `quack.yaml` document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    modules: Option<NamedMap<ModuleDescriptor>>,
    #[serde(default)]
    profiles: Option<NamedMap<Profile>>,
}

impl Manifest {
    /// All declared modules in declaration order.
    ///
    /// Fails when the manifest has no `modules` section at all.
    pub fn modules(&self) -> Result<&NamedMap<ModuleDescriptor>> {
        self.modules.as_ref().ok_or_else(|| Error::ConfigParse {
            message: "the manifest has no 'modules' section".to_string(),
            hint: Some("Declare modules under a top-level 'modules:' mapping".to_string()),
        })
    }

    /// Look up a single module by name.
    pub fn module(&self, name: &str) -> Result<&ModuleDescriptor> {
        let modules = self.modules()?;
        modules.get(name).ok_or_else(|| Error::UnknownModule {
            name: name.to_string(),
            hint: suggestions::name_hint("module", name, &modules.names()),
        })
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        let profiles = self.profiles.as_ref().ok_or_else(|| Error::ConfigParse {
            message: "the manifest has no 'profiles' section".to_string(),
            hint: Some("Declare profiles under a top-level 'profiles:' mapping".to_string()),
        })?;
        profiles.get(name).ok_or_else(|| Error::UnknownProfile {
            name: name.to_string(),
            hint: suggestions::name_hint("profile", name, &profiles.names()),
        })
    }

    /// Check the constraints serde cannot express: module names and subpaths
    /// must address locations inside the working tree.
    fn validate(&self) -> Result<()> {
        if let Some(modules) = &self.modules {
            for (name, descriptor) in modules.iter() {
                validate_module_name(name)?;
                if let Some(subpath) = descriptor.subpath() {
                    if !is_contained_relative(Path::new(subpath)) {
                        return Err(Error::ConfigParse {
                            message: format!("module '{name}' has path '{subpath}' outside its repository"),
                            hint: Some("Use a relative path without '..' components".to_string()),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Ensure a module name can be used as a top-level working-tree entry.
pub fn validate_module_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name refers to a relative directory")
    } else if name.contains(['/', '\\']) {
        Some("name must be a single path component")
    } else if name.contains(':') {
        Some("name must not contain ':'")
    } else if name.starts_with(".git") {
        Some("names starting with '.git' are reserved for version control")
    } else if name == defaults::WORK_DIR {
        Some("name is reserved for the staging area")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidModuleName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// True when `path` is relative and never climbs above its base.
pub(crate) fn is_contained_relative(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Parse a manifest from a YAML string.
///
/// An empty document yields an empty manifest; referencing its missing
/// sections later is what fails.
pub fn parse(yaml: &str) -> Result<Manifest> {
    let manifest: Option<Manifest> = serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })?;
    let manifest = manifest.unwrap_or_default();
    manifest.validate()?;
    Ok(manifest)
}

/// Load and parse a manifest file.
pub fn from_file(path: &Path) -> Result<Manifest> {
    if !path.is_file() {
        return Err(Error::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Manifest::default());
    }
    parse(&content)
}
