//! # Task Planning and Execution
//!
//! This module is the entry point of a build. Running a profile has two
//! phases:
//!
//! 1. **Dependencies**: every entry of the profile's dependency map is built,
//!    in declaration order, by a recursive sub-build rooted at its target
//!    directory.
//! 2. **Tasks**: the task list is walked in order. Each token is classified
//!    as a module fetch (`modules:<name>`, `modules`), a module clean
//!    (`-modules:<name>`, `-modules`) or anything else, which is accepted but
//!    has no handler yet.
//!
//! [`Engine`] owns the collaborators shared by every level of the recursion:
//! the version-control capability, the reporter and, optionally, the child
//! process used to isolate sub-builds. By default sub-builds run in-process
//! and the engine tracks the chain of active builds so a dependency that
//! leads back into a running build fails instead of recursing forever.

use crate::config::{self, Manifest, ModuleDescriptor, Profile};
use crate::defaults;
use crate::dependency::{ChildProcess, DependencyInvoker, DependencyOutcome, SubBuild};
use crate::error::{Error, Result};
use crate::ledger::ExclusionLedger;
use crate::modules::{MaterializeOutcome, ModuleMaterializer, ModuleRemover};
use crate::output::Reporter;
use crate::repository::{DefaultGitOperations, GitOperations};
use log::{debug, info};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Marks a task token as the inverse operation.
const NEGATION: char = '-';
/// Separates a task kind from its argument.
const DELIMITER: char = ':';
/// Prefix of module-scoped task tokens, delimiter included.
const MODULES_MARKER: &str = "modules:";

/// What a task token asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// A module directive; `None` addresses every declared module.
    Modules(Option<String>),
    /// Any other task name. Parsed, never dispatched.
    Other(String),
}

/// A single parsed entry of a profile's task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskToken {
    pub negated: bool,
    pub kind: TaskKind,
}

impl TaskToken {
    pub fn parse(raw: &str) -> Self {
        let (negated, body) = match raw.strip_prefix(NEGATION) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let mut normalized = format!("{body}{DELIMITER}");
        let kind = match normalized.find(MODULES_MARKER) {
            Some(at) => {
                normalized.replace_range(at..at + MODULES_MARKER.len(), "");
                let name = normalized.strip_suffix(DELIMITER).unwrap_or(&normalized);
                TaskKind::Modules((!name.is_empty()).then(|| name.to_string()))
            }
            None => TaskKind::Other(body.to_string()),
        };

        Self { negated, kind }
    }
}

/// Where and how to run a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Working root of the build.
    pub root: PathBuf,
    /// Manifest file override, relative to `root`.
    pub manifest: Option<String>,
    /// Profile override.
    pub profile: Option<String>,
}

impl Invocation {
    /// An invocation of the default profile with the default manifest.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest: None,
            profile: None,
        }
    }

    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root
            .join(self.manifest.as_deref().unwrap_or(defaults::MANIFEST_FILE))
    }

    pub fn profile_name(&self) -> &str {
        self.profile.as_deref().unwrap_or(defaults::PROFILE)
    }

    /// Identity of this build for cycle detection.
    fn key(&self) -> String {
        let root = self
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone());
        let manifest = self.manifest.as_deref().unwrap_or(defaults::MANIFEST_FILE);
        format!("{} ({}:{})", root.display(), manifest, self.profile_name())
    }
}

/// What a profile run did, in execution order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub dependencies: Vec<DependencyOutcome>,
    pub fetched: Vec<MaterializeOutcome>,
    pub cleaned: Vec<String>,
    /// Tokens without a handler.
    pub unhandled_tasks: Vec<String>,
}

/// Runs one profile of one manifest in one working root.
pub struct TaskPlanner<'a> {
    root: &'a Path,
    manifest: &'a Manifest,
    git: &'a dyn GitOperations,
    reporter: &'a Reporter,
    sub_build: &'a dyn SubBuild,
}

impl<'a> TaskPlanner<'a> {
    pub fn new(
        root: &'a Path,
        manifest: &'a Manifest,
        git: &'a dyn GitOperations,
        reporter: &'a Reporter,
        sub_build: &'a dyn SubBuild,
    ) -> Self {
        Self {
            root,
            manifest,
            git,
            reporter,
            sub_build,
        }
    }

    pub fn run(&self, profile: &Profile) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let invoker = DependencyInvoker::new(self.root, self.git, self.reporter, self.sub_build);
        for (name, spec) in profile.dependencies().iter() {
            debug!("Building dependency '{}' in '{}'", name, spec.directory);
            summary.dependencies.push(invoker.invoke(spec)?);
        }

        let materializer = ModuleMaterializer::new(self.root, self.git, self.reporter);
        let remover = ModuleRemover::new(self.root, self.reporter);
        let mut ledger = ExclusionLedger::load(self.root.join(defaults::IGNORE_FILE))?;

        for raw in profile.tasks() {
            let token = TaskToken::parse(raw);
            match (&token.kind, token.negated) {
                (TaskKind::Modules(filter), false) => {
                    for (name, descriptor) in self.select_modules(filter.as_deref())? {
                        summary
                            .fetched
                            .push(materializer.materialize(&name, descriptor, &mut ledger)?);
                    }
                }
                (TaskKind::Modules(filter), true) => {
                    for (name, _) in self.select_modules(filter.as_deref())? {
                        if remover.clean(&name)? {
                            summary.cleaned.push(name);
                        }
                    }
                }
                (TaskKind::Other(name), _) => {
                    debug!("Task '{}' has no handler; skipped", name);
                    summary.unhandled_tasks.push(raw.clone());
                }
            }
        }

        Ok(summary)
    }

    /// The modules a directive applies to, in declaration order.
    fn select_modules(&self, filter: Option<&str>) -> Result<Vec<(String, &'a ModuleDescriptor)>> {
        let manifest: &'a Manifest = self.manifest;
        match filter {
            Some(name) => Ok(vec![(name.to_string(), manifest.module(name)?)]),
            None => Ok(manifest
                .modules()?
                .iter()
                .map(|(name, descriptor)| (name.to_string(), descriptor))
                .collect()),
        }
    }
}

/// Shared collaborators for a build and all of its sub-builds.
pub struct Engine {
    git: Box<dyn GitOperations>,
    reporter: Reporter,
    isolation: Option<ChildProcess>,
}

impl Engine {
    /// An engine backed by the system `git`.
    pub fn new(reporter: Reporter) -> Self {
        Self::with_git(Box::new(DefaultGitOperations), reporter)
    }

    pub fn with_git(git: Box<dyn GitOperations>, reporter: Reporter) -> Self {
        Self {
            git,
            reporter,
            isolation: None,
        }
    }

    /// Run dependency sub-builds as child processes instead of in-process.
    pub fn isolated(mut self, child: ChildProcess) -> Self {
        self.isolation = Some(child);
        self
    }

    /// Run the profile selected by `invocation`.
    pub fn run(&self, invocation: &Invocation) -> Result<RunSummary> {
        match &self.isolation {
            Some(child) => self.run_with(invocation, child),
            None => InProcess::new(self).enter(invocation),
        }
    }

    fn run_with(&self, invocation: &Invocation, sub_build: &dyn SubBuild) -> Result<RunSummary> {
        let manifest = config::from_file(&invocation.manifest_path())?;
        let profile = manifest.profile(invocation.profile_name())?;
        info!(
            "Running profile '{}' in {}",
            invocation.profile_name(),
            invocation.root.display()
        );
        TaskPlanner::new(
            &invocation.root,
            &manifest,
            self.git.as_ref(),
            &self.reporter,
            sub_build,
        )
        .run(profile)
    }
}

/// Runs sub-builds as recursive calls, remembering the active chain.
struct InProcess<'a> {
    engine: &'a Engine,
    active: RefCell<Vec<String>>,
}

impl<'a> InProcess<'a> {
    fn new(engine: &'a Engine) -> Self {
        Self {
            engine,
            active: RefCell::new(Vec::new()),
        }
    }

    fn enter(&self, invocation: &Invocation) -> Result<RunSummary> {
        let key = invocation.key();
        {
            let mut active = self.active.borrow_mut();
            if let Some(start) = active.iter().position(|running| *running == key) {
                let mut cycle: Vec<&str> = active[start..].iter().map(String::as_str).collect();
                cycle.push(&key);
                return Err(Error::CycleDetected {
                    cycle: cycle.join(" -> "),
                });
            }
            active.push(key);
        }

        let result = self.engine.run_with(invocation, self);
        self.active.borrow_mut().pop();
        result
    }
}

impl SubBuild for InProcess<'_> {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.enter(invocation).map(|_| ())
    }
}

/// Run a profile with the system `git`, sub-builds in-process.
pub fn run_profile(invocation: &Invocation, reporter: Reporter) -> Result<RunSummary> {
    Engine::new(reporter).run(invocation)
}
