//! # quack
//!
//! A profile-driven source-tree assembler. A YAML manifest (`quack.yaml`)
//! declares external repositories ("modules") and named profiles. Running a
//! profile first builds its dependencies, each a nested run in a
//! subdirectory, and then walks its task list, copying modules into the
//! working tree or removing them again.
//!
//! ## Quick Example
//!
//! ```
//! use quack::config;
//! use quack::planner::{TaskKind, TaskToken};
//!
//! let manifest = config::parse(r#"
//! modules:
//!   foo:
//!     repository: https://example.com/foo.git
//!     path: src
//! profiles:
//!   init:
//!     tasks: [modules:foo]
//! "#).unwrap();
//!
//! let foo = manifest.module("foo").unwrap();
//! assert_eq!(foo.branch, "master");
//! assert_eq!(foo.subpath(), Some("src"));
//!
//! let task = TaskToken::parse(&manifest.profile("init").unwrap().tasks()[0]);
//! assert_eq!(task.kind, TaskKind::Modules(Some("foo".to_string())));
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`config`)**: typed, order-preserving view of `quack.yaml`.
//! - **Modules (`modules`)**: clone a module into a scratch directory, copy
//!   the declared subtree into `<root>/<name>` without version-control
//!   metadata, and record `<name>` in the ignore file (`ledger`).
//! - **Dependencies (`dependency`)**: recursive sub-builds, run in-process or
//!   as child processes.
//! - **Planning (`planner`)**: parses task tokens and drives a run.
//! - **Version control (`repository`, `git`)**: everything the engine needs
//!   from `git`, behind a trait.

pub mod config;
pub mod defaults;
pub mod dependency;
pub mod error;
pub mod git;
pub mod ledger;
pub mod modules;
pub mod output;
pub mod planner;
pub mod repository;
pub mod suggestions;

#[cfg(test)]
mod planner_proptest;
