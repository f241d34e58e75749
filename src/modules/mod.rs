//! # Modules
//!
//! A module is a named external repository whose sources are copied into the
//! working tree and then detached from version control. This module holds
//! the two operations a task list can apply to one:
//!
//! - **`materialize`**: clone at the declared branch (and pinned revision),
//!   copy the declared subtree into `<root>/<name>`, record `<name>` in the
//!   ignore file.
//! - **`remove`**: delete `<root>/<name>`.
//!
//! Each module owns exactly one top-level working-tree entry named after it.

pub mod copy;
pub mod materialize;
pub mod remove;

pub use materialize::{MaterializeOutcome, MaterializeStatus, ModuleMaterializer};
pub use remove::ModuleRemover;
