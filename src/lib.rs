//! muster - manage a fleet of local Git repositories.
//!
//! One invocation runs a workflow (status report, sync, or one of the
//! branch-retirement passes) across every repository declared in a TOML
//! config file, and renders one table row per repository.
//!
//! # Layout
//!
//! - [`scm`] - git subprocess execution and output parsing
//! - [`actions`] - the per-repository workflows
//! - [`project`] / [`config`] - the declarative project list
//! - [`selector`] - which projects an invocation acts on
//! - [`fleet`] - concurrent execution and report aggregation
//! - [`report`] - flat report rows and table rendering
//! - [`cli`] / [`logging`] / [`error`] - the outer shell

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod fleet;
pub mod logging;
pub mod project;
pub mod report;
pub mod scm;
pub mod selector;
