//! `dsync`: a concurrent directory-tree synchronizer.
//!
//! Given one or more source paths and a destination directory,
//! reproduces the contents of each source under the destination,
//! copying only files whose size or modification time differ (or
//! always, when forced). Preserves mode and access/modification
//! timestamps, copies symbolic links as links, and never deletes
//! extras already present at the destination.
//!
//! The core is the producer/consumer pipeline in [`traverse`] and
//! [`worker`], coordinated through the lock-free [`queue::MpmcQueue`]
//! and driven by [`orchestrator::run`].

pub mod cli;
pub mod constants;
pub mod copy;
pub mod diagnostics;
pub mod error;
pub mod orchestrator;
pub mod queue;
pub mod stat;
pub mod sync_dir;
pub mod sync_file;
pub mod traverse;
pub mod worker;
