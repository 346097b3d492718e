//! fogo-source
//!
//! Snapshot-source boundary: the versioned repository holding one full fire
//! listing per commit.
//!
//! This crate defines **only** the source contract, its error type, and two
//! adapters: an in-memory source for tests/demos and a thin `git` subprocess
//! adapter for production use.  No parsing, no DB logic, and no
//! reconciliation semantics belong here.

mod git_cli;
mod memory;
mod source;

pub use git_cli::GitCliSource;
pub use memory::MemorySource;
pub use source::{CommitInfo, SnapshotSource, SourceError};
