//! Source contract for the commit-ordered snapshot log.
//!
//! # Design constraints
//! - Commits are exposed oldest-first; replay order is load-bearing for
//!   disappearance semantics downstream.
//! - "File absent at a resolvable commit" and "commit id not resolvable"
//!   are **distinct** outcomes: the former is an ordinary empty snapshot,
//!   the latter means the log history was rewritten and drives the
//!   full-rescan fallback in the resume planner.
//! - Synchronous IO only; the engine replays strictly sequentially.

use std::fmt;

/// One commit in the snapshot log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Opaque commit identifier (e.g. a git hexsha).
    pub id: String,
    /// Commit timestamp as UTC epoch seconds.
    pub timestamp: i64,
}

impl CommitInfo {
    pub fn new(id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            timestamp,
        }
    }
}

/// Errors a [`SnapshotSource`] implementation may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source as a whole is not a usable snapshot log (bad path, not a
    /// repository, ...).  Fatal at process start, before any DB mutation.
    Unavailable { detail: String },
    /// The requested commit id does not resolve in the current history.
    /// After a rebase/force-push a persisted cursor can point here.
    CommitNotFound { commit_id: String },
    /// The backend failed in a way that is neither of the above.
    Backend { detail: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable { detail } => {
                write!(f, "snapshot source unavailable: {detail}")
            }
            SourceError::CommitNotFound { commit_id } => {
                write!(f, "commit '{commit_id}' not found in snapshot log")
            }
            SourceError::Backend { detail } => write!(f, "snapshot source error: {detail}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A versioned repository of point-in-time fire snapshots.
///
/// Implementations must be object-safe so callers can hold a
/// `Box<dyn SnapshotSource>` without knowing the concrete type.
pub trait SnapshotSource {
    /// All commits in the log, **oldest first**.  An empty log is not an
    /// error; it simply plans to nothing.
    fn list_commits(&self) -> Result<Vec<CommitInfo>, SourceError>;

    /// Raw bytes of `path` as it existed at `commit_id`.
    ///
    /// Returns `Ok(None)` when the commit resolves but the file is absent,
    /// and `Err(SourceError::CommitNotFound)` when the commit id itself no
    /// longer resolves.
    fn read_file_at(&self, commit_id: &str, path: &str) -> Result<Option<Vec<u8>>, SourceError>;
}
