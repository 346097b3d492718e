//! In-memory snapshot source for tests and demos.

use std::collections::BTreeMap;

use crate::source::{CommitInfo, SnapshotSource, SourceError};

/// An ordered commit list plus a per-commit file map, all in memory.
///
/// Builder-style: push commits oldest-first and attach files to them.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    commits: Vec<CommitInfo>,
    // commit id -> (path -> bytes)
    files: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit to the log (caller supplies commits oldest-first).
    pub fn push_commit(&mut self, id: impl Into<String>, timestamp: i64) -> &mut Self {
        self.commits.push(CommitInfo::new(id, timestamp));
        self
    }

    /// Store file bytes for a commit.  The commit does not have to exist
    /// yet; tests sometimes attach files before pushing the commit.
    pub fn put_file(
        &mut self,
        commit_id: impl Into<String>,
        path: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.files
            .entry(commit_id.into())
            .or_default()
            .insert(path.into(), bytes.into());
        self
    }

    /// Drop every commit up to and including `commit_id`, simulating a
    /// history rewrite that leaves an old cursor dangling.
    pub fn rewrite_history_dropping_through(&mut self, commit_id: &str) {
        if let Some(pos) = self.commits.iter().position(|c| c.id == commit_id) {
            self.commits.drain(..=pos);
        }
    }

    fn resolves(&self, commit_id: &str) -> bool {
        self.commits.iter().any(|c| c.id == commit_id)
    }
}

impl SnapshotSource for MemorySource {
    fn list_commits(&self) -> Result<Vec<CommitInfo>, SourceError> {
        Ok(self.commits.clone())
    }

    fn read_file_at(&self, commit_id: &str, path: &str) -> Result<Option<Vec<u8>>, SourceError> {
        if !self.resolves(commit_id) {
            return Err(SourceError::CommitNotFound {
                commit_id: commit_id.to_string(),
            });
        }
        Ok(self
            .files
            .get(commit_id)
            .and_then(|by_path| by_path.get(path))
            .cloned())
    }
}
