//! `git` subprocess adapter.
//!
//! Shells out to the `git` binary rather than linking an object-store
//! implementation: the snapshot log is an ordinary git repository updated by
//! a scraper, read volumes are modest, and the subprocess boundary keeps
//! this crate dependency-free.
//!
//! Exit-code handling is deliberate: a failed `show` is followed by a
//! `rev-parse --verify` probe so "file absent at commit" and "commit no
//! longer resolvable" stay distinct (the latter drives the full-rescan
//! fallback in the resume planner).

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::source::{CommitInfo, SnapshotSource, SourceError};

/// Snapshot source backed by a local git checkout.
#[derive(Debug, Clone)]
pub struct GitCliSource {
    repo_path: PathBuf,
}

impl GitCliSource {
    /// Open a repository, verifying it is usable before anything else
    /// touches the database.
    pub fn open(repo_path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let src = Self {
            repo_path: repo_path.into(),
        };
        let out = src.git(&["rev-parse", "--git-dir"])?;
        if !out.status.success() {
            return Err(SourceError::Unavailable {
                detail: format!(
                    "'{}' is not a git repository: {}",
                    src.repo_path.display(),
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            });
        }
        Ok(src)
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn git(&self, args: &[&str]) -> Result<Output, SourceError> {
        debug!(args = ?args, "git");
        Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(args)
            .output()
            .map_err(|e| SourceError::Unavailable {
                detail: format!("failed to spawn git: {e}"),
            })
    }

    fn head_exists(&self) -> Result<bool, SourceError> {
        let out = self.git(&["rev-parse", "--verify", "--quiet", "HEAD"])?;
        Ok(out.status.success())
    }
}

impl SnapshotSource for GitCliSource {
    fn list_commits(&self) -> Result<Vec<CommitInfo>, SourceError> {
        // A repository with no commits yet is an empty log, not an error.
        if !self.head_exists()? {
            return Ok(Vec::new());
        }

        let out = self.git(&["log", "--reverse", "--first-parent", "--format=%H %ct", "HEAD"])?;
        if !out.status.success() {
            return Err(SourceError::Backend {
                detail: format!(
                    "git log failed: {}",
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            });
        }

        let text = String::from_utf8_lossy(&out.stdout);
        let mut commits = Vec::new();
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            let (Some(id), Some(ts)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(timestamp) = ts.parse::<i64>() else {
                continue;
            };
            commits.push(CommitInfo::new(id, timestamp));
        }
        Ok(commits)
    }

    fn read_file_at(&self, commit_id: &str, path: &str) -> Result<Option<Vec<u8>>, SourceError> {
        let spec = format!("{commit_id}:{path}");
        let out = self.git(&["show", &spec])?;
        if out.status.success() {
            return Ok(Some(out.stdout));
        }

        // `show` failed: decide whether the commit or the file is missing.
        let probe_spec = format!("{commit_id}^{{commit}}");
        let probe = self.git(&["rev-parse", "--verify", "--quiet", &probe_spec])?;
        if probe.status.success() {
            Ok(None)
        } else {
            Err(SourceError::CommitNotFound {
                commit_id: commit_id.to_string(),
            })
        }
    }
}
