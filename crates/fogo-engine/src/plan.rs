//! Resume planning: which commits does this run have to replay?
//!
//! # Invariants
//! - Ranges are exclusive of the cursor, inclusive of the head.
//! - A cursor that no longer resolves (rewritten history) falls back to the
//!   **full** history — a partial range must never silently skip commits.
//! - Pure, no IO: the caller supplies the commit list and the cursor.

use fogo_source::CommitInfo;

/// How the planned range relates to the persisted cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// Cursor already points at the head; nothing to do.
    UpToDate,
    /// No cursor persisted yet; full history, oldest first.
    FirstRun,
    /// Cursor resolved; only commits strictly after it.
    Incremental,
    /// Cursor did not resolve against the log (rebase/force-push); full
    /// history as a deliberate, costly but safe recovery.
    FullRescan,
}

/// A planned replay range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePlan {
    pub mode: PlanMode,
    /// Commits to process, oldest first.
    pub commits: Vec<CommitInfo>,
}

/// Plan the replay range for one run.
pub fn plan_range(cursor: Option<&str>, commits: &[CommitInfo]) -> RangePlan {
    let Some(cursor) = cursor else {
        return RangePlan {
            mode: PlanMode::FirstRun,
            commits: commits.to_vec(),
        };
    };

    if commits.last().is_some_and(|head| head.id == cursor) {
        return RangePlan {
            mode: PlanMode::UpToDate,
            commits: Vec::new(),
        };
    }

    match commits.iter().position(|c| c.id == cursor) {
        Some(pos) => RangePlan {
            mode: PlanMode::Incremental,
            commits: commits[pos + 1..].to_vec(),
        },
        None => RangePlan {
            mode: PlanMode::FullRescan,
            commits: commits.to_vec(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(ids: &[&str]) -> Vec<CommitInfo> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| CommitInfo::new(*id, 100 + i as i64))
            .collect()
    }

    #[test]
    fn no_cursor_plans_full_history() {
        let commits = log(&["a", "b", "c"]);
        let plan = plan_range(None, &commits);
        assert_eq!(plan.mode, PlanMode::FirstRun);
        assert_eq!(plan.commits, commits);
    }

    #[test]
    fn cursor_at_head_is_up_to_date() {
        let commits = log(&["a", "b", "c"]);
        let plan = plan_range(Some("c"), &commits);
        assert_eq!(plan.mode, PlanMode::UpToDate);
        assert!(plan.commits.is_empty());
    }

    #[test]
    fn resolved_cursor_plans_the_strict_suffix() {
        let commits = log(&["a", "b", "c", "d"]);
        let plan = plan_range(Some("b"), &commits);
        assert_eq!(plan.mode, PlanMode::Incremental);
        assert_eq!(plan.commits, commits[2..].to_vec());
    }

    #[test]
    fn dangling_cursor_falls_back_to_full_history() {
        let commits = log(&["a", "b", "c"]);
        let plan = plan_range(Some("rebased-away"), &commits);
        assert_eq!(plan.mode, PlanMode::FullRescan);
        assert_eq!(plan.commits, commits, "must be the full range, never partial");
    }

    #[test]
    fn empty_log_plans_nothing() {
        assert_eq!(plan_range(None, &[]).mode, PlanMode::FirstRun);
        assert!(plan_range(None, &[]).commits.is_empty());
        // Cursor into an emptied log: still the (empty) full-history fallback.
        assert_eq!(plan_range(Some("x"), &[]).mode, PlanMode::FullRescan);
    }
}
