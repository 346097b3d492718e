//! Cold-start state loader.
//!
//! A resumed run must not replay full history just to rebuild the in-memory
//! baseline.  Instead, each persisted entity's record is re-fetched from the
//! snapshot at its `last_seen` commit.  Every failure mode here is
//! per-entity recoverable: an entity that cannot be re-fetched is simply
//! omitted from the seed map, and the engine then treats its next
//! appearance as compare-against-absent (worst case one extra UPDATED
//! event).

use std::collections::BTreeMap;

use fogo_db::FireIndexRow;
use fogo_snapshot::{parse_snapshot, FireRecord};
use fogo_source::{SnapshotSource, SourceError};
use tracing::{debug, warn};

/// Rebuild the tracked-state map for the entities in `index`.
///
/// Entities sharing a `last_seen` commit are served from a single fetch and
/// parse of that commit's snapshot.
pub fn load_seed_states<S: SnapshotSource>(
    source: &S,
    index: &[FireIndexRow],
    file_path: &str,
) -> BTreeMap<String, FireRecord> {
    let mut by_commit: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for row in index {
        by_commit
            .entry(row.last_seen_commit.as_str())
            .or_default()
            .push(row.fire_id.as_str());
    }

    let mut states = BTreeMap::new();
    for (commit_id, fire_ids) in by_commit {
        let bytes = match source.read_file_at(commit_id, file_path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(commit_id, "seed snapshot file absent; skipping its entities");
                continue;
            }
            Err(SourceError::CommitNotFound { .. }) => {
                warn!(commit_id, "seed commit no longer resolves; skipping its entities");
                continue;
            }
            Err(e) => {
                warn!(commit_id, error = %e, "seed snapshot fetch failed; skipping its entities");
                continue;
            }
        };

        let mut fires = parse_snapshot(Some(&bytes));
        for fire_id in fire_ids {
            match fires.remove(fire_id) {
                Some(rec) => {
                    states.insert(fire_id.to_string(), rec);
                }
                // Possible after a history rewrite between runs.
                None => debug!(fire_id, commit_id, "entity absent from its seed snapshot"),
            }
        }
    }

    debug!(seeded = states.len(), total = index.len(), "cold-start seed loaded");
    states
}
