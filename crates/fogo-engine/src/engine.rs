//! The replay loop.
//!
//! # Per-commit processing order (load-bearing)
//! 1. parse the snapshot into the current fire map;
//! 2. every id present in the map: NEW / UPDATED / UNCHANGED against the
//!    tracked state from *before* this commit;
//! 3. every tracked id absent from the map whose tracked `active` flag is
//!    still true: DISAPPEARED (the flag is forced false exactly once, so an
//!    entity that stays absent emits no further events);
//! 4. fold this commit's records into tracked state.
//!
//! Disappearance is defined relative to pre-commit state, so step 3 must
//! not observe step 2's folds — hence the explicit step 4.
//!
//! # Reappearance policy
//! A disappeared entity's tracked baseline carries `active = false`.  When
//! it reappears active, the activity flag alone makes `differs` true, so a
//! reappearance is always recorded as UPDATED — never silently UNCHANGED,
//! never a duplicate NEW.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{info, warn};

use fogo_db::{EventKind, FireIndexRow, FireRow, FireUpdate, NewEvent};
use fogo_snapshot::{differs, parse_snapshot, FireRecord};
use fogo_source::{CommitInfo, SnapshotSource};

use crate::plan::{plan_range, PlanMode};
use crate::seed::load_seed_states;

/// Engine settings for one run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path of the snapshot file inside the log (e.g. `fogos.json`).
    pub file_path: String,
    /// Commits per write transaction.  The cursor advances at every batch
    /// boundary, trading durability granularity against throughput.
    pub batch_size: usize,
}

impl EngineConfig {
    pub const DEFAULT_BATCH_SIZE: usize = 20;

    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// What one run did, for operator reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: PlanMode,
    /// Commits the planner selected.
    pub planned: usize,
    /// Commits actually replayed and committed.
    pub processed: usize,
    pub new_events: usize,
    pub updated_events: usize,
    pub disappeared_events: usize,
    /// Cursor position after the run.
    pub cursor: Option<String>,
}

/// Replays the snapshot log against the persisted store.
///
/// Owns the tracked-state map for the duration of one run; nothing about a
/// run survives into the next one except what is persisted.
pub struct ReconcileEngine<S: SnapshotSource> {
    source: S,
    pool: SqlitePool,
    cfg: EngineConfig,
}

impl<S: SnapshotSource> ReconcileEngine<S> {
    pub fn new(source: S, pool: SqlitePool, cfg: EngineConfig) -> Self {
        Self { source, pool, cfg }
    }

    /// Plan, seed, replay, and report.
    pub async fn run(&self) -> Result<RunReport> {
        let commits = self
            .source
            .list_commits()
            .context("listing snapshot log commits")?;
        let cursor = fogo_db::get_cursor(&self.pool).await?;
        let plan = plan_range(cursor.as_deref(), &commits);

        let mut report = RunReport {
            mode: plan.mode,
            planned: plan.commits.len(),
            processed: 0,
            new_events: 0,
            updated_events: 0,
            disappeared_events: 0,
            cursor: cursor.clone(),
        };

        match plan.mode {
            PlanMode::UpToDate => {
                info!(cursor = cursor.as_deref(), "already up to date");
                return Ok(report);
            }
            PlanMode::FirstRun => info!(planned = report.planned, "first run; replaying full history"),
            PlanMode::Incremental => info!(planned = report.planned, "replaying new commits"),
            PlanMode::FullRescan => warn!(
                cursor = cursor.as_deref(),
                planned = report.planned,
                "cursor no longer resolves against the log; falling back to full history"
            ),
        }
        if plan.commits.is_empty() {
            return Ok(report);
        }

        let index = fogo_db::fire_index(&self.pool).await?;
        let mut known: BTreeSet<String> = index.iter().map(|r| r.fire_id.clone()).collect();
        let mut state = self.seed_state(&index);

        let total = plan.commits.len();
        let mut tx: Transaction<'static, Sqlite> =
            self.pool.begin().await.context("begin batch transaction")?;
        let mut pending = 0usize;

        for (i, commit) in plan.commits.iter().enumerate() {
            let bytes = self
                .source
                .read_file_at(&commit.id, &self.cfg.file_path)
                .with_context(|| format!("reading snapshot at commit '{}'", commit.id))?;
            let current = parse_snapshot(bytes.as_deref());

            self.apply_commit(&mut tx, commit, &current, &mut known, &mut state, &mut report)
                .await?;
            report.processed += 1;
            pending += 1;

            if pending >= self.cfg.batch_size || i + 1 == total {
                fogo_db::set_cursor(&mut tx, &commit.id).await?;
                tx.commit().await.context("commit batch transaction")?;
                report.cursor = Some(commit.id.clone());
                tx = self.pool.begin().await.context("begin batch transaction")?;
                pending = 0;
            }
        }
        // The loop always commits on its final iteration; the transaction
        // opened after that holds no writes and rolls back on drop.
        drop(tx);

        info!(
            processed = report.processed,
            new = report.new_events,
            updated = report.updated_events,
            disappeared = report.disappeared_events,
            cursor = report.cursor.as_deref(),
            "replay complete"
        );
        Ok(report)
    }

    fn seed_state(&self, index: &[FireIndexRow]) -> BTreeMap<String, FireRecord> {
        if index.is_empty() {
            return BTreeMap::new();
        }
        load_seed_states(&self.source, index, &self.cfg.file_path)
    }

    async fn apply_commit(
        &self,
        conn: &mut SqliteConnection,
        commit: &CommitInfo,
        current: &BTreeMap<String, FireRecord>,
        known: &mut BTreeSet<String>,
        state: &mut BTreeMap<String, FireRecord>,
        report: &mut RunReport,
    ) -> Result<()> {
        // Step 2: ids present in this snapshot.
        for (id, rec) in current {
            if !known.contains(id) {
                fogo_db::insert_fire(&mut *conn, &new_fire_row(rec, commit)).await?;
                fogo_db::append_event(&mut *conn, &observation_event(rec, commit, EventKind::New))
                    .await?;
                known.insert(id.clone());
                report.new_events += 1;
            } else if differs(state.get(id), Some(rec)) {
                fogo_db::update_fire(&mut *conn, &fire_update(rec, commit)).await?;
                fogo_db::append_event(
                    &mut *conn,
                    &observation_event(rec, commit, EventKind::Updated),
                )
                .await?;
                report.updated_events += 1;
            } else {
                fogo_db::touch_fire(&mut *conn, id, &commit.id, rec.data_timestamp()).await?;
            }
        }

        // Step 3: tracked ids absent from this snapshot, judged against the
        // state from before this commit.
        let absent: Vec<String> = state
            .keys()
            .filter(|id| !current.contains_key(*id))
            .cloned()
            .collect();
        for id in absent {
            let Some(last) = state.get_mut(&id) else {
                continue;
            };
            if !last.active {
                continue;
            }
            fogo_db::mark_fire_inactive(&mut *conn, &id, &commit.id, commit.timestamp).await?;
            fogo_db::append_event(&mut *conn, &disappearance_event(&id, last, commit)).await?;
            last.active = false;
            report.disappeared_events += 1;
        }

        // Step 4: fold this commit's records into tracked state.
        for (id, rec) in current {
            state.insert(id.clone(), rec.clone());
        }
        Ok(())
    }
}

fn new_fire_row(rec: &FireRecord, commit: &CommitInfo) -> FireRow {
    FireRow {
        fire_id: rec.id.clone(),
        lat: rec.lat,
        lng: rec.lng,
        location: rec.location.clone(),
        district: rec.district.clone(),
        concelho: rec.concelho.clone(),
        freguesia: rec.freguesia.clone(),
        natureza: rec.natureza.clone(),
        first_seen_commit: commit.id.clone(),
        first_seen_ts: rec.date_time.map(|d| d.sec),
        last_seen_commit: commit.id.clone(),
        last_seen_ts: rec.data_timestamp(),
        is_active: rec.active,
    }
}

fn fire_update(rec: &FireRecord, commit: &CommitInfo) -> FireUpdate {
    FireUpdate {
        fire_id: rec.id.clone(),
        lat: rec.lat,
        lng: rec.lng,
        location: rec.location.clone(),
        district: rec.district.clone(),
        concelho: rec.concelho.clone(),
        freguesia: rec.freguesia.clone(),
        natureza: rec.natureza.clone(),
        last_seen_commit: commit.id.clone(),
        last_seen_ts: rec.data_timestamp(),
        is_active: rec.active,
    }
}

fn observation_event(rec: &FireRecord, commit: &CommitInfo, kind: EventKind) -> NewEvent {
    NewEvent {
        fire_id: rec.id.clone(),
        commit_id: commit.id.clone(),
        commit_ts: commit.timestamp,
        data_ts: rec.data_timestamp(),
        status: rec.status.clone(),
        status_code: rec.status_code,
        man: rec.man,
        terrain: rec.terrain,
        aerial: rec.aerial,
        aquatic: rec.meios_aquaticos,
        active: rec.active,
        kind,
        raw: Some(rec.raw.clone()),
    }
}

/// No data point exists for an absence, so the commit timestamp stands in
/// for the data timestamp and the last known payload is logged.
fn disappearance_event(fire_id: &str, last: &FireRecord, commit: &CommitInfo) -> NewEvent {
    NewEvent {
        fire_id: fire_id.to_string(),
        commit_id: commit.id.clone(),
        commit_ts: commit.timestamp,
        data_ts: Some(commit.timestamp),
        status: Some("Disappeared from source".to_string()),
        status_code: None,
        man: last.man,
        terrain: last.terrain,
        aerial: last.aerial,
        aquatic: last.meios_aquaticos,
        active: false,
        kind: EventKind::Disappeared,
        raw: Some(last.raw.clone()),
    }
}
