//! Lifecycle event log: append-only, one row per meaningful transition.
//!
//! # Invariants
//! - Rows are only ever inserted; nothing updates or deletes them.
//! - No row exists for an observation that was field-identical to the
//!   entity's last recorded state (UNCHANGED produces no event).

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};

/// Kind of lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    New,
    Updated,
    Disappeared,
}

impl EventKind {
    /// Stable text stored in the `kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::New => "NEW",
            EventKind::Updated => "UPDATED",
            EventKind::Disappeared => "DISAPPEARED",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition to append.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub fire_id: String,
    pub commit_id: String,
    pub commit_ts: i64,
    /// Data-side timestamp; for DISAPPEARED the commit timestamp is
    /// substituted (no data point exists for an absence).
    pub data_ts: Option<i64>,
    pub status: Option<String>,
    pub status_code: Option<i64>,
    pub man: Option<i64>,
    pub terrain: Option<i64>,
    pub aerial: Option<i64>,
    pub aquatic: Option<i64>,
    pub active: bool,
    pub kind: EventKind,
    /// Raw snapshot payload for the entity as observed in this commit (for
    /// DISAPPEARED: its last known payload).
    pub raw: Option<Value>,
}

/// A persisted transition.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EventRow {
    pub event_id: i64,
    pub fire_id: String,
    pub commit_id: String,
    pub commit_ts: i64,
    pub data_ts: Option<i64>,
    pub status: Option<String>,
    pub status_code: Option<i64>,
    pub man: Option<i64>,
    pub terrain: Option<i64>,
    pub aerial: Option<i64>,
    pub aquatic: Option<i64>,
    pub active: bool,
    pub kind: String,
    pub raw: Option<String>,
}

pub async fn append_event(conn: &mut SqliteConnection, ev: &NewEvent) -> Result<()> {
    sqlx::query(
        r#"
        insert into fire_events (
          fire_id, commit_id, commit_ts, data_ts, status, status_code,
          man, terrain, aerial, aquatic, active, kind, raw
        ) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&ev.fire_id)
    .bind(&ev.commit_id)
    .bind(ev.commit_ts)
    .bind(ev.data_ts)
    .bind(&ev.status)
    .bind(ev.status_code)
    .bind(ev.man)
    .bind(ev.terrain)
    .bind(ev.aerial)
    .bind(ev.aquatic)
    .bind(ev.active)
    .bind(ev.kind.as_str())
    .bind(ev.raw.as_ref().map(Value::to_string))
    .execute(conn)
    .await
    .with_context(|| format!("append_event failed for '{}'", ev.fire_id))?;
    Ok(())
}

/// Full event history for one fire, oldest first.
pub async fn events_for_fire(pool: &SqlitePool, fire_id: &str) -> Result<Vec<EventRow>> {
    sqlx::query_as("select * from fire_events where fire_id = ?1 order by event_id asc")
        .bind(fire_id)
        .fetch_all(pool)
        .await
        .with_context(|| format!("events_for_fire failed for '{fire_id}'"))
}

/// Events per calendar day of commit timestamp (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DayCount {
    pub day: String,
    pub count: i64,
}

pub async fn events_per_day(pool: &SqlitePool) -> Result<Vec<DayCount>> {
    sqlx::query_as(
        r#"
        select date(commit_ts, 'unixepoch') as day,
               count(*) as count
        from fire_events
        group by day
        order by day asc
        "#,
    )
    .fetch_all(pool)
    .await
    .context("events_per_day failed")
}
