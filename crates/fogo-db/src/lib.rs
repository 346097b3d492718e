//! fogo-db
//!
//! Persisted store for the reconciliation engine: the fire-entity table, the
//! append-only lifecycle event log, and the singleton replay cursor, all in
//! a single local SQLite file.
//!
//! Architectural decisions:
//! - Single-writer process: the pool holds exactly one connection; SQLite's
//!   own transaction isolation is the only locking discipline.
//! - Write functions take `&mut SqliteConnection` so one batch transaction
//!   can carry the entity/event writes *and* the cursor advance together.
//! - Read functions take `&SqlitePool`; the (external) serving layer only
//!   ever sees the read API.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{SqliteConnection, SqlitePool};

mod events;
mod fires;

pub use events::{
    append_event, events_for_fire, events_per_day, DayCount, EventKind, EventRow, NewEvent,
};
pub use fires::{
    count_fires_per_district, count_new_fires_per_month, fetch_fire, fire_durations, fire_index,
    insert_fire, list_fires, mark_fire_inactive, seen_date_range, touch_fire, update_fire,
    DistrictCount, FireDuration, FireFilter, FireIndexRow, FireRow, FireUpdate, MonthCount,
};

pub const ENV_DB_URL: &str = "FOGO_DATABASE_URL";
pub const DEFAULT_DB_URL: &str = "sqlite:fogos.sqlite?mode=rwc";

/// Key in `meta` under which the replay cursor is stored.
const CURSOR_KEY: &str = "last_processed_commit";

/// Connect using `FOGO_DATABASE_URL`, defaulting to a local SQLite file.
pub async fn connect_from_env() -> Result<SqlitePool> {
    let url = std::env::var(ENV_DB_URL).unwrap_or_else(|_| DEFAULT_DB_URL.to_string());
    connect(&url).await
}

/// Connect to SQLite at `url`.
///
/// The pool is capped at one connection: this is a single-writer process,
/// and for `sqlite::memory:` every connection would otherwise be a distinct
/// empty database.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(url)
        .await
        .with_context(|| format!("failed to connect to SQLite at '{url}'"))?;
    Ok(pool)
}

/// In-memory database for tests and tooling.
pub async fn connect_memory() -> Result<SqlitePool> {
    let pool = connect("sqlite::memory:").await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Run embedded migrations.  Idempotent.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &SqlitePool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (exists,): (i64,) = sqlx::query_as(
        "select count(*) from sqlite_master where type = 'table' and name = 'fires'",
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok: one == 1,
        has_fires_table: exists > 0,
    })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_fires_table: bool,
}

/// Read the replay cursor: the last commit whose snapshot was fully
/// reconciled, or `None` on a fresh store.
pub async fn get_cursor(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("select value from meta where key = ?1")
        .bind(CURSOR_KEY)
        .fetch_optional(pool)
        .await
        .context("get_cursor failed")?;
    Ok(row.map(|(v,)| v))
}

/// Advance the cursor.  Must be the final write of a batch transaction so a
/// crash never leaves the cursor ahead of unpersisted state.
pub async fn set_cursor(conn: &mut SqliteConnection, commit_id: &str) -> Result<()> {
    sqlx::query("insert or replace into meta (key, value) values (?1, ?2)")
        .bind(CURSOR_KEY)
        .bind(commit_id)
        .execute(conn)
        .await
        .context("set_cursor failed")?;
    Ok(())
}

/// Drop the cursor, forcing the next run to replay the full history.
pub async fn clear_cursor(pool: &SqlitePool) -> Result<()> {
    sqlx::query("delete from meta where key = ?1")
        .bind(CURSOR_KEY)
        .execute(pool)
        .await
        .context("clear_cursor failed")?;
    Ok(())
}
