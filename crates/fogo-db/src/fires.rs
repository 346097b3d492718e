//! Fire-entity table: one mutable row per tracked fire.
//!
//! Rows are created on first appearance and mutated on every later
//! observation; they are never deleted (disappearance flips `is_active`).

use anyhow::{Context, Result};
use sqlx::{SqliteConnection, SqlitePool};

/// One persisted fire entity.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FireRow {
    pub fire_id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub location: Option<String>,
    pub district: Option<String>,
    pub concelho: Option<String>,
    pub freguesia: Option<String>,
    pub natureza: Option<String>,
    /// Commit at which the fire first appeared.  Immutable after creation.
    pub first_seen_commit: String,
    pub first_seen_ts: Option<i64>,
    /// Commit of the most recent observation (including unchanged ones).
    pub last_seen_commit: String,
    pub last_seen_ts: Option<i64>,
    pub is_active: bool,
}

/// Mutable fields applied on an UPDATED observation.
#[derive(Debug, Clone)]
pub struct FireUpdate {
    pub fire_id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub location: Option<String>,
    pub district: Option<String>,
    pub concelho: Option<String>,
    pub freguesia: Option<String>,
    pub natureza: Option<String>,
    pub last_seen_commit: String,
    pub last_seen_ts: Option<i64>,
    pub is_active: bool,
}

/// Create the row for a newly appeared fire.
pub async fn insert_fire(conn: &mut SqliteConnection, row: &FireRow) -> Result<()> {
    sqlx::query(
        r#"
        insert into fires (
          fire_id, lat, lng, location, district, concelho, freguesia, natureza,
          first_seen_commit, first_seen_ts, last_seen_commit, last_seen_ts, is_active
        ) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&row.fire_id)
    .bind(row.lat)
    .bind(row.lng)
    .bind(&row.location)
    .bind(&row.district)
    .bind(&row.concelho)
    .bind(&row.freguesia)
    .bind(&row.natureza)
    .bind(&row.first_seen_commit)
    .bind(row.first_seen_ts)
    .bind(&row.last_seen_commit)
    .bind(row.last_seen_ts)
    .bind(row.is_active)
    .execute(conn)
    .await
    .with_context(|| format!("insert_fire failed for '{}'", row.fire_id))?;
    Ok(())
}

/// Apply an UPDATED observation.  `first_seen_*` is deliberately untouched.
pub async fn update_fire(conn: &mut SqliteConnection, up: &FireUpdate) -> Result<()> {
    sqlx::query(
        r#"
        update fires set
          lat = ?2, lng = ?3, location = ?4, district = ?5, concelho = ?6,
          freguesia = ?7, natureza = ?8,
          last_seen_commit = ?9, last_seen_ts = ?10, is_active = ?11
        where fire_id = ?1
        "#,
    )
    .bind(&up.fire_id)
    .bind(up.lat)
    .bind(up.lng)
    .bind(&up.location)
    .bind(&up.district)
    .bind(&up.concelho)
    .bind(&up.freguesia)
    .bind(&up.natureza)
    .bind(&up.last_seen_commit)
    .bind(up.last_seen_ts)
    .bind(up.is_active)
    .execute(conn)
    .await
    .with_context(|| format!("update_fire failed for '{}'", up.fire_id))?;
    Ok(())
}

/// Refresh `last_seen` for an unchanged-but-present observation.
pub async fn touch_fire(
    conn: &mut SqliteConnection,
    fire_id: &str,
    commit_id: &str,
    data_ts: Option<i64>,
) -> Result<()> {
    sqlx::query("update fires set last_seen_commit = ?2, last_seen_ts = ?3 where fire_id = ?1")
        .bind(fire_id)
        .bind(commit_id)
        .bind(data_ts)
        .execute(conn)
        .await
        .with_context(|| format!("touch_fire failed for '{fire_id}'"))?;
    Ok(())
}

/// Record a disappearance: the fire is no longer listed, so the observation
/// time is the commit timestamp.
pub async fn mark_fire_inactive(
    conn: &mut SqliteConnection,
    fire_id: &str,
    commit_id: &str,
    commit_ts: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        update fires set is_active = 0, last_seen_commit = ?2, last_seen_ts = ?3
        where fire_id = ?1
        "#,
    )
    .bind(fire_id)
    .bind(commit_id)
    .bind(commit_ts)
    .execute(conn)
    .await
    .with_context(|| format!("mark_fire_inactive failed for '{fire_id}'"))?;
    Ok(())
}

/// Minimal per-entity index used by the cold-start loader: every persisted
/// fire id with the commit of its last observation.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FireIndexRow {
    pub fire_id: String,
    pub last_seen_commit: String,
}

pub async fn fire_index(pool: &SqlitePool) -> Result<Vec<FireIndexRow>> {
    sqlx::query_as("select fire_id, last_seen_commit from fires order by fire_id asc")
        .fetch_all(pool)
        .await
        .context("fire_index failed")
}

// ---------------------------------------------------------------------------
// Read API (consumed by the external serving layer)
// ---------------------------------------------------------------------------

pub async fn fetch_fire(pool: &SqlitePool, fire_id: &str) -> Result<Option<FireRow>> {
    sqlx::query_as("select * from fires where fire_id = ?1")
        .bind(fire_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("fetch_fire failed for '{fire_id}'"))
}

/// Filters for [`list_fires`].  `Default` lists everything, paginated.
#[derive(Debug, Clone, Default)]
pub struct FireFilter {
    /// Keep only fires with this activity state.
    pub active: Option<bool>,
    /// Case-insensitive substring match on `location`.
    pub location_like: Option<String>,
    /// Inclusive lower bound on `first_seen_ts`.
    pub first_seen_from: Option<i64>,
    /// Inclusive upper bound on `last_seen_ts`.
    pub last_seen_to: Option<i64>,
    /// Page size; `None` means no limit.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_fires(pool: &SqlitePool, filter: &FireFilter) -> Result<Vec<FireRow>> {
    sqlx::query_as(
        r#"
        select * from fires
        where (?1 is null or is_active = ?1)
          and (?2 is null or location like '%' || ?2 || '%')
          and (?3 is null or first_seen_ts >= ?3)
          and (?4 is null or last_seen_ts <= ?4)
        order by fire_id asc
        limit coalesce(?5, -1) offset coalesce(?6, 0)
        "#,
    )
    .bind(filter.active)
    .bind(&filter.location_like)
    .bind(filter.first_seen_from)
    .bind(filter.last_seen_to)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
    .context("list_fires failed")
}

/// New fires per calendar month of first appearance (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MonthCount {
    pub month: String,
    pub count: i64,
}

pub async fn count_new_fires_per_month(pool: &SqlitePool) -> Result<Vec<MonthCount>> {
    sqlx::query_as(
        r#"
        select strftime('%Y-%m', first_seen_ts, 'unixepoch') as month,
               count(*) as count
        from fires
        where first_seen_ts is not null
        group by month
        order by month asc
        "#,
    )
    .fetch_all(pool)
    .await
    .context("count_new_fires_per_month failed")
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DistrictCount {
    pub district: Option<String>,
    pub count: i64,
}

pub async fn count_fires_per_district(pool: &SqlitePool) -> Result<Vec<DistrictCount>> {
    sqlx::query_as(
        r#"
        select district, count(*) as count
        from fires
        group by district
        order by count desc, district asc
        "#,
    )
    .fetch_all(pool)
    .await
    .context("count_fires_per_district failed")
}

/// Observed lifetime per fire (last seen minus first seen), for duration
/// histograms.  Fires without both timestamps are excluded.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FireDuration {
    pub fire_id: String,
    pub seconds: i64,
}

pub async fn fire_durations(pool: &SqlitePool) -> Result<Vec<FireDuration>> {
    sqlx::query_as(
        r#"
        select fire_id, last_seen_ts - first_seen_ts as seconds
        from fires
        where first_seen_ts is not null and last_seen_ts is not null
        order by fire_id asc
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fire_durations failed")
}

/// Min first-seen / max last-seen across the whole table, or `None` when the
/// store is empty of timestamped fires.
pub async fn seen_date_range(pool: &SqlitePool) -> Result<Option<(i64, i64)>> {
    let row: (Option<i64>, Option<i64>) =
        sqlx::query_as("select min(first_seen_ts), max(last_seen_ts) from fires")
            .fetch_one(pool)
            .await
            .context("seen_date_range failed")?;
    Ok(match row {
        (Some(lo), Some(hi)) => Some((lo, hi)),
        _ => None,
    })
}
