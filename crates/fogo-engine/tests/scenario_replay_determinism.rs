//! Scenario: replay determinism and batch-size independence.
//!
//! # Invariants under test
//! 1. From a cold store, the final fire table and event sequence are
//!    identical whether the run commits after every commit or once at the
//!    end.
//! 2. Untracked-field churn produces zero events and leaves the entity
//!    unchanged except for `last_seen`.

use anyhow::Result;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use fogo_engine::{EngineConfig, ReconcileEngine};
use fogo_source::MemorySource;

const FILE: &str = "fogos.json";

fn snapshot(fires: &[Value]) -> Vec<u8> {
    json!({"success": true, "data": fires}).to_string().into_bytes()
}

fn build_source() -> MemorySource {
    let mut src = MemorySource::new();
    src.push_commit("c1", 1_000).put_file(
        "c1",
        FILE,
        snapshot(&[
            json!({"id": "F1", "man": 5, "active": true, "updated": {"sec": 900}}),
            json!({"id": "F2", "man": 2, "active": true, "updated": {"sec": 910}}),
        ]),
    );
    src.push_commit("c2", 2_000).put_file(
        "c2",
        FILE,
        snapshot(&[json!({"id": "F1", "man": 7, "active": true, "updated": {"sec": 1_900}})]),
    );
    src.push_commit("c3", 3_000).put_file(
        "c3",
        FILE,
        snapshot(&[
            json!({"id": "F1", "man": 7, "active": true, "updated": {"sec": 1_900}}),
            json!({"id": "F3", "active": true, "dateTime": {"sec": 2_900}}),
        ]),
    );
    src
}

async fn replay_with_batch_size(batch_size: usize) -> Result<SqlitePool> {
    let pool = fogo_db::connect_memory().await?;
    let cfg = EngineConfig::new(FILE).with_batch_size(batch_size);
    let report = ReconcileEngine::new(build_source(), pool.clone(), cfg).run().await?;
    assert_eq!(report.processed, 3);
    assert_eq!(report.cursor.as_deref(), Some("c3"));
    Ok(pool)
}

#[tokio::test]
async fn final_state_is_independent_of_batch_size() -> Result<()> {
    let per_commit = replay_with_batch_size(1).await?;
    let single_batch = replay_with_batch_size(100).await?;

    let fires_a = fogo_db::list_fires(&per_commit, &Default::default()).await?;
    let fires_b = fogo_db::list_fires(&single_batch, &Default::default()).await?;
    assert_eq!(fires_a, fires_b);

    for id in ["F1", "F2", "F3"] {
        let ev_a = fogo_db::events_for_fire(&per_commit, id).await?;
        let ev_b = fogo_db::events_for_fire(&single_batch, id).await?;
        assert_eq!(ev_a, ev_b, "event history for {id} must match");
    }
    assert_eq!(
        fogo_db::get_cursor(&per_commit).await?,
        fogo_db::get_cursor(&single_batch).await?
    );

    Ok(())
}

#[tokio::test]
async fn untracked_churn_produces_no_events() -> Result<()> {
    let mut src = MemorySource::new();
    src.push_commit("c1", 1_000).put_file(
        "c1",
        FILE,
        snapshot(&[json!({
            "id": "F1", "active": true, "icon": "red",
            "dateTime": {"sec": 900},
        })]),
    );
    src.push_commit("c2", 2_000).put_file(
        "c2",
        FILE,
        snapshot(&[json!({
            "id": "F1", "active": true, "icon": "blue",
            "dateTime": {"sec": 900},
        })]),
    );

    let pool = fogo_db::connect_memory().await?;
    let report = ReconcileEngine::new(src, pool.clone(), EngineConfig::new(FILE))
        .run()
        .await?;

    assert_eq!(report.new_events, 1);
    assert_eq!(report.updated_events, 0, "icon churn is untracked");
    let events = fogo_db::events_for_fire(&pool, "F1").await?;
    assert_eq!(events.len(), 1);

    let fire = fogo_db::fetch_fire(&pool, "F1").await?.expect("F1 persisted");
    assert_eq!(fire.last_seen_commit, "c2", "last_seen still advances");

    Ok(())
}
