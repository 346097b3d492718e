//! fogo-engine
//!
//! The reconciliation engine: replays the commit-ordered snapshot log,
//! diffs each snapshot against tracked entity state, and records lifecycle
//! transitions (NEW / UPDATED / DISAPPEARED) in the persisted store.
//!
//! Architectural decisions:
//! - One algorithm for full and incremental scans, parameterized by the
//!   planned commit range and a seed-state map (empty on a cold store)
//! - Tracked state is owned by the engine for the duration of one run;
//!   no ambient shared mutability across runs
//! - Strictly sequential replay: disappearance is defined relative to the
//!   state before the current commit, so commit order is load-bearing
//! - The cursor advance is the final write of each batch transaction; a
//!   crash leaves the store resumable at the last committed batch boundary

mod engine;
mod plan;
mod seed;

pub use engine::{EngineConfig, ReconcileEngine, RunReport};
pub use plan::{plan_range, PlanMode, RangePlan};
pub use seed::load_seed_states;
