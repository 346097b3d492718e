//! fogo-snapshot
//!
//! Wire-level fire records, the snapshot parser, and the change classifier.
//!
//! Architectural decisions:
//! - Malformed or missing snapshot payloads parse to an empty fire set
//!   (a transient upstream outage must drive disappearance, never abort replay)
//! - Only a fixed set of tracked fields can produce a difference; churn in
//!   untracked fields is invisible to the event log
//! - Deterministic, pure logic. No IO. No DB calls.

mod diff;
mod parse;
mod record;

pub use diff::differs;
pub use parse::parse_snapshot;
pub use record::{EpochSec, FireRecord};
