pub mod market_snapshot_routine;
pub mod routine;

pub use market_snapshot_routine::{MarketSnapshotRoutine, RunSummary};
pub use routine::{Routine, RoutineError};
