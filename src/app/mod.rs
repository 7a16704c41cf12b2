//! Run orchestration: worker start-up, the control loop, and the final report.
mod progress;
mod roster;
mod runner;
mod summary;

#[cfg(test)]
mod tests;

pub use roster::{SpawnRecord, WorkerRole, WorkerRoster};
pub use runner::{RunOutcome, run_load};
pub use summary::build_report;
