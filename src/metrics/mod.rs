//! Delivery accounting, timing windows, and latency histograms.
mod histogram;
mod tracker;
mod types;
mod window;


pub use histogram::LatencyHistogram;
pub use tracker::CompletionTracker;
pub use types::{LatencyPercentiles, SideSnapshot, TrackerSnapshot};
pub use window::TimeWindow;
